//! Event surface.
//!
//! Lifecycle changes and inbound records are broadcast to every subscriber.
//! Delivery is fire-and-forget: the runtime never waits for a subscriber.
//! The buffer is bounded; a subscriber that falls behind loses the oldest
//! events and is told how many on its next receive.

use deckbridge_proto::{Action, Config, Profile, Stored};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::ClientError;

/// Event published by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Socket opened
    Connected,
    /// Open socket went away
    Disconnected,
    /// Something failed
    Error(ClientError),
    /// Action received and persisted
    Action(Stored<Action>),
    /// Config received and persisted
    Config(Stored<Config>),
    /// Profile received (not persisted)
    Profile(Profile),
}

/// Discriminant of [`ClientEvent`], for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`ClientEvent::Connected`]
    Connected,
    /// [`ClientEvent::Disconnected`]
    Disconnected,
    /// [`ClientEvent::Error`]
    Error,
    /// [`ClientEvent::Action`]
    Action,
    /// [`ClientEvent::Config`]
    Config,
    /// [`ClientEvent::Profile`]
    Profile,
}

impl ClientEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Disconnected => EventKind::Disconnected,
            Self::Error(_) => EventKind::Error,
            Self::Action(_) => EventKind::Action,
            Self::Config(_) => EventKind::Config,
            Self::Profile(_) => EventKind::Profile,
        }
    }
}

/// Why a subscription yielded no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    /// The subscriber fell behind and this many events were dropped.
    #[error("subscriber lagged, {0} events dropped")]
    Lagged(u64),

    /// The client and its runtime are gone.
    #[error("event stream closed")]
    Closed,
}

/// Receiving end of the event surface.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<ClientEvent>,
    kinds: Option<Vec<EventKind>>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<ClientEvent>, kinds: Option<Vec<EventKind>>) -> Self {
        Self { rx, kinds }
    }

    /// Wait for the next matching event.
    ///
    /// A `Lagged` error is reported once; the following call resumes with the
    /// oldest event still buffered.
    pub async fn recv(&mut self) -> Result<ClientEvent, SubscriptionError> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.wants(&event) => return Ok(event),
                Ok(_) => {},
                Err(RecvError::Lagged(missed)) => return Err(SubscriptionError::Lagged(missed)),
                Err(RecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Next matching event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<Option<ClientEvent>, SubscriptionError> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.wants(&event) => return Ok(Some(event)),
                Ok(_) => {},
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(missed)) => return Err(SubscriptionError::Lagged(missed)),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    fn wants(&self, event: &ClientEvent) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(&event.kind()))
    }
}

#[cfg(test)]
mod tests {
    use deckbridge_proto::{ActionKind, Profile};

    use super::*;

    fn profile() -> Profile {
        serde_json::from_value(serde_json::json!({
            "id": "p1", "name": "Main", "rows": 2, "columns": 3
        }))
        .unwrap()
    }

    #[test]
    fn filtered_subscription_skips_other_kinds() {
        let (tx, _) = broadcast::channel(8);
        let mut sub = Subscription::new(tx.subscribe(), Some(vec![EventKind::Profile]));

        tx.send(ClientEvent::Connected).unwrap();
        tx.send(ClientEvent::Profile(profile())).unwrap();
        tx.send(ClientEvent::Disconnected).unwrap();

        assert_eq!(sub.try_recv().unwrap(), Some(ClientEvent::Profile(profile())));
        assert_eq!(sub.try_recv().unwrap(), None);
    }

    #[test]
    fn lagging_subscriber_is_told_how_many_it_missed() {
        let (tx, _) = broadcast::channel(2);
        let mut sub = Subscription::new(tx.subscribe(), None);

        for _ in 0..5 {
            tx.send(ClientEvent::Connected).unwrap();
        }

        assert_eq!(sub.try_recv(), Err(SubscriptionError::Lagged(3)));
        assert_eq!(sub.try_recv().unwrap(), Some(ClientEvent::Connected));
    }

    #[tokio::test]
    async fn closed_when_senders_drop() {
        let (tx, rx) = broadcast::channel::<ClientEvent>(2);
        let mut sub = Subscription::new(rx, None);
        drop(tx);
        assert_eq!(sub.recv().await, Err(SubscriptionError::Closed));
    }

    #[test]
    fn kind_matches_variant() {
        let stored =
            Stored::first(deckbridge_proto::Action::new("a", ActionKind::Normal, "A"), 1);
        assert_eq!(ClientEvent::Action(stored).kind(), EventKind::Action);
        assert_eq!(ClientEvent::Error(ClientError::Shutdown).kind(), EventKind::Error);
    }
}
