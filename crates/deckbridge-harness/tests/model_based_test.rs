//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! session behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!     ModelSession    RealSession      Compare
//!     (reference)   (state machine)   Observable
//! ```

use deckbridge_core::{
    ConnectionId, Notice, Session, SessionAction, SessionConfig, SessionError, SessionInput,
};
use deckbridge_harness::{ModelSession, ObservableState, Operation};
use proptest::prelude::*;

/// Real session wrapper that mirrors ModelSession's interface.
struct RealSession {
    session: Session,
    retry_delay_ms: Option<u64>,
    torn_down: Vec<ConnectionId>,
    connected_events: u32,
    disconnected_events: u32,
    exhausted_events: u32,
}

impl RealSession {
    fn new() -> Self {
        Self {
            session: Session::new(SessionConfig::default()),
            retry_delay_ms: None,
            torn_down: Vec::new(),
            connected_events: 0,
            disconnected_events: 0,
            exhausted_events: 0,
        }
    }

    fn apply(&mut self, op: Operation) {
        let active = self.session.active_connection();
        match op {
            Operation::Connect => self.feed(SessionInput::Connect { url: "ws://h:1".into() }),
            Operation::Disconnect => self.feed(SessionInput::Disconnect),
            Operation::RetryFires => self.feed(SessionInput::RetryElapsed),
            Operation::Open => {
                if let Some(conn) = active {
                    self.feed(SessionInput::TransportOpened { conn });
                }
            },
            Operation::Close => {
                if let Some(conn) = active {
                    self.feed(SessionInput::TransportClosed { conn });
                }
            },
            Operation::Fail => {
                if let Some(conn) = active {
                    self.feed(SessionInput::TransportError { conn, reason: "reset".into() });
                    self.feed(SessionInput::TransportClosed { conn });
                }
            },
            Operation::StaleClose => {
                // Ids start at 1, so 0 is never active
                let conn = self.torn_down.last().copied().unwrap_or(0);
                self.feed(SessionInput::TransportClosed { conn });
            },
        }
    }

    fn feed(&mut self, input: SessionInput) {
        for action in self.session.handle(input) {
            match action {
                SessionAction::Close { conn } => self.torn_down.push(conn),
                SessionAction::ScheduleRetry { delay, .. } => {
                    self.retry_delay_ms = Some(delay.as_millis() as u64);
                },
                SessionAction::CancelRetry => self.retry_delay_ms = None,
                SessionAction::Open { .. } => self.retry_delay_ms = None,
                SessionAction::Notify(Notice::Connected) => self.connected_events += 1,
                SessionAction::Notify(Notice::Disconnected) => self.disconnected_events += 1,
                SessionAction::Notify(Notice::Error(SessionError::ReconnectExhausted { .. })) => {
                    self.exhausted_events += 1;
                },
                _ => {},
            }
        }
    }

    fn observable_state(&self) -> ObservableState {
        ObservableState {
            state: self.session.state(),
            attempts: self.session.reconnect_attempts(),
            retry_delay_ms: self.retry_delay_ms,
            has_socket: self.session.active_connection().is_some(),
            connected_events: self.connected_events,
            disconnected_events: self.disconnected_events,
            exhausted_events: self.exhausted_events,
        }
    }
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        1 => Just(Operation::Connect),
        1 => Just(Operation::Disconnect),
        3 => Just(Operation::Open),
        1 => Just(Operation::Fail),
        3 => Just(Operation::Close),
        4 => Just(Operation::RetryFires),
        1 => Just(Operation::StaleClose),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn session_matches_model(ops in prop::collection::vec(operation(), 1..64)) {
        let mut model = ModelSession::new();
        let mut real = RealSession::new();

        for (step, op) in ops.iter().enumerate() {
            model.apply(*op);
            real.apply(*op);
            prop_assert_eq!(
                real.observable_state(),
                model.observable_state(),
                "diverged at step {} ({:?})",
                step,
                op
            );
        }
    }

    #[test]
    fn at_most_one_retry_pending(ops in prop::collection::vec(operation(), 1..64)) {
        let mut session = Session::new(SessionConfig::default());
        let mut armed = 0i32;

        for op in ops {
            let input = match op {
                Operation::Connect => SessionInput::Connect { url: "ws://h:1".into() },
                Operation::Disconnect => SessionInput::Disconnect,
                Operation::RetryFires => SessionInput::RetryElapsed,
                Operation::Open => SessionInput::TransportOpened {
                    conn: session.active_connection().unwrap_or(0),
                },
                Operation::Close | Operation::Fail | Operation::StaleClose => {
                    SessionInput::TransportClosed { conn: session.active_connection().unwrap_or(0) }
                },
            };
            let fired = matches!(input, SessionInput::RetryElapsed) && session.retry_pending();

            for action in session.handle(input) {
                match action {
                    SessionAction::ScheduleRetry { .. } => armed += 1,
                    SessionAction::CancelRetry => armed -= 1,
                    _ => {},
                }
            }
            if fired {
                armed -= 1;
            }

            prop_assert!((0..=1).contains(&armed), "armed timers: {}", armed);
            prop_assert_eq!(armed == 1, session.retry_pending());
        }
    }
}

#[cfg(test)]
mod smoke_tests {
    use super::*;

    #[test]
    fn real_and_model_agree_on_happy_path() {
        let mut model = ModelSession::new();
        let mut real = RealSession::new();

        for op in [Operation::Connect, Operation::Open, Operation::Close, Operation::RetryFires] {
            model.apply(op);
            real.apply(op);
        }

        assert_eq!(real.observable_state(), model.observable_state());
        assert_eq!(model.observable_state().attempts, 1);
    }
}
