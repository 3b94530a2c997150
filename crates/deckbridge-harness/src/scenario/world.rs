//! World state for scenario execution.
//!
//! Holds the session under test and a record of every action it produced,
//! with helpers for oracle verification.

use std::time::Duration;

use deckbridge_core::{
    ConnectionId, Notice, Session, SessionAction, SessionConfig, SessionError, SessionState,
};
use deckbridge_proto::Payload;

/// Session plus everything it asked the runtime to do.
pub struct World {
    session: Session,
    actions: Vec<SessionAction>,
    last_opened: Option<ConnectionId>,
    send_errors: Vec<SessionError>,
}

impl World {
    /// Create a world around a fresh session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: Session::new(config),
            actions: Vec::new(),
            last_opened: None,
            send_errors: Vec::new(),
        }
    }

    /// Session under test.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Record actions produced by a step.
    pub(crate) fn record(&mut self, actions: Vec<SessionAction>) {
        for action in &actions {
            if let SessionAction::Open { conn, .. } = action {
                self.last_opened = Some(*conn);
            }
        }
        self.actions.extend(actions);
    }

    /// Record a rejected send.
    pub(crate) fn record_send_error(&mut self, error: SessionError) {
        self.send_errors.push(error);
    }

    /// Most recently opened socket, even if since torn down.
    pub fn last_opened(&self) -> Option<ConnectionId> {
        self.last_opened
    }

    /// Every action, in order.
    pub fn actions(&self) -> &[SessionAction] {
        &self.actions
    }

    /// Published notices, in order.
    pub fn notices(&self) -> Vec<&Notice> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Payloads handed off for persistence and publication.
    pub fn dispatched(&self) -> Vec<&Payload> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Dispatch(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Delays of every retry timer armed, in order.
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::ScheduleRetry { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect()
    }

    /// Number of sockets opened.
    pub fn opens(&self) -> usize {
        self.actions.iter().filter(|a| matches!(a, SessionAction::Open { .. })).count()
    }

    /// Number of handshakes requested.
    pub fn handshakes(&self) -> usize {
        self.actions.iter().filter(|a| matches!(a, SessionAction::SendHandshake { .. })).count()
    }

    /// Text written by successful sends.
    pub fn sent_text(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::SendText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Sends rejected by the session.
    pub fn send_errors(&self) -> &[SessionError] {
        &self.send_errors
    }
}
