//! Session state machine for the Deckbridge client.
//!
//! This module implements the session layer: connection lifecycle, inbound
//! message classification, and bounded reconnection.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods accept inputs describing what happened (no stored I/O handles)
//! - Methods return `Vec<SessionAction>` describing what should happen next
//! - A runtime executes the actions (open sockets, arm timers, publish events)
//!
//! # State Machine
//!
//! ```text
//!            connect                 opened
//! ┌──────┐ ──────────> ┌────────────┐ ──────> ┌───────────┐
//! │ Idle │             │ Connecting │         │ Connected │
//! └──────┘ <────┐      └────────────┘         └───────────┘
//!    ^          │        ^        │ closed          │ closed
//!    │   budget │  retry │        v                 v
//!    │  exhausted  elapsed  ┌──────────────┐ <──────┘
//!    │          └────────── │ Reconnecting │
//!    │                      └──────────────┘
//!    └──── disconnect (from any state)
//! ```
//!
//! # Connection ids
//!
//! Every socket attempt gets a fresh [`ConnectionId`]. Transport inputs carry
//! the id of the socket they came from, and only the active id is honored.
//! Tearing a socket down (disconnect, or a new connect superseding it) clears
//! the active id first, so the close that socket later reports is ignored and
//! never feeds the reconnect path.
//!
//! # Retry timer
//!
//! At most one retry is pending at any time. Scheduling a retry always cancels
//! the previous one, and every path out of `Reconnecting` cancels it too.

use std::time::Duration;

use deckbridge_proto::{Envelope, Payload, ProtocolError};
use tracing::{debug, info, warn};

use crate::{Backoff, SessionError};

/// Identifies one socket attempt.
pub type ConnectionId = u64;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Reconnect delay policy
    pub backoff: Backoff,
    /// Consecutive failed reconnects before giving up
    pub max_reconnect_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { backoff: Backoff::default(), max_reconnect_attempts: 5 }
    }
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No socket, no pending retry
    Idle,
    /// A socket attempt is in flight
    Connecting,
    /// Socket open, handshake sent, inbound messages dispatched
    Connected,
    /// Socket lost unexpectedly, retry timer armed
    Reconnecting,
}

/// Inputs to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// Caller asked to connect. Tears down any existing socket.
    Connect {
        /// Server URL
        url: String,
    },

    /// Caller asked to disconnect.
    Disconnect,

    /// Socket finished opening.
    TransportOpened {
        /// Socket the event came from
        conn: ConnectionId,
    },

    /// Socket reported an error. A `TransportClosed` for the same socket
    /// always follows.
    TransportError {
        /// Socket the event came from
        conn: ConnectionId,
        /// Transport-reported reason
        reason: String,
    },

    /// Socket closed, for whatever reason.
    TransportClosed {
        /// Socket the event came from
        conn: ConnectionId,
    },

    /// Retry timer fired.
    RetryElapsed,

    /// Text message arrived.
    TextReceived {
        /// Socket the message came from
        conn: ConnectionId,
        /// Raw message text
        text: String,
    },
}

/// Lifecycle notices to publish on the event surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Socket opened and handshake sent
    Connected,
    /// An open socket went away
    Disconnected,
    /// Something failed; see the error kind
    Error(SessionError),
}

/// Actions returned by the session state machine.
///
/// The runtime executes these in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Open a socket to `url` and report back tagged with `conn`.
    Open {
        /// Id the runtime must tag this socket's events with
        conn: ConnectionId,
        /// Server URL
        url: String,
    },

    /// Close socket `conn`. Its later events will be ignored.
    Close {
        /// Socket to close
        conn: ConnectionId,
    },

    /// Send the client handshake on socket `conn`.
    SendHandshake {
        /// Socket to send on
        conn: ConnectionId,
    },

    /// Send encoded text on socket `conn`.
    SendText {
        /// Socket to send on
        conn: ConnectionId,
        /// Encoded envelope
        text: String,
    },

    /// Arm the retry timer. Replaces any timer already armed.
    ScheduleRetry {
        /// Delay until `RetryElapsed` should be fed back
        delay: Duration,
        /// Which retry this will be (1-based)
        attempt: u32,
    },

    /// Disarm the retry timer.
    CancelRetry,

    /// Resolve the caller waiting on connect.
    SettleConnect(Result<(), SessionError>),

    /// Publish a lifecycle notice.
    Notify(Notice),

    /// Hand a validated inbound payload to the runtime for persistence and
    /// publication.
    Dispatch(Payload),
}

/// Session state machine
///
/// Owns the connection lifecycle and retry accounting for exactly one server.
/// This is a pure state machine: no I/O, no clock.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current state
    state: SessionState,
    /// Configuration
    config: SessionConfig,
    /// Server URL from the last connect
    url: Option<String>,
    /// Socket whose events are honored
    active: Option<ConnectionId>,
    /// Next id to hand out
    next_conn: ConnectionId,
    /// Consecutive failed reconnects
    attempts: u32,
    /// Whether a retry timer is armed
    retry_pending: bool,
    /// Whether a caller is waiting on connect
    awaiting_connect: bool,
}

impl Session {
    /// Create a session in `Idle`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: SessionState::Idle,
            config,
            url: None,
            active: None,
            next_conn: 1,
            attempts: 0,
            retry_pending: false,
            awaiting_connect: false,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Consecutive failed reconnects since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts
    }

    /// Socket whose events are currently honored.
    pub fn active_connection(&self) -> Option<ConnectionId> {
        self.active
    }

    /// Whether a retry timer is armed.
    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Process an input and return actions to execute.
    pub fn handle(&mut self, input: SessionInput) -> Vec<SessionAction> {
        match input {
            SessionInput::Connect { url } => self.connect(url),
            SessionInput::Disconnect => self.disconnect(),
            SessionInput::TransportOpened { conn } => self.on_opened(conn),
            SessionInput::TransportError { conn, reason } => self.on_error(conn, reason),
            SessionInput::TransportClosed { conn } => self.on_closed(conn),
            SessionInput::RetryElapsed => self.on_retry_elapsed(),
            SessionInput::TextReceived { conn, text } => self.on_text(conn, &text),
        }
    }

    /// Prepare an outbound envelope.
    ///
    /// # Errors
    ///
    /// `NotConnected` unless the session is `Connected`. No action is
    /// produced in that case, so nothing is written.
    pub fn send(&self, envelope: &Envelope) -> Result<Vec<SessionAction>, SessionError> {
        let (SessionState::Connected, Some(conn)) = (self.state, self.active) else {
            return Err(SessionError::NotConnected { state: self.state });
        };

        let text =
            envelope.encode().map_err(|e| SessionError::Encode { reason: e.to_string() })?;
        Ok(vec![SessionAction::SendText { conn, text }])
    }

    fn connect(&mut self, url: String) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        self.cancel_retry(&mut actions);
        self.tear_down(&mut actions);
        self.settle_connect(
            &mut actions,
            Err(SessionError::ConnectionFailed { reason: "superseded by a new connect".into() }),
        );

        // An explicit connect starts a fresh retry budget
        self.attempts = 0;
        self.url = Some(url);
        self.awaiting_connect = true;
        self.open(&mut actions);
        actions
    }

    fn disconnect(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        self.cancel_retry(&mut actions);
        self.tear_down(&mut actions);
        self.settle_connect(
            &mut actions,
            Err(SessionError::ConnectionFailed { reason: "disconnected before open".into() }),
        );

        if self.state != SessionState::Idle {
            info!(from = ?self.state, "session disconnected by caller");
        }
        self.state = SessionState::Idle;
        actions
    }

    fn on_opened(&mut self, conn: ConnectionId) -> Vec<SessionAction> {
        if !self.is_active(conn) || self.state != SessionState::Connecting {
            debug!(conn, state = ?self.state, "ignoring open from inactive socket");
            return vec![];
        }

        self.state = SessionState::Connected;
        self.attempts = 0;
        info!(conn, "session connected");

        let mut actions =
            vec![SessionAction::SendHandshake { conn }, SessionAction::Notify(Notice::Connected)];
        self.settle_connect(&mut actions, Ok(()));
        actions
    }

    fn on_error(&mut self, conn: ConnectionId, reason: String) -> Vec<SessionAction> {
        if !self.is_active(conn) {
            debug!(conn, %reason, "ignoring error from inactive socket");
            return vec![];
        }

        warn!(conn, %reason, attempts = self.attempts, "transport error");
        let error = SessionError::ConnectionFailed { reason };
        let mut actions = vec![SessionAction::Notify(Notice::Error(error.clone()))];
        self.settle_connect(&mut actions, Err(error));
        actions
    }

    fn on_closed(&mut self, conn: ConnectionId) -> Vec<SessionAction> {
        if !self.is_active(conn) {
            debug!(conn, "ignoring close from inactive socket");
            return vec![];
        }

        let mut actions = Vec::new();
        self.active = None;

        if self.state == SessionState::Connected {
            actions.push(SessionAction::Notify(Notice::Disconnected));
        }
        self.settle_connect(
            &mut actions,
            Err(SessionError::ConnectionFailed { reason: "closed before open".into() }),
        );

        self.schedule_retry(&mut actions);
        actions
    }

    fn on_retry_elapsed(&mut self) -> Vec<SessionAction> {
        if self.state != SessionState::Reconnecting || !self.retry_pending {
            debug!(state = ?self.state, "ignoring retry timer outside Reconnecting");
            return vec![];
        }

        self.retry_pending = false;
        self.attempts += 1;
        info!(attempt = self.attempts, "reconnecting");

        let mut actions = Vec::new();
        self.open(&mut actions);
        actions
    }

    fn on_text(&mut self, conn: ConnectionId, text: &str) -> Vec<SessionAction> {
        if !self.is_active(conn) || self.state != SessionState::Connected {
            debug!(conn, "ignoring message from inactive socket");
            return vec![];
        }

        let envelope = match Envelope::decode(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(conn, error = %e, "dropping malformed message");
                let error = SessionError::MalformedMessage { reason: e.to_string() };
                return vec![SessionAction::Notify(Notice::Error(error))];
            },
        };

        match Payload::from_envelope(envelope) {
            Ok(Payload::Handshake(_)) => {
                warn!(conn, "dropping unexpected inbound handshake");
                vec![]
            },
            Ok(payload) => vec![SessionAction::Dispatch(payload)],
            Err(ProtocolError::UnknownType(kind)) => {
                warn!(conn, %kind, "dropping message of unknown type");
                vec![]
            },
            Err(e) => {
                debug!(conn, error = %e, "dropping message that failed validation");
                vec![]
            },
        }
    }

    fn open(&mut self, actions: &mut Vec<SessionAction>) {
        let Some(url) = self.url.clone() else {
            warn!("no server url to connect to");
            self.state = SessionState::Idle;
            return;
        };

        let conn = self.next_conn;
        self.next_conn += 1;
        self.active = Some(conn);
        self.state = SessionState::Connecting;

        debug!(conn, %url, attempt = self.attempts, "opening socket");
        actions.push(SessionAction::Open { conn, url });
    }

    fn tear_down(&mut self, actions: &mut Vec<SessionAction>) {
        if let Some(conn) = self.active.take() {
            actions.push(SessionAction::Close { conn });
        }
        if self.state == SessionState::Connected {
            actions.push(SessionAction::Notify(Notice::Disconnected));
        }
    }

    fn schedule_retry(&mut self, actions: &mut Vec<SessionAction>) {
        if self.attempts >= self.config.max_reconnect_attempts {
            warn!(attempts = self.attempts, "giving up on reconnecting");
            self.cancel_retry(actions);
            self.state = SessionState::Idle;
            let error = SessionError::ReconnectExhausted { attempts: self.attempts };
            actions.push(SessionAction::Notify(Notice::Error(error)));
            return;
        }

        self.cancel_retry(actions);

        let delay = self.config.backoff.delay(self.attempts);
        self.state = SessionState::Reconnecting;
        self.retry_pending = true;

        info!(delay_ms = delay.as_millis() as u64, attempt = self.attempts + 1, "scheduling retry");
        actions.push(SessionAction::ScheduleRetry { delay, attempt: self.attempts + 1 });
    }

    fn cancel_retry(&mut self, actions: &mut Vec<SessionAction>) {
        if self.retry_pending {
            self.retry_pending = false;
            actions.push(SessionAction::CancelRetry);
        }
    }

    fn settle_connect(
        &mut self,
        actions: &mut Vec<SessionAction>,
        result: Result<(), SessionError>,
    ) {
        if self.awaiting_connect {
            self.awaiting_connect = false;
            actions.push(SessionAction::SettleConnect(result));
        }
    }

    fn is_active(&self, conn: ConnectionId) -> bool {
        self.active == Some(conn)
    }
}
