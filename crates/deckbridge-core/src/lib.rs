//! Deckbridge session core
//!
//! Pure state machine logic for the Deckbridge client session, decoupled from
//! I/O, time and scheduling.
//!
//! # Architecture
//!
//! The session is a deterministic state machine. Socket events, timer expiry
//! and caller commands are fed in as [`session::SessionInput`] values; the
//! machine answers with declarative [`session::SessionAction`]s describing
//! what should happen (open a socket, schedule a retry, publish an event). A
//! runtime interprets those actions against real sockets and timers; tests
//! interpret them against scripted ones.
//!
//! Keeping the machine free of I/O means the reconnect policy, the
//! one-timer-at-a-time rule and the stale-socket filtering can be checked
//! exhaustively without a network.
//!
//! # Components
//!
//! - [`session`]: Session state machine (connect, classify, reconnect)
//! - [`backoff`]: Reconnect delay policy
//! - [`mod@env`]: Environment abstraction (wall clock, sleep)
//! - [`transport`]: Transport abstraction (text message channel)
//! - [`bridge`]: Platform capability seam (device info, key-value storage)
//! - [`error`]: Session error types

pub mod backoff;
pub mod bridge;
pub mod env;
pub mod error;
pub mod session;
pub mod transport;

pub use backoff::Backoff;
pub use bridge::{BridgeError, PlatformBridge};
pub use env::Environment;
pub use error::SessionError;
pub use session::{
    ConnectionId, Notice, Session, SessionAction, SessionConfig, SessionInput, SessionState,
};
pub use transport::{MessageSink, MessageStream, Transport};
