//! Session error types.

use crate::SessionState;

/// Errors surfaced by the session, either to a waiting caller or as `error`
/// events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Socket could not be opened, or failed while open.
    #[error("connection failed: {reason}")]
    ConnectionFailed {
        /// Transport-reported reason
        reason: String,
    },

    /// Retry budget used up; the session is idle until restarted.
    #[error("max reconnection attempts reached ({attempts})")]
    ReconnectExhausted {
        /// Consecutive failed attempts
        attempts: u32,
    },

    /// Outbound send while the socket is not open.
    #[error("not connected (state: {state:?})")]
    NotConnected {
        /// State at the time of the send
        state: SessionState,
    },

    /// Inbound text was not a `{type, data}` envelope.
    #[error("malformed message: {reason}")]
    MalformedMessage {
        /// Decoder message
        reason: String,
    },

    /// Outbound envelope could not be encoded.
    #[error("failed to encode outbound message: {reason}")]
    Encode {
        /// Encoder message
        reason: String,
    },
}
