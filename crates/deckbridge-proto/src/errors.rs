//! Protocol error types.

use crate::MessageType;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while decoding or encoding wire messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Payload is not valid JSON or does not have the `{type, data}` shape.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Envelope is well-formed but its `type` is not one we route.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// Envelope data does not satisfy the record contract for its type.
    #[error("invalid {kind} record: {reason}")]
    InvalidRecord {
        /// Message type the data was routed as
        kind: MessageType,
        /// Why the record was rejected
        reason: String,
    },

    /// A value could not be serialized.
    #[error("failed to encode {kind}: {reason}")]
    Encode {
        /// What was being encoded
        kind: &'static str,
        /// Underlying serializer message
        reason: String,
    },
}
