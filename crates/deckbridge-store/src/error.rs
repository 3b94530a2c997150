//! Persistence error types.

use deckbridge_core::BridgeError;
use deckbridge_proto::StorageKind;

/// Failure reported by a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// Platform bridge call failed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the state store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A write or delete did not reach the backend.
    #[error("failed to write {key}: {reason}")]
    StorageWriteFailed {
        /// Storage key
        key: String,
        /// Backend-reported reason
        reason: String,
    },

    /// A stored value is not a valid record.
    #[error("corrupt record at {key}: {reason}")]
    CorruptRecord {
        /// Storage key
        key: String,
        /// Decoder message
        reason: String,
    },

    /// A record could not be encoded for storage.
    #[error("failed to encode {key}: {reason}")]
    Encode {
        /// Storage key
        key: String,
        /// Encoder message
        reason: String,
    },

    /// The configured backend has nothing to back it.
    #[error("storage backend {kind} selected but not provided")]
    AdapterUnavailable {
        /// Requested backend
        kind: StorageKind,
    },

    /// The config names a backend this client cannot provide.
    #[error("unsupported storage backend {name}")]
    UnsupportedBackend {
        /// Backend name as configured
        name: String,
    },
}
