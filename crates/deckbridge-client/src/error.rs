//! Client error types.

use deckbridge_core::SessionError;
use deckbridge_store::StoreError;

/// Errors returned by [`crate::DeckClient`] and carried by error events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Config rejected at construction or after merging with stored state.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Session failure (connect, send, reconnect, inbound decode).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The runtime task is gone.
    #[error("client runtime has shut down")]
    Shutdown,
}
