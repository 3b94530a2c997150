//! Deckbridge persistence
//!
//! Durable caching of the records the server pushes. Two layers:
//!
//! - [`adapter`]: the key-value contract every backend satisfies, plus the
//!   [`Storage`] wrapper that fixes failure semantics in one place
//! - [`state_store`]: typed access to actions and config on top of a backend
//!
//! Backends: [`NativeAdapter`] delegates to the host platform bridge,
//! [`MemoryAdapter`] keeps everything in process. Callers may supply their own
//! [`PersistenceAdapter`].

pub mod adapter;
pub mod error;
pub mod memory;
pub mod native;
pub mod state_store;

pub use adapter::{PersistenceAdapter, Storage, select_adapter};
pub use error::{AdapterError, StoreError};
pub use memory::MemoryAdapter;
pub use native::NativeAdapter;
pub use state_store::{ACTION_PREFIX, CONFIG_KEY, StateStore};
