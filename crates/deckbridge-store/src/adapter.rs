//! Persistence adapter contract.
//!
//! Backends only move strings. Every caller goes through [`Storage`], which
//! decides what a backend failure means:
//!
//! | operation   | on backend failure                  |
//! |-------------|-------------------------------------|
//! | `get`       | logged, treated as absent           |
//! | `set`       | `StorageWriteFailed`                |
//! | `remove`    | `StorageWriteFailed`                |
//! | `list_keys` | logged, treated as empty            |

use std::sync::Arc;

use async_trait::async_trait;
use deckbridge_core::PlatformBridge;
use deckbridge_proto::StorageKind;
use tracing::warn;

use crate::{AdapterError, NativeAdapter, StoreError};

/// Key-value backend.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync + 'static {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>, AdapterError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), AdapterError>;

    /// Delete a value. Deleting a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), AdapterError>;

    /// Keys starting with `prefix`.
    ///
    /// Backends that cannot enumerate keep the default, which reports none.
    async fn list_keys(&self, _prefix: &str) -> Result<Vec<String>, AdapterError> {
        Ok(Vec::new())
    }
}

/// Backend with uniform failure semantics.
#[derive(Clone)]
pub struct Storage {
    adapter: Arc<dyn PersistenceAdapter>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Wrap a backend.
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self { adapter }
    }

    /// Read a value. Backend failures read as absent.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.adapter.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "storage read failed, treating as absent");
                None
            },
        }
    }

    /// Write a value.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.adapter.set(key, value).await.map_err(|e| write_failed(key, &e))
    }

    /// Delete a value.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.adapter.remove(key).await.map_err(|e| write_failed(key, &e))
    }

    /// Keys starting with `prefix`. Backend failures read as empty.
    pub async fn list_keys(&self, prefix: &str) -> Vec<String> {
        match self.adapter.list_keys(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(prefix, error = %e, "storage enumeration failed, treating as empty");
                Vec::new()
            },
        }
    }
}

fn write_failed(key: &str, error: &AdapterError) -> StoreError {
    warn!(key, %error, "storage write failed");
    StoreError::StorageWriteFailed { key: key.to_string(), reason: error.to_string() }
}

/// Pick the backend a config asks for.
///
/// # Errors
///
/// `AdapterUnavailable` when `native` is requested without a bridge or
/// `custom` without an adapter. `UnsupportedBackend` for any other name.
pub fn select_adapter(
    kind: StorageKind,
    bridge: Option<Arc<dyn PlatformBridge>>,
    custom: Option<Arc<dyn PersistenceAdapter>>,
) -> Result<Arc<dyn PersistenceAdapter>, StoreError> {
    match kind {
        StorageKind::Native => bridge
            .map(|bridge| Arc::new(NativeAdapter::new(bridge)) as Arc<dyn PersistenceAdapter>)
            .ok_or(StoreError::AdapterUnavailable { kind }),
        StorageKind::Custom => custom.ok_or(StoreError::AdapterUnavailable { kind }),
        StorageKind::Other(name) => Err(StoreError::UnsupportedBackend { name }),
    }
}
