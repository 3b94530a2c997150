//! Backend over the host platform's key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use deckbridge_core::PlatformBridge;

use crate::{AdapterError, PersistenceAdapter};

/// Delegates every operation to a [`PlatformBridge`].
#[derive(Clone)]
pub struct NativeAdapter {
    bridge: Arc<dyn PlatformBridge>,
}

impl NativeAdapter {
    /// Wrap a bridge.
    pub fn new(bridge: Arc<dyn PlatformBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl PersistenceAdapter for NativeAdapter {
    async fn get(&self, key: &str) -> Result<Option<String>, AdapterError> {
        Ok(self.bridge.get_item(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AdapterError> {
        Ok(self.bridge.set_item(key, value).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), AdapterError> {
        Ok(self.bridge.remove_item(key).await?)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AdapterError> {
        Ok(self.bridge.list_keys(prefix).await?)
    }
}
