//! Typed cache of server-pushed records.
//!
//! Actions live under `action:<id>`, the config under `config`. Values are
//! the JSON of [`Stored`] records: the record's fields, its unknown extras and
//! the two timestamps, all in one flat object.
//!
//! Writes read first. A record replacing a valid stored one keeps the stored
//! `createdAt`; a record replacing nothing (or garbage) starts fresh.

use deckbridge_proto::{Action, Config, Record, Stored};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{Storage, StoreError};

/// Key prefix for action records.
pub const ACTION_PREFIX: &str = "action:";

/// Key of the config record.
pub const CONFIG_KEY: &str = "config";

/// Action and config records over a [`Storage`] backend.
#[derive(Debug, Clone)]
pub struct StateStore {
    storage: Storage,
}

impl StateStore {
    /// Create a store over `storage`.
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Persist an action, stamped at `now_ms`.
    #[instrument(skip(self, action), fields(id = %action.id))]
    pub async fn store_action(
        &self,
        action: &Action,
        now_ms: u64,
    ) -> Result<Stored<Action>, StoreError> {
        self.store(&action_key(&action.id), action.clone(), now_ms).await
    }

    /// Load an action by id.
    ///
    /// # Errors
    ///
    /// `CorruptRecord` if the stored value is not a valid action.
    pub async fn get_action(&self, id: &str) -> Result<Option<Stored<Action>>, StoreError> {
        self.load(&action_key(id)).await
    }

    /// Persist the config, stamped at `now_ms`.
    #[instrument(skip(self, config))]
    pub async fn store_config(
        &self,
        config: &Config,
        now_ms: u64,
    ) -> Result<Stored<Config>, StoreError> {
        self.store(CONFIG_KEY, config.clone(), now_ms).await
    }

    /// Load the config.
    ///
    /// # Errors
    ///
    /// `CorruptRecord` if the stored value is not a valid config.
    pub async fn get_config(&self) -> Result<Option<Stored<Config>>, StoreError> {
        self.load(CONFIG_KEY).await
    }

    /// Ids of all stored actions, in backend order.
    ///
    /// Empty when the backend cannot enumerate.
    pub async fn list_stored_actions(&self) -> Vec<String> {
        self.storage
            .list_keys(ACTION_PREFIX)
            .await
            .into_iter()
            .filter_map(|key| key.strip_prefix(ACTION_PREFIX).map(str::to_string))
            .collect()
    }

    async fn store<T: Record + Clone>(
        &self,
        key: &str,
        record: T,
        now_ms: u64,
    ) -> Result<Stored<T>, StoreError> {
        let stored = match self.load::<T>(key).await {
            Ok(Some(previous)) => Stored::refresh(record, previous.created_at, now_ms),
            Ok(None) => Stored::first(record, now_ms),
            Err(e) => {
                debug!(key, error = %e, "replacing unreadable record");
                Stored::first(record, now_ms)
            },
        };

        let text = serde_json::to_string(&stored)
            .map_err(|e| StoreError::Encode { key: key.to_string(), reason: e.to_string() })?;
        self.storage.set(key, &text).await?;

        debug!(key, created_at = stored.created_at, "record stored");
        Ok(stored)
    }

    async fn load<T: Record>(&self, key: &str) -> Result<Option<Stored<T>>, StoreError> {
        let Some(text) = self.storage.get(key).await else {
            return Ok(None);
        };

        let corrupt = |reason: String| StoreError::CorruptRecord { key: key.to_string(), reason };
        let value: Value = serde_json::from_str(&text).map_err(|e| corrupt(e.to_string()))?;
        let stored: Stored<T> = serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))?;
        Ok(Some(stored))
    }
}

fn action_key(id: &str) -> String {
    format!("{ACTION_PREFIX}{id}")
}
