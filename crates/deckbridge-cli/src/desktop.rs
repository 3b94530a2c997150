//! Platform bridge for desktop hosts.
//!
//! Device details come from the build target; records live in a single redb
//! table keyed by the store's string keys.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use deckbridge_core::{BridgeError, PlatformBridge};
use deckbridge_proto::{DeviceInfo, DisplayMetrics};
use redb::{Database, TableDefinition};
use tracing::debug;

const ITEMS: TableDefinition<&str, &str> = TableDefinition::new("items");

fn failed<E: Display>(operation: &'static str) -> impl FnOnce(E) -> BridgeError {
    move |e| BridgeError::new(operation, e.to_string())
}

/// [`PlatformBridge`] backed by a local redb file.
#[derive(Clone)]
pub struct DesktopBridge {
    db: Arc<Database>,
    path: PathBuf,
    display: DisplayMetrics,
}

impl std::fmt::Debug for DesktopBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopBridge").field("path", &self.path).finish_non_exhaustive()
    }
}

impl DesktopBridge {
    /// Open or create the database at `path`.
    pub fn open(path: impl AsRef<Path>, display: DisplayMetrics) -> Result<Self, BridgeError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(failed("open"))?;

        // Create the table up front so readers never see it missing
        let txn = db.begin_write().map_err(failed("open"))?;
        txn.open_table(ITEMS).map_err(failed("open"))?;
        txn.commit().map_err(failed("open"))?;

        debug!(path = %path.display(), "opened desktop store");
        Ok(Self { db: Arc::new(db), path, display })
    }

    /// Screen geometry reported when the caller knows only the resolution.
    pub fn display(width: u32, height: u32) -> DisplayMetrics {
        DisplayMetrics {
            width,
            height,
            density: 1.0,
            scaled_density: 1.0,
            xdpi: 96.0,
            ydpi: 96.0,
        }
    }
}

#[async_trait]
impl PlatformBridge for DesktopBridge {
    async fn device_info(&self) -> Result<DeviceInfo, BridgeError> {
        Ok(DeviceInfo {
            platform: std::env::consts::OS.to_string(),
            model: "desktop".to_string(),
            manufacturer: String::new(),
            version: String::new(),
            sdk_version: std::env::consts::ARCH.to_string(),
        })
    }

    async fn display_metrics(&self) -> Result<DisplayMetrics, BridgeError> {
        Ok(self.display.clone())
    }

    async fn storage_path(&self) -> Result<PathBuf, BridgeError> {
        Ok(self.path.parent().map(Path::to_path_buf).unwrap_or_default())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, BridgeError> {
        let txn = self.db.begin_read().map_err(failed("get_item"))?;
        let table = txn.open_table(ITEMS).map_err(failed("get_item"))?;
        let value = table.get(key).map_err(failed("get_item"))?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BridgeError> {
        let txn = self.db.begin_write().map_err(failed("set_item"))?;
        {
            let mut table = txn.open_table(ITEMS).map_err(failed("set_item"))?;
            table.insert(key, value).map_err(failed("set_item"))?;
        }
        txn.commit().map_err(failed("set_item"))
    }

    async fn remove_item(&self, key: &str) -> Result<(), BridgeError> {
        let txn = self.db.begin_write().map_err(failed("remove_item"))?;
        {
            let mut table = txn.open_table(ITEMS).map_err(failed("remove_item"))?;
            table.remove(key).map_err(failed("remove_item"))?;
        }
        txn.commit().map_err(failed("remove_item"))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BridgeError> {
        let txn = self.db.begin_read().map_err(failed("list_keys"))?;
        let table = txn.open_table(ITEMS).map_err(failed("list_keys"))?;

        let mut keys = Vec::new();
        for entry in table.range(prefix..).map_err(failed("list_keys"))? {
            let (key, _) = entry.map_err(failed("list_keys"))?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}
