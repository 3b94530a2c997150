//! Scriptable platform bridge.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use deckbridge_core::{BridgeError, PlatformBridge};
use deckbridge_proto::{DeviceInfo, DisplayMetrics};

/// Platform bridge backed by an in-process map, with switchable failures.
#[derive(Debug)]
pub struct MemoryBridge {
    items: Mutex<BTreeMap<String, String>>,
    device_info: DeviceInfo,
    display_metrics: DisplayMetrics,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_device: AtomicBool,
}

impl MemoryBridge {
    /// Bridge reporting a phone-sized Android device.
    pub fn new() -> Self {
        Self::with_device(
            DeviceInfo {
                platform: "android".into(),
                model: "Pixel 8".into(),
                manufacturer: "Google".into(),
                version: "14".into(),
                sdk_version: "34".into(),
            },
            DisplayMetrics {
                width: 1080,
                height: 2400,
                density: 2.625,
                scaled_density: 2.625,
                xdpi: 420.0,
                ydpi: 420.0,
            },
        )
    }

    /// Bridge reporting the given device.
    pub fn with_device(device_info: DeviceInfo, display_metrics: DisplayMetrics) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            device_info,
            display_metrics,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_device: AtomicBool::new(false),
        }
    }

    /// Make `get_item` and `list_keys` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `set_item` and `remove_item` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `device_info` and `display_metrics` fail.
    pub fn fail_device(&self, fail: bool) {
        self.fail_device.store(fail, Ordering::SeqCst);
    }

    /// Raw stored value, bypassing failure injection.
    pub fn item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    /// Store a raw value, bypassing failure injection.
    pub fn insert(&self, key: &str, value: &str) {
        self.items().insert(key.to_string(), value.to_string());
    }

    fn items(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, flag: &AtomicBool, operation: &'static str) -> Result<(), BridgeError> {
        if flag.load(Ordering::SeqCst) {
            return Err(BridgeError::new(operation, "injected failure"));
        }
        Ok(())
    }
}

impl Default for MemoryBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformBridge for MemoryBridge {
    async fn device_info(&self) -> Result<DeviceInfo, BridgeError> {
        self.check(&self.fail_device, "device_info")?;
        Ok(self.device_info.clone())
    }

    async fn display_metrics(&self) -> Result<DisplayMetrics, BridgeError> {
        self.check(&self.fail_device, "display_metrics")?;
        Ok(self.display_metrics.clone())
    }

    async fn storage_path(&self) -> Result<PathBuf, BridgeError> {
        Ok(PathBuf::from("/data/user/0/deckbridge/files"))
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, BridgeError> {
        self.check(&self.fail_reads, "get_item")?;
        Ok(self.item(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BridgeError> {
        self.check(&self.fail_writes, "set_item")?;
        self.insert(key, value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), BridgeError> {
        self.check(&self.fail_writes, "remove_item")?;
        self.items().remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BridgeError> {
        self.check(&self.fail_reads, "list_keys")?;
        Ok(self.items().keys().filter(|key| key.starts_with(prefix)).cloned().collect())
    }
}
