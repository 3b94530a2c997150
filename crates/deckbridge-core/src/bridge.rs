//! Platform capability seam.
//!
//! The host platform provides device details for the handshake and a
//! key-value store for persistence. The session consumes this contract; it
//! never implements it.

use std::path::PathBuf;

use async_trait::async_trait;
use deckbridge_proto::{DeviceInfo, DisplayMetrics};

/// Failure reported by a platform call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {reason}")]
pub struct BridgeError {
    /// Bridge operation that failed
    pub operation: &'static str,
    /// Platform-reported reason
    pub reason: String,
}

impl BridgeError {
    /// Create a bridge error.
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        Self { operation, reason: reason.into() }
    }
}

/// Capabilities exposed by the host platform.
#[async_trait]
pub trait PlatformBridge: Send + Sync + 'static {
    /// Device model and OS details.
    async fn device_info(&self) -> Result<DeviceInfo, BridgeError>;

    /// Screen geometry.
    async fn display_metrics(&self) -> Result<DisplayMetrics, BridgeError>;

    /// Directory the platform reserves for application files.
    async fn storage_path(&self) -> Result<PathBuf, BridgeError>;

    /// Read a stored value.
    async fn get_item(&self, key: &str) -> Result<Option<String>, BridgeError>;

    /// Write a value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), BridgeError>;

    /// Delete a value. Deleting a missing key succeeds.
    async fn remove_item(&self, key: &str) -> Result<(), BridgeError>;

    /// Keys starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BridgeError>;
}
