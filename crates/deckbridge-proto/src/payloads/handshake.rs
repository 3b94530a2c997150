//! Client identification sent right after the socket opens.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{MessageType, Record};

/// Hardware and OS details reported by the platform bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Operating system family, e.g. `android`
    pub platform: String,
    /// Device model
    pub model: String,
    /// Device manufacturer
    pub manufacturer: String,
    /// OS release
    pub version: String,
    /// Platform SDK level
    pub sdk_version: String,
}

/// Screen geometry reported by the platform bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetrics {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Logical density
    pub density: f64,
    /// Font scaling density
    pub scaled_density: f64,
    /// Horizontal dots per inch
    pub xdpi: f64,
    /// Vertical dots per inch
    pub ydpi: f64,
}

/// Handshake body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Client name from the session config
    pub client_name: String,
    /// Client version from the session config
    pub version: String,
    /// Device details
    pub device_info: DeviceInfo,
    /// Display details
    pub display_metrics: DisplayMetrics,
    /// Fields outside the known schema
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Handshake {
    /// Build a handshake.
    pub fn new(
        client_name: impl Into<String>,
        version: impl Into<String>,
        device_info: DeviceInfo,
        display_metrics: DisplayMetrics,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            version: version.into(),
            device_info,
            display_metrics,
            extra: Map::new(),
        }
    }
}

impl Record for Handshake {
    const MESSAGE_TYPE: MessageType = MessageType::Handshake;

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}
