//! Session configuration records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{MessageType, ProtocolError, Record, Result};

/// Which persistence backend the client should use.
///
/// Names this client does not know are kept as [`StorageKind::Other`] so the
/// config still round-trips; selecting such a backend fails at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageKind {
    /// Platform key-value store behind the native bridge
    #[default]
    Native,
    /// Adapter supplied by the embedding application
    Custom,
    /// Backend name this client does not recognize
    Other(String),
}

impl From<String> for StorageKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "native" => Self::Native,
            "custom" => Self::Custom,
            _ => Self::Other(name),
        }
    }
}

impl From<StorageKind> for String {
    fn from(kind: StorageKind) -> Self {
        match kind {
            StorageKind::Native => "native".into(),
            StorageKind::Custom => "custom".into(),
            StorageKind::Other(name) => name,
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::Custom => "custom",
            Self::Other(name) => name,
        })
    }
}

/// Storage override carried in the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageDescriptor {
    /// Selected backend (wire name `type`)
    #[serde(rename = "type")]
    pub kind: StorageKind,

    /// Backend options outside the known schema, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StorageDescriptor {
    /// Descriptor selecting `kind` with no extra options.
    pub fn new(kind: StorageKind) -> Self {
        Self { kind, extra: Map::new() }
    }
}

/// Connection and identity parameters for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Socket URL of the companion server
    pub server_url: String,

    /// Name this client identifies as
    pub client_name: String,

    /// Client version string
    pub version: String,

    /// Storage backend override; native when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageDescriptor>,

    /// Fields outside the known schema, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// Create a config with native storage and no extra fields.
    pub fn new(
        server_url: impl Into<String>,
        client_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            client_name: client_name.into(),
            version: version.into(),
            storage: None,
            extra: Map::new(),
        }
    }

    /// Effective storage backend.
    pub fn storage_kind(&self) -> StorageKind {
        self.storage.as_ref().map(|s| s.kind.clone()).unwrap_or_default()
    }

    /// Minimal shape check beyond what the types already guarantee.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` if the server URL or client name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(invalid("serverUrl must not be empty"));
        }
        if self.client_name.trim().is_empty() {
            return Err(invalid("clientName must not be empty"));
        }
        Ok(())
    }

    /// Overlay `other`'s fields on top of this config.
    ///
    /// Keys present in `other` win. Known fields and side-bag entries are
    /// merged alike since both serialize to the same flat object.
    pub fn merged_with(&self, other: &Self) -> Result<Self> {
        let mut base = to_object(self)?;
        base.extend(to_object(other)?);
        Self::from_data(Value::Object(base))
    }
}

impl Record for Config {
    const MESSAGE_TYPE: MessageType = MessageType::Config;

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }

    fn from_data(data: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(data)
            .map_err(|e| ProtocolError::InvalidRecord { kind: Self::MESSAGE_TYPE, reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }
}

fn invalid(reason: &str) -> ProtocolError {
    ProtocolError::InvalidRecord { kind: MessageType::Config, reason: reason.to_string() }
}

fn to_object(config: &Config) -> Result<Map<String, Value>> {
    match serde_json::to_value(config) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ProtocolError::Encode { kind: "config", reason: "not an object".into() }),
        Err(e) => Err(ProtocolError::Encode { kind: "config", reason: e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn storage_defaults_to_native() {
        let config = Config::new("ws://h:1", "c", "1.0");
        assert_eq!(config.storage_kind(), StorageKind::Native);

        let config = Config::from_data(json!({
            "serverUrl": "ws://h:1",
            "clientName": "c",
            "version": "1.0",
            "storage": {"type": "custom"}
        }))
        .unwrap();
        assert_eq!(config.storage_kind(), StorageKind::Custom);
    }

    #[test]
    fn merge_prefers_overlay_keys() {
        let mut ctor = Config::new("ws://h:1", "c", "1.0");
        ctor.extra.insert("theme".into(), json!("dark"));
        ctor.extra.insert("columns".into(), json!(4));

        let mut stored = Config::new("ws://h:2", "c", "1.1");
        stored.extra.insert("columns".into(), json!(5));

        let merged = ctor.merged_with(&stored).unwrap();
        assert_eq!(merged.server_url, "ws://h:2");
        assert_eq!(merged.version, "1.1");
        assert_eq!(merged.extra.get("theme"), Some(&json!("dark")));
        assert_eq!(merged.extra.get("columns"), Some(&json!(5)));
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(Config::new("ws://h:1", "c", "1.0").validate().is_ok());
        assert!(Config::new("", "c", "1.0").validate().is_err());
        assert!(Config::new("ws://h:1", "  ", "1.0").validate().is_err());
    }

    #[test]
    fn storage_options_survive_round_trip() {
        let data = json!({
            "serverUrl": "ws://h:1",
            "clientName": "c",
            "version": "1.0",
            "storage": {"type": "native", "path": "/x", "sync": {"every": 5}}
        });

        let config = Config::from_data(data.clone()).unwrap();
        let storage = config.storage.as_ref().unwrap();
        assert_eq!(storage.kind, StorageKind::Native);
        assert_eq!(storage.extra.get("path"), Some(&json!("/x")));
        assert_eq!(serde_json::to_value(&config).unwrap(), data);
    }

    #[test]
    fn unknown_storage_kind_is_kept() {
        let data = json!({
            "serverUrl": "ws://h:1",
            "clientName": "c",
            "version": "1.0",
            "storage": {"type": "sqlite"}
        });

        let config = Config::from_data(data.clone()).unwrap();
        assert_eq!(config.storage_kind(), StorageKind::Other("sqlite".into()));
        assert_eq!(config.storage_kind().to_string(), "sqlite");
        assert_eq!(serde_json::to_value(&config).unwrap(), data);
    }

    #[test]
    fn version_must_be_a_string() {
        let data = json!({"serverUrl": "ws://h:1", "clientName": "c", "version": 1});
        assert!(Config::from_data(data).is_err());
    }
}
