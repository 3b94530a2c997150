//! The `{type, data}` wrapper around every wire message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{MessageType, ProtocolError, Result};

/// JSON envelope.
///
/// `kind` is kept as a raw string so envelopes with types we do not route can
/// still be decoded, logged and dropped. `data` defaults to `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type as it appears on the wire
    #[serde(rename = "type")]
    pub kind: String,

    /// Message body
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Create an envelope from a raw type name and body.
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self { kind: kind.into(), data }
    }

    /// Create an envelope by serializing a typed body.
    pub fn with_data<T: Serialize>(kind: MessageType, data: &T) -> Result<Self> {
        let data = serde_json::to_value(data)
            .map_err(|e| ProtocolError::Encode { kind: kind.as_str(), reason: e.to_string() })?;
        Ok(Self::new(kind.as_str(), data))
    }

    /// Decode an envelope from socket text.
    ///
    /// # Errors
    ///
    /// `MalformedMessage` if the text is not JSON, is not an object, or lacks
    /// a string `type`.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedMessage(e.to_string()))
    }

    /// Encode to socket text.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ProtocolError::Encode { kind: "envelope", reason: e.to_string() })
    }

    /// Routed message type, if recognized.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_wire(&self.kind)
    }
}
