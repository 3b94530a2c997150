//! Typed message bodies.
//!
//! [`Payload`] is the routed form of an [`Envelope`]. Conversion validates
//! the body against its record contract; anything extra the peer sent is kept
//! in the record's side-bag.

pub mod action;
pub mod config;
pub mod handshake;
pub mod profile;

pub use action::{Action, ActionKind};
pub use config::{Config, StorageDescriptor, StorageKind};
pub use handshake::{DeviceInfo, DisplayMetrics, Handshake};
pub use profile::Profile;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Envelope, MessageType, ProtocolError, Result};

/// Records that carry an opaque side-bag of additional fields.
pub trait Record: Serialize + DeserializeOwned {
    /// Message type this record travels as.
    const MESSAGE_TYPE: MessageType;

    /// Additional fields not covered by the known schema.
    fn extra(&self) -> &Map<String, Value>;

    /// Mutable access to the additional fields.
    fn extra_mut(&mut self) -> &mut Map<String, Value>;

    /// Decode and validate a record from envelope data.
    fn from_data(data: Value) -> Result<Self> {
        serde_json::from_value(data).map_err(|e| ProtocolError::InvalidRecord {
            kind: Self::MESSAGE_TYPE,
            reason: e.to_string(),
        })
    }
}

/// Routed message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Client identification (outbound only)
    Handshake(Handshake),
    /// Single button update
    Action(Action),
    /// Session configuration update
    Config(Config),
    /// Full button layout
    Profile(Profile),
}

impl Payload {
    /// Message type of this payload.
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Handshake(_) => MessageType::Handshake,
            Self::Action(_) => MessageType::Action,
            Self::Config(_) => MessageType::Config,
            Self::Profile(_) => MessageType::Profile,
        }
    }

    /// Route and validate an envelope.
    ///
    /// # Errors
    ///
    /// - `UnknownType` if the envelope type is not routed
    /// - `InvalidRecord` if the data fails the record contract
    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        let Some(kind) = envelope.message_type() else {
            return Err(ProtocolError::UnknownType(envelope.kind));
        };

        match kind {
            MessageType::Handshake => Handshake::from_data(envelope.data).map(Self::Handshake),
            MessageType::Action => Action::from_data(envelope.data).map(Self::Action),
            MessageType::Config => Config::from_data(envelope.data).map(Self::Config),
            MessageType::Profile => Profile::from_data(envelope.data).map(Self::Profile),
        }
    }

    /// Wrap this payload in an envelope.
    pub fn into_envelope(self) -> Result<Envelope> {
        match self {
            Self::Handshake(h) => Envelope::with_data(MessageType::Handshake, &h),
            Self::Action(a) => Envelope::with_data(MessageType::Action, &a),
            Self::Config(c) => Envelope::with_data(MessageType::Config, &c),
            Self::Profile(p) => Envelope::with_data(MessageType::Profile, &p),
        }
    }
}
