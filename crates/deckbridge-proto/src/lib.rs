//! Wire format for the Deckbridge protocol.
//!
//! Every message on the socket is a JSON envelope `{ "type": ..., "data": ...
//! }`. The envelope is decoded first and its `type` routes the `data` into a
//! typed [`Payload`]. Decoding the envelope and validating the payload are two
//! separate steps so callers can tell a garbled frame (malformed, worth an
//! error event) from a well-formed frame carrying a record that fails its
//! contract (dropped quietly).
//!
//! Records are fixed structs with an opaque side-bag of additional fields.
//! Whatever the server sends beyond the known fields survives every
//! serialize/deserialize cycle, including storage.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod errors;
pub mod message_type;
pub mod payloads;
pub mod stored;

pub use envelope::Envelope;
pub use errors::{ProtocolError, Result};
pub use message_type::MessageType;
pub use payloads::{
    Action, ActionKind, Config, DeviceInfo, DisplayMetrics, Handshake, Payload, Profile, Record,
    StorageDescriptor, StorageKind,
};
pub use stored::Stored;
