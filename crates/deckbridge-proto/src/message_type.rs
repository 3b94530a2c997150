//! Envelope message types.

use std::fmt;

/// Message types carried in the envelope `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Client identification, sent once after the socket opens
    Handshake,
    /// A single button's state
    Action,
    /// Connection and identity parameters
    Config,
    /// A full button layout
    Profile,
}

impl MessageType {
    /// All routed message types.
    pub const ALL: [Self; 4] = [Self::Handshake, Self::Action, Self::Config, Self::Profile];

    /// Wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::Action => "action",
            Self::Config => "config",
            Self::Profile => "profile",
        }
    }

    /// Parse a wire name. Returns `None` for types we do not route.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "handshake" => Some(Self::Handshake),
            "action" => Some(Self::Action),
            "config" => Some(Self::Config),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for kind in MessageType::ALL {
            assert_eq!(MessageType::from_wire(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_and_case_mismatch_are_not_routed() {
        assert_eq!(MessageType::from_wire("bogus"), None);
        assert_eq!(MessageType::from_wire("Action"), None);
        assert_eq!(MessageType::from_wire(""), None);
    }
}
