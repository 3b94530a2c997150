//! Records with persistence timestamps.

use serde::{Deserialize, Serialize};

use crate::Record;

/// Side-bag keys owned by [`Stored`]; never kept as record extras.
pub const RESERVED_KEYS: [&str; 2] = ["createdAt", "lastModified"];

/// A record as persisted: the record's own fields flattened alongside
/// `createdAt` and `lastModified` (wall-clock milliseconds).
///
/// Invariant: `created_at <= last_modified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    /// The record
    #[serde(flatten)]
    pub record: T,
    /// Set on first persist
    pub created_at: u64,
    /// Set on every persist
    pub last_modified: u64,
}

impl<T: Record> Stored<T> {
    /// Stamp a record persisted for the first time.
    pub fn first(record: T, now_ms: u64) -> Self {
        Self::stamp(record, now_ms, now_ms)
    }

    /// Stamp a record replacing one first persisted at `created_at`.
    ///
    /// `last_modified` never goes below `created_at`, so a wall clock that
    /// stepped backwards cannot break the invariant.
    pub fn refresh(record: T, created_at: u64, now_ms: u64) -> Self {
        Self::stamp(record, created_at, now_ms.max(created_at))
    }

    fn stamp(mut record: T, created_at: u64, last_modified: u64) -> Self {
        let extra = record.extra_mut();
        for key in RESERVED_KEYS {
            extra.remove(key);
        }
        Self { record, created_at, last_modified }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{Action, ActionKind};

    #[test]
    fn serializes_flat() {
        let stored = Stored::first(Action::new("a1", ActionKind::Toggle, "Mute"), 1_000);
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "a1",
                "type": "toggle",
                "displayText": "Mute",
                "createdAt": 1_000,
                "lastModified": 1_000
            })
        );
    }

    #[test]
    fn timestamps_do_not_leak_into_extras() {
        let text = r#"{"id":"a1","type":"normal","displayText":"Go","hue":7,"createdAt":5,"lastModified":9}"#;
        let stored: Stored<Action> = serde_json::from_str(text).unwrap();

        assert_eq!(stored.created_at, 5);
        assert_eq!(stored.last_modified, 9);
        assert_eq!(stored.record.extra.len(), 1);
        assert_eq!(stored.record.extra.get("hue"), Some(&json!(7)));
    }

    #[test]
    fn stamping_strips_reserved_keys_from_wire_extras() {
        let mut action = Action::new("a1", ActionKind::Normal, "Go");
        action.extra.insert("createdAt".into(), json!(1));
        action.extra.insert("lastModified".into(), json!(2));

        let stored = Stored::first(action, 50);
        assert!(stored.record.extra.is_empty());

        // And the output parses back without duplicate keys
        let text = serde_json::to_string(&stored).unwrap();
        let back: Stored<Action> = serde_json::from_str(&text).unwrap();
        assert_eq!(back.created_at, 50);
    }

    proptest! {
        #[test]
        fn refresh_keeps_created_at_le_last_modified(created in any::<u64>(), now in any::<u64>()) {
            let stored = Stored::refresh(Action::new("a", ActionKind::Normal, "x"), created, now);
            prop_assert_eq!(stored.created_at, created);
            prop_assert!(stored.created_at <= stored.last_modified);
        }
    }
}
