//! Button layout records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Action, MessageType, Record};

/// A page of buttons arranged on a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Profile identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Grid rows
    pub rows: u32,
    /// Grid columns
    pub columns: u32,
    /// Buttons in row-major order
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Fields outside the known schema, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Profile {
    const MESSAGE_TYPE: MessageType = MessageType::Profile;

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}
