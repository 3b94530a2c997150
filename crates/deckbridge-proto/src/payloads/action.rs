//! Button action records.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{MessageType, Record};

/// Kind of button. Determines rendering and which optional fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Plain press button
    Normal,
    /// Two-state button
    Toggle,
    /// Opens a nested page of buttons
    Folder,
    /// Displays a value within a range
    Gauge,
}

/// One controllable button.
///
/// Only `id`, `type` and `displayText` are required. An optional field with
/// the wrong JSON type (or `null`) is not an error: it stays in `extra` under
/// its wire name and the typed field is `None`.
///
/// Gauge fields are passed through as received. `gauge_min <= gauge_value <=
/// gauge_max` is not checked here; renderers must clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Map<String, Value>")]
pub struct Action {
    /// Stable identifier, unique per server
    pub id: String,

    /// Button kind (wire name `type`)
    #[serde(rename = "type")]
    pub kind: ActionKind,

    /// Label shown on the button
    pub display_text: String,

    /// Icon variant to render
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_state: Option<String>,

    /// Current toggle state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_toggled: Option<bool>,

    /// Whether the button accepts presses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,

    /// Current gauge reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge_value: Option<f64>,

    /// Lower gauge bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge_min: Option<f64>,

    /// Upper gauge bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge_max: Option<f64>,

    /// Fields outside the known schema, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    /// Create an action with no optional fields set.
    pub fn new(id: impl Into<String>, kind: ActionKind, display_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            display_text: display_text.into(),
            icon_state: None,
            is_toggled: None,
            is_disabled: None,
            gauge_value: None,
            gauge_min: None,
            gauge_max: None,
            extra: Map::new(),
        }
    }
}

impl TryFrom<Map<String, Value>> for Action {
    type Error = String;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, String> {
        let id = required(&mut fields, "id")?;
        let kind = required(&mut fields, "type")?;
        let display_text = required(&mut fields, "displayText")?;

        Ok(Self {
            id,
            kind,
            display_text,
            icon_state: optional(&mut fields, "iconState", |v| v.as_str().map(str::to_owned)),
            is_toggled: optional(&mut fields, "isToggled", Value::as_bool),
            is_disabled: optional(&mut fields, "isDisabled", Value::as_bool),
            gauge_value: optional(&mut fields, "gaugeValue", Value::as_f64),
            gauge_min: optional(&mut fields, "gaugeMin", Value::as_f64),
            gauge_max: optional(&mut fields, "gaugeMax", Value::as_f64),
            extra: fields,
        })
    }
}

fn required<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str) -> Result<T, String> {
    let value = fields.remove(key).ok_or_else(|| format!("missing field `{key}`"))?;
    serde_json::from_value(value).map_err(|e| format!("field `{key}`: {e}"))
}

/// Take `key` out of `fields` only if `read` accepts its value.
fn optional<T>(
    fields: &mut Map<String, Value>,
    key: &str,
    read: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = fields.get(key).and_then(read)?;
    fields.remove(key);
    Some(value)
}

impl Record for Action {
    const MESSAGE_TYPE: MessageType = MessageType::Action;

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}
