// Director REST types
//
// The Director reports items and variables with a handful of stable fields
// and a long tail that varies by driver and OS version. We model the stable
// ones and keep everything else in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Literal the Director sends for a variable that has no value yet.
pub(crate) const UNDEFINED: &str = "Undefined";

/// Body of `POST /api/v1/items/{id}/commands`.
#[derive(Debug, Serialize)]
pub(crate) struct CommandRequest<'a, P: Serialize> {
    #[serde(rename = "async")]
    pub is_async: bool,
    pub command: &'a str,
    #[serde(rename = "tParams")]
    pub params: &'a P,
}

/// An addressable item (device, room, agent, proxy) on the Director.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Numeric item type (1 = root, 2 = site, 7 = device, 8 = room, ...).
    #[serde(default, rename = "type")]
    pub item_type: Option<i64>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<u32>,
    #[serde(default)]
    pub room_id: Option<u32>,
    #[serde(default)]
    pub room_name: Option<String>,
    /// Proxy name, e.g. `light_v2`, `thermostatV2`.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Control type, e.g. `light_v2`, `control4_thermostat`.
    #[serde(default)]
    pub control: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub capabilities: Option<serde_json::Map<String, Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Item {
    /// Look up a capability flag or value reported for this item.
    pub fn capability(&self, name: &str) -> Option<&Value> {
        self.capabilities.as_ref()?.get(name)
    }
}

/// One variable of one item.
///
/// A value of `"Undefined"` from the Director is normalized to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariable {
    pub id: u32,
    pub var_name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ItemVariable {
    pub(crate) fn normalize(mut self) -> Self {
        self.value = normalize_value(self.value);
        self
    }
}

pub(crate) fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(s) if s == UNDEFINED => Value::Null,
        other => other,
    }
}
