// Typed device wrappers
//
// Each wrapper is a borrowed view over a `DirectorClient` plus an item id.
// Reads go through `item_variable_value`, writes through `send_command`.
// Getters return `Option` so an "Undefined" variable surfaces as `None`
// instead of a bogus zero.

pub mod alarm;
pub mod blind;
pub mod climate;
pub mod color;
pub mod fan;
pub mod light;
pub mod relay;
pub mod room;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::director::DirectorClient;
use crate::error::Error;

pub use alarm::{ArmState, ContactSensor, SecurityPanel};
pub use blind::Blind;
pub use climate::Climate;
pub use fan::Fan;
pub use light::{ColorMode, Light};
pub use relay::{Lock, Relay};
pub use room::Room;

/// An item id bound to the Director that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ItemHandle<'a> {
    director: &'a DirectorClient,
    item_id: u32,
}

impl<'a> ItemHandle<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self { director, item_id }
    }

    pub fn item_id(&self) -> u32 {
        self.item_id
    }

    pub fn director(&self) -> &'a DirectorClient {
        self.director
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Raw variable value; `None` when the Director reports "Undefined".
    pub async fn value(&self, name: &str) -> Result<Option<Value>, Error> {
        self.director
            .item_variable_value(self.item_id, &[name])
            .await
    }

    pub async fn int(&self, name: &str) -> Result<Option<i64>, Error> {
        Ok(self.value(name).await?.as_ref().and_then(as_int))
    }

    pub async fn float(&self, name: &str) -> Result<Option<f64>, Error> {
        Ok(self.value(name).await?.as_ref().and_then(as_float))
    }

    pub async fn flag(&self, name: &str) -> Result<Option<bool>, Error> {
        Ok(self.value(name).await?.as_ref().and_then(as_bool))
    }

    pub async fn text(&self, name: &str) -> Result<Option<String>, Error> {
        Ok(self.value(name).await?.as_ref().and_then(as_text))
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Send a command with parameters, discarding the Director's reply.
    pub async fn command<P: Serialize + Sync>(&self, name: &str, params: &P) -> Result<(), Error> {
        self.director
            .send_command(self.item_id, name, params)
            .await
            .map(|_| ())
    }

    /// Send a command that takes no parameters (`tParams: {}`).
    pub async fn bare_command(&self, name: &str) -> Result<(), Error> {
        self.command(name, &Map::new()).await
    }
}

impl DirectorClient {
    pub fn light(&self, item_id: u32) -> Light<'_> {
        Light::new(self, item_id)
    }

    pub fn climate(&self, item_id: u32) -> Climate<'_> {
        Climate::new(self, item_id)
    }

    pub fn relay(&self, item_id: u32) -> Relay<'_> {
        Relay::new(self, item_id)
    }

    pub fn lock(&self, item_id: u32) -> Lock<'_> {
        Lock::new(self, item_id)
    }

    pub fn fan(&self, item_id: u32) -> Fan<'_> {
        Fan::new(self, item_id)
    }

    pub fn blind(&self, item_id: u32) -> Blind<'_> {
        Blind::new(self, item_id)
    }

    pub fn room(&self, item_id: u32) -> Room<'_> {
        Room::new(self, item_id)
    }

    pub fn security_panel(&self, item_id: u32) -> SecurityPanel<'_> {
        SecurityPanel::new(self, item_id)
    }

    pub fn contact_sensor(&self, item_id: u32) -> ContactSensor<'_> {
        ContactSensor::new(self, item_id)
    }
}

// ── Value conversions ───────────────────────────────────────────────
//
// Drivers are inconsistent: the same variable may arrive as a number, a
// numeric string, or a boolean depending on the driver.

/// Integer view of a variable value. Floats are truncated.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

/// Truthiness of a variable value: non-zero numbers, `"true"`, `"1"`.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else if let Ok(f) = s.parse::<f64>() {
                Some(f != 0.0)
            } else {
                Some(!s.is_empty())
            }
        }
        _ => None,
    }
}

pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
