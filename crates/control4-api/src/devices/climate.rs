// Thermostats

use serde_json::json;

use crate::devices::ItemHandle;
use crate::director::DirectorClient;
use crate::error::Error;

/// A thermostat. Setpoints and temperatures are in Fahrenheit, which is
/// what the Director exposes regardless of the display unit.
#[derive(Debug, Clone, Copy)]
pub struct Climate<'a> {
    item: ItemHandle<'a>,
}

impl<'a> Climate<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    // ── State ────────────────────────────────────────────────────────

    /// What the equipment is doing right now, e.g. `Heat`, `Off`.
    pub async fn hvac_state(&self) -> Result<Option<String>, Error> {
        self.item.text("HVAC_STATE").await
    }

    /// Comma-separated list of supported HVAC modes.
    pub async fn hvac_modes(&self) -> Result<Option<String>, Error> {
        self.item.text("HVAC_MODES_LIST").await
    }

    pub async fn hvac_mode(&self) -> Result<Option<String>, Error> {
        self.item.text("HVAC_MODE").await
    }

    /// Comma-separated list of supported fan modes.
    pub async fn fan_modes(&self) -> Result<Option<String>, Error> {
        self.item.text("FAN_MODES_LIST").await
    }

    pub async fn fan_mode(&self) -> Result<Option<String>, Error> {
        self.item.text("FAN_MODE").await
    }

    pub async fn fan_state(&self) -> Result<Option<String>, Error> {
        self.item.text("FAN_STATE").await
    }

    pub async fn cool_setpoint_f(&self) -> Result<Option<f64>, Error> {
        self.item.float("COOL_SETPOINT_F").await
    }

    pub async fn heat_setpoint_f(&self) -> Result<Option<f64>, Error> {
        self.item.float("HEAT_SETPOINT_F").await
    }

    /// Relative humidity in percent.
    pub async fn humidity(&self) -> Result<Option<f64>, Error> {
        self.item.float("HUMIDITY").await
    }

    pub async fn temperature_f(&self) -> Result<Option<f64>, Error> {
        self.item.float("TEMPERATURE_F").await
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn set_cool_setpoint(&self, fahrenheit: f64) -> Result<(), Error> {
        self.item
            .command("SET_SETPOINT_COOL", &json!({ "FAHRENHEIT": fahrenheit }))
            .await
    }

    pub async fn set_heat_setpoint(&self, fahrenheit: f64) -> Result<(), Error> {
        self.item
            .command("SET_SETPOINT_HEAT", &json!({ "FAHRENHEIT": fahrenheit }))
            .await
    }

    /// Set the HVAC mode, using one of the names from [`hvac_modes`](Self::hvac_modes).
    pub async fn set_hvac_mode(&self, mode: &str) -> Result<(), Error> {
        self.item
            .command("SET_MODE_HVAC", &json!({ "MODE": mode }))
            .await
    }

    /// Set the fan mode, using one of the names from [`fan_modes`](Self::fan_modes).
    pub async fn set_fan_mode(&self, mode: &str) -> Result<(), Error> {
        self.item
            .command("SET_MODE_FAN", &json!({ "MODE": mode }))
            .await
    }

    /// Apply a named thermostat preset.
    pub async fn set_preset(&self, name: &str) -> Result<(), Error> {
        self.item
            .command("SET_PRESET", &json!({ "NAME": name }))
            .await
    }
}
