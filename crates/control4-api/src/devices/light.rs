// Lights: switches, dimmers, and color-capable fixtures

use std::time::Duration;

use serde::Serialize;

use crate::devices::ItemHandle;
use crate::devices::color::{hex_to_rgb, kelvin_to_xy, rgb_to_xy};
use crate::director::DirectorClient;
use crate::error::Error;

/// How a color light interprets an xy target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Full-color target.
    #[default]
    Full,
    /// Correlated color temperature (white tuning).
    Cct,
}

impl ColorMode {
    fn code(self) -> u8 {
        match self {
            Self::Full => 0,
            Self::Cct => 1,
        }
    }
}

#[derive(Serialize)]
struct LevelParams {
    #[serde(rename = "LEVEL")]
    level: u8,
}

#[derive(Serialize)]
struct RampParams {
    #[serde(rename = "LEVEL")]
    level: u8,
    /// Milliseconds.
    #[serde(rename = "TIME")]
    time: u64,
}

#[derive(Serialize)]
struct ColorTargetParams {
    #[serde(rename = "LIGHT_COLOR_TARGET_X")]
    x: f64,
    #[serde(rename = "LIGHT_COLOR_TARGET_Y")]
    y: f64,
    #[serde(rename = "LIGHT_COLOR_TARGET_MODE")]
    mode: u8,
    #[serde(rename = "RATE", skip_serializing_if = "Option::is_none")]
    rate: Option<u64>,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// A light switch or dimmer.
#[derive(Debug, Clone, Copy)]
pub struct Light<'a> {
    item: ItemHandle<'a>,
}

impl<'a> Light<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    /// Dimmer level 0-100 (`LIGHT_LEVEL`). Not reported by plain switches;
    /// use [`state`](Self::state) for those.
    pub async fn level(&self) -> Result<Option<i64>, Error> {
        self.item.int("LIGHT_LEVEL").await
    }

    /// On/off state of a dimmer or switch (`LIGHT_STATE`).
    pub async fn state(&self) -> Result<Option<bool>, Error> {
        self.item.flag("LIGHT_STATE").await
    }

    /// Set the level 0-100. Any level above zero turns a switch on.
    pub async fn set_level(&self, level: u8) -> Result<(), Error> {
        self.item.command("SET_LEVEL", &LevelParams { level }).await
    }

    /// Ramp to a level 0-100 over `time` (sent in milliseconds).
    pub async fn ramp_to_level(&self, level: u8, time: Duration) -> Result<(), Error> {
        let params = RampParams {
            level,
            time: millis(time),
        };
        self.item.command("RAMP_TO_LEVEL", &params).await
    }

    // ── Color ────────────────────────────────────────────────────────

    /// Set a CIE 1931 xy color target, optionally fading over `rate`.
    pub async fn set_color_xy(
        &self,
        x: f64,
        y: f64,
        mode: ColorMode,
        rate: Option<Duration>,
    ) -> Result<(), Error> {
        let params = ColorTargetParams {
            x,
            y,
            mode: mode.code(),
            rate: rate.map(millis),
        };
        self.item.command("SET_COLOR_TARGET", &params).await
    }

    /// Set an sRGB color (0-255 per channel) in full-color mode.
    pub async fn set_color_rgb(
        &self,
        r: u8,
        g: u8,
        b: u8,
        rate: Option<Duration>,
    ) -> Result<(), Error> {
        let (x, y) = rgb_to_xy(r, g, b);
        self.set_color_xy(x, y, ColorMode::Full, rate).await
    }

    /// Set a hex color (`#RRGGBB`, `#RGB`, with or without `#`).
    pub async fn set_color_hex(&self, hex: &str, rate: Option<Duration>) -> Result<(), Error> {
        let (r, g, b) = hex_to_rgb(hex)?;
        self.set_color_rgb(r, g, b, rate).await
    }

    /// Set a white color temperature in Kelvin (clamped to 1667-25000 K).
    pub async fn set_color_temperature(
        &self,
        kelvin: u32,
        rate: Option<Duration>,
    ) -> Result<(), Error> {
        let (x, y) = kelvin_to_xy(kelvin);
        self.set_color_xy(x, y, ColorMode::Cct, rate).await
    }
}
