// Motorized blinds and shades

use serde_json::json;

use crate::devices::ItemHandle;
use crate::director::DirectorClient;
use crate::error::Error;

/// A motorized blind. Levels run from 0 (fully closed) to 100 (fully open).
#[derive(Debug, Clone, Copy)]
pub struct Blind<'a> {
    item: ItemHandle<'a>,
}

impl<'a> Blind<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    // ── State ────────────────────────────────────────────────────────

    /// Battery level as reported by the driver; range is driver-specific.
    pub async fn battery_level(&self) -> Result<Option<i64>, Error> {
        self.item.int("Battery Level").await
    }

    /// Current position.
    pub async fn level(&self) -> Result<Option<i64>, Error> {
        self.item.int("Level").await
    }

    /// Desired position; the blind moves while this differs from `level`.
    pub async fn target_level(&self) -> Result<Option<i64>, Error> {
        self.item.int("Target Level").await
    }

    /// Moving (or last moved) towards closed.
    pub async fn is_closing(&self) -> Result<Option<bool>, Error> {
        self.item.flag("Closing").await
    }

    /// Moving (or last moved) towards open.
    pub async fn is_opening(&self) -> Result<Option<bool>, Error> {
        self.item.flag("Opening").await
    }

    pub async fn is_fully_closed(&self) -> Result<Option<bool>, Error> {
        self.item.flag("Fully Closed").await
    }

    pub async fn is_fully_open(&self) -> Result<Option<bool>, Error> {
        self.item.flag("Fully Open").await
    }

    /// Open at all, including partially.
    pub async fn is_open(&self) -> Result<Option<bool>, Error> {
        self.item.flag("Open").await
    }

    pub async fn is_stopped(&self) -> Result<Option<bool>, Error> {
        self.item.flag("Stopped").await
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn open(&self) -> Result<(), Error> {
        self.item
            .bare_command("SET_LEVEL_TARGET:LEVEL_TARGET_OPEN")
            .await
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.item
            .bare_command("SET_LEVEL_TARGET:LEVEL_TARGET_CLOSED")
            .await
    }

    /// Start moving towards `level` (0-100).
    pub async fn set_level_target(&self, level: u8) -> Result<(), Error> {
        self.item
            .command("SET_LEVEL_TARGET", &json!({ "LEVEL_TARGET": level }))
            .await
    }

    /// Stop moving. The Director then resets the target to the reached level.
    pub async fn stop(&self) -> Result<(), Error> {
        self.item.bare_command("STOP").await
    }

    /// Toggle between open and closed. No effect on a partially open blind.
    pub async fn toggle(&self) -> Result<(), Error> {
        self.item.bare_command("TOGGLE").await
    }
}
