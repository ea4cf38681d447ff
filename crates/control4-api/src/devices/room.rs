// Rooms

use serde_json::json;

use crate::devices::ItemHandle;
use crate::director::DirectorClient;
use crate::error::Error;

/// A room, as far as its power, volume and mute state go.
#[derive(Debug, Clone, Copy)]
pub struct Room<'a> {
    item: ItemHandle<'a>,
}

impl<'a> Room<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    /// Hidden from the end-user navigators.
    pub async fn is_hidden(&self) -> Result<Option<bool>, Error> {
        self.item.flag("ROOM_HIDDEN").await
    }

    pub async fn is_on(&self) -> Result<Option<bool>, Error> {
        self.item.flag("POWER_STATE").await
    }

    /// Volume 0-100.
    pub async fn volume(&self) -> Result<Option<i64>, Error> {
        self.item.int("CURRENT_VOLUME").await
    }

    pub async fn is_muted(&self) -> Result<Option<bool>, Error> {
        self.item.flag("IS_MUTED").await
    }

    pub async fn set_off(&self) -> Result<(), Error> {
        self.item.bare_command("ROOM_OFF").await
    }

    pub async fn set_mute(&self, muted: bool) -> Result<(), Error> {
        self.item
            .bare_command(if muted { "MUTE_ON" } else { "MUTE_OFF" })
            .await
    }

    pub async fn toggle_mute(&self) -> Result<(), Error> {
        self.item.bare_command("MUTE_TOGGLE").await
    }

    /// Set the volume 0-100.
    pub async fn set_volume(&self, volume: u8) -> Result<(), Error> {
        self.item
            .command("SET_VOLUME_LEVEL", &json!({ "LEVEL": volume }))
            .await
    }
}
