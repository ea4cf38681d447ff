// Fan speed controllers

use serde_json::json;

use crate::devices::ItemHandle;
use crate::director::DirectorClient;
use crate::error::Error;

/// A fan speed controller. Speeds are 0 (off) through 4 (high).
#[derive(Debug, Clone, Copy)]
pub struct Fan<'a> {
    item: ItemHandle<'a>,
}

impl<'a> Fan<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    pub async fn speed(&self) -> Result<Option<i64>, Error> {
        self.item.int("CURRENT_SPEED").await
    }

    pub async fn is_on(&self) -> Result<Option<bool>, Error> {
        self.item.flag("IS_ON").await
    }

    /// Set the speed; `0` turns the fan off.
    pub async fn set_speed(&self, speed: u8) -> Result<(), Error> {
        self.item
            .command("SET_SPEED", &json!({ "SPEED": speed }))
            .await
    }

    /// Set the speed the fan returns to when simply switched on.
    pub async fn set_preset(&self, preset: u8) -> Result<(), Error> {
        self.item
            .command("DESIGNATE_PRESET", &json!({ "PRESET": preset }))
            .await
    }
}
