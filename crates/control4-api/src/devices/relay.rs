// Relays and relay-driven locks

use crate::devices::ItemHandle;
use crate::director::DirectorClient;
use crate::error::Error;

/// A generic relay. For most relays `0` means open and `1` closed.
#[derive(Debug, Clone, Copy)]
pub struct Relay<'a> {
    item: ItemHandle<'a>,
}

impl<'a> Relay<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    /// Raw `RelayState`.
    pub async fn relay_state(&self) -> Result<Option<i64>, Error> {
        self.item.int("RelayState").await
    }

    /// Whether the driver has confirmed the relay position (`StateVerified`).
    pub async fn state_verified(&self) -> Result<Option<bool>, Error> {
        self.item.flag("StateVerified").await
    }

    pub async fn open(&self) -> Result<(), Error> {
        self.item.bare_command("OPEN").await
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.item.bare_command("CLOSE").await
    }

    pub async fn toggle(&self) -> Result<(), Error> {
        self.item.bare_command("TOGGLE").await
    }
}

/// A door lock driven by a relay. `RelayState == 0` means locked;
/// `OPEN` engages the lock and `CLOSE` releases it.
#[derive(Debug, Clone, Copy)]
pub struct Lock<'a> {
    relay: Relay<'a>,
}

impl<'a> Lock<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            relay: Relay::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.relay.item_id()
    }

    pub async fn is_locked(&self) -> Result<Option<bool>, Error> {
        Ok(self.relay.relay_state().await?.map(|state| state == 0))
    }

    pub async fn state_verified(&self) -> Result<Option<bool>, Error> {
        self.relay.state_verified().await
    }

    pub async fn lock(&self) -> Result<(), Error> {
        self.relay.open().await
    }

    pub async fn unlock(&self) -> Result<(), Error> {
        self.relay.close().await
    }

    pub async fn toggle(&self) -> Result<(), Error> {
        self.relay.toggle().await
    }
}
