// Security panels and contact sensors

use std::fmt;

use serde_json::json;

use crate::devices::{ItemHandle, as_bool, as_text};
use crate::director::{DirectorClient, Item};
use crate::error::Error;

/// Arm state of a security partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    Disarmed,
    ArmedHome,
    ArmedAway,
}

impl fmt::Display for ArmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disarmed => "DISARMED",
            Self::ArmedHome => "ARMED_HOME",
            Self::ArmedAway => "ARMED_AWAY",
        })
    }
}

const EMERGENCY_CAPABILITIES: [(&str, &str); 4] = [
    ("has_fire", "Fire"),
    ("has_medical", "Medical"),
    ("has_panic", "Panic"),
    ("has_police", "Police"),
];

/// A security panel partition.
#[derive(Debug, Clone, Copy)]
pub struct SecurityPanel<'a> {
    item: ItemHandle<'a>,
}

impl<'a> SecurityPanel<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    // ── State ────────────────────────────────────────────────────────

    /// Derived from `DISARMED_STATE`, `HOME_STATE` and `AWAY_STATE`, checked
    /// in that order. `None` when none of them is set.
    pub async fn arm_state(&self) -> Result<Option<ArmState>, Error> {
        let disarmed = self.item.int("DISARMED_STATE").await?;
        let home = self.item.int("HOME_STATE").await?;
        let away = self.item.int("AWAY_STATE").await?;

        Ok(if disarmed == Some(1) {
            Some(ArmState::Disarmed)
        } else if home == Some(1) {
            Some(ArmState::ArmedHome)
        } else if away == Some(1) {
            Some(ArmState::ArmedAway)
        } else {
            None
        })
    }

    /// `true` while the alarm is triggered.
    pub async fn alarm_state(&self) -> Result<Option<bool>, Error> {
        self.item.flag("ALARM_STATE").await
    }

    pub async fn display_text(&self) -> Result<Option<String>, Error> {
        self.item.text("DISPLAY_TEXT").await
    }

    pub async fn trouble_text(&self) -> Result<Option<String>, Error> {
        self.item.text("TROUBLE_TEXT").await
    }

    /// e.g. `DISARMED_READY`, `ARMED_AWAY`, `EXIT_DELAY`, `ENTRY_DELAY`.
    pub async fn partition_state(&self) -> Result<Option<String>, Error> {
        self.item.text("PARTITION_STATE").await
    }

    /// Total exit delay in seconds; `0` when no delay is running.
    pub async fn delay_time_total(&self) -> Result<Option<i64>, Error> {
        self.item.int("DELAY_TIME_TOTAL").await
    }

    pub async fn delay_time_remaining(&self) -> Result<Option<i64>, Error> {
        self.item.int("DELAY_TIME_REMAINING").await
    }

    /// Number of open (unsecured) zones.
    pub async fn open_zone_count(&self) -> Result<Option<i64>, Error> {
        self.item.int("OPEN_ZONE_COUNT").await
    }

    pub async fn alarm_type(&self) -> Result<Option<String>, Error> {
        self.item.text("ALARM_TYPE").await
    }

    pub async fn armed_type(&self) -> Result<Option<String>, Error> {
        self.item.text("ARMED_TYPE").await
    }

    pub async fn last_emergency(&self) -> Result<Option<String>, Error> {
        self.item.text("LAST_EMERGENCY").await
    }

    pub async fn last_arm_failure(&self) -> Result<Option<String>, Error> {
        self.item.text("LAST_ARM_FAILED").await
    }

    // ── Capabilities ─────────────────────────────────────────────────

    /// Emergency types the panel supports (`Fire`, `Medical`, `Panic`,
    /// `Police`), read from the item's capabilities.
    pub async fn emergency_types(&self) -> Result<Vec<String>, Error> {
        let item = self.item.director().item_info(self.item_id()).await?;
        Ok(emergency_types(&item))
    }

    /// Arm modes the panel supports, read from the item's capabilities.
    pub async fn arm_types(&self) -> Result<Vec<String>, Error> {
        let item = self.item.director().item_info(self.item_id()).await?;
        Ok(arm_types(&item))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm with one of the modes from [`arm_types`](Self::arm_types).
    pub async fn arm(&self, user_code: &str, arm_type: &str) -> Result<(), Error> {
        self.item
            .command(
                "PARTITION_ARM",
                &json!({ "ArmType": arm_type, "UserCode": user_code }),
            )
            .await
    }

    pub async fn disarm(&self, user_code: &str) -> Result<(), Error> {
        self.item
            .command("PARTITION_DISARM", &json!({ "UserCode": user_code }))
            .await
    }

    /// Trigger one of the [`emergency_types`](Self::emergency_types).
    pub async fn trigger_emergency(&self, emergency_type: &str) -> Result<(), Error> {
        self.item
            .command(
                "EXECUTE_EMERGENCY",
                &json!({ "EmergencyType": emergency_type }),
            )
            .await
    }

    /// Press a single key on the panel's virtual keypad.
    pub async fn send_key_press(&self, key: &str) -> Result<(), Error> {
        self.item
            .command("KEY_PRESS", &json!({ "KeyName": key }))
            .await
    }
}

fn emergency_types(item: &Item) -> Vec<String> {
    EMERGENCY_CAPABILITIES
        .iter()
        .filter(|(cap, _)| item.capability(cap).and_then(as_bool).unwrap_or(false))
        .map(|(_, name)| (*name).to_owned())
        .collect()
}

fn arm_types(item: &Item) -> Vec<String> {
    item.capability("arm_types")
        .and_then(as_text)
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// A door, window, or motion contact.
#[derive(Debug, Clone, Copy)]
pub struct ContactSensor<'a> {
    item: ItemHandle<'a>,
}

impl<'a> ContactSensor<'a> {
    pub fn new(director: &'a DirectorClient, item_id: u32) -> Self {
        Self {
            item: ItemHandle::new(director, item_id),
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item.item_id()
    }

    /// `true` when the contact is triggered (door closed, motion detected).
    pub async fn contact_state(&self) -> Result<Option<bool>, Error> {
        self.item.flag("ContactState").await
    }
}
