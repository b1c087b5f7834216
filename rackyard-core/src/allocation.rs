//! Outcomes of slot assignment and release.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pallet::PalletCode;
use crate::slot::SlotKey;

/// Which slot mutation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SlotAction {
    Assigned,
    Released,
}

/// Confirmation of a committed slot mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Confirmation {
    pub action: SlotAction,
    pub pallet: PalletCode,
    /// Slot that was filled, or the head slot that was vacated.
    pub slot: SlotKey,
}

impl Confirmation {
    pub fn assigned(pallet: PalletCode, slot: SlotKey) -> Self {
        Self {
            action: SlotAction::Assigned,
            pallet,
            slot,
        }
    }

    pub fn released(pallet: PalletCode, slot: SlotKey) -> Self {
        Self {
            action: SlotAction::Released,
            pallet,
            slot,
        }
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            SlotAction::Assigned => write!(
                f,
                "Pallet {} assigned to slot {}",
                self.pallet, self.slot
            ),
            SlotAction::Released => write!(
                f,
                "Pallet {} released from slot {}",
                self.pallet, self.slot
            ),
        }
    }
}
