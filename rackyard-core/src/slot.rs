//! Warehouse slot (`ubicaciones`) types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::pallet::Pallet;

/// Position index of the head of a lane. Only the head may be released.
pub const HEAD_POSITION: i32 = 1;

/// Occupancy status of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Free,
    Occupied,
}

impl SlotStatus {
    /// Value stored in `ubicaciones.status_ubicacion`.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            SlotStatus::Free => "Libre",
            SlotStatus::Occupied => "Ocupado",
        }
    }

    /// Anything other than the free marker counts as occupied.
    pub fn from_db_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("Libre") {
            SlotStatus::Free
        } else {
            SlotStatus::Occupied
        }
    }
}

/// A lane: the ordered run of slots sharing (type, floor, rack, letter).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LaneKey {
    pub warehouse_type: String,
    pub floor: i32,
    pub rack: i32,
    pub letter: String,
}

impl LaneKey {
    pub fn new(
        warehouse_type: impl Into<String>,
        floor: i32,
        rack: i32,
        letter: impl Into<String>,
    ) -> Self {
        Self {
            warehouse_type: warehouse_type.into(),
            floor,
            rack,
            letter: letter.into(),
        }
    }

    /// Slot key for a position within this lane.
    pub fn slot(&self, position: i32) -> SlotKey {
        SlotKey {
            warehouse_type: self.warehouse_type.clone(),
            floor: self.floor,
            rack: self.rack,
            letter: self.letter.clone(),
            position,
        }
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.warehouse_type, self.floor, self.rack, self.letter
        )
    }
}

/// Composite slot identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotKey {
    pub warehouse_type: String,
    pub floor: i32,
    pub rack: i32,
    pub letter: String,
    pub position: i32,
}

impl SlotKey {
    pub fn lane(&self) -> LaneKey {
        LaneKey {
            warehouse_type: self.warehouse_type.clone(),
            floor: self.floor,
            rack: self.rack,
            letter: self.letter.clone(),
        }
    }

    pub fn is_head(&self) -> bool {
        self.position == HEAD_POSITION
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.warehouse_type, self.floor, self.rack, self.letter, self.position
        )
    }
}

/// One row of the slot table left-joined with its occupying pallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotRecord {
    pub key: SlotKey,
    pub status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pallet: Option<Pallet>,
}

impl SlotRecord {
    pub fn free(key: SlotKey) -> Self {
        Self {
            key,
            status: SlotStatus::Free,
            pallet: None,
        }
    }

    pub fn occupied(key: SlotKey, pallet: Pallet) -> Self {
        Self {
            key,
            status: SlotStatus::Occupied,
            pallet: Some(pallet),
        }
    }

    /// A slot counts as occupied only when a pallet row joined onto it.
    pub fn is_occupied(&self) -> bool {
        self.pallet.is_some()
    }
}

/// Partial selection made in the assignment form. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SlotSelection {
    pub warehouse_type: Option<String>,
    pub floor: Option<i32>,
    pub rack: Option<i32>,
    pub letter: Option<String>,
}

impl SlotSelection {
    pub fn matches(&self, key: &SlotKey) -> bool {
        let text_matches = |wanted: &Option<String>, actual: &str| match wanted {
            Some(value) if !value.is_empty() => value == actual,
            _ => true,
        };
        text_matches(&self.warehouse_type, &key.warehouse_type)
            && self.floor.map_or(true, |floor| floor == key.floor)
            && self.rack.map_or(true, |rack| rack == key.rack)
            && text_matches(&self.letter, &key.letter)
    }
}

/// Distinct values offered by the slot dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotOptions {
    pub warehouse_types: Vec<String>,
    pub floors: Vec<i32>,
    pub racks: Vec<i32>,
    pub letters: Vec<String>,
}

impl SlotOptions {
    /// Collect sorted, de-duplicated options from lanes. Empty text values
    /// are dropped.
    pub fn from_lanes<'a>(lanes: impl IntoIterator<Item = &'a LaneKey>) -> Self {
        let mut warehouse_types = BTreeSet::new();
        let mut floors = BTreeSet::new();
        let mut racks = BTreeSet::new();
        let mut letters = BTreeSet::new();

        for lane in lanes {
            if !lane.warehouse_type.is_empty() {
                warehouse_types.insert(lane.warehouse_type.clone());
            }
            floors.insert(lane.floor);
            racks.insert(lane.rack);
            if !lane.letter.is_empty() {
                letters.insert(lane.letter.clone());
            }
        }

        Self {
            warehouse_types: warehouse_types.into_iter().collect(),
            floors: floors.into_iter().collect(),
            racks: racks.into_iter().collect(),
            letters: letters.into_iter().collect(),
        }
    }
}
