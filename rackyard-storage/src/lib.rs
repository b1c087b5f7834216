//! RACKYARD Storage - Storage Trait and Mock Implementation
//!
//! Defines the storage abstraction over pallets, slots, and users.
//! The PostgreSQL implementation lives in rackyard-api.

pub mod store;

pub use store::{AssignOutcome, ReleaseOutcome, SharedStore, WarehouseStore};

use ::async_trait::async_trait;
use rackyard_core::{
    LaneKey, Pallet, PalletCode, PalletKey, PalletRecord, PasswordDigest, SlotKey, SlotOptions,
    SlotRecord, SlotSelection, StorageError, StorageResult,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Constraint name reported for duplicate pallet codes.
pub const PALLET_CODE_CONSTRAINT: &str = "pallets_npallet_key";

/// Constraint name reported for duplicate usernames.
pub const USERNAME_CONSTRAINT: &str = "usuarios_username_key";

// ============================================================================
// MOCK STORAGE
// ============================================================================

#[derive(Debug, Default)]
struct Inventory {
    pallets: BTreeMap<PalletKey, Pallet>,
    last_pallet_key: PalletKey,
    /// Slot → occupying pallet. Ordered so a lane's positions are adjacent.
    slots: BTreeMap<SlotKey, Option<PalletKey>>,
    users: HashMap<String, PasswordDigest>,
}

impl Inventory {
    fn slot_of(&self, pallet: PalletKey) -> Option<&SlotKey> {
        self.slots
            .iter()
            .find(|(_, occupant)| **occupant == Some(pallet))
            .map(|(key, _)| key)
    }

    fn lane_positions(&self, lane: &LaneKey) -> Vec<SlotKey> {
        self.slots
            .keys()
            .filter(|key| key.lane() == *lane)
            .cloned()
            .collect()
    }

    fn insert_pallet(&mut self, record: PalletRecord) -> StorageResult<Pallet> {
        if self.pallets.values().any(|p| p.code == record.code) {
            return Err(StorageError::UniqueViolation {
                constraint: PALLET_CODE_CONSTRAINT.to_string(),
            });
        }
        self.last_pallet_key += 1;
        let pallet = Pallet::from_record(self.last_pallet_key, record);
        self.pallets.insert(pallet.key, pallet.clone());
        Ok(pallet)
    }
}

/// In-memory store that applies the slotting rules directly: assignment
/// takes the lowest free position of a lane, release frees position 1 and
/// shifts the lane down by one.
#[derive(Debug, Default)]
pub struct MockStorage {
    inner: RwLock<Inventory>,
}

impl MockStorage {
    /// Create an empty mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lane with free positions `1..=depth`.
    pub fn with_lane(mut self, lane: &LaneKey, depth: i32) -> Self {
        let inventory = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        for position in 1..=depth {
            inventory.slots.entry(lane.slot(position)).or_insert(None);
        }
        self
    }

    /// Add a pallet that sits in no slot. Duplicate codes are ignored.
    pub fn with_pallet(mut self, record: PalletRecord) -> Self {
        let inventory = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        let _ = inventory.insert_pallet(record);
        self
    }

    /// Put an existing pallet in a specific slot, bypassing the lane rules.
    /// Unknown codes are ignored.
    pub fn with_occupant(mut self, slot: SlotKey, code: &str) -> Self {
        let inventory = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        let key = inventory
            .pallets
            .values()
            .find(|p| p.code.as_str() == code)
            .map(|p| p.key);
        if let Some(key) = key {
            inventory.slots.insert(slot, Some(key));
        }
        self
    }

    /// Add a user with an already-computed password digest.
    pub fn with_user(mut self, username: &str, digest: PasswordDigest) -> Self {
        let inventory = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inventory.users.insert(username.to_string(), digest);
        self
    }

    /// Number of stored pallets.
    pub fn pallet_count(&self) -> StorageResult<usize> {
        Ok(self.read()?.pallets.len())
    }

    /// Number of stored users.
    pub fn user_count(&self) -> StorageResult<usize> {
        Ok(self.read()?.users.len())
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Inventory>> {
        self.inner.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Inventory>> {
        self.inner.write().map_err(|_| StorageError::LockPoisoned)
    }
}

#[async_trait]
impl WarehouseStore for MockStorage {
    // === Pallet Operations ===

    async fn pallet_find_by_code(&self, code: &PalletCode) -> StorageResult<Option<Pallet>> {
        let inventory = self.read()?;
        Ok(inventory.pallets.values().find(|p| p.code == *code).cloned())
    }

    async fn pallet_insert_from_qr(&self, record: &PalletRecord) -> StorageResult<Pallet> {
        self.write()?.insert_pallet(record.clone())
    }

    // === Slot Operations ===

    async fn slot_assign(&self, lane: &LaneKey, pallet: PalletKey) -> StorageResult<AssignOutcome> {
        let mut inventory = self.write()?;

        if let Some(current) = inventory.slot_of(pallet) {
            return Ok(AssignOutcome::AlreadyAssigned(current.clone()));
        }

        let free = inventory
            .lane_positions(lane)
            .into_iter()
            .find(|key| matches!(inventory.slots.get(key), Some(None)));

        match free {
            Some(slot) => {
                inventory.slots.insert(slot.clone(), Some(pallet));
                Ok(AssignOutcome::Assigned(slot))
            }
            None => Ok(AssignOutcome::LaneFull),
        }
    }

    async fn slot_release(&self, pallet: PalletKey) -> StorageResult<ReleaseOutcome> {
        let mut inventory = self.write()?;

        let Some(slot) = inventory.slot_of(pallet).cloned() else {
            return Ok(ReleaseOutcome::NotAssigned);
        };
        if !slot.is_head() {
            return Ok(ReleaseOutcome::NotAtHead(slot));
        }

        // Each position takes the contents of the one behind it; the last
        // position ends up free.
        let positions = inventory.lane_positions(&slot.lane());
        for pair in positions.windows(2) {
            let behind = inventory.slots.get(&pair[1]).copied().flatten();
            inventory.slots.insert(pair[0].clone(), behind);
        }
        if let Some(last) = positions.last() {
            inventory.slots.insert(last.clone(), None);
        }

        Ok(ReleaseOutcome::Released(slot))
    }

    async fn slot_list_all(&self) -> StorageResult<Vec<SlotRecord>> {
        let inventory = self.read()?;
        Ok(inventory
            .slots
            .iter()
            .map(|(key, occupant)| {
                match occupant.and_then(|k| inventory.pallets.get(&k)) {
                    Some(pallet) => SlotRecord::occupied(key.clone(), pallet.clone()),
                    None => SlotRecord::free(key.clone()),
                }
            })
            .collect())
    }

    async fn slot_field_options(&self) -> StorageResult<SlotOptions> {
        let inventory = self.read()?;
        let lanes: Vec<LaneKey> = inventory.slots.keys().map(SlotKey::lane).collect();
        Ok(SlotOptions::from_lanes(&lanes))
    }

    async fn slot_available_options(
        &self,
        selection: &SlotSelection,
    ) -> StorageResult<SlotOptions> {
        let inventory = self.read()?;
        let lanes: Vec<LaneKey> = inventory
            .slots
            .iter()
            .filter(|(key, occupant)| occupant.is_none() && selection.matches(key))
            .map(|(key, _)| key.lane())
            .collect();
        Ok(SlotOptions::from_lanes(&lanes))
    }

    // === User Operations ===

    async fn user_insert(&self, username: &str, digest: &PasswordDigest) -> StorageResult<()> {
        let mut inventory = self.write()?;
        if inventory.users.contains_key(username) {
            return Err(StorageError::UniqueViolation {
                constraint: USERNAME_CONSTRAINT.to_string(),
            });
        }
        inventory.users.insert(username.to_string(), digest.clone());
        Ok(())
    }

    async fn user_verify(&self, username: &str, digest: &PasswordDigest) -> StorageResult<bool> {
        let inventory = self.read()?;
        Ok(inventory.users.get(username) == Some(digest))
    }

    // === Health ===

    async fn health_check(&self) -> StorageResult<()> {
        self.read().map(|_| ())
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use rackyard_core::HarvestDate;
    use std::collections::HashSet;

    #[derive(Debug, Clone)]
    enum Op {
        Assign { pallet: usize, letter: usize },
        Release { pallet: usize },
    }

    const LETTERS: [&str; 2] = ["A", "B"];
    const PALLETS: usize = 6;

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..PALLETS, 0..LETTERS.len()).prop_map(|(pallet, letter)| Op::Assign { pallet, letter }),
            (0..PALLETS).prop_map(|pallet| Op::Release { pallet }),
        ]
    }

    fn seeded() -> MockStorage {
        let mut storage = MockStorage::new();
        for letter in LETTERS {
            storage = storage.with_lane(&LaneKey::new("COLD", 1, 1, letter), 3);
        }
        for i in 0..PALLETS {
            storage = storage.with_pallet(PalletRecord {
                variety: "Gala".to_string(),
                description: "Box".to_string(),
                market: "EU".to_string(),
                harvest_date: HarvestDate::from_stored("20240115"),
                code: PalletCode::from_stored(format!("{:08}", i)),
            });
        }
        storage
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any sequence of assigns and releases keeps every pallet in at most
        /// one slot and every lane packed from position 1.
        #[test]
        fn prop_lane_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..40)) {
            let rt = runtime();
            let storage = seeded();

            rt.block_on(async {
                for op in &ops {
                    match op {
                        Op::Assign { pallet, letter } => {
                            let lane = LaneKey::new("COLD", 1, 1, LETTERS[*letter]);
                            storage.slot_assign(&lane, (*pallet as PalletKey) + 1).await.unwrap();
                        }
                        Op::Release { pallet } => {
                            storage.slot_release((*pallet as PalletKey) + 1).await.unwrap();
                        }
                    }
                }
            });

            let records = rt.block_on(storage.slot_list_all()).unwrap();

            let mut seen = HashSet::new();
            for record in &records {
                if let Some(pallet) = &record.pallet {
                    prop_assert!(seen.insert(pallet.key), "pallet {} in two slots", pallet.key);
                }
            }

            for letter in LETTERS {
                let occupied: Vec<i32> = records
                    .iter()
                    .filter(|r| r.key.letter == letter && r.is_occupied())
                    .map(|r| r.key.position)
                    .collect();
                let expected: Vec<i32> = (1..=occupied.len() as i32).collect();
                prop_assert_eq!(occupied, expected);
            }
        }

        /// Releasing a pallet behind the head never changes any slot.
        #[test]
        fn prop_not_at_head_is_noop(depth in 2..4i32) {
            let rt = runtime();
            let lane = LaneKey::new("COLD", 1, 1, "A");
            let storage = seeded();

            let before = rt.block_on(async {
                for pallet in 1..=depth {
                    storage.slot_assign(&lane, pallet).await.unwrap();
                }
                storage.slot_list_all().await.unwrap()
            });

            let outcome = rt.block_on(storage.slot_release(depth)).unwrap();
            let is_not_at_head = matches!(outcome, ReleaseOutcome::NotAtHead(_));
            prop_assert!(is_not_at_head);
            prop_assert_eq!(rt.block_on(storage.slot_list_all()).unwrap(), before);
        }
    }
}
