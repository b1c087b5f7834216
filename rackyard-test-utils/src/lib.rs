//! RACKYARD Test Utilities
//!
//! Centralized test infrastructure for the RACKYARD workspace:
//! - Proptest generators for pallet codes, QR labels, and lanes
//! - Test fixtures for a small seeded warehouse
//! - Custom assertions for lane state

// Re-export mock storage from its source crate
pub use rackyard_storage::MockStorage;

// Re-export core types for convenience
pub use rackyard_core::{
    HarvestDate, LaneKey, Pallet, PalletCode, PalletRecord, PasswordDigest, SlotKey, SlotRecord,
};

pub use fixtures::{
    lane, pallet_record, seeded_storage, OPERATOR, OPERATOR_PASSWORD, SEEDED_FREE_SLOTS,
    SEEDED_TOTAL_SLOTS, UNASSIGNED_CODE,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for RACKYARD inputs.

    use super::*;
    use proptest::prelude::*;

    /// Eight-digit pallet code accepted by assign/release.
    pub fn arb_pallet_code() -> impl Strategy<Value = String> {
        "[0-9]{8}"
    }

    /// Eight-digit harvest date.
    pub fn arb_harvest_date() -> impl Strategy<Value = String> {
        "20[0-9]{2}(0[1-9]|1[0-2])(0[1-9]|1[0-9]|2[0-8])"
    }

    /// Free text that cannot break the comma-separated label format.
    pub fn arb_label_text() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,14}[A-Za-z0-9]"
    }

    /// A decoded QR label.
    pub fn arb_pallet_record() -> impl Strategy<Value = PalletRecord> {
        (
            arb_label_text(),
            arb_label_text(),
            arb_label_text(),
            arb_harvest_date(),
            arb_pallet_code(),
        )
            .prop_map(|(variety, description, market, date, code)| PalletRecord {
                variety,
                description,
                market,
                harvest_date: HarvestDate::from_stored(date),
                code: PalletCode::from_stored(code),
            })
    }

    /// A raw, well-formed QR payload.
    pub fn arb_qr_payload() -> impl Strategy<Value = String> {
        arb_pallet_record().prop_map(|record| record.to_qr_payload())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! A small warehouse used across test suites.
    //!
    //! | lane          | depth | occupants                         |
    //! |---------------|-------|-----------------------------------|
    //! | COLD-1-1-A    | 3     | 1: 10000001, 2: 10000002          |
    //! | COLD-1-1-B    | 3     | none                              |
    //! | COLD-2-1-A    | 2     | none                              |
    //! | DRY-1-2-A     | 2     | 1: 10000003                       |
    //!
    //! Pallet 10000004 exists but sits in no slot. One operator account is
    //! registered.

    use super::*;

    /// Registered operator username.
    pub const OPERATOR: &str = "operator";

    /// Registered operator password.
    pub const OPERATOR_PASSWORD: &str = "forklift-42";

    /// Code of the pallet that exists but occupies no slot.
    pub const UNASSIGNED_CODE: &str = "10000004";

    /// Number of slots in the seeded warehouse.
    pub const SEEDED_TOTAL_SLOTS: usize = 10;

    /// Number of free slots in the seeded warehouse.
    pub const SEEDED_FREE_SLOTS: usize = 7;

    pub fn lane(warehouse_type: &str, floor: i32, rack: i32, letter: &str) -> LaneKey {
        LaneKey::new(warehouse_type, floor, rack, letter)
    }

    pub fn pallet_record(code: &str, variety: &str, market: &str, harvest_date: &str) -> PalletRecord {
        PalletRecord {
            variety: variety.to_string(),
            description: format!("{} box 18kg", variety),
            market: market.to_string(),
            harvest_date: HarvestDate::from_stored(harvest_date),
            code: PalletCode::from_stored(code),
        }
    }

    /// Mock storage holding the seeded warehouse.
    pub fn seeded_storage() -> MockStorage {
        let cold_a = lane("COLD", 1, 1, "A");
        let dry_a = lane("DRY", 1, 2, "A");

        MockStorage::new()
            .with_lane(&cold_a, 3)
            .with_lane(&lane("COLD", 1, 1, "B"), 3)
            .with_lane(&lane("COLD", 2, 1, "A"), 2)
            .with_lane(&dry_a, 2)
            .with_pallet(pallet_record("10000001", "Fuji", "EU", "20240115"))
            .with_pallet(pallet_record("10000002", "Gala", "US", "20240116"))
            .with_pallet(pallet_record("10000003", "Fuji", "ASIA", "20240117"))
            .with_pallet(pallet_record(UNASSIGNED_CODE, "Gala", "EU", "20240118"))
            .with_occupant(cold_a.slot(1), "10000001")
            .with_occupant(cold_a.slot(2), "10000002")
            .with_occupant(dry_a.slot(1), "10000003")
            .with_user(OPERATOR, PasswordDigest::compute(OPERATOR_PASSWORD))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over slot listings.

    use super::*;

    /// Occupant codes of a lane, ordered by position.
    pub fn lane_occupants(records: &[SlotRecord], lane: &LaneKey) -> Vec<(i32, Option<String>)> {
        let mut occupants: Vec<(i32, Option<String>)> = records
            .iter()
            .filter(|record| record.key.lane() == *lane)
            .map(|record| {
                (
                    record.key.position,
                    record.pallet.as_ref().map(|p| p.code.to_string()),
                )
            })
            .collect();
        occupants.sort_by_key(|(position, _)| *position);
        occupants
    }

    /// Assert that a lane's occupied positions are exactly `1..=k`.
    pub fn assert_lane_compact(records: &[SlotRecord], lane: &LaneKey) {
        let occupants = lane_occupants(records, lane);
        let filled = occupants.iter().take_while(|(_, code)| code.is_some()).count();
        assert!(
            occupants[filled..].iter().all(|(_, code)| code.is_none()),
            "lane {} has a gap: {:?}",
            lane,
            occupants
        );
    }

    /// Assert that no pallet occupies more than one slot.
    pub fn assert_single_slot_per_pallet(records: &[SlotRecord]) {
        let mut seen = std::collections::HashSet::new();
        for pallet in records.iter().filter_map(|r| r.pallet.as_ref()) {
            assert!(
                seen.insert(pallet.key),
                "pallet {} occupies more than one slot",
                pallet.code
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::*;
    use rackyard_storage::WarehouseStore;

    #[tokio::test]
    async fn test_seeded_storage_shape() {
        let store = seeded_storage();
        let records = store.slot_list_all().await.unwrap();

        assert_eq!(records.len(), SEEDED_TOTAL_SLOTS);
        assert_eq!(
            records.iter().filter(|r| !r.is_occupied()).count(),
            SEEDED_FREE_SLOTS
        );
        assert_eq!(store.pallet_count().unwrap(), 4);
        assert_eq!(store.user_count().unwrap(), 1);

        assert_single_slot_per_pallet(&records);
        assert_lane_compact(&records, &lane("COLD", 1, 1, "A"));
        assert_eq!(
            lane_occupants(&records, &lane("COLD", 1, 1, "A")),
            vec![
                (1, Some("10000001".to_string())),
                (2, Some("10000002".to_string())),
                (3, None),
            ]
        );
    }

    #[test]
    fn test_generated_payloads_decode() {
        use proptest::strategy::{Strategy, ValueTree};
        use proptest::test_runner::TestRunner;

        let mut runner = TestRunner::default();
        for _ in 0..32 {
            let payload = generators::arb_qr_payload()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            let record = rackyard_core::qr::parse(&payload).unwrap();
            assert_eq!(record.to_qr_payload(), payload);
        }
    }
}
