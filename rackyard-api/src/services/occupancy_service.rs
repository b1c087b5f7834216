//! Occupancy Service
//!
//! Reads the slot table and projects it into rack grids.

use rackyard_core::{
    FilterOptions, OccupancyFilter, OccupancySnapshot, StorageResult, Timestamp,
};
use rackyard_storage::WarehouseStore;

/// Build a snapshot of every rack from a fresh read.
pub async fn load_snapshot(
    store: &dyn WarehouseStore,
    filter: &OccupancyFilter,
    generated_at: Timestamp,
) -> StorageResult<OccupancySnapshot> {
    let records = store.slot_list_all().await?;
    Ok(OccupancySnapshot::build(&records, filter, generated_at))
}

/// Distinct values offered by the occupancy filter.
pub async fn load_filter_options(store: &dyn WarehouseStore) -> StorageResult<FilterOptions> {
    let records = store.slot_list_all().await?;
    Ok(FilterOptions::from_records(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rackyard_core::CellClass;
    use rackyard_test_utils::{seeded_storage, SEEDED_TOTAL_SLOTS};

    fn at() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_counts() {
        let store = seeded_storage();
        let snapshot = load_snapshot(&store, &OccupancyFilter::default(), at())
            .await
            .unwrap();

        assert_eq!(snapshot.total, SEEDED_TOTAL_SLOTS);
        assert_eq!(snapshot.occupied, 3);
        assert_eq!(snapshot.utilization, "30.00%");
        // (COLD, 1) and (DRY, 2)
        assert_eq!(snapshot.racks.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_is_stable_without_writes() {
        let store = seeded_storage();
        let first = load_snapshot(&store, &OccupancyFilter::default(), at())
            .await
            .unwrap();
        let second = load_snapshot(&store, &OccupancyFilter::default(), at())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_filter_marks_matches() {
        let store = seeded_storage();
        let filter = OccupancyFilter {
            varieties: ["Fuji".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let snapshot = load_snapshot(&store, &filter, at()).await.unwrap();

        let classes: Vec<(String, CellClass)> = snapshot
            .racks
            .iter()
            .flat_map(|rack| rack.rows.iter())
            .flat_map(|row| row.cells.iter().flatten())
            .filter(|cell| cell.class != CellClass::Free)
            .map(|cell| (cell.label.clone(), cell.class))
            .collect();

        assert!(classes.contains(&("10000001".to_string(), CellClass::Matched)));
        assert!(classes.contains(&("10000003".to_string(), CellClass::Matched)));
        assert!(classes.contains(&("10000002".to_string(), CellClass::Unmatched)));
    }

    #[tokio::test]
    async fn test_filter_options_cover_occupied_only() {
        let store = seeded_storage();
        let options = load_filter_options(&store).await.unwrap();
        assert_eq!(options.codes, vec!["10000001", "10000002", "10000003"]);
        assert_eq!(options.varieties, vec!["Fuji", "Gala"]);
        assert_eq!(options.markets, vec!["ASIA", "EU", "US"]);
    }
}
