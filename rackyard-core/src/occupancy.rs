//! Occupancy projection: rack grids, utilization, and filter classification.
//!
//! All functions here are pure over a slice of [`SlotRecord`]s, so the same
//! read can be projected any number of times with identical results.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::identity::Timestamp;
use crate::slot::SlotRecord;

/// Label shown in a grid cell with no pallet.
pub const FREE_LABEL: &str = "Free";

// ============================================================================
// UTILIZATION
// ============================================================================

/// Occupied over total slot counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Utilization {
    pub occupied: usize,
    pub total: usize,
}

impl Utilization {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a SlotRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut acc, record| {
            acc.total += 1;
            if record.is_occupied() {
                acc.occupied += 1;
            }
            acc
        })
    }

    /// Percentage in `[0, 100]`; zero slots yields `0.0`.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.occupied as f64 / self.total as f64 * 100.0
    }
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.percentage())
    }
}

/// Utilization formatted with two decimals, e.g. `"75.00%"`.
pub fn utilization(records: &[SlotRecord]) -> String {
    Utilization::of(records).to_string()
}

// ============================================================================
// FILTERING
// ============================================================================

/// Three-way classification used for cell coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CellClass {
    Matched,
    Unmatched,
    Free,
}

/// Selected values per attribute axis. An empty set selects nothing on that
/// axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyFilter {
    pub codes: BTreeSet<String>,
    pub varieties: BTreeSet<String>,
    pub markets: BTreeSet<String>,
    pub harvest_dates: BTreeSet<String>,
}

impl OccupancyFilter {
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
            && self.varieties.is_empty()
            && self.markets.is_empty()
            && self.harvest_dates.is_empty()
    }
}

/// Classify one record. Occupied cells match when any selected predicate
/// holds.
pub fn classify(record: &SlotRecord, filter: &OccupancyFilter) -> CellClass {
    let Some(pallet) = &record.pallet else {
        return CellClass::Free;
    };

    let matched = filter.codes.contains(pallet.code.as_str())
        || filter.varieties.contains(&pallet.variety)
        || filter.markets.contains(&pallet.market)
        || filter.harvest_dates.contains(pallet.harvest_date.as_str());

    if matched {
        CellClass::Matched
    } else {
        CellClass::Unmatched
    }
}

/// Values available to the occupancy filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FilterOptions {
    pub codes: Vec<String>,
    pub varieties: Vec<String>,
    pub markets: Vec<String>,
    pub harvest_dates: Vec<String>,
}

impl FilterOptions {
    /// Distinct attribute values over occupied slots, sorted.
    pub fn from_records(records: &[SlotRecord]) -> Self {
        let mut codes = BTreeSet::new();
        let mut varieties = BTreeSet::new();
        let mut markets = BTreeSet::new();
        let mut harvest_dates = BTreeSet::new();

        for pallet in records.iter().filter_map(|r| r.pallet.as_ref()) {
            codes.insert(pallet.code.to_string());
            varieties.insert(pallet.variety.clone());
            markets.insert(pallet.market.clone());
            harvest_dates.insert(pallet.harvest_date.to_string());
        }

        Self {
            codes: codes.into_iter().collect(),
            varieties: varieties.into_iter().collect(),
            markets: markets.into_iter().collect(),
            harvest_dates: harvest_dates.into_iter().collect(),
        }
    }
}

// ============================================================================
// PIVOT
// ============================================================================

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GridCell {
    /// Pallet code, or `"Free"`.
    pub label: String,
    pub class: CellClass,
}

/// One (floor, position) row across the rack's letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GridRow {
    pub floor: i32,
    pub position: i32,
    /// Aligned with [`RackGrid::letters`]; `None` where the rack has no slot.
    pub cells: Vec<Option<GridCell>>,
}

/// Pivoted view of one rack: rows are (floor, position), columns are letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RackGrid {
    pub warehouse_type: String,
    pub rack: i32,
    pub letters: Vec<String>,
    pub rows: Vec<GridRow>,
    pub utilization: String,
}

/// Pivot records into one grid per (warehouse type, rack).
///
/// Rows are ordered by descending floor, then descending position; letters
/// ascend left to right.
pub fn pivot(records: &[SlotRecord], filter: &OccupancyFilter) -> Vec<RackGrid> {
    let mut racks: BTreeMap<(&str, i32), Vec<&SlotRecord>> = BTreeMap::new();
    for record in records {
        racks
            .entry((record.key.warehouse_type.as_str(), record.key.rack))
            .or_default()
            .push(record);
    }

    racks
        .into_iter()
        .map(|((warehouse_type, rack), rack_records)| {
            let letters: Vec<String> = rack_records
                .iter()
                .map(|r| r.key.letter.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            let mut rows: BTreeMap<Reverse<(i32, i32)>, Vec<Option<GridCell>>> = BTreeMap::new();
            for record in &rack_records {
                let cells = rows
                    .entry(Reverse((record.key.floor, record.key.position)))
                    .or_insert_with(|| vec![None; letters.len()]);
                if let Ok(column) = letters.binary_search(&record.key.letter) {
                    cells[column] = Some(GridCell {
                        label: record
                            .pallet
                            .as_ref()
                            .map_or_else(|| FREE_LABEL.to_string(), |p| p.code.to_string()),
                        class: classify(record, filter),
                    });
                }
            }

            RackGrid {
                warehouse_type: warehouse_type.to_string(),
                rack,
                letters,
                rows: rows
                    .into_iter()
                    .map(|(Reverse((floor, position)), cells)| GridRow {
                        floor,
                        position,
                        cells,
                    })
                    .collect(),
                utilization: Utilization::of(rack_records.iter().copied()).to_string(),
            }
        })
        .collect()
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Full occupancy view at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OccupancySnapshot {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub generated_at: Timestamp,
    pub racks: Vec<RackGrid>,
    pub occupied: usize,
    pub total: usize,
    pub utilization: String,
}

impl OccupancySnapshot {
    pub fn build(records: &[SlotRecord], filter: &OccupancyFilter, generated_at: Timestamp) -> Self {
        let summary = Utilization::of(records);
        Self {
            generated_at,
            racks: pivot(records, filter),
            occupied: summary.occupied,
            total: summary.total,
            utilization: summary.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pallet::{HarvestDate, Pallet, PalletCode};
    use crate::slot::LaneKey;

    fn pallet(key: i32, code: &str, variety: &str, market: &str, date: &str) -> Pallet {
        Pallet {
            key,
            code: PalletCode::from_stored(code),
            description: "box".to_string(),
            variety: variety.to_string(),
            market: market.to_string(),
            harvest_date: HarvestDate::from_stored(date),
        }
    }

    fn occupied(floor: i32, letter: &str, position: i32, p: Pallet) -> SlotRecord {
        SlotRecord::occupied(LaneKey::new("COLD", floor, 1, letter).slot(position), p)
    }

    fn free(floor: i32, letter: &str, position: i32) -> SlotRecord {
        SlotRecord::free(LaneKey::new("COLD", floor, 1, letter).slot(position))
    }

    #[test]
    fn test_utilization_empty() {
        assert_eq!(utilization(&[]), "0.00%");
    }

    #[test]
    fn test_utilization_three_of_four() {
        let records = vec![
            occupied(1, "A", 1, pallet(1, "00000001", "Gala", "EU", "20240101")),
            occupied(1, "A", 2, pallet(2, "00000002", "Gala", "EU", "20240101")),
            occupied(1, "B", 1, pallet(3, "00000003", "Fuji", "US", "20240102")),
            free(1, "B", 2),
        ];
        assert_eq!(utilization(&records), "75.00%");
    }

    #[test]
    fn test_utilization_rounding() {
        let records = vec![
            occupied(1, "A", 1, pallet(1, "00000001", "Gala", "EU", "20240101")),
            free(1, "A", 2),
            free(1, "A", 3),
        ];
        assert_eq!(utilization(&records), "33.33%");
    }

    #[test]
    fn test_classify_three_way() {
        let gala = occupied(1, "A", 1, pallet(1, "00000001", "Gala", "EU", "20240101"));
        let fuji = occupied(1, "A", 2, pallet(2, "00000002", "Fuji", "US", "20240102"));
        let empty = free(1, "A", 3);

        let mut filter = OccupancyFilter::default();
        filter.varieties.insert("Gala".to_string());

        assert_eq!(classify(&gala, &filter), CellClass::Matched);
        assert_eq!(classify(&fuji, &filter), CellClass::Unmatched);
        assert_eq!(classify(&empty, &filter), CellClass::Free);
    }

    #[test]
    fn test_classify_any_axis_matches() {
        let fuji = occupied(1, "A", 2, pallet(2, "00000002", "Fuji", "US", "20240102"));
        let mut filter = OccupancyFilter::default();
        filter.varieties.insert("Gala".to_string());
        filter.harvest_dates.insert("20240102".to_string());
        assert_eq!(classify(&fuji, &filter), CellClass::Matched);
    }

    #[test]
    fn test_classify_empty_filter_leaves_occupied_unmatched() {
        let gala = occupied(1, "A", 1, pallet(1, "00000001", "Gala", "EU", "20240101"));
        let filter = OccupancyFilter::default();
        assert!(filter.is_empty());
        assert_eq!(classify(&gala, &filter), CellClass::Unmatched);
    }

    #[test]
    fn test_pivot_row_and_column_order() {
        let records = vec![
            free(1, "B", 1),
            occupied(1, "A", 1, pallet(1, "00000001", "Gala", "EU", "20240101")),
            free(1, "A", 2),
            free(2, "A", 1),
        ];
        let grids = pivot(&records, &OccupancyFilter::default());
        assert_eq!(grids.len(), 1);

        let grid = &grids[0];
        assert_eq!(grid.letters, vec!["A", "B"]);
        let order: Vec<(i32, i32)> = grid.rows.iter().map(|r| (r.floor, r.position)).collect();
        assert_eq!(order, vec![(2, 1), (1, 2), (1, 1)]);

        // Floor 2 has no letter B slot.
        assert_eq!(grid.rows[0].cells[1], None);

        let head_row = &grid.rows[2];
        assert_eq!(head_row.cells[0].as_ref().unwrap().label, "00000001");
        assert_eq!(head_row.cells[1].as_ref().unwrap().label, FREE_LABEL);
        assert_eq!(head_row.cells[1].as_ref().unwrap().class, CellClass::Free);
        assert_eq!(grid.utilization, "25.00%");
    }

    #[test]
    fn test_pivot_groups_by_type_and_rack() {
        let records = vec![
            SlotRecord::free(LaneKey::new("DRY", 1, 2, "A").slot(1)),
            SlotRecord::free(LaneKey::new("COLD", 1, 2, "A").slot(1)),
            SlotRecord::free(LaneKey::new("COLD", 1, 1, "A").slot(1)),
        ];
        let grids = pivot(&records, &OccupancyFilter::default());
        let keys: Vec<(&str, i32)> = grids
            .iter()
            .map(|g| (g.warehouse_type.as_str(), g.rack))
            .collect();
        assert_eq!(keys, vec![("COLD", 1), ("COLD", 2), ("DRY", 2)]);
    }

    #[test]
    fn test_filter_options_only_from_occupied() {
        let records = vec![
            occupied(1, "A", 1, pallet(1, "00000002", "Gala", "EU", "20240101")),
            occupied(1, "A", 2, pallet(2, "00000001", "Fuji", "EU", "20240101")),
            free(1, "A", 3),
        ];
        let options = FilterOptions::from_records(&records);
        assert_eq!(options.codes, vec!["00000001", "00000002"]);
        assert_eq!(options.varieties, vec!["Fuji", "Gala"]);
        assert_eq!(options.markets, vec!["EU"]);
        assert_eq!(options.harvest_dates, vec!["20240101"]);
    }

    #[test]
    fn test_snapshot_totals() {
        let records = vec![
            occupied(1, "A", 1, pallet(1, "00000001", "Gala", "EU", "20240101")),
            free(1, "A", 2),
        ];
        let now = chrono::Utc::now();
        let snapshot = OccupancySnapshot::build(&records, &OccupancyFilter::default(), now);
        assert_eq!(snapshot.occupied, 1);
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.utilization, "50.00%");
        assert_eq!(snapshot.generated_at, now);
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
