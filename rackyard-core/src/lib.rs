//! RACKYARD Core - Domain Types
//!
//! Pallets, slots, lanes, and the pure functions over them: QR label
//! decoding and the occupancy projection. All other crates depend on this.
//! Nothing here performs I/O.

pub mod allocation;
pub mod error;
pub mod identity;
pub mod occupancy;
pub mod pallet;
pub mod qr;
pub mod slot;

pub use allocation::{Confirmation, SlotAction};
pub use error::{
    AllocationError, CreateUserError, ErrorKind, IngestError, ReleaseError, StorageError,
    StorageResult, ValidationError,
};
pub use identity::{PalletKey, PasswordDigest, Timestamp};
pub use occupancy::{
    classify, pivot, utilization, CellClass, FilterOptions, GridCell, GridRow, OccupancyFilter,
    OccupancySnapshot, RackGrid, Utilization, FREE_LABEL,
};
pub use pallet::{
    HarvestDate, Pallet, PalletCode, PalletRecord, HARVEST_DATE_LEN, PALLET_CODE_LEN,
};
pub use qr::QR_FIELD_COUNT;
pub use slot::{
    LaneKey, SlotKey, SlotOptions, SlotRecord, SlotSelection, SlotStatus, HEAD_POSITION,
};
