//! Async storage trait for the warehouse tables.
//!
//! Every mutating method is a single atomic unit: implementations run the
//! precondition checks and the write inside one transaction so concurrent
//! callers cannot interleave between them.

use ::async_trait::async_trait;
use rackyard_core::{
    LaneKey, Pallet, PalletCode, PalletKey, PalletRecord, PasswordDigest, SlotKey, SlotOptions,
    SlotRecord, SlotSelection, StorageResult,
};
use std::sync::Arc;

/// Result of an assignment attempt that reached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The pallet now occupies this slot.
    Assigned(SlotKey),
    /// The pallet already sits in this slot; nothing changed.
    AlreadyAssigned(SlotKey),
    /// The lane has no free slot.
    LaneFull,
}

/// Result of a release attempt that reached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The head slot was vacated and the lane shifted down.
    Released(SlotKey),
    /// The pallet is not in any slot.
    NotAssigned,
    /// The pallet sits behind the head of its lane; nothing changed.
    NotAtHead(SlotKey),
}

/// Storage operations over pallets, slots, and users.
#[async_trait]
pub trait WarehouseStore: Send + Sync {
    // ========================================================================
    // PALLET OPERATIONS
    // ========================================================================

    /// Look up a pallet by its external code.
    async fn pallet_find_by_code(&self, code: &PalletCode) -> StorageResult<Option<Pallet>>;

    /// Insert a pallet decoded from a QR label.
    ///
    /// A code that already exists fails with `StorageError::UniqueViolation`.
    async fn pallet_insert_from_qr(&self, record: &PalletRecord) -> StorageResult<Pallet>;

    // ========================================================================
    // SLOT OPERATIONS
    // ========================================================================

    /// Place a pallet in the lowest free position of a lane, then recompute
    /// slot statuses.
    async fn slot_assign(&self, lane: &LaneKey, pallet: PalletKey) -> StorageResult<AssignOutcome>;

    /// Vacate the head slot holding a pallet and shift the rest of its lane
    /// down by one position, then recompute slot statuses.
    async fn slot_release(&self, pallet: PalletKey) -> StorageResult<ReleaseOutcome>;

    /// Every slot joined with its occupying pallet, if any.
    async fn slot_list_all(&self) -> StorageResult<Vec<SlotRecord>>;

    /// Distinct type, floor, rack, and letter values over all slots.
    async fn slot_field_options(&self) -> StorageResult<SlotOptions>;

    /// Distinct values over free slots matching a partial selection.
    async fn slot_available_options(&self, selection: &SlotSelection)
        -> StorageResult<SlotOptions>;

    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    /// Insert a user. A taken username fails with
    /// `StorageError::UniqueViolation`.
    async fn user_insert(&self, username: &str, digest: &PasswordDigest) -> StorageResult<()>;

    /// Whether exactly one user row matches the name and digest.
    async fn user_verify(&self, username: &str, digest: &PasswordDigest) -> StorageResult<bool>;

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Round-trip to the backing store.
    async fn health_check(&self) -> StorageResult<()>;
}

/// Store handle shared across request handlers and background jobs.
pub type SharedStore = Arc<dyn WarehouseStore>;
