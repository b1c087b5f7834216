//! Allocation Service
//!
//! Assign and release pallets against warehouse lanes. Preconditions that
//! depend on current slot state (already assigned, lane full, head position)
//! are checked by the store inside the same transaction as the write.

use rackyard_core::{
    AllocationError, Confirmation, LaneKey, PalletCode, ReleaseError, ValidationError,
};
use rackyard_storage::{AssignOutcome, ReleaseOutcome, WarehouseStore};

fn require_lane_fields(lane: &LaneKey) -> Result<(), ValidationError> {
    if lane.warehouse_type.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "warehouse_type".to_string(),
        });
    }
    if lane.letter.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "letter".to_string(),
        });
    }
    Ok(())
}

/// Place a pallet in the lowest free position of a lane.
///
/// # Errors
/// - `Invalid` when the code is not 8 digits or a lane field is empty
/// - `PalletNotFound` when no pallet carries the code
/// - `AlreadyAssigned` when the pallet already occupies a slot
/// - `LaneFull` when the lane has no free position (or does not exist)
pub async fn assign_pallet(
    store: &dyn WarehouseStore,
    pallet_code: &str,
    lane: &LaneKey,
) -> Result<Confirmation, AllocationError> {
    let code = PalletCode::parse(pallet_code)?;
    require_lane_fields(lane)?;

    let pallet = store
        .pallet_find_by_code(&code)
        .await?
        .ok_or_else(|| AllocationError::PalletNotFound { code: code.clone() })?;

    match store.slot_assign(lane, pallet.key).await? {
        AssignOutcome::Assigned(slot) => {
            tracing::info!(pallet = %code, slot = %slot, "Pallet assigned");
            Ok(Confirmation::assigned(code, slot))
        }
        AssignOutcome::AlreadyAssigned(slot) => {
            Err(AllocationError::AlreadyAssigned { code, slot })
        }
        AssignOutcome::LaneFull => Err(AllocationError::LaneFull { lane: lane.clone() }),
    }
}

/// Release the head slot held by a pallet; the rest of its lane shifts down.
///
/// # Errors
/// - `Invalid` when the code is not 8 digits
/// - `PalletNotFound` when no pallet carries the code
/// - `NotAssigned` when the pallet occupies no slot
/// - `NotAtHead` when the pallet sits behind position 1
pub async fn release_pallet(
    store: &dyn WarehouseStore,
    pallet_code: &str,
) -> Result<Confirmation, ReleaseError> {
    let code = PalletCode::parse(pallet_code)?;

    let pallet = store
        .pallet_find_by_code(&code)
        .await?
        .ok_or_else(|| ReleaseError::PalletNotFound { code: code.clone() })?;

    match store.slot_release(pallet.key).await? {
        ReleaseOutcome::Released(slot) => {
            tracing::info!(pallet = %code, slot = %slot, "Pallet released");
            Ok(Confirmation::released(code, slot))
        }
        ReleaseOutcome::NotAssigned => Err(ReleaseError::NotAssigned { code }),
        ReleaseOutcome::NotAtHead(slot) => Err(ReleaseError::NotAtHead { code, slot }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
