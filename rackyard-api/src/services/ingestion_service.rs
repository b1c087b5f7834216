//! Ingestion Service
//!
//! Registers pallets from scanned QR labels.

use rackyard_core::{qr, IngestError, Pallet, StorageError};
use rackyard_storage::WarehouseStore;

/// Decode a scanned label and insert the pallet it describes.
///
/// # Errors
/// - `EmptyPayload`, `MalformedPayload`, `InvalidDate`, `InvalidCode` when
///   the label does not decode
/// - `DuplicateCode` when a pallet with the same code already exists
pub async fn ingest_pallet(store: &dyn WarehouseStore, raw: &str) -> Result<Pallet, IngestError> {
    let record = qr::parse(raw)?;

    if store.pallet_find_by_code(&record.code).await?.is_some() {
        return Err(IngestError::DuplicateCode { code: record.code });
    }

    // A concurrent insert of the same code can still land between the check
    // and the write; the unique constraint reports it.
    let pallet = store
        .pallet_insert_from_qr(&record)
        .await
        .map_err(|err| match err {
            StorageError::UniqueViolation { .. } => IngestError::DuplicateCode {
                code: record.code.clone(),
            },
            other => IngestError::Storage(other),
        })?;

    tracing::info!(
        pallet = %pallet.code,
        variety = %pallet.variety,
        market = %pallet.market,
        "Pallet registered from QR"
    );
    Ok(pallet)
}
