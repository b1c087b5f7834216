//! QR label decoding.
//!
//! Labels carry five comma-separated fields in a fixed order:
//! `variety,description,market,harvest_date,pallet_code`.

use crate::error::IngestError;
use crate::pallet::{HarvestDate, PalletCode, PalletRecord};

/// Number of fields a label must carry.
pub const QR_FIELD_COUNT: usize = 5;

/// Decode a scanned QR payload into a pallet record.
///
/// Only the scanner's trailing line terminators are stripped; fields are
/// taken verbatim, spaces included.
pub fn parse(raw: &str) -> Result<PalletRecord, IngestError> {
    let payload = raw.trim_end_matches(['\r', '\n']);
    if payload.trim().is_empty() {
        return Err(IngestError::EmptyPayload);
    }

    let fields: Vec<&str> = payload.split(',').collect();
    let [variety, description, market, harvest_date, code] = fields[..] else {
        return Err(IngestError::MalformedPayload {
            fields: fields.len(),
        });
    };

    let harvest_date = HarvestDate::parse(harvest_date).map_err(|_| IngestError::InvalidDate {
        value: harvest_date.to_string(),
    })?;
    let code = PalletCode::parse_scanned(code).map_err(|_| IngestError::InvalidCode {
        value: code.to_string(),
    })?;

    Ok(PalletRecord {
        variety: variety.to_string(),
        description: description.to_string(),
        market: market.to_string(),
        harvest_date,
        code,
    })
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
