//! Pallet identity and attribute types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::identity::PalletKey;

/// Required length of a pallet code (`NPallet`).
pub const PALLET_CODE_LEN: usize = 8;

/// Required length of a harvest date (`YYYYMMDD`).
pub const HARVEST_DATE_LEN: usize = 8;

/// External pallet code (`NPallet`).
///
/// Two validation rules exist on purpose: codes typed into the slot forms
/// must be eight digits ([`PalletCode::parse`]), while codes read from a QR
/// scan only need eight characters ([`PalletCode::parse_scanned`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct PalletCode(String);

impl PalletCode {
    /// Parse a code entered for assignment or release: exactly 8 ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() != PALLET_CODE_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidPalletCode {
                value: raw.to_string(),
                reason: format!("must be exactly {} digits", PALLET_CODE_LEN),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse a code read from a QR payload: exactly 8 characters, any kind.
    pub fn parse_scanned(raw: &str) -> Result<Self, ValidationError> {
        if raw.chars().count() != PALLET_CODE_LEN {
            return Err(ValidationError::InvalidPalletCode {
                value: raw.to_string(),
                reason: format!("must be exactly {} characters", PALLET_CODE_LEN),
            });
        }
        Ok(Self(raw.to_string()))
    }

    /// Wrap a code read back from storage without re-validating it.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PalletCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Harvest date kept as the 8-digit string the labels carry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct HarvestDate(String);

impl HarvestDate {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.chars().count() != HARVEST_DATE_LEN || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidHarvestDate {
                value: raw.to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HarvestDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attributes decoded from a QR label, before the pallet has a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PalletRecord {
    pub variety: String,
    pub description: String,
    pub market: String,
    pub harvest_date: HarvestDate,
    pub code: PalletCode,
}

impl PalletRecord {
    /// Canonical comma-joined form handed to `InsertPalletFromQR`.
    pub fn to_qr_payload(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.variety, self.description, self.market, self.harvest_date, self.code
        )
    }
}

/// A stored pallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Pallet {
    pub key: PalletKey,
    pub code: PalletCode,
    pub description: String,
    pub variety: String,
    pub market: String,
    pub harvest_date: HarvestDate,
}

impl Pallet {
    pub fn from_record(key: PalletKey, record: PalletRecord) -> Self {
        Self {
            key,
            code: record.code,
            description: record.description,
            variety: record.variety,
            market: record.market,
            harvest_date: record.harvest_date,
        }
    }
}
