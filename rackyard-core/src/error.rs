//! Error types for RACKYARD operations

use thiserror::Error;

use crate::pallet::PalletCode;
use crate::slot::{LaneKey, SlotKey};

/// Coarse failure category shared by every operation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Pallet or code could not be resolved.
    NotFound,
    /// Already assigned, duplicate code, lane full, user exists.
    Conflict,
    /// Malformed QR field, wrong-length code or date, missing input.
    Validation,
    /// Release attempted off the head position or on an unassigned pallet.
    PreconditionFailed,
    /// Connection or driver failure.
    Storage,
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Query failed during {operation}: {reason}")]
    QueryFailed { operation: String, reason: String },

    #[error("Procedure {procedure} failed: {reason}")]
    ProcedureFailed { procedure: String, reason: String },

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Unexpected row shape in {operation}: {reason}")]
    RowMapping { operation: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Input validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid pallet code '{value}': {reason}")]
    InvalidPalletCode { value: String, reason: String },

    #[error("Invalid harvest date '{value}': must be exactly 8 digits")]
    InvalidHarvestDate { value: String },
}

/// Failures of the assign operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Pallet {code} does not exist")]
    PalletNotFound { code: PalletCode },

    #[error("Pallet {code} is already assigned to slot {slot}")]
    AlreadyAssigned { code: PalletCode, slot: SlotKey },

    #[error("No free slot left in lane {lane}")]
    LaneFull { lane: LaneKey },

    #[error("Failed to assign slot: {0}")]
    Storage(#[from] StorageError),
}

impl AllocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AllocationError::Invalid(_) => ErrorKind::Validation,
            AllocationError::PalletNotFound { .. } => ErrorKind::NotFound,
            AllocationError::AlreadyAssigned { .. } | AllocationError::LaneFull { .. } => {
                ErrorKind::Conflict
            }
            AllocationError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Failures of the release operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Pallet {code} does not exist")]
    PalletNotFound { code: PalletCode },

    #[error("Pallet {code} is not assigned to any slot")]
    NotAssigned { code: PalletCode },

    #[error("Pallet {code} sits at slot {slot}; only position 1 can be released")]
    NotAtHead { code: PalletCode, slot: SlotKey },

    #[error("Failed to release slot: {0}")]
    Storage(#[from] StorageError),
}

impl ReleaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::Invalid(_) => ErrorKind::Validation,
            ReleaseError::PalletNotFound { .. } => ErrorKind::NotFound,
            ReleaseError::NotAssigned { .. } | ReleaseError::NotAtHead { .. } => {
                ErrorKind::PreconditionFailed
            }
            ReleaseError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Failures of QR ingestion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("QR payload is empty")]
    EmptyPayload,

    #[error("QR payload must have 5 comma-separated fields, found {fields}")]
    MalformedPayload { fields: usize },

    #[error("Harvest date must be exactly 8 digits, got '{value}'")]
    InvalidDate { value: String },

    #[error("Pallet code must be exactly 8 characters, got '{value}'")]
    InvalidCode { value: String },

    #[error("Pallet code {code} already exists")]
    DuplicateCode { code: PalletCode },

    #[error("Failed to ingest pallet: {0}")]
    Storage(#[from] StorageError),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::EmptyPayload
            | IngestError::MalformedPayload { .. }
            | IngestError::InvalidDate { .. }
            | IngestError::InvalidCode { .. } => ErrorKind::Validation,
            IngestError::DuplicateCode { .. } => ErrorKind::Conflict,
            IngestError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Failures of user signup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CreateUserError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("User '{username}' already exists")]
    AlreadyExists { username: String },

    #[error("Failed to create user: {0}")]
    Storage(#[from] StorageError),
}

impl CreateUserError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CreateUserError::Invalid(_) => ErrorKind::Validation,
            CreateUserError::AlreadyExists { .. } => ErrorKind::Conflict,
            CreateUserError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> PalletCode {
        PalletCode::from_stored("12345678")
    }

    #[test]
    fn test_already_assigned_names_current_slot() {
        let err = AllocationError::AlreadyAssigned {
            code: code(),
            slot: LaneKey::new("COLD", 1, 4, "A").slot(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("12345678"));
        assert!(msg.contains("COLD-1-4-A-2"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_release_error_kinds() {
        assert_eq!(
            ReleaseError::NotAssigned { code: code() }.kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(
            ReleaseError::PalletNotFound { code: code() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ReleaseError::from(StorageError::LockPoisoned).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_ingest_error_kinds() {
        assert_eq!(IngestError::EmptyPayload.kind(), ErrorKind::Validation);
        assert_eq!(
            IngestError::MalformedPayload { fields: 3 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            IngestError::DuplicateCode { code: code() }.kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_storage_error_display_keeps_context() {
        let err = StorageError::ProcedureFailed {
            procedure: "retirar_pallet".to_string(),
            reason: "deadlock detected".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("retirar_pallet"));
        assert!(msg.contains("deadlock detected"));
    }

    #[test]
    fn test_create_user_from_validation() {
        let err = CreateUserError::from(ValidationError::RequiredFieldMissing {
            field: "username".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("username"));
    }
}
