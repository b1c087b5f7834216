//! Error Types for RACKYARD API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - Conversions from the domain errors in rackyard-core
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rackyard_core::{
    AllocationError, CreateUserError, IngestError, ReleaseError, StorageError, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Username and password do not match a stored user
    InvalidCredentials,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Required field is missing from request
    MissingField,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// No pallet carries the given code
    PalletNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Pallet already occupies a slot
    PalletAlreadyAssigned,

    /// Requested lane has no free slot
    LaneFull,

    /// Pallet code is already registered
    DuplicatePalletCode,

    /// Username is already taken
    UserAlreadyExists,

    // ========================================================================
    // Precondition Errors (412)
    // ========================================================================
    /// Pallet does not occupy any slot
    PalletNotAssigned,

    /// Pallet is not at the head position of its lane
    PalletNotAtHead,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Required configuration is missing or invalid
    ConfigurationError,

    /// Database operation failed
    DatabaseError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// No live occupancy snapshot has been computed yet
    SnapshotUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Authentication errors
            ErrorCode::Unauthorized
            | ErrorCode::InvalidCredentials
            | ErrorCode::InvalidToken
            | ErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,

            // Validation errors
            ErrorCode::ValidationFailed
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            // Not found errors
            ErrorCode::PalletNotFound => StatusCode::NOT_FOUND,

            // Conflict errors
            ErrorCode::PalletAlreadyAssigned
            | ErrorCode::LaneFull
            | ErrorCode::DuplicatePalletCode
            | ErrorCode::UserAlreadyExists => StatusCode::CONFLICT,

            // Precondition errors
            ErrorCode::PalletNotAssigned | ErrorCode::PalletNotAtHead => {
                StatusCode::PRECONDITION_FAILED
            }

            // Server errors
            ErrorCode::ServiceUnavailable | ErrorCode::SnapshotUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::InternalError | ErrorCode::ConfigurationError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            // Authentication
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",

            // Validation
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format",

            // Not Found
            ErrorCode::PalletNotFound => "Pallet not found",

            // Conflict
            ErrorCode::PalletAlreadyAssigned => "Pallet is already assigned to a slot",
            ErrorCode::LaneFull => "No free slot left in the lane",
            ErrorCode::DuplicatePalletCode => "Pallet code already exists",
            ErrorCode::UserAlreadyExists => "User already exists",

            // Precondition
            ErrorCode::PalletNotAssigned => "Pallet is not assigned to any slot",
            ErrorCode::PalletNotAtHead => "Only the pallet at position 1 can be released",

            // Server
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ConfigurationError => "Server configuration error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::SnapshotUnavailable => "Occupancy snapshot not yet available",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, current slot, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_credentials() -> Self {
        Self::from_code(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ConfigurationError naming the offending setting.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn snapshot_unavailable() -> Self {
        Self::from_code(ErrorCode::SnapshotUnavailable)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
///
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::unauthorized("Invalid credentials"))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Log the full error; only a generic message reaches the client.
        tracing::error!(error = %err, "Storage error");

        match err {
            StorageError::ConnectionFailed { .. } => {
                ApiError::service_unavailable("Database is unreachable")
            }
            StorageError::LockPoisoned => ApiError::internal_error("Storage is unavailable"),
            StorageError::UniqueViolation { constraint } => {
                ApiError::from_code(ErrorCode::DatabaseError)
                    .with_details(serde_json::json!({ "constraint": constraint }))
            }
            StorageError::QueryFailed { .. }
            | StorageError::ProcedureFailed { .. }
            | StorageError::RowMapping { .. } => ApiError::from_code(ErrorCode::DatabaseError),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::RequiredFieldMissing { .. } => ErrorCode::MissingField,
            ValidationError::InvalidPalletCode { .. }
            | ValidationError::InvalidHarvestDate { .. } => ErrorCode::InvalidFormat,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        let message = err.to_string();
        match err {
            AllocationError::Invalid(inner) => inner.into(),
            AllocationError::PalletNotFound { .. } => {
                ApiError::new(ErrorCode::PalletNotFound, message)
            }
            AllocationError::AlreadyAssigned { slot, .. } => {
                ApiError::new(ErrorCode::PalletAlreadyAssigned, message)
                    .with_details(serde_json::json!({ "slot": slot }))
            }
            AllocationError::LaneFull { lane } => ApiError::new(ErrorCode::LaneFull, message)
                .with_details(serde_json::json!({ "lane": lane })),
            AllocationError::Storage(inner) => inner.into(),
        }
    }
}

impl From<ReleaseError> for ApiError {
    fn from(err: ReleaseError) -> Self {
        let message = err.to_string();
        match err {
            ReleaseError::Invalid(inner) => inner.into(),
            ReleaseError::PalletNotFound { .. } => ApiError::new(ErrorCode::PalletNotFound, message),
            ReleaseError::NotAssigned { .. } => {
                ApiError::new(ErrorCode::PalletNotAssigned, message)
            }
            ReleaseError::NotAtHead { slot, .. } => {
                ApiError::new(ErrorCode::PalletNotAtHead, message)
                    .with_details(serde_json::json!({ "slot": slot }))
            }
            ReleaseError::Storage(inner) => inner.into(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        let message = err.to_string();
        match err {
            IngestError::EmptyPayload => ApiError::new(ErrorCode::MissingField, message),
            IngestError::MalformedPayload { .. } => {
                ApiError::new(ErrorCode::ValidationFailed, message)
            }
            IngestError::InvalidDate { .. } | IngestError::InvalidCode { .. } => {
                ApiError::new(ErrorCode::InvalidFormat, message)
            }
            IngestError::DuplicateCode { .. } => {
                ApiError::new(ErrorCode::DuplicatePalletCode, message)
            }
            IngestError::Storage(inner) => inner.into(),
        }
    }
}

impl From<CreateUserError> for ApiError {
    fn from(err: CreateUserError) -> Self {
        let message = err.to_string();
        match err {
            CreateUserError::Invalid(inner) => inner.into(),
            CreateUserError::AlreadyExists { .. } => {
                ApiError::new(ErrorCode::UserAlreadyExists, message)
            }
            CreateUserError::Storage(inner) => inner.into(),
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
