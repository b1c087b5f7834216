//! API Request and Response Types
//!
//! This module defines all request and response bodies of the RACKYARD API.
//! Domain values (slot keys, pallets, grids) come straight from
//! `rackyard-core`.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use rackyard_core::{Confirmation, LaneKey, OccupancyFilter, Pallet, SlotOptions};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCode};
use crate::validation::split_list;

// ============================================================================
// AUTH TYPES
// ============================================================================

/// Request to create an operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Request to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Bearer token issued on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Confirmation that an account was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SignupResponse {
    pub username: String,
    pub message: String,
}

// ============================================================================
// SLOT TYPES
// ============================================================================

/// Request to place a pallet in a lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignSlotRequest {
    /// 8-digit pallet code
    pub pallet_code: String,
    pub warehouse_type: String,
    pub floor: i32,
    pub rack: i32,
    pub letter: String,
}

impl AssignSlotRequest {
    pub fn lane(&self) -> LaneKey {
        LaneKey::new(
            self.warehouse_type.trim(),
            self.floor,
            self.rack,
            self.letter.trim(),
        )
    }
}

/// Request to release the head slot held by a pallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReleaseSlotRequest {
    /// 8-digit pallet code
    pub pallet_code: String,
}

// ============================================================================
// PALLET TYPES
// ============================================================================

/// Raw text produced by the QR scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IngestPalletRequest {
    /// `variety,description,market,harvest_date,pallet_code`
    pub payload: String,
}

// ============================================================================
// ACTION OUTCOME
// ============================================================================

/// Color class of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Danger,
}

/// Answer to a slot action or an ingestion.
///
/// Carries the operator-facing status message, its color class, and the
/// available slot options refreshed after the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ActionOutcome {
    pub message: String,
    pub severity: Severity,
    /// Error code when `severity` is `danger`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pallet: Option<Pallet>,
    pub options: SlotOptions,
    #[serde(skip)]
    status: StatusCode,
}

impl ActionOutcome {
    /// Outcome of a committed slot mutation.
    pub fn confirmed(confirmation: Confirmation, options: SlotOptions) -> Self {
        Self {
            message: confirmation.to_string(),
            severity: Severity::Success,
            code: None,
            confirmation: Some(confirmation),
            pallet: None,
            options,
            status: StatusCode::OK,
        }
    }

    /// Outcome of a successful ingestion.
    pub fn ingested(pallet: Pallet, options: SlotOptions) -> Self {
        Self {
            message: format!("Pallet {} registered", pallet.code),
            severity: Severity::Success,
            code: None,
            confirmation: None,
            pallet: Some(pallet),
            options,
            status: StatusCode::CREATED,
        }
    }

    /// Outcome of a rejected action.
    pub fn failed(error: ApiError, options: SlotOptions) -> Self {
        Self {
            status: error.status_code(),
            message: error.message,
            severity: Severity::Danger,
            code: Some(error.code),
            confirmation: None,
            pallet: None,
            options,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

// ============================================================================
// OCCUPANCY TYPES
// ============================================================================

/// Occupancy filter as query parameters; each axis is a comma-separated
/// list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct OccupancyQuery {
    pub codes: Option<String>,
    pub varieties: Option<String>,
    pub markets: Option<String>,
    pub harvest_dates: Option<String>,
}

impl OccupancyQuery {
    pub fn to_filter(&self) -> OccupancyFilter {
        OccupancyFilter {
            codes: split_list(self.codes.as_deref()).collect(),
            varieties: split_list(self.varieties.as_deref()).collect(),
            markets: split_list(self.markets.as_deref()).collect(),
            harvest_dates: split_list(self.harvest_dates.as_deref()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackyard_core::PalletCode;

    #[test]
    fn test_query_to_filter() {
        let query = OccupancyQuery {
            codes: Some("12345678, 87654321".to_string()),
            markets: Some("".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter();
        assert_eq!(filter.codes.len(), 2);
        assert!(filter.codes.contains("87654321"));
        assert!(filter.markets.is_empty());
        assert!(OccupancyQuery::default().to_filter().is_empty());
    }

    #[test]
    fn test_assign_request_lane_trims_text() {
        let req = AssignSlotRequest {
            pallet_code: "12345678".to_string(),
            warehouse_type: " COLD ".to_string(),
            floor: 1,
            rack: 4,
            letter: "A ".to_string(),
        };
        assert_eq!(req.lane(), LaneKey::new("COLD", 1, 4, "A"));
    }

    #[test]
    fn test_outcome_wire_shape() {
        let confirmation = Confirmation::assigned(
            PalletCode::from_stored("12345678"),
            LaneKey::new("COLD", 1, 4, "A").slot(1),
        );
        let outcome = ActionOutcome::confirmed(confirmation, SlotOptions::default());
        assert_eq!(outcome.status(), StatusCode::OK);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["severity"], "success");
        assert_eq!(json["message"], "Pallet 12345678 assigned to slot COLD-1-4-A-1");
        assert!(json.get("code").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_failed_outcome_carries_status_and_code() {
        let outcome = ActionOutcome::failed(
            ApiError::from_code(ErrorCode::LaneFull),
            SlotOptions::default(),
        );
        assert_eq!(outcome.status(), StatusCode::CONFLICT);
        assert_eq!(outcome.severity, Severity::Danger);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["code"], "LANE_FULL");
        assert_eq!(json["severity"], "danger");
    }
}
