//! OpenAPI Specification for RACKYARD API
//!
//! This module defines the OpenAPI document for the RACKYARD REST API.
//! It uses utoipa to generate the OpenAPI specification from Rust types
//! and route annotations.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ReadinessReport, StoreProbe};
use crate::routes::{account, health, occupancy, pallets, slots};
use crate::types::*;

use rackyard_core::{
    CellClass, Confirmation, FilterOptions, GridCell, GridRow, HarvestDate, LaneKey,
    OccupancySnapshot, Pallet, PalletCode, RackGrid, SlotAction, SlotKey, SlotOptions,
    SlotSelection,
};

/// OpenAPI document for RACKYARD API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RACKYARD API",
        version = "0.1.0",
        description = "Warehouse rack occupancy, pallet slotting, and QR intake",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Auth", description = "Operator signup and login"),
        (name = "Slots", description = "Pallet assignment and release"),
        (name = "Pallets", description = "QR label ingestion"),
        (name = "Occupancy", description = "Rack grids, filters, and the live snapshot"),
        (name = "Health", description = "Liveness and readiness")
    ),
    paths(
        // === Account Routes ===
        account::signup,
        account::login,

        // === Slot Routes ===
        slots::assign_slot,
        slots::release_slot,
        slots::field_options,
        slots::available_options,

        // === Pallet Routes ===
        pallets::ingest_pallet,

        // === Occupancy Routes ===
        occupancy::get_occupancy,
        occupancy::get_filter_options,
        occupancy::get_live_occupancy,

        // === Health Routes ===
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Request / Response Types ===
            SignupRequest, SignupResponse, LoginRequest, TokenResponse,
            AssignSlotRequest, ReleaseSlotRequest, IngestPalletRequest,
            ActionOutcome, Severity,

            // === Domain Types (from rackyard-core) ===
            PalletCode, HarvestDate, Pallet, LaneKey, SlotKey, SlotSelection, SlotOptions,
            SlotAction, Confirmation, CellClass, GridCell, GridRow, RackGrid,
            OccupancySnapshot, FilterOptions,

            // === Health Types ===
            ReadinessReport, StoreProbe
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier for OpenAPI document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}
