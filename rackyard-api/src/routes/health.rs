//! Health Check Endpoints
//!
//! - `/health/ping` answers `pong`
//! - `/health/live` answers while the process serves requests
//! - `/health/ready` probes the store and reports the age of the live
//!   occupancy snapshot
//!
//! None of these require a token.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use rackyard_core::Timestamp;
use rackyard_storage::SharedStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::jobs::LiveOccupancy;

/// Outcome of the store probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum StoreProbe {
    Up,
    Down,
}

/// Body of `/health/ready`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadinessReport {
    pub store: StoreProbe,
    /// When the refresh job last published; absent before its first tick
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub live_snapshot_at: Option<Timestamp>,
}

#[derive(Clone)]
pub struct HealthState {
    pub store: SharedStore,
    pub live: LiveOccupancy,
}

/// GET /health/ping
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses((status = 200, description = "Service is responding", body = String)),
))]
pub async fn ping() -> impl IntoResponse {
    "pong"
}

/// GET /health/live
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Process is alive", body = String)),
))]
pub async fn liveness() -> impl IntoResponse {
    "alive"
}

/// GET /health/ready - 503 while the store is unreachable
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = ReadinessReport),
        (status = 503, description = "Store unreachable", body = ReadinessReport),
    ),
))]
pub async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let store = match state.store.health_check().await {
        Ok(()) => StoreProbe::Up,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            StoreProbe::Down
        }
    };
    let report = ReadinessReport {
        store,
        live_snapshot_at: state.live.latest().map(|snapshot| snapshot.generated_at),
    };

    let status = match store {
        StoreProbe::Up => StatusCode::OK,
        StoreProbe::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}

/// Health routes, nested under `/health`.
pub fn create_router(store: SharedStore, live: LiveOccupancy) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(Arc::new(HealthState { store, live }))
}
