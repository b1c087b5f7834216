//! Occupancy REST API Routes
//!
//! - `GET /` reads every slot and projects the rack grids, classifying
//!   occupied cells against the query filter
//! - `GET /filters` lists the values the filter can select
//! - `GET /live` returns the snapshot kept current by the refresh job

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rackyard_core::{FilterOptions, OccupancySnapshot};
use rackyard_storage::SharedStore;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    jobs::LiveOccupancy,
    middleware::AuthExtractor,
    services,
    types::OccupancyQuery,
};

#[derive(Clone)]
pub struct OccupancyState {
    pub store: SharedStore,
    pub live: LiveOccupancy,
}

impl OccupancyState {
    pub fn new(store: SharedStore, live: LiveOccupancy) -> Self {
        Self { store, live }
    }
}

/// GET /api/v1/occupancy - Fresh rack grids
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/occupancy",
    tag = "Occupancy",
    params(OccupancyQuery),
    responses(
        (status = 200, description = "Rack grids and utilization", body = OccupancySnapshot),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_occupancy(
    State(state): State<Arc<OccupancyState>>,
    AuthExtractor(_auth): AuthExtractor,
    Query(query): Query<OccupancyQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = query.to_filter();
    let snapshot =
        services::load_snapshot(state.store.as_ref(), &filter, chrono::Utc::now()).await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/occupancy/filters - Values offered by the occupancy filter
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/occupancy/filters",
    tag = "Occupancy",
    responses(
        (status = 200, description = "Filter options over occupied slots", body = FilterOptions),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_filter_options(
    State(state): State<Arc<OccupancyState>>,
    AuthExtractor(_auth): AuthExtractor,
) -> ApiResult<impl IntoResponse> {
    let options: FilterOptions = services::load_filter_options(state.store.as_ref()).await?;
    Ok(Json(options))
}

/// GET /api/v1/occupancy/live - Latest snapshot from the refresh job
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/occupancy/live",
    tag = "Occupancy",
    responses(
        (status = 200, description = "Latest live snapshot", body = OccupancySnapshot),
        (status = 503, description = "No snapshot published yet", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_live_occupancy(
    State(state): State<Arc<OccupancyState>>,
    AuthExtractor(_auth): AuthExtractor,
) -> ApiResult<impl IntoResponse> {
    let snapshot = state
        .live
        .latest()
        .ok_or_else(ApiError::snapshot_unavailable)?;
    Ok(Json(OccupancySnapshot::clone(&snapshot)))
}

/// Create the occupancy routes router.
pub fn create_router(store: SharedStore, live: LiveOccupancy) -> Router {
    let state = Arc::new(OccupancyState::new(store, live));

    Router::new()
        .route("/", get(get_occupancy))
        .route("/filters", get(get_filter_options))
        .route("/live", get(get_live_occupancy))
        .with_state(state)
}
