//! Slot REST API Routes
//!
//! Assign and release pallets, and the option lists that drive the
//! assignment form. Assign and release answer with an [`ActionOutcome`]
//! carrying the refreshed free-slot options, whether the action succeeded
//! or was rejected.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rackyard_core::{ErrorKind, SlotOptions, SlotSelection};
use rackyard_storage::{SharedStore, WarehouseStore};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    services,
    types::{ActionOutcome, AssignSlotRequest, ReleaseSlotRequest},
};

// ============================================================================
// SHARED STATE
// ============================================================================

#[derive(Clone)]
pub struct SlotState {
    pub store: SharedStore,
}

impl SlotState {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

/// Free-slot options with no selection applied.
pub(crate) async fn refreshed_options(store: &dyn WarehouseStore) -> ApiResult<SlotOptions> {
    Ok(store
        .slot_available_options(&SlotSelection::default())
        .await?)
}

/// Turn a rejected action into an outcome. Storage failures stay plain
/// errors since the options cannot be read either.
pub(crate) async fn rejected(
    store: &dyn WarehouseStore,
    kind: ErrorKind,
    error: ApiError,
) -> ApiResult<ActionOutcome> {
    if kind == ErrorKind::Storage {
        return Err(error);
    }
    Ok(ActionOutcome::failed(error, refreshed_options(store).await?))
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/slots/assign - Place a pallet in the lowest free slot of a lane
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/slots/assign",
    tag = "Slots",
    request_body = AssignSlotRequest,
    responses(
        (status = 200, description = "Pallet assigned", body = ActionOutcome),
        (status = 400, description = "Invalid pallet code or lane", body = ActionOutcome),
        (status = 404, description = "Pallet not found", body = ActionOutcome),
        (status = 409, description = "Already assigned or lane full", body = ActionOutcome),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn assign_slot(
    State(state): State<Arc<SlotState>>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<AssignSlotRequest>,
) -> ApiResult<impl IntoResponse> {
    let store = state.store.as_ref();
    let lane = req.lane();

    match services::assign_pallet(store, &req.pallet_code, &lane).await {
        Ok(confirmation) => {
            tracing::debug!(username = %auth.username, slot = %confirmation.slot, "Assign confirmed");
            Ok(ActionOutcome::confirmed(
                confirmation,
                refreshed_options(store).await?,
            ))
        }
        Err(err) => {
            tracing::info!(
                username = %auth.username,
                pallet = %req.pallet_code,
                lane = %lane,
                error = %err,
                "Assign rejected"
            );
            rejected(store, err.kind(), err.into()).await
        }
    }
}

/// POST /api/v1/slots/release - Release the head slot held by a pallet
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/slots/release",
    tag = "Slots",
    request_body = ReleaseSlotRequest,
    responses(
        (status = 200, description = "Pallet released", body = ActionOutcome),
        (status = 400, description = "Invalid pallet code", body = ActionOutcome),
        (status = 404, description = "Pallet not found", body = ActionOutcome),
        (status = 412, description = "Not assigned or not at position 1", body = ActionOutcome),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn release_slot(
    State(state): State<Arc<SlotState>>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<ReleaseSlotRequest>,
) -> ApiResult<impl IntoResponse> {
    let store = state.store.as_ref();

    match services::release_pallet(store, &req.pallet_code).await {
        Ok(confirmation) => {
            tracing::debug!(username = %auth.username, slot = %confirmation.slot, "Release confirmed");
            Ok(ActionOutcome::confirmed(
                confirmation,
                refreshed_options(store).await?,
            ))
        }
        Err(err) => {
            tracing::info!(
                username = %auth.username,
                pallet = %req.pallet_code,
                error = %err,
                "Release rejected"
            );
            rejected(store, err.kind(), err.into()).await
        }
    }
}

/// GET /api/v1/slots/options - Distinct values over all slots
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/slots/options",
    tag = "Slots",
    responses(
        (status = 200, description = "Slot field options", body = SlotOptions),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn field_options(
    State(state): State<Arc<SlotState>>,
    AuthExtractor(_auth): AuthExtractor,
) -> ApiResult<impl IntoResponse> {
    let options = state.store.slot_field_options().await?;
    Ok(Json(options))
}

/// GET /api/v1/slots/available - Distinct values over free slots matching a
/// partial selection
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/slots/available",
    tag = "Slots",
    params(SlotSelection),
    responses(
        (status = 200, description = "Free slot options", body = SlotOptions),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn available_options(
    State(state): State<Arc<SlotState>>,
    AuthExtractor(_auth): AuthExtractor,
    Query(selection): Query<SlotSelection>,
) -> ApiResult<impl IntoResponse> {
    let options = state.store.slot_available_options(&selection).await?;
    Ok(Json(options))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the slot routes router.
pub fn create_router(store: SharedStore) -> Router {
    let state = Arc::new(SlotState::new(store));

    Router::new()
        .route("/assign", post(assign_slot))
        .route("/release", post(release_slot))
        .route("/options", get(field_options))
        .route("/available", get(available_options))
        .with_state(state)
}
