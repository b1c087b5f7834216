//! Pallet REST API Routes
//!
//! QR ingestion. The scanner's raw text is posted as-is; decoding happens
//! server side.

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use rackyard_storage::SharedStore;
use std::sync::Arc;

use crate::{
    error::ApiResult,
    middleware::AuthExtractor,
    routes::slots::{refreshed_options, rejected},
    services,
    types::{ActionOutcome, IngestPalletRequest},
};

#[derive(Clone)]
pub struct PalletState {
    pub store: SharedStore,
}

impl PalletState {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

/// POST /api/v1/pallets/ingest - Register a pallet from a scanned QR label
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/pallets/ingest",
    tag = "Pallets",
    request_body = IngestPalletRequest,
    responses(
        (status = 201, description = "Pallet registered", body = ActionOutcome),
        (status = 400, description = "Label did not decode", body = ActionOutcome),
        (status = 409, description = "Pallet code already exists", body = ActionOutcome),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn ingest_pallet(
    State(state): State<Arc<PalletState>>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<IngestPalletRequest>,
) -> ApiResult<impl IntoResponse> {
    let store = state.store.as_ref();

    match services::ingest_pallet(store, &req.payload).await {
        Ok(pallet) => Ok(ActionOutcome::ingested(
            pallet,
            refreshed_options(store).await?,
        )),
        Err(err) => {
            tracing::info!(username = %auth.username, error = %err, "QR ingestion rejected");
            rejected(store, err.kind(), err.into()).await
        }
    }
}

/// Create the pallet routes router.
pub fn create_router(store: SharedStore) -> Router {
    let state = Arc::new(PalletState::new(store));

    Router::new()
        .route("/ingest", post(ingest_pallet))
        .with_state(state)
}
