//! REST API Routes Module
//!
//! Route handlers grouped by resource:
//! - Account signup and login (public)
//! - Slot assignment, release, and option lists
//! - QR pallet ingestion
//! - Occupancy grids, filter options, and the live snapshot
//! - WebSocket stream of live snapshots
//! - Health check endpoints (Kubernetes-compatible)
//! - CORS support for the browser dashboard

pub mod account;
pub mod health;
pub mod occupancy;
pub mod pallets;
pub mod slots;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, request::Parts, HeaderValue, Method},
    middleware::from_fn_with_state,
    Router,
};
use rackyard_storage::SharedStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::jobs::LiveOccupancy;
use crate::middleware::{auth_middleware, AuthMiddlewareState};
use crate::ws;

pub use account::create_router as account_router;
pub use health::create_router as health_router;
pub use occupancy::create_router as occupancy_router;
pub use pallets::create_router as pallet_router;
pub use slots::create_router as slot_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> impl axum::response::IntoResponse {
    use utoipa::OpenApi;

    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

/// Validate API configuration for production use.
fn validate_api_config_for_production(config: &ApiConfig) -> ApiResult<()> {
    if config.cors_origins.is_empty() {
        return Err(ApiError::configuration(
            "CORS origins not configured for production. Set RACKYARD_CORS_ORIGINS.",
        ));
    }
    if config.cors_origins.iter().any(|origin| origin.contains('*')) {
        tracing::warn!(
            origins = ?config.cors_origins,
            "Wildcard CORS origin configured in production"
        );
    }
    Ok(())
}

// ============================================================================
// SECURE ROUTER BUILDER
// ============================================================================

/// Builder for the API router with auth on every `/api/v1` route except
/// signup and login.
///
/// Public routes (health, OpenAPI) are exempt from authentication.
pub struct SecureRouterBuilder {
    store: SharedStore,
    live: LiveOccupancy,
    api_config: ApiConfig,
    auth_config: Arc<AuthConfig>,
    auth_state: AuthMiddlewareState,
}

impl SecureRouterBuilder {
    /// Create a new SecureRouterBuilder.
    ///
    /// In production, an insecure JWT secret or a missing CORS allow-list is
    /// an error.
    pub fn new(
        store: SharedStore,
        live: LiveOccupancy,
        api_config: ApiConfig,
        auth_config: AuthConfig,
    ) -> ApiResult<Self> {
        let is_production = api_config.is_production();
        auth_config.validate_for_production(is_production)?;
        if is_production {
            validate_api_config_for_production(&api_config)?;
        }

        let auth_config = Arc::new(auth_config);
        let auth_state = AuthMiddlewareState::new(auth_config.clone());

        Ok(Self {
            store,
            live,
            api_config,
            auth_config,
            auth_state,
        })
    }

    /// Routes that require a bearer token.
    fn build_protected_routes(&self) -> Router {
        Router::new()
            .nest("/slots", slots::create_router(self.store.clone()))
            .nest("/pallets", pallets::create_router(self.store.clone()))
            .nest(
                "/occupancy",
                occupancy::create_router(self.store.clone(), self.live.clone()),
            )
            .nest("/ws", ws::create_router(self.live.clone()))
    }

    /// Build the complete router.
    ///
    /// # Middleware Order (outer to inner)
    /// 1. CORS (outermost) - handles preflight requests
    /// 2. Tracing - one span per request
    /// 3. Auth (innermost, only on protected /api/v1/* routes)
    pub fn build(self) -> Router {
        let protected = self
            .build_protected_routes()
            .layer(from_fn_with_state(self.auth_state.clone(), auth_middleware));

        let api_routes = protected.nest(
            "/auth",
            account::create_router(self.store.clone(), self.auth_config.clone()),
        );

        #[allow(unused_mut)]
        let mut router = Router::new()
            .nest("/api/v1", api_routes)
            .nest(
                "/health",
                health::create_router(self.store.clone(), self.live.clone()),
            );

        #[cfg(feature = "openapi")]
        {
            router = router.route("/openapi.json", axum::routing::get(openapi_json));
        }

        let cors = build_cors_layer(&self.api_config);

        router.layer(TraceLayer::new_for_http()).layer(cors)
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// Otherwise only the configured origins are allowed; `*.domain` entries
/// match any subdomain.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: allowing configured origins");
        let allowed = config.clone();
        let cors = cors.allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| allowed.is_origin_allowed(origin))
                    .unwrap_or(false)
            },
        ));

        if config.cors_allow_credentials {
            cors.allow_credentials(true)
        } else {
            cors
        }
    }
}

/// Create the complete API router.
///
/// - Account routes at /api/v1/auth/* (public)
/// - Slot, pallet, occupancy, and WebSocket routes under /api/v1/* (bearer token)
/// - Health checks at /health/* (public)
/// - OpenAPI spec at /openapi.json
pub fn create_api_router(
    store: SharedStore,
    live: LiveOccupancy,
    api_config: &ApiConfig,
    auth_config: AuthConfig,
) -> ApiResult<Router> {
    SecureRouterBuilder::new(store, live, api_config.clone(), auth_config)
        .map(SecureRouterBuilder::build)
}
