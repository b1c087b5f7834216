//! Account REST API Routes
//!
//! Signup and login. These routes are public; login issues the bearer token
//! every other `/api/v1` route requires.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use rackyard_storage::SharedStore;
use std::sync::Arc;

use crate::{
    auth::{generate_jwt_token, AuthConfig},
    error::{ApiError, ApiResult},
    services,
    types::{LoginRequest, SignupRequest, SignupResponse, TokenResponse},
    validation::ValidateNonEmpty,
};

// ============================================================================
// SHARED STATE
// ============================================================================

#[derive(Clone)]
pub struct AccountState {
    pub store: SharedStore,
    pub auth_config: Arc<AuthConfig>,
}

impl AccountState {
    pub fn new(store: SharedStore, auth_config: Arc<AuthConfig>) -> Self {
        Self { store, auth_config }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/auth/signup - Create an operator account
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Missing username or password", body = ApiError),
        (status = 409, description = "Username taken", body = ApiError),
    ),
))]
pub async fn signup(
    State(state): State<Arc<AccountState>>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    services::create_user(state.store.as_ref(), &req.username, &req.password).await?;

    let response = SignupResponse {
        message: format!("User {} created", req.username),
        username: req.username,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login - Exchange credentials for a bearer token
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Missing username or password", body = ApiError),
        (status = 401, description = "Invalid username or password", body = ApiError),
    ),
))]
pub async fn login(
    State(state): State<Arc<AccountState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.username.validate_non_empty("username")?;
    req.password.validate_non_empty("password")?;

    let verified = services::verify_user(state.store.as_ref(), &req.username, &req.password).await?;
    if !verified {
        tracing::info!(username = %req.username, "Login rejected");
        return Err(ApiError::invalid_credentials());
    }

    let access_token = generate_jwt_token(&state.auth_config, &req.username)?;
    tracing::info!(username = %req.username, "Login succeeded");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth_config.jwt_expiration_secs,
    }))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the account routes router.
pub fn create_router(store: SharedStore, auth_config: Arc<AuthConfig>) -> Router {
    let state = Arc::new(AccountState::new(store, auth_config));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .with_state(state)
}
