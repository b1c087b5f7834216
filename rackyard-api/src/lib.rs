//! RACKYARD API - REST/WebSocket API Layer
//!
//! HTTP surface of the warehouse service: slot assignment and release, QR
//! pallet intake, occupancy grids, operator accounts, and a live occupancy
//! stream kept current by a background job.
//!
//! Slot mutations go through the PostgreSQL procedures that own lane
//! reorganization; `DbClient` wraps them in one transaction per operation.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod jobs;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod types;
pub mod validation;
pub mod ws;

// Re-export commonly used types
pub use auth::{
    authenticate, generate_jwt_token, validate_jwt_token, AuthConfig, AuthContext, Claims,
    FixedClock, JwtClock, JwtSecret, SystemClock,
};
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use jobs::{occupancy_refresh_task, LiveOccupancy, OccupancyRefreshConfig};
pub use middleware::{auth_middleware, AuthExtractor, AuthMiddlewareState};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use types::*;
