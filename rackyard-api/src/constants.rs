//! Constants for RACKYARD API
//!
//! This module contains all constant values used throughout the API.
//! Centralizing constants makes them easy to find, modify, and test.

// ============================================================================
// AUTHENTICATION
// ============================================================================

/// Default JWT token expiration time in seconds (1 hour)
pub const DEFAULT_JWT_EXPIRATION_SECS: i64 = 3600;

/// Default leeway applied to `exp`/`nbf` checks
pub const DEFAULT_JWT_CLOCK_SKEW_SECS: u64 = 60;

/// Minimum required length for JWT secret keys
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Placeholder secret used when none is configured; rejected in production
pub const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

// ============================================================================
// DATABASE
// ============================================================================

/// Default PostgreSQL port
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default maximum pool size
pub const DEFAULT_DB_POOL_SIZE: usize = 16;

/// Default wait for a pooled connection, in seconds
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// LIVE OCCUPANCY
// ============================================================================

/// Default interval between occupancy refreshes, in milliseconds
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2000;

/// Lower bound on the refresh interval, in milliseconds
pub const MIN_REFRESH_INTERVAL_MS: u64 = 100;
