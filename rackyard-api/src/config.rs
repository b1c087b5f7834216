//! API Configuration Module
//!
//! This module provides configuration for the listener, CORS, and the live
//! occupancy refresh. Configuration is loaded from environment variables with
//! sensible defaults for development.

use std::net::SocketAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_PORT, DEFAULT_REFRESH_INTERVAL_MS,
    MIN_REFRESH_INTERVAL_MS,
};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for the listener, CORS, and production hardening.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Listener Configuration
    // ========================================================================
    /// Host or IP to bind.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    /// Example: "https://yard.example.com,https://ops.example.com"
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Live Occupancy
    // ========================================================================
    /// Interval between live occupancy refreshes.
    pub refresh_interval: Duration,

    /// Deployment environment name ("development", "production", ...).
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,

            // CORS defaults: permissive for development
            cors_origins: Vec::new(), // Empty = allow all
            cors_allow_credentials: false,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,

            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `RACKYARD_API_BIND`: Host to bind (default: 0.0.0.0)
    /// - `PORT` / `RACKYARD_API_PORT`: Port to listen on (default: 3000)
    /// - `RACKYARD_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `RACKYARD_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `RACKYARD_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `RACKYARD_REFRESH_INTERVAL_MS`: Live refresh period (default: 2000)
    /// - `RACKYARD_ENVIRONMENT`: "production" enables strict checks
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let bind_host = std::env::var("RACKYARD_API_BIND")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT").or_else(|_| std::env::var("RACKYARD_API_PORT")) {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ApiError::configuration(format!("Invalid port '{}': expected 0-65535", raw))
            })?,
            Err(_) => defaults.port,
        };

        let cors_origins = std::env::var("RACKYARD_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("RACKYARD_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("RACKYARD_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let refresh_interval = std::env::var("RACKYARD_REFRESH_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|ms| Duration::from_millis(ms.max(MIN_REFRESH_INTERVAL_MS)))
            .unwrap_or(defaults.refresh_interval);

        let environment = std::env::var("RACKYARD_ENVIRONMENT")
            .ok()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.environment);

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            refresh_interval,
            environment,
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    /// Resolve the listening socket address.
    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        format!("{}:{}", self.bind_host, self.port)
            .parse()
            .map_err(|e| {
                ApiError::configuration(format!(
                    "Invalid bind address '{}:{}': {}",
                    self.bind_host, self.port, e
                ))
            })
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            // Dev mode: allow all
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Support wildcard subdomains: *.example.com
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin
                    .strip_prefix("https://")
                    .or_else(|| origin.strip_prefix("http://"))
                {
                    return origin_domain.ends_with(pattern)
                        && origin_domain.len() > pattern.len()
                        && origin_domain[..origin_domain.len() - pattern.len()].ends_with('.');
                }
            }
            false
        })
    }
}
