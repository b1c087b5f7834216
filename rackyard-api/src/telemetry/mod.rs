//! RACKYARD Telemetry - Logging Infrastructure
//!
//! Structured `tracing` output for the API binary. Request spans come from
//! `tower_http::trace::TraceLayer` on the router.

pub mod tracer;

pub use tracer::{init_tracer, TelemetryConfig, DEFAULT_LOG_FILTER};
