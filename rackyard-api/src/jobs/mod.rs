//! Background Jobs for RACKYARD API
//!
//! - `occupancy_refresh`: Recomputes the live occupancy snapshot
//!
//! # Usage
//!
//! ```ignore
//! use rackyard_api::jobs::{occupancy_refresh_task, LiveOccupancy, OccupancyRefreshConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let live = LiveOccupancy::new();
//! tokio::spawn(occupancy_refresh_task(store, live.clone(), OccupancyRefreshConfig::default(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod occupancy_refresh;

pub use occupancy_refresh::{
    occupancy_refresh_task, LiveOccupancy, OccupancyRefreshConfig, OccupancyRefreshMetrics,
    OccupancyRefreshSnapshot,
};
