//! Occupancy Refresh Background Task
//!
//! Periodically reads every slot, projects the rack grids, and publishes the
//! result on a `watch` channel. Readers always see the most recent snapshot;
//! a newer snapshot replaces an unread older one.
//!
//! A failed read is logged and counted, and the previous snapshot stays
//! published.
//!
//! # Configuration
//!
//! ```rust
//! use rackyard_api::jobs::OccupancyRefreshConfig;
//! use std::time::Duration;
//!
//! let config = OccupancyRefreshConfig {
//!     refresh_interval: Duration::from_secs(2),
//! };
//! ```

use crate::config::ApiConfig;
use crate::constants::DEFAULT_REFRESH_INTERVAL_MS;
use crate::services::load_snapshot;
use rackyard_core::{OccupancyFilter, OccupancySnapshot};
use rackyard_storage::SharedStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the occupancy refresh task.
#[derive(Debug, Clone)]
pub struct OccupancyRefreshConfig {
    /// Time between reads (default: 2 seconds)
    pub refresh_interval: Duration,
}

impl Default for OccupancyRefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
        }
    }
}

impl OccupancyRefreshConfig {
    /// Take the interval already parsed into the API configuration.
    pub fn from_api_config(config: &ApiConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval,
        }
    }
}

// ============================================================================
// LIVE SNAPSHOT CHANNEL
// ============================================================================

/// Latest-value channel carrying the live occupancy snapshot.
///
/// `None` until the first refresh completes.
#[derive(Clone)]
pub struct LiveOccupancy {
    tx: Arc<watch::Sender<Option<Arc<OccupancySnapshot>>>>,
}

impl LiveOccupancy {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<Arc<OccupancySnapshot>> {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<OccupancySnapshot>>> {
        self.tx.subscribe()
    }

    /// Replace the current snapshot. Works with or without subscribers.
    pub fn publish(&self, snapshot: OccupancySnapshot) {
        self.tx.send_replace(Some(Arc::new(snapshot)));
    }
}

impl Default for LiveOccupancy {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters for the refresh task.
#[derive(Debug, Default)]
pub struct OccupancyRefreshMetrics {
    /// Snapshots published since startup
    pub snapshots_published: AtomicU64,

    /// Reads that failed since startup
    pub refresh_errors: AtomicU64,
}

impl OccupancyRefreshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> OccupancyRefreshSnapshot {
        OccupancyRefreshSnapshot {
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            refresh_errors: self.refresh_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`OccupancyRefreshMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyRefreshSnapshot {
    pub snapshots_published: u64,
    pub refresh_errors: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Background task that keeps [`LiveOccupancy`] current.
///
/// Runs until the shutdown signal is received. The first tick fires
/// immediately, so a snapshot is available as soon as the first read
/// succeeds.
///
/// # Example
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let live = LiveOccupancy::new();
/// let handle = tokio::spawn(occupancy_refresh_task(
///     store.clone(),
///     live.clone(),
///     OccupancyRefreshConfig::default(),
///     shutdown_rx,
/// ));
///
/// // Later, trigger shutdown
/// let _ = shutdown_tx.send(true);
/// let metrics = handle.await?;
/// ```
pub async fn occupancy_refresh_task(
    store: SharedStore,
    live: LiveOccupancy,
    config: OccupancyRefreshConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<OccupancyRefreshMetrics> {
    let metrics = Arc::new(OccupancyRefreshMetrics::new());

    let mut refresh_interval = interval(config.refresh_interval);
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        refresh_interval_ms = config.refresh_interval.as_millis() as u64,
        "Occupancy refresh task started"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("Occupancy refresh task shutting down");
                    break;
                }
            }

            _ = refresh_interval.tick() => {
                refresh_once(&store, &live, &metrics).await;
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        snapshots_published = snapshot.snapshots_published,
        refresh_errors = snapshot.refresh_errors,
        "Occupancy refresh task completed"
    );

    metrics
}

/// Perform one read-project-publish cycle.
async fn refresh_once(store: &SharedStore, live: &LiveOccupancy, metrics: &OccupancyRefreshMetrics) {
    match load_snapshot(store.as_ref(), &OccupancyFilter::default(), chrono::Utc::now()).await {
        Ok(snapshot) => {
            tracing::trace!(
                occupied = snapshot.occupied,
                total = snapshot.total,
                "Occupancy snapshot published"
            );
            live.publish(snapshot);
            metrics.snapshots_published.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to refresh occupancy snapshot");
            metrics.refresh_errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackyard_test_utils::{seeded_storage, SEEDED_TOTAL_SLOTS};

    #[test]
    fn test_default_interval() {
        let config = OccupancyRefreshConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_millis(2000));
    }

    #[test]
    fn test_from_api_config() {
        let api = ApiConfig {
            refresh_interval: Duration::from_millis(250),
            ..Default::default()
        };
        assert_eq!(
            OccupancyRefreshConfig::from_api_config(&api).refresh_interval,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_live_starts_empty() {
        let live = LiveOccupancy::new();
        assert!(live.latest().is_none());
    }

    #[tokio::test]
    async fn test_refresh_once_publishes() {
        let store: SharedStore = Arc::new(seeded_storage());
        let live = LiveOccupancy::new();
        let metrics = OccupancyRefreshMetrics::new();

        refresh_once(&store, &live, &metrics).await;

        let snapshot = live.latest().expect("snapshot published");
        assert_eq!(snapshot.total, SEEDED_TOTAL_SLOTS);
        assert_eq!(metrics.snapshot().snapshots_published, 1);
        assert_eq!(metrics.snapshot().refresh_errors, 0);
    }

    #[tokio::test]
    async fn test_task_stops_on_shutdown() {
        let store: SharedStore = Arc::new(seeded_storage());
        let live = LiveOccupancy::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut updates = live.subscribe();

        let handle = tokio::spawn(occupancy_refresh_task(
            store,
            live.clone(),
            OccupancyRefreshConfig {
                refresh_interval: Duration::from_millis(10),
            },
            shutdown_rx,
        ));

        updates.changed().await.unwrap();
        assert!(live.latest().is_some());

        shutdown_tx.send(true).unwrap();
        let metrics = handle.await.unwrap();
        assert!(metrics.snapshot().snapshots_published >= 1);
    }
}
