//! RACKYARD API Server Entry Point
//!
//! Bootstraps configuration, opens the PostgreSQL pool, starts the live
//! occupancy refresh job, and serves the Axum HTTP server until Ctrl-C.

use std::sync::Arc;

use axum::Router;
use rackyard_api::telemetry::{init_tracer, TelemetryConfig};
use rackyard_api::{
    create_api_router, occupancy_refresh_task, ApiConfig, ApiError, ApiResult, AuthConfig,
    DbClient, DbConfig, LiveOccupancy, OccupancyRefreshConfig,
};
use rackyard_storage::SharedStore;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let db_config = DbConfig::from_env()?;
    let db = DbClient::from_config(&db_config)?;
    tracing::info!(
        host = %db_config.host,
        dbname = %db_config.dbname,
        pool_size = db.pool_size(),
        "Database pool configured"
    );
    let store: SharedStore = Arc::new(db);

    let api_config = ApiConfig::from_env()?;
    let auth_config = AuthConfig::from_env();

    let live = LiveOccupancy::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh = tokio::spawn(occupancy_refresh_task(
        store.clone(),
        live.clone(),
        OccupancyRefreshConfig::from_api_config(&api_config),
        shutdown_rx,
    ));

    let app: Router = create_api_router(store, live, &api_config, auth_config)?;

    let addr = api_config.socket_addr()?;
    tracing::info!(%addr, environment = %api_config.environment, "Starting RACKYARD API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = refresh.await {
        tracing::error!(error = %e, "Occupancy refresh task ended abnormally");
    }

    Ok(())
}
