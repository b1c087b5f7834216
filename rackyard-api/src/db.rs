//! Database Connection Pool Module
//!
//! This module provides PostgreSQL connection pooling using deadpool-postgres
//! and the `WarehouseStore` implementation over the `pallets`,
//! `ubicaciones`, and `usuarios` tables.
//!
//! Slot mutations go through the stored procedures (`reasignar_pallet`,
//! `retirar_pallet`, `actualizar_status_ubicacion`, `insertpalletfromqr`);
//! reads and precondition checks are plain SQL. Every mutation runs inside a
//! single transaction on one pooled connection.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use rackyard_core::{
    HarvestDate, LaneKey, Pallet, PalletCode, PalletKey, PalletRecord, PasswordDigest, SlotKey,
    SlotOptions, SlotRecord, SlotSelection, SlotStatus, StorageError, StorageResult,
};
use rackyard_storage::{AssignOutcome, ReleaseOutcome, WarehouseStore};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

use crate::constants::{DEFAULT_DB_POOL_SIZE, DEFAULT_DB_PORT, DEFAULT_DB_TIMEOUT_SECS};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Clone)]
pub struct DbConfig {
    /// PostgreSQL host (`SQL_SERVER`)
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name (`SQL_DATABASE`)
    pub dbname: String,
    /// Database user (`SQL_USER`)
    pub user: String,
    /// Database password (`SQL_PASSWORD`)
    pub password: SecretString,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait timeout for a pooled connection
    pub timeout: Duration,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("max_size", &self.max_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn required_env(name: &str) -> ApiResult<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ApiError::configuration(format!("Missing required environment variable {}", name))
        })
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// `SQL_SERVER`, `SQL_DATABASE`, `SQL_USER`, and `SQL_PASSWORD` are
    /// required; startup fails with a configuration error when any is unset.
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self {
            host: required_env("SQL_SERVER")?,
            port: std::env::var("RACKYARD_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DB_PORT),
            dbname: required_env("SQL_DATABASE")?,
            user: required_env("SQL_USER")?,
            password: SecretString::from(required_env("SQL_PASSWORD")?),
            max_size: std::env::var("RACKYARD_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DB_POOL_SIZE),
            timeout: Duration::from_secs(
                std::env::var("RACKYARD_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DB_TIMEOUT_SECS),
            ),
        })
    }

    /// Create a connection pool from this configuration.
    ///
    /// No connection is opened until the first checkout.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.expose_secret().to_string());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(self.max_size);
        pool_config.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_config);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn pool_error(err: deadpool_postgres::PoolError) -> StorageError {
    tracing::error!(error = %err, "Failed to acquire database connection");
    StorageError::ConnectionFailed {
        reason: err.to_string(),
    }
}

fn query_error(operation: &str, err: tokio_postgres::Error) -> StorageError {
    if let Some(db_err) = err.as_db_error() {
        if *db_err.code() == SqlState::UNIQUE_VIOLATION {
            return StorageError::UniqueViolation {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    tracing::error!(operation, error = %err, "Database query failed");
    StorageError::QueryFailed {
        operation: operation.to_string(),
        reason: err.to_string(),
    }
}

fn procedure_error(procedure: &str, err: tokio_postgres::Error) -> StorageError {
    match query_error(procedure, err) {
        StorageError::QueryFailed { reason, .. } => StorageError::ProcedureFailed {
            procedure: procedure.to_string(),
            reason,
        },
        other => other,
    }
}

fn column<'a, T>(row: &'a Row, operation: &str, name: &str) -> StorageResult<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name).map_err(|e| StorageError::RowMapping {
        operation: operation.to_string(),
        reason: format!("column {}: {}", name, e),
    })
}

// ============================================================================
// ROW MAPPING
// ============================================================================

const SLOT_COLUMNS: &str = "tipo_almacen, piso, rack, letra, posicion_pallet";

const PALLET_COLUMNS: &str = "id_pallet, npallet, descripcion, variedad, mercado, fechafaena";

fn slot_key_from_row(row: &Row, operation: &str) -> StorageResult<SlotKey> {
    Ok(SlotKey {
        warehouse_type: column(row, operation, "tipo_almacen")?,
        floor: column(row, operation, "piso")?,
        rack: column(row, operation, "rack")?,
        letter: column(row, operation, "letra")?,
        position: column(row, operation, "posicion_pallet")?,
    })
}

fn pallet_from_row(row: &Row, operation: &str) -> StorageResult<Pallet> {
    let code: String = column(row, operation, "npallet")?;
    let harvest_date: String = column(row, operation, "fechafaena")?;
    Ok(Pallet {
        key: column(row, operation, "id_pallet")?,
        code: PalletCode::from_stored(code.trim()),
        description: column(row, operation, "descripcion")?,
        variety: column(row, operation, "variedad")?,
        market: column(row, operation, "mercado")?,
        harvest_date: HarvestDate::from_stored(harvest_date.trim()),
    })
}

/// Slot row left-joined with `pallets`; the pallet columns are NULL for
/// free slots.
fn slot_record_from_row(row: &Row, operation: &str) -> StorageResult<SlotRecord> {
    let key = slot_key_from_row(row, operation)?;
    let pallet_key: Option<PalletKey> = column(row, operation, "id_pallet")?;
    let pallet = match pallet_key {
        Some(_) => Some(pallet_from_row(row, operation)?),
        None => None,
    };
    let status = column::<Option<String>>(row, operation, "status_ubicacion")?
        .map(|raw| SlotStatus::from_db_str(&raw))
        .unwrap_or(if pallet.is_some() {
            SlotStatus::Occupied
        } else {
            SlotStatus::Free
        });

    Ok(SlotRecord {
        key,
        status,
        pallet,
    })
}

fn options_from_rows(rows: &[Row], operation: &str) -> StorageResult<SlotOptions> {
    let lanes = rows
        .iter()
        .map(|row| {
            Ok(LaneKey {
                warehouse_type: column(row, operation, "tipo_almacen")?,
                floor: column(row, operation, "piso")?,
                rack: column(row, operation, "rack")?,
                letter: column(row, operation, "letra")?,
            })
        })
        .collect::<StorageResult<Vec<_>>>()?;
    Ok(SlotOptions::from_lanes(&lanes))
}

/// `reasignar_pallet` is keyed by floor, rack, and letter only; a placement
/// in another warehouse type's lane is a procedure failure.
fn placed_in_lane(slot: SlotKey, lane: &LaneKey, pallet: PalletKey) -> StorageResult<SlotKey> {
    if slot.lane() == *lane {
        return Ok(slot);
    }
    Err(StorageError::ProcedureFailed {
        procedure: "reasignar_pallet".to_string(),
        reason: format!("pallet {} placed in {} instead of lane {}", pallet, slot, lane),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool and implements
/// [`WarehouseStore`] over the warehouse tables.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        let status = self.pool.status();
        status.size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StorageResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(pool_error)
    }
}

#[async_trait]
impl WarehouseStore for DbClient {
    // ========================================================================
    // PALLET OPERATIONS
    // ========================================================================

    async fn pallet_find_by_code(&self, code: &PalletCode) -> StorageResult<Option<Pallet>> {
        const OP: &str = "pallet_find_by_code";
        let conn = self.get_conn().await?;

        let row = conn
            .query_opt(
                &format!("SELECT {} FROM pallets WHERE npallet = $1", PALLET_COLUMNS),
                &[&code.as_str()],
            )
            .await
            .map_err(|e| query_error(OP, e))?;

        row.map(|row| pallet_from_row(&row, OP)).transpose()
    }

    async fn pallet_insert_from_qr(&self, record: &PalletRecord) -> StorageResult<Pallet> {
        const OP: &str = "pallet_insert_from_qr";
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(|e| query_error(OP, e))?;

        tx.execute("CALL insertpalletfromqr($1)", &[&record.to_qr_payload()])
            .await
            .map_err(|e| procedure_error("insertpalletfromqr", e))?;

        let row = tx
            .query_opt(
                &format!("SELECT {} FROM pallets WHERE npallet = $1", PALLET_COLUMNS),
                &[&record.code.as_str()],
            )
            .await
            .map_err(|e| query_error(OP, e))?
            .ok_or_else(|| StorageError::RowMapping {
                operation: OP.to_string(),
                reason: format!("pallet {} missing after insert", record.code),
            })?;
        let pallet = pallet_from_row(&row, OP)?;

        tx.commit().await.map_err(|e| query_error(OP, e))?;
        Ok(pallet)
    }

    // ========================================================================
    // SLOT OPERATIONS
    // ========================================================================

    async fn slot_assign(&self, lane: &LaneKey, pallet: PalletKey) -> StorageResult<AssignOutcome> {
        const OP: &str = "slot_assign";
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(|e| query_error(OP, e))?;

        let current = tx
            .query_opt(
                &format!(
                    "SELECT {} FROM ubicaciones WHERE id_pallet_asignado = $1 FOR UPDATE",
                    SLOT_COLUMNS
                ),
                &[&pallet],
            )
            .await
            .map_err(|e| query_error(OP, e))?;
        if let Some(row) = current {
            return Ok(AssignOutcome::AlreadyAssigned(slot_key_from_row(&row, OP)?));
        }

        let free = tx
            .query_opt(
                "SELECT posicion_pallet FROM ubicaciones \
                 WHERE tipo_almacen = $1 AND piso = $2 AND rack = $3 AND letra = $4 \
                   AND id_pallet_asignado IS NULL \
                 ORDER BY posicion_pallet LIMIT 1 FOR UPDATE",
                &[&lane.warehouse_type, &lane.floor, &lane.rack, &lane.letter],
            )
            .await
            .map_err(|e| query_error(OP, e))?;
        if free.is_none() {
            return Ok(AssignOutcome::LaneFull);
        }

        tx.execute(
            "CALL reasignar_pallet($1, $2, $3, $4)",
            &[&lane.floor, &lane.rack, &lane.letter, &pallet],
        )
        .await
        .map_err(|e| procedure_error("reasignar_pallet", e))?;

        tx.execute("CALL actualizar_status_ubicacion()", &[])
            .await
            .map_err(|e| procedure_error("actualizar_status_ubicacion", e))?;

        let row = tx
            .query_opt(
                &format!(
                    "SELECT {} FROM ubicaciones WHERE id_pallet_asignado = $1",
                    SLOT_COLUMNS
                ),
                &[&pallet],
            )
            .await
            .map_err(|e| query_error(OP, e))?
            .ok_or_else(|| StorageError::ProcedureFailed {
                procedure: "reasignar_pallet".to_string(),
                reason: format!("pallet {} not placed in lane {}", pallet, lane),
            })?;
        // Returning before commit drops `tx`, which rolls the placement back.
        let slot = placed_in_lane(slot_key_from_row(&row, OP)?, lane, pallet)?;

        tx.commit().await.map_err(|e| query_error(OP, e))?;
        Ok(AssignOutcome::Assigned(slot))
    }

    async fn slot_release(&self, pallet: PalletKey) -> StorageResult<ReleaseOutcome> {
        const OP: &str = "slot_release";
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(|e| query_error(OP, e))?;

        let current = tx
            .query_opt(
                &format!(
                    "SELECT {} FROM ubicaciones WHERE id_pallet_asignado = $1 FOR UPDATE",
                    SLOT_COLUMNS
                ),
                &[&pallet],
            )
            .await
            .map_err(|e| query_error(OP, e))?;
        let slot = match current {
            Some(row) => slot_key_from_row(&row, OP)?,
            None => return Ok(ReleaseOutcome::NotAssigned),
        };
        if !slot.is_head() {
            return Ok(ReleaseOutcome::NotAtHead(slot));
        }

        tx.execute("CALL retirar_pallet($1)", &[&pallet])
            .await
            .map_err(|e| procedure_error("retirar_pallet", e))?;

        tx.execute("CALL actualizar_status_ubicacion()", &[])
            .await
            .map_err(|e| procedure_error("actualizar_status_ubicacion", e))?;

        tx.commit().await.map_err(|e| query_error(OP, e))?;
        Ok(ReleaseOutcome::Released(slot))
    }

    async fn slot_list_all(&self) -> StorageResult<Vec<SlotRecord>> {
        const OP: &str = "slot_list_all";
        let conn = self.get_conn().await?;

        let rows = conn
            .query(
                "SELECT u.tipo_almacen, u.piso, u.rack, u.letra, u.posicion_pallet, \
                        u.status_ubicacion, \
                        p.id_pallet, p.npallet, p.descripcion, p.variedad, p.mercado, p.fechafaena \
                 FROM ubicaciones u \
                 LEFT JOIN pallets p ON p.id_pallet = u.id_pallet_asignado \
                 ORDER BY u.tipo_almacen, u.rack, u.piso DESC, u.posicion_pallet DESC, u.letra",
                &[],
            )
            .await
            .map_err(|e| query_error(OP, e))?;

        rows.iter().map(|row| slot_record_from_row(row, OP)).collect()
    }

    async fn slot_field_options(&self) -> StorageResult<SlotOptions> {
        const OP: &str = "slot_field_options";
        let conn = self.get_conn().await?;

        let rows = conn
            .query(
                "SELECT DISTINCT tipo_almacen, piso, rack, letra FROM ubicaciones",
                &[],
            )
            .await
            .map_err(|e| query_error(OP, e))?;

        options_from_rows(&rows, OP)
    }

    async fn slot_available_options(
        &self,
        selection: &SlotSelection,
    ) -> StorageResult<SlotOptions> {
        const OP: &str = "slot_available_options";
        let conn = self.get_conn().await?;

        let rows = conn
            .query(
                "SELECT DISTINCT tipo_almacen, piso, rack, letra FROM ubicaciones \
                 WHERE id_pallet_asignado IS NULL \
                   AND ($1::text IS NULL OR tipo_almacen = $1) \
                   AND ($2::int4 IS NULL OR piso = $2) \
                   AND ($3::int4 IS NULL OR rack = $3) \
                   AND ($4::text IS NULL OR letra = $4)",
                &[
                    &non_empty(&selection.warehouse_type),
                    &selection.floor,
                    &selection.rack,
                    &non_empty(&selection.letter),
                ],
            )
            .await
            .map_err(|e| query_error(OP, e))?;

        options_from_rows(&rows, OP)
    }

    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    async fn user_insert(&self, username: &str, digest: &PasswordDigest) -> StorageResult<()> {
        const OP: &str = "user_insert";
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO usuarios (username, password) VALUES ($1, $2)",
            &[&username, &digest.as_str()],
        )
        .await
        .map_err(|e| query_error(OP, e))?;

        Ok(())
    }

    async fn user_verify(&self, username: &str, digest: &PasswordDigest) -> StorageResult<bool> {
        const OP: &str = "user_verify";
        let conn = self.get_conn().await?;

        let row = conn
            .query_one(
                "SELECT COUNT(*) AS matches FROM usuarios WHERE username = $1 AND password = $2",
                &[&username, &digest.as_str()],
            )
            .await
            .map_err(|e| query_error(OP, e))?;

        let matches: i64 = column(&row, OP, "matches")?;
        Ok(matches == 1)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(|e| query_error("health_check", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_selection_values() {
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("COLD".to_string())), Some("COLD"));
    }

    #[test]
    fn test_placement_must_match_requested_lane() {
        let cold = LaneKey::new("COLD", 1, 1, "A");
        let dry = LaneKey::new("DRY", 1, 1, "A");

        assert_eq!(placed_in_lane(cold.slot(1), &cold, 7).unwrap(), cold.slot(1));

        let err = placed_in_lane(dry.slot(1), &cold, 7).unwrap_err();
        assert!(matches!(
            err,
            StorageError::ProcedureFailed { ref procedure, .. } if procedure == "reasignar_pallet"
        ));
        assert!(err.to_string().contains("DRY-1-1-A-1"));
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = DbConfig {
            host: "localhost".to_string(),
            port: DEFAULT_DB_PORT,
            dbname: "bodega".to_string(),
            user: "yard".to_string(),
            password: SecretString::from("hunter2".to_string()),
            max_size: DEFAULT_DB_POOL_SIZE,
            timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_create_pool_is_lazy() {
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            dbname: "bodega".to_string(),
            user: "yard".to_string(),
            password: SecretString::from("secret".to_string()),
            max_size: 2,
            timeout: Duration::from_millis(50),
        };
        let client = DbClient::from_config(&config).expect("pool builds without connecting");
        assert_eq!(client.pool_size(), 0);
    }
}
