//! # Local Gateway (Embedded SQLite)
//!
//! The strong-contract backend: a connection-pooled embedded SQLite
//! database with real multi-statement transactions.
//!
//! ## Pool Configuration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  WAL mode     - readers don't block writers and vice versa          │
//! │  NORMAL sync  - safe from corruption, may lose the last             │
//! │                 transaction on power loss                           │
//! │  foreign_keys - ON (SQLite disables them by default)                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};
use tracing::{debug, info};

use super::{
    ExecResult, Gateway, RollbackStatus, Row, SqlValue, Statement, TransactionHandle,
    TransactionSupport,
};
use crate::error::{DbError, DbResult};

// =============================================================================
// Configuration
// =============================================================================

/// Local database configuration.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Path to the SQLite database file. Created if missing.
    pub database_path: PathBuf,

    /// Maximum number of pooled connections.
    /// Default: 5 (sufficient for a small retail deployment)
    pub max_connections: u32,

    /// Connection acquire timeout.
    pub connect_timeout: Duration,
}

impl LocalConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// In-memory database configuration (for tests).
    ///
    /// In-memory SQLite requires a single connection: every connection
    /// would otherwise see its own private database.
    pub fn in_memory() -> Self {
        LocalConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Local Gateway
// =============================================================================

/// Gateway backed by embedded SQLite with full ACID transactions.
#[derive(Debug, Clone)]
pub struct LocalGateway {
    pool: SqlitePool,
}

impl LocalGateway {
    /// Opens (creating if missing) the database file and builds the pool.
    pub async fn connect(config: LocalConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening local SQLite database"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Local pool created");

        Ok(LocalGateway { pool })
    }

    /// Checks that the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the connection pool (on shutdown).
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Gateway for LocalGateway {
    fn transaction_support(&self) -> TransactionSupport {
        TransactionSupport::Full
    }

    async fn query(&self, stmt: Statement) -> DbResult<Vec<Row>> {
        let rows = bind_params(&stmt).fetch_all(&self.pool).await?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, stmt: Statement) -> DbResult<ExecResult> {
        let result = bind_params(&stmt).execute(&self.pool).await?;
        Ok(ExecResult {
            last_insert_id: result.last_insert_rowid(),
            rows_affected: result.rows_affected(),
        })
    }

    async fn begin(&self) -> DbResult<Box<dyn TransactionHandle>> {
        debug!("BEGIN (local transaction)");
        let tx = self.pool.begin().await?;
        Ok(Box::new(LocalTransaction { tx }))
    }
}

// =============================================================================
// Local Transaction
// =============================================================================

/// A real SQLite transaction. Dropped without commit → sqlx rolls back.
struct LocalTransaction {
    tx: sqlx::Transaction<'static, Sqlite>,
}

#[async_trait]
impl TransactionHandle for LocalTransaction {
    async fn query(&mut self, stmt: Statement) -> DbResult<Vec<Row>> {
        let rows = bind_params(&stmt).fetch_all(&mut *self.tx).await?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&mut self, stmt: Statement) -> DbResult<ExecResult> {
        let result = bind_params(&stmt).execute(&mut *self.tx).await?;
        Ok(ExecResult {
            last_insert_id: result.last_insert_rowid(),
            rows_affected: result.rows_affected(),
        })
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        debug!("COMMIT (local transaction)");
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<RollbackStatus> {
        debug!("ROLLBACK (local transaction)");
        self.tx.rollback().await?;
        Ok(RollbackStatus::RolledBack)
    }
}

// =============================================================================
// sqlx <-> gateway conversion
// =============================================================================

fn bind_params(stmt: &Statement) -> sqlx::query::Query<'_, Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    let mut query = sqlx::query(&stmt.sql);
    for param in &stmt.params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Blob(v) => query.bind(v.clone()),
        };
    }
    query
}

fn convert_row(row: &SqliteRow) -> DbResult<Row> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(idx)?;
        // Match on the value's storage class, not the declared column
        // type: SQLite is dynamically typed at the cell level.
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get(idx)?),
                "REAL" | "NUMERIC" => SqlValue::Real(row.try_get(idx)?),
                "BLOB" => SqlValue::Blob(row.try_get(idx)?),
                _ => SqlValue::Text(row.try_get(idx)?),
            }
        };
        columns.push(column.name().to_string());
        values.push(value);
    }

    Ok(Row::new(columns, values))
}

// =============================================================================
// Unit Tests
// =============================================================================
