//! # Remote Gateway (Managed Store over HTTP)
//!
//! The weak-contract backend: each SQL statement is POSTed to a managed
//! datastore and commits on its own. There is no multi-statement
//! rollback.
//!
//! ## Degraded Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  begin()    - returns a counting handle, logs a warning             │
//! │  execute()  - statement is durably applied immediately              │
//! │  commit()   - no-op (everything already committed)                  │
//! │  rollback() - no-op; reports NotSupported with the number of        │
//! │               statements already applied so callers can surface     │
//! │               a partial-commit error instead of lying               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Protocol
//! `POST {base_url}/v1/execute` with a bearer token:
//! ```json
//! { "sql": "SELECT ... WHERE id = ?", "args": [7] }
//! ```
//! Response:
//! ```json
//! { "columns": ["id", "name"], "rows": [[7, "Coca Cola 330ml"]],
//!   "rows_affected": 0, "last_insert_rowid": null }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{
    ExecResult, Gateway, RollbackStatus, Row, SqlValue, Statement, TransactionHandle,
    TransactionSupport,
};
use crate::error::{DbError, DbResult};

// =============================================================================
// Configuration
// =============================================================================

/// Remote datastore configuration. Both values are injected from the
/// environment; nothing here is ever compiled into the binary.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the managed store, e.g. `https://pos-db.example.com`.
    pub base_url: String,

    /// Bearer token for authentication.
    pub auth_token: String,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        RemoteConfig {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Remote Gateway
// =============================================================================

/// Gateway speaking the JSON statement protocol of the managed store.
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    client: reqwest::Client,
    execute_url: String,
    auth_token: String,
}

impl RemoteGateway {
    pub fn new(config: RemoteConfig) -> DbResult<Self> {
        info!(base_url = %config.base_url, "Using remote datastore");

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        Ok(RemoteGateway {
            client,
            execute_url: format!("{}/v1/execute", config.base_url.trim_end_matches('/')),
            auth_token: config.auth_token,
        })
    }

    /// Checks that the remote store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        self.send(&Statement::new("SELECT 1")).await.is_ok()
    }

    async fn send(&self, stmt: &Statement) -> DbResult<WireResponse> {
        debug!(sql = %stmt.sql, "Remote statement");

        let args: Vec<Value> = stmt.params.iter().map(to_wire_value).collect();
        let response = self
            .client
            .post(&self.execute_url)
            .bearer_auth(&self.auth_token)
            .json(&json!({ "sql": stmt.sql, "args": args }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &body));
        }

        Ok(response.json::<WireResponse>().await?)
    }
}

#[async_trait]
impl Gateway for RemoteGateway {
    fn transaction_support(&self) -> TransactionSupport {
        TransactionSupport::PerStatement
    }

    async fn query(&self, stmt: Statement) -> DbResult<Vec<Row>> {
        let resp = self.send(&stmt).await?;
        resp.into_rows()
    }

    async fn execute(&self, stmt: Statement) -> DbResult<ExecResult> {
        let resp = self.send(&stmt).await?;
        Ok(ExecResult {
            last_insert_id: resp.last_insert_rowid.unwrap_or(0),
            rows_affected: resp.rows_affected,
        })
    }

    async fn begin(&self) -> DbResult<Box<dyn TransactionHandle>> {
        warn!(
            "Remote backend has no multi-statement transactions; \
             statements apply immediately and cannot be rolled back"
        );
        Ok(Box::new(RemoteSequence {
            gateway: self.clone(),
            statements_applied: 0,
        }))
    }
}

// =============================================================================
// Remote Statement Sequence
// =============================================================================

/// Stand-in for a transaction on the per-statement backend.
///
/// It only counts what was applied so that `rollback` can report the
/// damage precisely.
struct RemoteSequence {
    gateway: RemoteGateway,
    statements_applied: u64,
}

#[async_trait]
impl TransactionHandle for RemoteSequence {
    async fn query(&mut self, stmt: Statement) -> DbResult<Vec<Row>> {
        self.gateway.query(stmt).await
    }

    async fn execute(&mut self, stmt: Statement) -> DbResult<ExecResult> {
        let result = self.gateway.execute(stmt).await?;
        self.statements_applied += 1;
        Ok(result)
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        // Every statement already committed on its own.
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<RollbackStatus> {
        if self.statements_applied > 0 {
            warn!(
                statements_applied = self.statements_applied,
                "Rollback requested on per-statement backend; applied statements remain committed"
            );
        }
        Ok(RollbackStatus::NotSupported {
            statements_applied: self.statements_applied,
        })
    }
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
    #[serde(default)]
    rows_affected: u64,
    #[serde(default)]
    last_insert_rowid: Option<i64>,
}

impl WireResponse {
    fn into_rows(self) -> DbResult<Vec<Row>> {
        self.rows
            .into_iter()
            .map(|cells| {
                if cells.len() != self.columns.len() {
                    return Err(DbError::Remote(format!(
                        "row width {} does not match {} columns",
                        cells.len(),
                        self.columns.len()
                    )));
                }
                let values = cells
                    .into_iter()
                    .map(from_wire_value)
                    .collect::<DbResult<Vec<_>>>()?;
                Ok(Row::new(self.columns.clone(), values))
            })
            .collect()
    }
}

fn to_wire_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => json!(v),
        SqlValue::Real(v) => json!(v),
        SqlValue::Text(v) => json!(v),
        // The protocol has no binary channel; blobs are unused by this
        // application.
        SqlValue::Blob(v) => json!(String::from_utf8_lossy(v)),
    }
}

fn from_wire_value(value: Value) -> DbResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(b as i64)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Err(DbError::Remote(format!("unrepresentable number: {n}")))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s)),
        other => Err(DbError::Remote(format!("unexpected cell value: {other}"))),
    }
}

fn remote_error(status: reqwest::StatusCode, body: &str) -> DbError {
    // The store reports SQL errors as plain-text bodies; constraint
    // failures carry the same SQLite message text as the local backend.
    if body.contains("UNIQUE constraint failed") {
        let field = body
            .split("UNIQUE constraint failed: ")
            .nth(1)
            .unwrap_or("unknown")
            .trim()
            .to_string();
        DbError::UniqueViolation { field }
    } else if body.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation(body.to_string())
    } else {
        DbError::Remote(format!("HTTP {status}: {body}"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_value_round_trip() {
        assert_eq!(
            from_wire_value(to_wire_value(&SqlValue::Integer(2240))).unwrap(),
            SqlValue::Integer(2240)
        );
        assert_eq!(
            from_wire_value(to_wire_value(&SqlValue::Text("Cash".into()))).unwrap(),
            SqlValue::Text("Cash".into())
        );
        assert_eq!(
            from_wire_value(to_wire_value(&SqlValue::Null)).unwrap(),
            SqlValue::Null
        );
    }

    #[test]
    fn test_whole_number_stays_integer() {
        // Cents columns must never silently become floats on the wire.
        assert_eq!(
            from_wire_value(json!(199_00_i64)).unwrap(),
            SqlValue::Integer(19900)
        );
        assert_eq!(from_wire_value(json!(1.5)).unwrap(), SqlValue::Real(1.5));
    }

    #[test]
    fn test_response_row_mapping() {
        let resp = WireResponse {
            columns: vec!["id".into(), "total_cents".into()],
            rows: vec![vec![json!(1), json!(2240)]],
            rows_affected: 0,
            last_insert_rowid: None,
        };
        let rows = resp.into_rows().unwrap();
        assert_eq!(rows[0].integer("total_cents").unwrap(), 2240);
    }

    #[test]
    fn test_mismatched_row_width_is_error() {
        let resp = WireResponse {
            columns: vec!["id".into()],
            rows: vec![vec![json!(1), json!(2)]],
            rows_affected: 0,
            last_insert_rowid: None,
        };
        assert!(resp.into_rows().is_err());
    }

    #[test]
    fn test_remote_error_classifies_constraints() {
        let err = remote_error(
            reqwest::StatusCode::BAD_REQUEST,
            "SQLite error: UNIQUE constraint failed: products.barcode",
        );
        assert!(matches!(err, DbError::UniqueViolation { field } if field == "products.barcode"));
    }
}
