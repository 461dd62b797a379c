//! # Persistence Gateway
//!
//! A single abstraction over the two datastores Ridge POS can run
//! against, with the transaction-strength divergence made explicit at
//! the boundary instead of leaking into business logic.
//!
//! ## The Two Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Gateway Implementations                        │
//! │                                                                     │
//! │  LocalGateway (local.rs)            RemoteGateway (remote.rs)       │
//! │  ─────────────────────────          ──────────────────────────      │
//! │  Embedded SQLite via sqlx           Managed store over HTTP         │
//! │  Real BEGIN/COMMIT/ROLLBACK         Each statement its own atomic   │
//! │  TransactionSupport::Full           unit; no multi-statement        │
//! │                                     rollback                        │
//! │                                     TransactionSupport::PerStatement│
//! │                                                                     │
//! │  The checkout engine is written against the STRONG contract.        │
//! │  The weaker remote mode is an accepted degradation that announces   │
//! │  itself: begin() logs a warning, rollback() reports how many        │
//! │  statements were already applied, and the engine converts that      │
//! │  into a distinguishable PartialCommit error. It is never silently   │
//! │  pretended to be transactional.                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let mut tx = gateway.begin().await?;
//! let res = tx.execute(Statement::new("INSERT INTO sales ...").bind(1_i64)).await?;
//! tx.commit().await?;
//! ```

pub mod local;
pub mod remote;

use async_trait::async_trait;

use crate::error::{DbError, DbResult};

// =============================================================================
// SQL Values
// =============================================================================

/// A dynamically typed SQL parameter or result cell.
///
/// The gateway is deliberately untyped at the wire level: both backends
/// speak the same four storage classes, and repositories do the typed
/// mapping at the edges.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => SqlValue::Null,
        }
    }
}

// =============================================================================
// Statement
// =============================================================================

/// One parameterized SQL statement.
///
/// All SQL in the system is parameterized; string interpolation of
/// values into SQL text is forbidden.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// Creates a statement with no parameters yet.
    pub fn new(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends one positional parameter.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }
}

// =============================================================================
// Rows and Results
// =============================================================================

/// One result row, addressable by column name.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) columns: Vec<String>,
    pub(crate) values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        Row { columns, values }
    }

    fn get(&self, name: &str) -> DbResult<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
            .ok_or_else(|| DbError::RowDecode(format!("missing column '{name}'")))
    }

    /// Non-null integer column.
    pub fn integer(&self, name: &str) -> DbResult<i64> {
        match self.get(name)? {
            SqlValue::Integer(v) => Ok(*v),
            other => Err(DbError::RowDecode(format!(
                "column '{name}': expected integer, got {other:?}"
            ))),
        }
    }

    /// Nullable integer column.
    pub fn opt_integer(&self, name: &str) -> DbResult<Option<i64>> {
        match self.get(name)? {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(v) => Ok(Some(*v)),
            other => Err(DbError::RowDecode(format!(
                "column '{name}': expected integer, got {other:?}"
            ))),
        }
    }

    /// Non-null text column.
    pub fn text(&self, name: &str) -> DbResult<String> {
        match self.get(name)? {
            SqlValue::Text(v) => Ok(v.clone()),
            other => Err(DbError::RowDecode(format!(
                "column '{name}': expected text, got {other:?}"
            ))),
        }
    }

    /// Nullable text column.
    pub fn opt_text(&self, name: &str) -> DbResult<Option<String>> {
        match self.get(name)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(v) => Ok(Some(v.clone())),
            other => Err(DbError::RowDecode(format!(
                "column '{name}': expected text, got {other:?}"
            ))),
        }
    }

    /// Numeric column coerced to f64 (aggregates like AVG produce REAL
    /// even over integer-cents columns).
    pub fn opt_number(&self, name: &str) -> DbResult<Option<f64>> {
        match self.get(name)? {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(v) => Ok(Some(*v as f64)),
            SqlValue::Real(v) => Ok(Some(*v)),
            other => Err(DbError::RowDecode(format!(
                "column '{name}': expected number, got {other:?}"
            ))),
        }
    }
}

/// Outcome of a mutation statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecResult {
    /// Rowid of the last inserted row (0 when not an insert).
    pub last_insert_id: i64,
    /// Number of rows changed by the statement.
    pub rows_affected: u64,
}

// =============================================================================
// Capability Flag
// =============================================================================

/// The transaction strength of the active backend.
///
/// Selected once at startup and logged; the checkout engine consults it
/// only to decide how a mid-sequence failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSupport {
    /// True ACID multi-statement transactions (local SQLite).
    Full,
    /// Each statement is its own atomic unit; no multi-statement
    /// rollback (remote managed store).
    PerStatement,
}

/// What actually happened when a transaction handle was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackStatus {
    /// All mutations inside the handle were undone.
    RolledBack,
    /// The backend cannot undo anything; this many statements were
    /// already durably applied.
    NotSupported { statements_applied: u64 },
}

// =============================================================================
// Gateway Traits
// =============================================================================

/// Scoped unit of work acquired from [`Gateway::begin`].
///
/// Dropping a handle without calling `commit` must never leave a
/// dangling open transaction (the local backend rolls back on drop via
/// sqlx; the remote backend has nothing to clean up).
#[async_trait]
pub trait TransactionHandle: Send {
    /// Runs a read inside the unit of work.
    async fn query(&mut self, stmt: Statement) -> DbResult<Vec<Row>>;

    /// Runs a mutation inside the unit of work.
    async fn execute(&mut self, stmt: Statement) -> DbResult<ExecResult>;

    /// Durably commits all mutations performed through this handle.
    async fn commit(self: Box<Self>) -> DbResult<()>;

    /// Undoes the mutations where the backend can; reports honestly
    /// where it cannot.
    async fn rollback(self: Box<Self>) -> DbResult<RollbackStatus>;
}

/// The persistence gateway: row query, row mutation, and a scoped
/// atomicity primitive.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Capability flag for the active backend.
    fn transaction_support(&self) -> TransactionSupport;

    /// Runs a standalone read.
    async fn query(&self, stmt: Statement) -> DbResult<Vec<Row>>;

    /// Runs a standalone mutation (its own atomic unit on both backends).
    async fn execute(&self, stmt: Statement) -> DbResult<ExecResult>;

    /// Opens a unit of work.
    async fn begin(&self) -> DbResult<Box<dyn TransactionHandle>>;
}

/// Fetches at most one row.
pub async fn query_one(gateway: &dyn Gateway, stmt: Statement) -> DbResult<Option<Row>> {
    Ok(gateway.query(stmt).await?.into_iter().next())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_builder() {
        let stmt = Statement::new("SELECT * FROM products WHERE id = ? AND stock >= ?")
            .bind(7_i64)
            .bind(2_i64);
        assert_eq!(stmt.params.len(), 2);
        assert_eq!(stmt.params[0], SqlValue::Integer(7));
    }

    #[test]
    fn test_option_binds_null() {
        let stmt = Statement::new("INSERT INTO sales (customer_id) VALUES (?)")
            .bind(None::<i64>);
        assert_eq!(stmt.params[0], SqlValue::Null);
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::new(
            vec!["id".into(), "name".into(), "barcode".into(), "avg".into()],
            vec![
                SqlValue::Integer(3),
                SqlValue::Text("Coca Cola 330ml".into()),
                SqlValue::Null,
                SqlValue::Real(12.5),
            ],
        );

        assert_eq!(row.integer("id").unwrap(), 3);
        assert_eq!(row.text("name").unwrap(), "Coca Cola 330ml");
        assert_eq!(row.opt_text("barcode").unwrap(), None);
        assert_eq!(row.opt_number("avg").unwrap(), Some(12.5));
        assert_eq!(row.opt_number("id").unwrap(), Some(3.0));
        assert!(row.integer("missing").is_err());
        assert!(row.text("id").is_err());
    }
}
