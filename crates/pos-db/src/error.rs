//! # Database Error Types
//!
//! Error types for gateway and repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                │
//! │                                                                     │
//! │  sqlx::Error / reqwest::Error                                       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  DbError (this module) ← adds context and categorization            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ApiError (server app) ← serialized as {"error": "..."}             │
//! │                                                                     │
//! │  DbError::PartialCommit is special: it means the remote backend     │
//! │  failed mid-sequence and already-applied statements CANNOT be       │
//! │  undone. It is surfaced distinctly so operators can reconcile.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Datastore operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the datastore.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation (duplicate barcode, username, key).
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Row is referenced elsewhere and may not be deleted.
    #[error("{entity} {id} is referenced by existing sales and cannot be deleted")]
    Referenced { entity: &'static str, id: i64 },

    /// Connection to the datastore failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A result row was missing an expected column or held an
    /// unexpected type.
    #[error("Row decode failed: {0}")]
    RowDecode(String),

    /// The remote backend failed mid-sequence; statements applied before
    /// the failure are durably committed and were NOT rolled back.
    ///
    /// This is the documented weaker guarantee of the per-statement
    /// backend, never a silent condition.
    #[error(
        "Partial commit on non-transactional backend: {statements_applied} statement(s) already applied ({cause})"
    )]
    PartialCommit {
        statements_applied: u64,
        cause: String,
    },

    /// Remote backend returned a malformed or error response.
    #[error("Remote datastore error: {0}")]
    Remote(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal datastore error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record",
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::RowDecode(format!("column {index}: {source}"))
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            DbError::ConnectionFailed(err.to_string())
        } else {
            DbError::Remote(err.to_string())
        }
    }
}

/// Result type for datastore operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_commit_message_names_applied_count() {
        let err = DbError::PartialCommit {
            statements_applied: 3,
            cause: "disk I/O error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 statement(s) already applied"));
        assert!(msg.contains("disk I/O error"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = DbError::not_found("Sale", 7);
        assert_eq!(err.to_string(), "Sale not found: 7");
    }
}
