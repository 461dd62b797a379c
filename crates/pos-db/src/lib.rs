//! # pos-db: Persistence Layer for Ridge POS
//!
//! All datastore access for the system lives here, behind one gateway
//! trait with two backends.
//!
//! ## Layer Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                             pos-db                                  │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                    checkout (Sale Engine)                     │  │
//! │  │   validate → price (pos-core) → one transaction → receipt     │  │
//! │  └──────────────────────────────┬────────────────────────────────┘  │
//! │  ┌──────────────────────────────▼────────────────────────────────┐  │
//! │  │                        repository/                            │  │
//! │  │   products · sales · settings · customers · users · reports   │  │
//! │  └──────────────────────────────┬────────────────────────────────┘  │
//! │  ┌──────────────────────────────▼────────────────────────────────┐  │
//! │  │                         gateway/                               │ │
//! │  │   LocalGateway (sqlx SQLite)   RemoteGateway (reqwest JSON)    │ │
//! │  │   TransactionSupport::Full     TransactionSupport::PerStatement│ │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod checkout;
pub mod error;
pub mod gateway;
pub mod repository;
pub mod schema;

pub use error::{DbError, DbResult};
pub use gateway::local::{LocalConfig, LocalGateway};
pub use gateway::remote::{RemoteConfig, RemoteGateway};
pub use gateway::{
    ExecResult, Gateway, RollbackStatus, Row, SqlValue, Statement, TransactionHandle,
    TransactionSupport,
};

/// Timestamp format used across every table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in the canonical `TEXT` column format.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format_shape() {
        let ts = now_timestamp();
        // "2026-08-23 14:05:09"
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }
}
