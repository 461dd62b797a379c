//! # Settings Repository
//!
//! Key/value store for operator-tunable configuration. The VAT rate
//! lives here as a percent string; `resolve_first` implements the
//! ordered-key lookup that keeps the legacy `tax_rate` key working.

use std::sync::Arc;

use pos_core::Setting;

use crate::error::{DbError, DbResult};
use crate::gateway::{query_one, Gateway, Row, Statement};

pub struct SettingsRepository {
    gateway: Arc<dyn Gateway>,
}

impl SettingsRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        SettingsRepository { gateway }
    }

    pub async fn list(&self) -> DbResult<Vec<Setting>> {
        let rows = self
            .gateway
            .query(Statement::new(
                "SELECT key, value, description, updated_at FROM settings ORDER BY key",
            ))
            .await?;
        rows.iter().map(map_setting).collect()
    }

    pub async fn get(&self, key: &str) -> DbResult<Setting> {
        let row = query_one(
            self.gateway.as_ref(),
            Statement::new("SELECT key, value, description, updated_at FROM settings WHERE key = ?")
                .bind(key),
        )
        .await?
        .ok_or_else(|| DbError::not_found("Setting", key))?;
        map_setting(&row)
    }

    /// Returns the value of the first key in `keys` that exists.
    ///
    /// The checkout engine calls this once per sale with the VAT key
    /// candidates; older databases only carry `tax_rate`.
    pub async fn resolve_first(&self, keys: &[&str]) -> DbResult<Option<String>> {
        for key in keys {
            let row = query_one(
                self.gateway.as_ref(),
                Statement::new("SELECT value FROM settings WHERE key = ?").bind(*key),
            )
            .await?;
            if let Some(row) = row {
                return Ok(Some(row.text("value")?));
            }
        }
        Ok(None)
    }

    /// Creates or replaces a setting value.
    pub async fn upsert(&self, key: &str, value: &str, description: Option<&str>) -> DbResult<Setting> {
        self.gateway
            .execute(
                Statement::new(
                    "INSERT INTO settings (key, value, description, updated_at) \
                     VALUES (?, ?, ?, ?) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                     description = COALESCE(excluded.description, settings.description), \
                     updated_at = excluded.updated_at",
                )
                .bind(key)
                .bind(value)
                .bind(description.map(str::to_string))
                .bind(crate::now_timestamp()),
            )
            .await?;
        self.get(key).await
    }
}

fn map_setting(row: &Row) -> DbResult<Setting> {
    Ok(Setting {
        key: row.text("key")?,
        value: row.text("value")?,
        description: row.opt_text("description")?,
        updated_at: row.text("updated_at")?,
    })
}
