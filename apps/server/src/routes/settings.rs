//! Settings endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pos_core::Setting;
use pos_db::repository::SettingsRepository;

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingUpdate {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /api/settings
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> ApiResult<Json<Value>> {
    let settings = SettingsRepository::new(state.gateway.clone()).list().await?;
    Ok(Json(json!({ "settings": settings })))
}

/// GET /api/settings/:key
pub async fn get(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(key): Path<String>,
) -> ApiResult<Json<Setting>> {
    let setting = SettingsRepository::new(state.gateway.clone()).get(&key).await?;
    Ok(Json(setting))
}

/// PUT /api/settings (admin)
///
/// Accepts a batch of key/value updates and returns the updated rows.
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(updates): Json<Vec<SettingUpdate>>,
) -> ApiResult<Json<Value>> {
    if updates.is_empty() {
        return Err(ApiError::BadRequest("No settings provided".to_string()));
    }

    let repo = SettingsRepository::new(state.gateway.clone());
    let mut updated = Vec::with_capacity(updates.len());
    for update in updates {
        if update.key.trim().is_empty() {
            return Err(ApiError::BadRequest("Setting key must not be empty".to_string()));
        }
        updated.push(
            repo.upsert(&update.key, &update.value, update.description.as_deref())
                .await?,
        );
    }

    Ok(Json(json!({ "settings": updated })))
}
