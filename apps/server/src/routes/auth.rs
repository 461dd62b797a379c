//! Login and identity endpoints.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use pos_db::repository::UserRepository;

use crate::auth::{verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// The response is the same for unknown usernames and wrong passwords,
/// so usernames cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let credentials = UserRepository::new(state.gateway.clone())
        .get_credentials(&body.username)
        .await?;

    let credentials = credentials
        .filter(|c| verify_password(&body.password, &c.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let token = state.jwt.generate_token(&credentials.user)?;
    info!(username = %credentials.user.username, "Login");

    Ok(Json(json!({ "token": token, "user": credentials.user })))
}

/// GET /api/auth/me
pub async fn me(AuthUser(user): AuthUser) -> Json<Value> {
    Json(json!({ "user": user }))
}
