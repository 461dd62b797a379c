//! User account management. Admin-only: cashier accounts are created
//! and maintained here, never self-registered.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use pos_core::{Role, User};
use pos_db::repository::UserRepository;

use crate::auth::{hash_password, AdminUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub username: String,
    pub password: String,
    pub role: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
    pub full_name: String,
    pub role: String,
    /// When present, the password is replaced.
    #[serde(default)]
    pub password: Option<String>,
}

fn parse_role(value: &str) -> ApiResult<Role> {
    Role::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid role: {value}")))
}

fn check_password(password: &str) -> ApiResult<()> {
    if password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/users (admin)
pub async fn list(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<Value>> {
    let users = UserRepository::new(state.gateway.clone()).list().await?;
    Ok(Json(json!({ "users": users })))
}

/// POST /api/users (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(body): Json<CreateUserBody>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if body.username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    let role = parse_role(&body.role)?;
    check_password(&body.password)?;

    let hash = hash_password(&body.password)?;
    let user = UserRepository::new(state.gateway.clone())
        .create(body.username.trim(), &hash, role, &body.full_name)
        .await?;

    info!(username = %user.username, role = user.role.as_str(), "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserBody>,
) -> ApiResult<Json<User>> {
    let role = parse_role(&body.role)?;

    // An admin demoting themselves would lock admin access out.
    if id == admin.id && !role.is_admin() {
        return Err(ApiError::BadRequest(
            "Cannot remove your own admin role".to_string(),
        ));
    }

    let repo = UserRepository::new(state.gateway.clone());
    let user = repo.update(id, &body.full_name, role).await?;

    if let Some(password) = &body.password {
        check_password(password)?;
        repo.set_password(id, &hash_password(password)?).await?;
    }

    Ok(Json(user))
}

/// DELETE /api/users/:id (admin)
///
/// Blocked for the caller's own account and for users with sales
/// history (their sales must stay attributable).
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    if id == admin.id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    UserRepository::new(state.gateway.clone()).delete(id).await?;
    Ok(Json(json!({ "deleted": id })))
}
