//! Customer registry endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pos_core::Customer;
use pos_db::repository::{CustomerRepository, NewCustomer};

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerBody {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl CustomerBody {
    fn validated(self) -> ApiResult<NewCustomer> {
        if self.name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
        Ok(NewCustomer {
            name: self.name,
            phone: self.phone,
            email: self.email,
            address: self.address,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Value>> {
    let customers = CustomerRepository::new(state.gateway.clone())
        .list(query.search.as_deref())
        .await?;
    Ok(Json(json!({ "customers": customers })))
}

/// GET /api/customers/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    let customer = CustomerRepository::new(state.gateway.clone()).get(id).await?;
    Ok(Json(customer))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Json(body): Json<CustomerBody>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = CustomerRepository::new(state.gateway.clone())
        .create(body.validated()?)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CustomerBody>,
) -> ApiResult<Json<Customer>> {
    let customer = CustomerRepository::new(state.gateway.clone())
        .update(id, body.validated()?)
        .await?;
    Ok(Json(customer))
}

/// DELETE /api/customers/:id (admin)
///
/// Blocked while sales reference the customer.
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    CustomerRepository::new(state.gateway.clone()).delete(id).await?;
    Ok(Json(json!({ "deleted": id })))
}
