//! Catalog endpoints. Reads are open to any authenticated user;
//! writes are admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pos_core::validation::{validate_price_cents, validate_product_name, validate_stock};
use pos_core::Product;
use pos_db::repository::{NewProduct, ProductRepository};

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default = "default_min_stock")]
    pub min_stock: i64,
}

fn default_min_stock() -> i64 {
    5
}

impl ProductBody {
    fn validated(self) -> ApiResult<NewProduct> {
        validate_product_name(&self.name).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        validate_price_cents(self.price_cents).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        validate_stock(self.stock).map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(NewProduct {
            name: self.name,
            sku: self.sku,
            barcode: self.barcode,
            price_cents: self.price_cents,
            cost_cents: self.cost_cents,
            stock: self.stock,
            category: self.category,
            description: self.description,
            brand: self.brand,
            min_stock: self.min_stock,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Value>> {
    let products = ProductRepository::new(state.gateway.clone())
        .list(query.search.as_deref(), query.category.as_deref())
        .await?;
    Ok(Json(json!({ "products": products })))
}

/// GET /api/products/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    let product = ProductRepository::new(state.gateway.clone()).get(id).await?;
    Ok(Json(product))
}

/// GET /api/products/barcode/:code
pub async fn get_by_barcode(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(code): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = ProductRepository::new(state.gateway.clone())
        .get_by_barcode(&code)
        .await?;
    Ok(Json(product))
}

/// POST /api/products (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(body): Json<ProductBody>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = ProductRepository::new(state.gateway.clone())
        .create(body.validated()?)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> ApiResult<Json<Product>> {
    let product = ProductRepository::new(state.gateway.clone())
        .update(id, body.validated()?)
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id (admin)
///
/// Blocked while sale history references the product.
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    ProductRepository::new(state.gateway.clone()).delete(id).await?;
    Ok(Json(json!({ "deleted": id })))
}
