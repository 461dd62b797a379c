//! Checkout and sales-history endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pos_core::RequestedItem;
use pos_db::checkout::{CheckoutEngine, CheckoutOutcome, CreateSaleRequest};
use pos_db::repository::{ReportPeriod, ReportsRepository, SaleFilter, SaleRepository};

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemBody {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleBody {
    pub items: Vec<ItemBody>,
    pub payment_method: String,
    #[serde(default)]
    pub payment_received_cents: Option<i64>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub amount_paid_cents: Option<i64>,
}

/// POST /api/sales
///
/// The cashier id always comes from the verified token, never from the
/// request body.
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateSaleBody>,
) -> ApiResult<(StatusCode, Json<CheckoutOutcome>)> {
    let request = CreateSaleRequest {
        cashier_id: user.id,
        items: body
            .items
            .iter()
            .map(|item| RequestedItem {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        payment_method: body.payment_method,
        payment_received_cents: body.payment_received_cents,
        discount_cents: body.discount_cents,
        customer_id: body.customer_id,
        amount_paid_cents: body.amount_paid_cents,
    };

    let outcome = CheckoutEngine::new(state.gateway.clone())
        .create_sale(request)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub cashier_id: Option<i64>,
}

/// GET /api/sales
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let filter = SaleFilter {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
        start_date: query.start_date,
        end_date: query.end_date,
        cashier_id: query.cashier_id,
    };

    let page = SaleRepository::new(state.gateway.clone())
        .list(&filter, user.id, user.role.is_admin())
        .await?;

    Ok(Json(json!(page)))
}

/// GET /api/sales/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let repo = SaleRepository::new(state.gateway.clone());
    let sale = repo.get(id, user.id, user.role.is_admin()).await?;
    let items = repo.items_for(id).await?;
    let balance_due_cents = sale.balance_due().cents();

    Ok(Json(json!({
        "sale": sale,
        "items": items,
        "balance_due_cents": balance_due_cents,
    })))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// GET /api/sales/reports/summary (admin)
pub async fn summary(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<Value>> {
    let report = ReportsRepository::new(state.gateway.clone())
        .summary(range.start_date.as_deref(), range.end_date.as_deref())
        .await?;
    Ok(Json(json!(report)))
}

/// GET /api/sales/reports/:period (admin)
pub async fn period_report(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(period): Path<String>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<Value>> {
    let period = ReportPeriod::parse(&period).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unknown report period '{period}' (expected daily, weekly, monthly or yearly)"
        ))
    })?;

    let rows = ReportsRepository::new(state.gateway.clone())
        .period(period, range.start_date.as_deref(), range.end_date.as_deref())
        .await?;
    Ok(Json(json!({ "report": rows })))
}

/// GET /api/sales/product/:id (admin)
pub async fn product_history(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let rows = ReportsRepository::new(state.gateway.clone())
        .product_history(id)
        .await?;
    Ok(Json(json!({ "history": rows })))
}
