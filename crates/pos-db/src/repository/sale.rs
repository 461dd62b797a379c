//! # Sale Repository
//!
//! Read side of sales history. Writes go through the checkout engine
//! only; sale rows are never updated after creation.
//!
//! ## Visibility Rule
//! Admins see every sale; cashiers see only their own. The restriction
//! is applied in SQL so a cashier cannot page past it.

use std::sync::Arc;

use pos_core::{PaymentMethod, Sale, SaleItem, SaleStatus};
use serde::Serialize;

use crate::error::{DbError, DbResult};
use crate::gateway::{query_one, Gateway, Row, SqlValue, Statement};

/// Filters accepted by the paginated sales list.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub page: i64,
    pub limit: i64,
    /// Inclusive date lower bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive date upper bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Admin-only filter on a specific cashier.
    pub cashier_id: Option<i64>,
}

/// One row of the sales list, with its line-item count.
#[derive(Debug, Clone, Serialize)]
pub struct SaleListEntry {
    #[serde(flatten)]
    pub sale: Sale,
    pub items_count: i64,
}

/// One page of sales history.
#[derive(Debug, Clone, Serialize)]
pub struct SaleListPage {
    pub sales: Vec<SaleListEntry>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

const SELECT_SALE: &str = "SELECT s.id, s.cashier_id, s.customer_id, s.total_cents, s.vat_cents, \
     s.discount_cents, s.payment_method, s.payment_received_cents, s.change_cents, \
     s.amount_paid_cents, s.status, s.created_at, u.full_name AS cashier_name \
     FROM sales s LEFT JOIN users u ON u.id = s.cashier_id";

pub struct SaleRepository {
    gateway: Arc<dyn Gateway>,
}

impl SaleRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        SaleRepository { gateway }
    }

    /// Fetches one sale. Cashiers get NotFound for sales that are not
    /// theirs, indistinguishable from a missing id.
    pub async fn get(&self, id: i64, viewer_id: i64, is_admin: bool) -> DbResult<Sale> {
        let mut sql = format!("{SELECT_SALE} WHERE s.id = ?");
        let mut params: Vec<SqlValue> = vec![id.into()];
        if !is_admin {
            sql.push_str(" AND s.cashier_id = ?");
            params.push(viewer_id.into());
        }

        let row = query_one(self.gateway.as_ref(), Statement { sql, params })
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        map_sale(&row)
    }

    /// Line items of a sale, joined with live product name and barcode.
    pub async fn items_for(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let rows = self
            .gateway
            .query(
                Statement::new(
                    "SELECT si.id, si.sale_id, si.product_id, si.quantity, \
                     si.unit_price_cents, si.total_price_cents, \
                     p.name AS product_name, p.barcode \
                     FROM sale_items si LEFT JOIN products p ON p.id = si.product_id \
                     WHERE si.sale_id = ? ORDER BY si.id",
                )
                .bind(sale_id),
            )
            .await?;
        rows.iter().map(map_sale_item).collect()
    }

    /// Paginated history, newest first.
    pub async fn list(
        &self,
        filter: &SaleFilter,
        viewer_id: i64,
        is_admin: bool,
    ) -> DbResult<SaleListPage> {
        let (page, limit, offset) = pos_core::validation::clamp_pagination(filter.page, filter.limit);

        let mut where_sql = String::from(" WHERE 1=1");
        let mut params: Vec<SqlValue> = Vec::new();

        if !is_admin {
            where_sql.push_str(" AND s.cashier_id = ?");
            params.push(viewer_id.into());
        } else if let Some(cashier_id) = filter.cashier_id {
            where_sql.push_str(" AND s.cashier_id = ?");
            params.push(cashier_id.into());
        }
        if let Some(start) = &filter.start_date {
            where_sql.push_str(" AND DATE(s.created_at) >= DATE(?)");
            params.push(start.clone().into());
        }
        if let Some(end) = &filter.end_date {
            where_sql.push_str(" AND DATE(s.created_at) <= DATE(?)");
            params.push(end.clone().into());
        }

        let count_stmt = Statement {
            sql: format!("SELECT COUNT(*) AS n FROM sales s{where_sql}"),
            params: params.clone(),
        };
        let total = query_one(self.gateway.as_ref(), count_stmt)
            .await?
            .map(|r| r.integer("n"))
            .transpose()?
            .unwrap_or(0);

        let mut list_params = params;
        list_params.push(limit.into());
        list_params.push(offset.into());
        let list_stmt = Statement {
            sql: format!(
                "SELECT s.id, s.cashier_id, s.customer_id, s.total_cents, s.vat_cents, \
                 s.discount_cents, s.payment_method, s.payment_received_cents, s.change_cents, \
                 s.amount_paid_cents, s.status, s.created_at, u.full_name AS cashier_name, \
                 (SELECT COUNT(*) FROM sale_items si WHERE si.sale_id = s.id) AS items_count \
                 FROM sales s LEFT JOIN users u ON u.id = s.cashier_id\
                 {where_sql} ORDER BY s.created_at DESC, s.id DESC LIMIT ? OFFSET ?"
            ),
            params: list_params,
        };

        let rows = self.gateway.query(list_stmt).await?;
        let sales = rows
            .iter()
            .map(|row| {
                Ok(SaleListEntry {
                    sale: map_sale(row)?,
                    items_count: row.integer("items_count")?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(SaleListPage {
            sales,
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        })
    }
}

pub(crate) fn map_sale(row: &Row) -> DbResult<Sale> {
    let method_text = row.text("payment_method")?;
    let payment_method = PaymentMethod::parse(&method_text)
        .map_err(|_| DbError::RowDecode(format!("unknown payment method '{method_text}'")))?;

    let status_text = row.text("status")?;
    let status = match status_text.as_str() {
        "completed" => SaleStatus::Completed,
        "pending" => SaleStatus::Pending,
        "cancelled" => SaleStatus::Cancelled,
        other => {
            return Err(DbError::RowDecode(format!("unknown sale status '{other}'")));
        }
    };

    Ok(Sale {
        id: row.integer("id")?,
        cashier_id: row.integer("cashier_id")?,
        customer_id: row.opt_integer("customer_id")?,
        total_cents: row.integer("total_cents")?,
        vat_cents: row.integer("vat_cents")?,
        discount_cents: row.integer("discount_cents")?,
        payment_method,
        payment_received_cents: row.opt_integer("payment_received_cents")?,
        change_cents: row.integer("change_cents")?,
        amount_paid_cents: row.integer("amount_paid_cents")?,
        status,
        created_at: row.text("created_at")?,
        cashier_name: row.opt_text("cashier_name")?,
    })
}

pub(crate) fn map_sale_item(row: &Row) -> DbResult<SaleItem> {
    Ok(SaleItem {
        id: row.integer("id")?,
        sale_id: row.integer("sale_id")?,
        product_id: row.integer("product_id")?,
        quantity: row.integer("quantity")?,
        unit_price_cents: row.integer("unit_price_cents")?,
        total_price_cents: row.integer("total_price_cents")?,
        product_name: row.opt_text("product_name")?,
        barcode: row.opt_text("barcode")?,
    })
}
