//! # Sales Reporting
//!
//! Aggregate queries over sales history. All money aggregates stay in
//! integer cents (SUM over INTEGER columns); only averages are REAL.
//!
//! ## Report Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  summary          totals + payment breakdown + top products + daily │
//! │  period           revenue grouped by day / ISO week / month / year  │
//! │  product_history  every sale line that touched one product          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::error::{DbError, DbResult};
use crate::gateway::{query_one, Gateway, SqlValue, Statement};

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Default)]
pub struct SummaryTotals {
    pub sales_count: i64,
    pub revenue_cents: i64,
    pub vat_cents: i64,
    pub discount_cents: i64,
    /// Mean sale total; fractional cents are meaningful here.
    pub average_sale_cents: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentBreakdown {
    pub payment_method: String,
    pub sales_count: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyPoint {
    pub day: String,
    pub sales_count: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub totals: SummaryTotals,
    pub payment_methods: Vec<PaymentBreakdown>,
    pub top_products: Vec<TopProduct>,
    pub daily: Vec<DailyPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodRow {
    pub period: String,
    pub sales_count: i64,
    pub revenue_cents: i64,
    pub vat_cents: i64,
    pub discount_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductHistoryRow {
    pub sale_id: i64,
    pub created_at: String,
    pub cashier_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

/// Grouping granularity for period reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ReportPeriod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(ReportPeriod::Daily),
            "weekly" => Some(ReportPeriod::Weekly),
            "monthly" => Some(ReportPeriod::Monthly),
            "yearly" => Some(ReportPeriod::Yearly),
            _ => None,
        }
    }

    /// SQLite strftime pattern producing the group key.
    const fn strftime(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "%Y-%m-%d",
            ReportPeriod::Weekly => "%Y-W%W",
            ReportPeriod::Monthly => "%Y-%m",
            ReportPeriod::Yearly => "%Y",
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

pub struct ReportsRepository {
    gateway: Arc<dyn Gateway>,
}

impl ReportsRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        ReportsRepository { gateway }
    }

    /// The dashboard summary over an optional date range. Cancelled
    /// sales are excluded from every aggregate.
    pub async fn summary(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<SalesSummary> {
        let (range_sql, range_params) = date_range("s.created_at", start_date, end_date);

        let totals_row = query_one(
            self.gateway.as_ref(),
            Statement {
                sql: format!(
                    "SELECT COUNT(*) AS sales_count, \
                     COALESCE(SUM(s.total_cents), 0) AS revenue_cents, \
                     COALESCE(SUM(s.vat_cents), 0) AS vat_cents, \
                     COALESCE(SUM(s.discount_cents), 0) AS discount_cents, \
                     COALESCE(AVG(s.total_cents), 0) AS average_sale_cents \
                     FROM sales s WHERE s.status != 'cancelled'{range_sql}"
                ),
                params: range_params.clone(),
            },
        )
        .await?
        .ok_or_else(|| DbError::Internal("summary aggregate returned no row".to_string()))?;

        let totals = SummaryTotals {
            sales_count: totals_row.integer("sales_count")?,
            revenue_cents: totals_row.integer("revenue_cents")?,
            vat_cents: totals_row.integer("vat_cents")?,
            discount_cents: totals_row.integer("discount_cents")?,
            average_sale_cents: totals_row.opt_number("average_sale_cents")?.unwrap_or(0.0),
        };

        let method_rows = self
            .gateway
            .query(Statement {
                sql: format!(
                    "SELECT s.payment_method, COUNT(*) AS sales_count, \
                     COALESCE(SUM(s.total_cents), 0) AS total_cents \
                     FROM sales s WHERE s.status != 'cancelled'{range_sql} \
                     GROUP BY s.payment_method ORDER BY total_cents DESC"
                ),
                params: range_params.clone(),
            })
            .await?;
        let payment_methods = method_rows
            .iter()
            .map(|row| {
                Ok(PaymentBreakdown {
                    payment_method: row.text("payment_method")?,
                    sales_count: row.integer("sales_count")?,
                    total_cents: row.integer("total_cents")?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        let product_rows = self
            .gateway
            .query(Statement {
                sql: format!(
                    "SELECT si.product_id, COALESCE(p.name, 'Deleted product') AS name, \
                     SUM(si.quantity) AS quantity_sold, \
                     SUM(si.total_price_cents) AS revenue_cents \
                     FROM sale_items si \
                     JOIN sales s ON s.id = si.sale_id \
                     LEFT JOIN products p ON p.id = si.product_id \
                     WHERE s.status != 'cancelled'{range_sql} \
                     GROUP BY si.product_id ORDER BY quantity_sold DESC LIMIT 10"
                ),
                params: range_params.clone(),
            })
            .await?;
        let top_products = product_rows
            .iter()
            .map(|row| {
                Ok(TopProduct {
                    product_id: row.integer("product_id")?,
                    name: row.text("name")?,
                    quantity_sold: row.integer("quantity_sold")?,
                    revenue_cents: row.integer("revenue_cents")?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        let daily_rows = self
            .gateway
            .query(Statement {
                sql: format!(
                    "SELECT strftime('%Y-%m-%d', s.created_at) AS day, \
                     COUNT(*) AS sales_count, \
                     COALESCE(SUM(s.total_cents), 0) AS revenue_cents \
                     FROM sales s WHERE s.status != 'cancelled'{range_sql} \
                     GROUP BY day ORDER BY day DESC LIMIT 30"
                ),
                params: range_params,
            })
            .await?;
        let daily = daily_rows
            .iter()
            .map(|row| {
                Ok(DailyPoint {
                    day: row.text("day")?,
                    sales_count: row.integer("sales_count")?,
                    revenue_cents: row.integer("revenue_cents")?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(SalesSummary {
            totals,
            payment_methods,
            top_products,
            daily,
        })
    }

    /// Revenue grouped by the requested period granularity.
    pub async fn period(
        &self,
        period: ReportPeriod,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<Vec<PeriodRow>> {
        let (range_sql, range_params) = date_range("s.created_at", start_date, end_date);
        let pattern = period.strftime();

        let rows = self
            .gateway
            .query(Statement {
                sql: format!(
                    "SELECT strftime('{pattern}', s.created_at) AS period, \
                     COUNT(*) AS sales_count, \
                     COALESCE(SUM(s.total_cents), 0) AS revenue_cents, \
                     COALESCE(SUM(s.vat_cents), 0) AS vat_cents, \
                     COALESCE(SUM(s.discount_cents), 0) AS discount_cents \
                     FROM sales s WHERE s.status != 'cancelled'{range_sql} \
                     GROUP BY period ORDER BY period DESC"
                ),
                params: range_params,
            })
            .await?;

        rows.iter()
            .map(|row| {
                Ok(PeriodRow {
                    period: row.text("period")?,
                    sales_count: row.integer("sales_count")?,
                    revenue_cents: row.integer("revenue_cents")?,
                    vat_cents: row.integer("vat_cents")?,
                    discount_cents: row.integer("discount_cents")?,
                })
            })
            .collect()
    }

    /// Every sale line for one product, newest first.
    pub async fn product_history(&self, product_id: i64) -> DbResult<Vec<ProductHistoryRow>> {
        let rows = self
            .gateway
            .query(
                Statement::new(
                    "SELECT si.sale_id, s.created_at, u.full_name AS cashier_name, \
                     si.quantity, si.unit_price_cents, si.total_price_cents \
                     FROM sale_items si \
                     JOIN sales s ON s.id = si.sale_id \
                     LEFT JOIN users u ON u.id = s.cashier_id \
                     WHERE si.product_id = ? \
                     ORDER BY s.created_at DESC, si.id DESC",
                )
                .bind(product_id),
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(ProductHistoryRow {
                    sale_id: row.integer("sale_id")?,
                    created_at: row.text("created_at")?,
                    cashier_name: row.opt_text("cashier_name")?,
                    quantity: row.integer("quantity")?,
                    unit_price_cents: row.integer("unit_price_cents")?,
                    total_price_cents: row.integer("total_price_cents")?,
                })
            })
            .collect()
    }
}

/// Builds an optional inclusive date-range clause over `column`.
fn date_range(
    column: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> (String, Vec<SqlValue>) {
    let mut sql = String::new();
    let mut params = Vec::new();
    if let Some(start) = start_date {
        sql.push_str(&format!(" AND DATE({column}) >= DATE(?)"));
        params.push(start.into());
    }
    if let Some(end) = end_date {
        sql.push_str(&format!(" AND DATE({column}) <= DATE(?)"));
        params.push(end.into());
    }
    (sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse() {
        assert_eq!(ReportPeriod::parse("daily"), Some(ReportPeriod::Daily));
        assert_eq!(ReportPeriod::parse("weekly"), Some(ReportPeriod::Weekly));
        assert_eq!(ReportPeriod::parse("monthly"), Some(ReportPeriod::Monthly));
        assert_eq!(ReportPeriod::parse("yearly"), Some(ReportPeriod::Yearly));
        assert_eq!(ReportPeriod::parse("hourly"), None);
    }

    #[test]
    fn test_date_range_clause() {
        let (sql, params) = date_range("s.created_at", Some("2026-08-01"), None);
        assert_eq!(sql, " AND DATE(s.created_at) >= DATE(?)");
        assert_eq!(params.len(), 1);

        let (sql, params) = date_range("s.created_at", None, None);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }
}
