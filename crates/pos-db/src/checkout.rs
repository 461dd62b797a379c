//! # Sale Transaction Engine
//!
//! The one write path for sales. Composes validation and pricing from
//! pos-core with atomic persistence through the gateway.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  1. Validate request        no mutation has happened yet            │
//! │  2. Resolve VAT rate        settings keys: vat_rate, then tax_rate  │
//! │  3. Fetch products          fail-fast on missing / understocked     │
//! │  4. Price (pos-core)        subtotal, discount, VAT, total, change  │
//! │  5. One transaction         sale → initial payment → per item:      │
//! │                             sale_item + conditional stock decrement │
//! │  6. Post-commit reads       joined sale + items + receipt data      │
//! │                                                                     │
//! │  The stock decrement is guarded in SQL:                             │
//! │    UPDATE products SET stock = stock - ?                            │
//! │    WHERE id = ? AND stock >= ?                                      │
//! │  Zero rows affected means another sale won the race; this one       │
//! │  fails with InsufficientStock instead of driving stock negative.    │
//! │                                                                     │
//! │  On the per-statement backend a mid-sequence failure cannot be      │
//! │  rolled back; it surfaces as DbError::PartialCommit naming how many │
//! │  statements were already applied.                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use pos_core::{
    price_checkout, validation::validate_items, CartLine, CheckoutError, Money, PaymentMethod,
    PricedCheckout, RequestedItem, Sale, SaleItem, ValidationError, VatRate,
    INITIAL_PAYMENT_NOTE, VAT_RATE_KEYS,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::DbError;
use crate::gateway::{Gateway, RollbackStatus, Statement, TransactionHandle};
use crate::repository::{SaleRepository, SettingsRepository};

// =============================================================================
// Request / Response Types
// =============================================================================

/// A checkout request, already authenticated (cashier_id comes from the
/// verified token, never from the client body).
#[derive(Debug, Clone)]
pub struct CreateSaleRequest {
    pub cashier_id: i64,
    pub items: Vec<RequestedItem>,
    /// Wire payment method; validated before any datastore access.
    pub payment_method: String,
    /// Cash physically handed over, in cents.
    pub payment_received_cents: Option<i64>,
    /// Absolute discount in cents, applied before VAT.
    pub discount_cents: i64,
    pub customer_id: Option<i64>,
    /// Explicit partial payment in cents; `None` means paid in full.
    pub amount_paid_cents: Option<i64>,
}

/// Receipt numbers echoed back to the terminal for printing.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptData {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub vat_cents: i64,
    pub total_cents: i64,
    pub payment_received_cents: Option<i64>,
    pub change_cents: i64,
}

/// The persisted result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub receipt_data: ReceiptData,
}

/// Why a checkout failed.
#[derive(Debug, Error)]
pub enum CheckoutFailure {
    /// Business rejection: bad input, missing product, stock, tender.
    #[error(transparent)]
    Domain(#[from] CheckoutError),

    /// Persistence failure, including partial commits on the remote
    /// backend.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for CheckoutFailure {
    fn from(err: ValidationError) -> Self {
        CheckoutFailure::Domain(err.into())
    }
}

// =============================================================================
// Engine
// =============================================================================

pub struct CheckoutEngine {
    gateway: Arc<dyn Gateway>,
}

impl CheckoutEngine {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        CheckoutEngine { gateway }
    }

    /// Creates a sale: validates, prices, persists atomically, and
    /// returns the persisted sale with receipt data.
    pub async fn create_sale(
        &self,
        request: CreateSaleRequest,
    ) -> Result<CheckoutOutcome, CheckoutFailure> {
        // 1. Request shape, before touching the datastore.
        validate_items(&request.items)?;
        if request.payment_method.trim().is_empty() {
            return Err(ValidationError::Required("Payment method").into());
        }
        let method = PaymentMethod::parse(&request.payment_method)
            .map_err(CheckoutError::Validation)?;

        // 2. VAT rate, resolved at this single call site.
        let vat_rate = self.resolve_vat_rate().await?;

        // 3. Catalog lookups, fail-fast per item.
        let lines = self.load_cart(&request.items).await?;

        // 4. Pure pricing.
        let priced = price_checkout(
            &lines,
            Money::from_cents(request.discount_cents),
            vat_rate,
            method,
            request.payment_received_cents.map(Money::from_cents),
            request.amount_paid_cents.map(Money::from_cents),
        )?;

        // 5. One transaction for sale + payment + items + stock.
        let sale_id = self.persist(&request, method, &lines, &priced).await?;

        info!(
            sale_id,
            total_cents = priced.total.cents(),
            status = priced.status.as_str(),
            "Sale created"
        );

        // 6. Joined reads for the response.
        let sale_repo = SaleRepository::new(self.gateway.clone());
        let sale = sale_repo.get(sale_id, request.cashier_id, true).await?;
        let items = sale_repo.items_for(sale_id).await?;

        Ok(CheckoutOutcome {
            receipt_data: ReceiptData {
                subtotal_cents: priced.subtotal.cents(),
                discount_cents: priced.discount.cents(),
                vat_cents: priced.vat.cents(),
                total_cents: priced.total.cents(),
                payment_received_cents: request.payment_received_cents,
                change_cents: priced.change.cents(),
            },
            sale,
            items,
        })
    }

    async fn resolve_vat_rate(&self) -> Result<VatRate, CheckoutFailure> {
        let settings = SettingsRepository::new(self.gateway.clone());
        let value = settings.resolve_first(VAT_RATE_KEYS).await?;
        Ok(match value {
            Some(percent) => VatRate::parse_percent(&percent),
            None => VatRate::zero(),
        })
    }

    /// Fetches every requested product and snapshots its price.
    /// The stock check here is advisory (fail fast with a good message);
    /// the authoritative check is the conditional UPDATE inside the
    /// transaction.
    async fn load_cart(
        &self,
        items: &[RequestedItem],
    ) -> Result<Vec<CartLine>, CheckoutFailure> {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let row = crate::gateway::query_one(
                self.gateway.as_ref(),
                Statement::new("SELECT name, price_cents, stock FROM products WHERE id = ?")
                    .bind(item.product_id),
            )
            .await?
            .ok_or(CheckoutError::ProductNotFound(item.product_id))?;

            let stock = row.integer("stock")?;
            if stock < item.quantity {
                return Err(CheckoutError::InsufficientStock {
                    name: row.text("name")?,
                    available: stock,
                    requested: item.quantity,
                }
                .into());
            }

            lines.push(CartLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: Money::from_cents(row.integer("price_cents")?),
            });
        }
        Ok(lines)
    }

    async fn persist(
        &self,
        request: &CreateSaleRequest,
        method: PaymentMethod,
        lines: &[CartLine],
        priced: &PricedCheckout,
    ) -> Result<i64, CheckoutFailure> {
        let mut tx = self.gateway.begin().await?;

        match write_sale(tx.as_mut(), request, method, lines, priced).await {
            Ok(sale_id) => {
                tx.commit().await?;
                Ok(sale_id)
            }
            Err(err) => {
                match tx.rollback().await {
                    Ok(RollbackStatus::RolledBack) => Err(err),
                    Ok(RollbackStatus::NotSupported { statements_applied })
                        if statements_applied > 0 =>
                    {
                        warn!(
                            statements_applied,
                            "Checkout failed mid-sequence on non-transactional backend"
                        );
                        Err(DbError::PartialCommit {
                            statements_applied,
                            cause: err.to_string(),
                        }
                        .into())
                    }
                    // Nothing was applied, or rollback itself failed:
                    // the original error is the one worth reporting.
                    _ => Err(err),
                }
            }
        }
    }
}

/// The statement sequence of one sale, run inside a transaction handle.
async fn write_sale(
    tx: &mut dyn TransactionHandle,
    request: &CreateSaleRequest,
    method: PaymentMethod,
    lines: &[CartLine],
    priced: &PricedCheckout,
) -> Result<i64, CheckoutFailure> {
    let now = crate::now_timestamp();

    let sale = tx
        .execute(
            Statement::new(
                "INSERT INTO sales (cashier_id, customer_id, total_cents, vat_cents, \
                 discount_cents, payment_method, payment_received_cents, change_cents, \
                 amount_paid_cents, status, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(request.cashier_id)
            .bind(request.customer_id)
            .bind(priced.total.cents())
            .bind(priced.vat.cents())
            .bind(priced.discount.cents())
            .bind(method.as_str())
            .bind(request.payment_received_cents)
            .bind(priced.change.cents())
            .bind(priced.amount_paid.cents())
            .bind(priced.status.as_str())
            .bind(now.clone()),
        )
        .await?;
    let sale_id = sale.last_insert_id;

    // Initial payment row, only when money actually changed hands.
    if priced.amount_paid.cents() > 0 {
        tx.execute(
            Statement::new(
                "INSERT INTO payments (sale_id, amount_cents, payment_method, notes, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(sale_id)
            .bind(priced.amount_paid.cents())
            .bind(method.as_str())
            .bind(INITIAL_PAYMENT_NOTE)
            .bind(now.clone()),
        )
        .await?;
    }

    for line in lines {
        tx.execute(
            Statement::new(
                "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price_cents, \
                 total_price_cents) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.line_total().cents()),
        )
        .await?;

        // Conditional decrement: the WHERE clause is the stock check,
        // so concurrent sales of the last unit cannot both commit.
        let decrement = tx
            .execute(
                Statement::new(
                    "UPDATE products SET stock = stock - ?, updated_at = ? \
                     WHERE id = ? AND stock >= ?",
                )
                .bind(line.quantity)
                .bind(now.clone())
                .bind(line.product_id)
                .bind(line.quantity),
            )
            .await?;

        if decrement.rows_affected == 0 {
            // Lost the race since the advisory check. Re-read inside the
            // transaction for an accurate error message.
            let row = tx
                .query(
                    Statement::new("SELECT name, stock FROM products WHERE id = ?")
                        .bind(line.product_id),
                )
                .await?
                .into_iter()
                .next()
                .ok_or(CheckoutError::ProductNotFound(line.product_id))?;

            return Err(CheckoutError::InsufficientStock {
                name: row.text("name")?,
                available: row.integer("stock")?,
                requested: line.quantity,
            }
            .into());
        }
    }

    Ok(sale_id)
}
