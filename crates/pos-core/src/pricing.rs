//! # Checkout Pricing
//!
//! The deterministic pricing algorithm for a sale. Pure function: the
//! checkout engine in pos-db fetches catalog prices and the VAT rate,
//! then delegates all arithmetic and tender policy here.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  subtotal  = Σ unit_price × quantity     (catalog prices only —     │
//! │                                           client prices are never   │
//! │                                           trusted)                  │
//! │  vat       = (subtotal − discount) × rate                           │
//! │  total     = subtotal − discount + vat                              │
//! │                                                                     │
//! │  Discount is applied BEFORE VAT: it reduces the VAT base.           │
//! │  This is a deliberate policy choice, not incidental.                │
//! │                                                                     │
//! │  amount_paid = caller-supplied, else total (full payment)           │
//! │  status      = pending  iff amount_paid < total                     │
//! │  change      = max(0, tendered − total)  only on completed sales    │
//! │                with cash tender supplied; a partially-paid balance  │
//! │                never produces change                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, CheckoutResult, ValidationError};
use crate::money::{Money, VatRate};
use crate::types::{PaymentMethod, SaleStatus};

/// One validated cart line with its catalog price snapshot.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Current catalog price, captured by the engine at validation time.
    pub unit_price: Money,
}

impl CartLine {
    /// quantity × unit price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// The computed monetary outcome of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedCheckout {
    pub subtotal: Money,
    pub discount: Money,
    pub vat: Money,
    pub total: Money,
    pub amount_paid: Money,
    pub status: SaleStatus,
    pub change: Money,
}

/// Prices a cart and decides settlement status.
///
/// ## Arguments
/// * `lines` - validated cart lines (non-empty, positive quantities)
/// * `discount` - absolute discount in cents, applied before VAT
/// * `vat_rate` - resolved from settings by the engine
/// * `method` - payment method (tender policy differs for cash)
/// * `payment_received` - cash handed over, when supplied
/// * `amount_paid` - explicit partial payment; `None` means paid in full
///
/// ## Errors
/// * `ValidationError` - empty cart, non-positive quantity, negative or
///   oversized discount, negative tender
/// * `CheckoutError::InsufficientPayment` - cash tender below total on a
///   sale that would complete
pub fn price_checkout(
    lines: &[CartLine],
    discount: Money,
    vat_rate: VatRate,
    method: PaymentMethod,
    payment_received: Option<Money>,
    amount_paid: Option<Money>,
) -> CheckoutResult<PricedCheckout> {
    if lines.is_empty() {
        return Err(ValidationError::Required("Items").into());
    }
    if lines.iter().any(|line| line.quantity <= 0) {
        return Err(ValidationError::InvalidItemData.into());
    }
    if discount.is_negative() {
        return Err(ValidationError::NegativeAmount { field: "discount_amount" }.into());
    }
    if let Some(received) = payment_received {
        if received.is_negative() {
            return Err(ValidationError::NegativeAmount { field: "payment_received" }.into());
        }
    }
    if let Some(paid) = amount_paid {
        if paid.is_negative() {
            return Err(ValidationError::NegativeAmount { field: "amount_paid" }.into());
        }
    }

    let subtotal = lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());

    // A discount larger than the subtotal would drive the VAT base
    // negative; reject rather than issue a negative-total receipt.
    if discount > subtotal {
        return Err(ValidationError::DiscountExceedsSubtotal.into());
    }

    let vat = (subtotal - discount).vat_at(vat_rate);
    let total = subtotal - discount + vat;

    // Default to full payment when the caller does not ask for a
    // partial (down-payment) sale.
    let amount_paid = amount_paid.unwrap_or(total);
    let status = if amount_paid < total {
        SaleStatus::Pending
    } else {
        SaleStatus::Completed
    };

    // Cash tender must cover the total on a sale that completes.
    // Card/digital tender is trusted as-is.
    if method == PaymentMethod::Cash && status == SaleStatus::Completed {
        if let Some(received) = payment_received {
            if received < total {
                return Err(CheckoutError::InsufficientPayment);
            }
        }
    }

    let change = match (status, payment_received) {
        (SaleStatus::Completed, Some(received)) => (received - total).floor_zero(),
        _ => Money::zero(),
    };

    Ok(PricedCheckout {
        subtotal,
        discount,
        vat,
        total,
        amount_paid,
        status,
        change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_cart() -> Vec<CartLine> {
        // Widget: price 10.00, qty 2
        vec![CartLine {
            product_id: 1,
            quantity: 2,
            unit_price: Money::from_cents(1000),
        }]
    }

    fn twelve_percent() -> VatRate {
        VatRate::from_bps(1200)
    }

    #[test]
    fn exact_cash_tender_completes_with_no_change() {
        // subtotal 20.00, vat 2.40, total 22.40, tendered 22.40
        let priced = price_checkout(
            &widget_cart(),
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Cash,
            Some(Money::from_cents(2240)),
            None,
        )
        .unwrap();

        assert_eq!(priced.subtotal.cents(), 2000);
        assert_eq!(priced.vat.cents(), 240);
        assert_eq!(priced.total.cents(), 2240);
        assert_eq!(priced.change.cents(), 0);
        assert_eq!(priced.status, SaleStatus::Completed);
    }

    #[test]
    fn overpayment_returns_change() {
        let priced = price_checkout(
            &widget_cart(),
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Cash,
            Some(Money::from_cents(2500)),
            None,
        )
        .unwrap();

        assert_eq!(priced.change.cents(), 260);
        assert_eq!(priced.status, SaleStatus::Completed);
    }

    #[test]
    fn explicit_partial_payment_goes_pending_without_change() {
        let priced = price_checkout(
            &widget_cart(),
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Cash,
            None,
            Some(Money::from_cents(1000)),
        )
        .unwrap();

        assert_eq!(priced.status, SaleStatus::Pending);
        assert_eq!(priced.amount_paid.cents(), 1000);
        // No change is ever computed against a partially-paid balance
        assert_eq!(priced.change.cents(), 0);
    }

    #[test]
    fn discount_reduces_vat_base() {
        // (20.00 - 5.00) * 12% = 1.80, total 16.80
        let priced = price_checkout(
            &widget_cart(),
            Money::from_cents(500),
            twelve_percent(),
            PaymentMethod::Cash,
            Some(Money::from_cents(1680)),
            None,
        )
        .unwrap();

        assert_eq!(priced.vat.cents(), 180);
        assert_eq!(priced.total.cents(), 1680);
    }

    #[test]
    fn insufficient_cash_tender_is_rejected() {
        let err = price_checkout(
            &widget_cart(),
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Cash,
            Some(Money::from_cents(2000)),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, CheckoutError::InsufficientPayment));
    }

    #[test]
    fn card_tender_is_not_validated_against_total() {
        // Trust the caller for card/digital: no tender check
        let priced = price_checkout(
            &widget_cart(),
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Card,
            Some(Money::from_cents(1)),
            None,
        )
        .unwrap();
        assert_eq!(priced.status, SaleStatus::Completed);
    }

    #[test]
    fn partial_cash_sale_skips_tender_check() {
        // Pending sales never hit the insufficient-payment rule
        let priced = price_checkout(
            &widget_cart(),
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Cash,
            Some(Money::from_cents(1000)),
            Some(Money::from_cents(1000)),
        )
        .unwrap();
        assert_eq!(priced.status, SaleStatus::Pending);
        assert_eq!(priced.change.cents(), 0);
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = price_checkout(
            &[],
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Cash,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let lines = vec![CartLine {
            product_id: 1,
            quantity: 0,
            unit_price: Money::from_cents(1000),
        }];
        let err = price_checkout(
            &lines,
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Cash,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::InvalidItemData)
        ));
    }

    #[test]
    fn oversized_discount_is_rejected() {
        let err = price_checkout(
            &widget_cart(),
            Money::from_cents(2001),
            twelve_percent(),
            PaymentMethod::Cash,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::DiscountExceedsSubtotal)
        ));
    }

    #[test]
    fn zero_vat_rate_adds_nothing() {
        let priced = price_checkout(
            &widget_cart(),
            Money::zero(),
            VatRate::zero(),
            PaymentMethod::Digital,
            None,
            None,
        )
        .unwrap();
        assert_eq!(priced.vat.cents(), 0);
        assert_eq!(priced.total.cents(), 2000);
    }

    #[test]
    fn overpaid_amount_still_completes() {
        // amount_paid above total is completed, steady state expects
        // amount_paid ≤ total but creation does not clamp
        let priced = price_checkout(
            &widget_cart(),
            Money::zero(),
            twelve_percent(),
            PaymentMethod::Card,
            None,
            Some(Money::from_cents(3000)),
        )
        .unwrap();
        assert_eq!(priced.status, SaleStatus::Completed);
    }
}
