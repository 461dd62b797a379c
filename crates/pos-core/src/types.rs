//! # Domain Types
//!
//! Core domain types used throughout Ridge POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │    Product    │   │     Sale      │   │    Payment    │          │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │          │
//! │  │  id           │   │  id           │   │  id           │          │
//! │  │  price_cents  │   │  cashier_id   │   │  sale_id (FK) │          │
//! │  │  stock        │   │  total_cents  │   │  amount_cents │          │
//! │  │  min_stock    │   │  status       │   │  notes        │          │
//! │  └───────────────┘   └───────────────┘   └───────────────┘          │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │  SaleStatus   │   │ PaymentMethod │   │     Role      │          │
//! │  │  Completed    │   │  Cash         │   │  Admin        │          │
//! │  │  Pending      │   │  Card         │   │  Cashier      │          │
//! │  │  Cancelled    │   │  Digital      │   └───────────────┘          │
//! │  └───────────────┘   └───────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are carried as the datastore's text representation
//! (`YYYY-MM-DD HH:MM:SS`); the API passes them through unmodified.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Digital,
}

impl PaymentMethod {
    /// Stable datastore / wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Digital => "digital",
        }
    }

    /// Parses the wire representation, rejecting anything unknown.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "digital" => Ok(PaymentMethod::Digital),
            other => Err(ValidationError::InvalidPaymentMethod(other.to_string())),
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The settlement status of a sale.
///
/// Status is decided once, at creation time: `pending` iff the amount
/// paid is below the total. Balance due on a pending sale is *derived*
/// at read time (`total - amount_paid`), never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Fully paid at creation.
    Completed,
    /// Partially paid (down payment); balance outstanding.
    Pending,
    /// Voided after the fact.
    Cancelled,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Pending => "pending",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// User role. Admins see everything; cashiers see their own sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
        }
    }

    /// Parses the datastore representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "cashier" => Some(Role::Cashier),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    /// Barcode (EAN-13, UPC-A, etc.), unique where present.
    pub barcode: Option<String>,
    /// Selling price in cents.
    pub price_cents: i64,
    /// Acquisition cost in cents (for margin reporting).
    pub cost_cents: Option<i64>,
    /// Current stock level. Never negative after a committed sale.
    pub stock: i64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// Low-stock warning threshold.
    pub min_stock: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether stock has fallen to or below the warning threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale transaction.
///
/// Never updated after creation: line items and the initial payment are
/// written atomically alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub cashier_id: i64,
    pub customer_id: Option<i64>,
    /// Grand total: subtotal - discount + VAT.
    pub total_cents: i64,
    pub vat_cents: i64,
    pub discount_cents: i64,
    pub payment_method: PaymentMethod,
    /// Cash handed over by the customer (cash tender only).
    pub payment_received_cents: Option<i64>,
    pub change_cents: i64,
    /// Cumulative payments applied at creation.
    pub amount_paid_cents: i64,
    pub status: SaleStatus,
    pub created_at: String,
    /// Cashier display name, joined from the users table.
    pub cashier_name: Option<String>,
}

impl Sale {
    /// Outstanding balance, derived at read time.
    #[inline]
    pub fn balance_due(&self) -> Money {
        (Money::from_cents(self.total_cents) - Money::from_cents(self.amount_paid_cents))
            .floor_zero()
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: `unit_price_cents` freezes the catalog
/// price at sale time, so historical receipts are immune to future
/// price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Catalog price at sale time (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit_price (frozen).
    pub total_price_cents: i64,
    /// Product name, joined from the products table.
    pub product_name: Option<String>,
    /// Product barcode, joined from the products table.
    pub barcode: Option<String>,
}

// =============================================================================
// Payment
// =============================================================================

/// One settlement event against a sale (append-only ledger).
///
/// The checkout engine only emits the initial payment; later payments
/// against a pending sale are a natural extension of the same table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub sale_id: i64,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: String,
}

// =============================================================================
// Customer
// =============================================================================

/// A simple lookup entity, optionally referenced by a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// =============================================================================
// Setting
// =============================================================================

/// One key/value row from the settings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: String,
}

// =============================================================================
// User
// =============================================================================

/// A user account. The password hash never leaves pos-db.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_round_trip() {
        for method in [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Digital] {
            assert_eq!(PaymentMethod::parse(method.as_str()).unwrap(), method);
        }
        assert!(PaymentMethod::parse("cheque").is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("cashier"), Some(Role::Cashier));
        assert_eq!(Role::parse("root"), None);
        assert!(Role::Admin.is_admin());
        assert!(!Role::Cashier.is_admin());
    }

    #[test]
    fn test_balance_due_is_derived() {
        let sale = Sale {
            id: 1,
            cashier_id: 1,
            customer_id: None,
            total_cents: 2240,
            vat_cents: 240,
            discount_cents: 0,
            payment_method: PaymentMethod::Cash,
            payment_received_cents: None,
            change_cents: 0,
            amount_paid_cents: 1000,
            status: SaleStatus::Pending,
            created_at: "2026-01-01 00:00:00".to_string(),
            cashier_name: None,
        };
        assert_eq!(sale.balance_due().cents(), 1240);
    }

    #[test]
    fn test_low_stock() {
        let mut product = Product {
            id: 1,
            name: "Widget".to_string(),
            sku: None,
            barcode: None,
            price_cents: 1000,
            cost_cents: None,
            stock: 5,
            category: None,
            description: None,
            brand: None,
            min_stock: 5,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(product.is_low_stock());
        product.stock = 6;
        assert!(!product.is_low_stock());
    }
}
