//! # Error Types
//!
//! Domain-specific error types for pos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  pos-core errors (this file)                                        │
//! │  ├── CheckoutError    - Sale pricing / stock / tender failures      │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  pos-db errors (separate crate)                                     │
//! │  └── DbError          - Gateway / datastore failures                │
//! │                                                                     │
//! │  HTTP errors (in server app)                                        │
//! │  └── ApiError         - What clients see ({"error": "..."})         │
//! │                                                                     │
//! │  Flow: ValidationError → CheckoutError → ApiError → client          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, counts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Checkout Error
// =============================================================================

/// Business errors raised while pricing or committing a sale.
///
/// Every variant here maps to an HTTP 400 at the API boundary: the request
/// was well-formed transport-wise but violates a business rule.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A requested product id does not exist in the catalog.
    #[error("Product with ID {0} not found")]
    ProductNotFound(i64),

    /// Requested quantity exceeds current catalog stock.
    ///
    /// ## When This Occurs
    /// - Pre-commit validation sees `stock < quantity`
    /// - The conditional stock decrement affects zero rows because a
    ///   concurrent sale took the remaining units first
    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cash tender is below the total on a sale that would complete.
    #[error("Insufficient payment")]
    InsufficientPayment,

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when request input doesn't meet requirements and are
/// checked before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// A line item has a missing product id or non-positive quantity.
    #[error("Invalid item data")]
    InvalidItemData,

    /// Payment method is not one of cash/card/digital.
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// A monetary amount is negative where it must not be.
    #[error("{field} cannot be negative")]
    NegativeAmount { field: &'static str },

    /// Discount exceeds the cart subtotal.
    #[error("Discount cannot exceed subtotal")]
    DiscountExceedsSubtotal,

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================
