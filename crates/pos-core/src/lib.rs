//! # pos-core: Pure Business Logic for Ridge POS
//!
//! This crate is the **heart** of Ridge POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Ridge POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                 HTTP API (apps/server, axum)                  │  │
//! │  │    POST /api/sales, GET /api/products, /api/settings ...      │  │
//! │  └──────────────────────────────┬────────────────────────────────┘  │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐  │
//! │  │                ★ pos-core (THIS CRATE) ★                      │  │
//! │  │                                                               │  │
//! │  │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐     │  │
//! │  │  │  types   │  │  money   │  │ pricing  │  │ validation │     │  │
//! │  │  │ Product  │  │  Money   │  │ checkout │  │   rules    │     │  │
//! │  │  │  Sale    │  │ VatRate  │  │   math   │  │   checks   │     │  │
//! │  │  └──────────┘  └──────────┘  └──────────┘  └────────────┘     │  │
//! │  │                                                               │  │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │  │
//! │  └──────────────────────────────┬────────────────────────────────┘  │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐  │
//! │  │                  pos-db (Persistence Layer)                   │  │
//! │  │     Gateway (SQLite / remote), repositories, checkout engine  │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the pricing pipeline is deterministic —
//!    same cart, same receipt
//! 2. **No I/O**: database, network and file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use error::{CheckoutError, CheckoutResult, ValidationError};
pub use money::{Money, VatRate};
pub use pricing::{price_checkout, CartLine, PricedCheckout};
pub use types::*;
pub use validation::RequestedItem;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Settings keys consulted for the VAT rate, in resolution order.
///
/// `tax_rate` is a legacy key kept for databases seeded by earlier
/// releases; it is resolved at exactly one call site in the checkout
/// engine, never duplicated per request path.
pub const VAT_RATE_KEYS: &[&str] = &["vat_rate", "tax_rate"];

/// Note attached to the payment row written at sale creation.
pub const INITIAL_PAYMENT_NOTE: &str = "Initial payment";
