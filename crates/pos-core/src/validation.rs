//! # Validation Module
//!
//! Request-level validation helpers, run before any business logic or
//! datastore access. Violations here are side-effect-free by
//! construction: nothing has been written yet.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// One requested line item, as received from the client.
///
/// Only the product id and quantity are accepted; prices always come
/// from the catalog to prevent price tampering.
#[derive(Debug, Clone, Copy)]
pub struct RequestedItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// Validates the requested line items of a sale.
///
/// ## Rules
/// - The list must be non-empty
/// - Every product id must be positive
/// - Every quantity must be a positive integer
pub fn validate_items(items: &[RequestedItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required("Items"));
    }
    for item in items {
        if item.product_id <= 0 || item.quantity <= 0 {
            return Err(ValidationError::InvalidItemData);
        }
    }
    Ok(())
}

/// Validates a product name for catalog writes.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required("Name"));
    }
    Ok(())
}

/// Validates a price in cents for catalog writes. Zero is allowed
/// (free items); negatives are not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::NegativeAmount { field: "price" });
    }
    Ok(())
}

/// Validates a stock level for catalog writes.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::NegativeAmount { field: "stock" });
    }
    Ok(())
}

/// Clamps pagination parameters to sane bounds.
///
/// ## Returns
/// `(page, limit, offset)` with `page >= 1` and `1 <= limit <= 200`.
pub fn clamp_pagination(page: i64, limit: i64) -> (i64, i64, i64) {
    let page = page.max(1);
    let limit = limit.clamp(1, 200);
    (page, limit, (page - 1) * limit)
}
