//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A receipt total that is off by a fraction of a cent is a real      │
//! │  bookkeeping defect, not a cosmetic one.                            │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    Every amount in the system is an i64 count of the smallest       │
//! │    currency unit. Rounding happens exactly once, at VAT time.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pos_core::money::{Money, VatRate};
//!
//! let subtotal = Money::from_cents(2000);       // 20.00
//! let vat = subtotal.vat_at(VatRate::from_bps(1200)); // 12%
//! assert_eq!(vat.cents(), 240);                 // 2.40
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: change calculations subtract freely before clamping
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde transparent**: serializes as a plain integer in JSON
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1000); // 10.00
    /// assert_eq!(unit_price.times(2).cents(), 2000);
    /// ```
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Calculates VAT on this amount, rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math throughout: `(amount * bps + 5000) / 10000`.
    /// The `+5000` term is the rounding offset (5000/10000 = 0.5).
    /// i128 intermediates prevent overflow on large carts.
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::money::{Money, VatRate};
    ///
    /// // 15.00 at 12% = 1.80
    /// let base = Money::from_cents(1500);
    /// assert_eq!(base.vat_at(VatRate::from_bps(1200)).cents(), 180);
    /// ```
    pub fn vat_at(&self, rate: VatRate) -> Money {
        let vat = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(vat as i64)
    }

    /// Clamps negative values to zero.
    ///
    /// Used for change: `(tendered - total).floor_zero()`.
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

/// Debug-friendly display: "20.00", "-5.50".
///
/// Currency symbols are a presentation concern and come from the
/// `currency` setting, not from this type.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. 1200 bps = 12%. Storing the rate as
/// an integer keeps the whole pricing pipeline float-free.
///
/// The settings table stores the rate as a percent string ("12.0");
/// [`VatRate::parse_percent`] is the single place that string is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatRate(u32);

impl VatRate {
    /// Creates a VAT rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// Parses a percent string from settings ("12.0" → 1200 bps).
    ///
    /// Unparseable or negative input falls back to zero, matching the
    /// behaviour of a missing setting: a misconfigured rate must never
    /// block checkout.
    pub fn parse_percent(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(pct) if pct > 0.0 => VatRate((pct * 100.0).round() as u32),
            _ => VatRate(0),
        }
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero VAT rate.
    #[inline]
    pub const fn zero() -> Self {
        VatRate(0)
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(2240)), "22.40");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.times(3).cents(), 3000);
    }

    #[test]
    fn test_vat_basic() {
        // 20.00 at 12% = 2.40 exactly
        let amount = Money::from_cents(2000);
        assert_eq!(amount.vat_at(VatRate::from_bps(1200)).cents(), 240);
    }

    #[test]
    fn test_vat_with_rounding() {
        // 10.00 at 8.25% = 0.825 → rounds to 0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.vat_at(VatRate::from_bps(825)).cents(), 83);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_cents(-260).floor_zero().cents(), 0);
        assert_eq!(Money::from_cents(260).floor_zero().cents(), 260);
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(VatRate::parse_percent("12.0").bps(), 1200);
        assert_eq!(VatRate::parse_percent("8.25").bps(), 825);
        assert_eq!(VatRate::parse_percent("0").bps(), 0);
        // Garbage and negatives fall back to zero instead of failing checkout
        assert_eq!(VatRate::parse_percent("twelve").bps(), 0);
        assert_eq!(VatRate::parse_percent("-3").bps(), 0);
    }
}
