//! # Amount Module
//!
//! Provides the `Amount` type for monetary values on an invoice.
//!
//! ## Round Once, At The End
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE COMPOUNDING ROUNDING PROBLEM                                       │
//! │                                                                         │
//! │  Rounding every line before summing:                                    │
//! │    3 lines × 0.333... rounded to 0.33  → 0.99  ❌ drifts by a cent      │
//! │                                                                         │
//! │  Aggregating in full precision, rounding the displayed figure:          │
//! │    0.333... + 0.333... + 0.333... = 1.00  ✅                            │
//! │                                                                         │
//! │  Quantities are fractional (labour hours) and tax is a percentage,     │
//! │  so values are carried as f64 and rounded to 2 decimals only when      │
//! │  they are shown.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use folio_core::amount::Amount;
//!
//! let price = Amount::new(10.5);
//! let line = price * 3.0;                 // 31.50
//! let total = line + Amount::new(0.005);  // 31.505 internally
//!
//! assert_eq!(total.to_string(), "31.51");
//! assert_eq!(total.format_with("R"), "R31.51");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// Currency symbol used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "R";

/// Largest difference two presented figures may have and still be equal.
pub const PRESENTATION_TOLERANCE: f64 = 0.01;

// =============================================================================
// Amount Type
// =============================================================================

/// A monetary value in major currency units, kept at full precision.
///
/// ## Design Decisions
/// - **f64**: quantities and tax rates are decimals, so intermediate values
///   are fractional cents; nothing is truncated mid-calculation
/// - **Transparent serde**: serializes as a plain JSON number
/// - **Presentation methods**: `rounded`, `Display`, `format_with`
///
/// ## Where Amount is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LineItem.quantity × LineItem.unit_price ──► LineComputation.net_total  │
/// │                                                    │                    │
/// │                          × tax_rate_percent / 100 ─┴─► tax_amount       │
/// │                                                                         │
/// │  Σ net_total ──► InvoiceTotals.subtotal ─┐                              │
/// │  Σ tax_amount ─► InvoiceTotals.tax_total ┴─► grand_total                │
/// │                                                                         │
/// │  Only the print page / API response rounds: "R230.00"                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Amount(f64);

impl Amount {
    /// Creates an amount from a value in major units.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Amount(value)
    }

    /// Returns the zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Amount(0.0)
    }

    /// Returns the full-precision value.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Checks if the value is exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Returns the value rounded to two decimals (half away from zero).
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::amount::Amount;
    ///
    /// assert_eq!(Amount::new(2.675).rounded(), 2.68);
    /// assert_eq!(Amount::new(-1.235).rounded(), -1.24);
    /// ```
    ///
    /// The `1e-9` nudge absorbs binary representation error so that values
    /// such as `2.675` (stored as `2.67499999...`) round the way they read.
    pub fn rounded(&self) -> f64 {
        let scaled = self.0 * 100.0;
        let nudged = scaled + scaled.signum() * 1e-9;
        let rounded = nudged.round() / 100.0;
        // Collapse -0.0 so it never prints as "-0.00"
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    /// Returns `rate_percent` percent of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::amount::Amount;
    ///
    /// let net = Amount::new(200.0);
    /// assert_eq!(net.percent(15.0), Amount::new(30.0));
    /// ```
    #[inline]
    pub fn percent(&self, rate_percent: f64) -> Amount {
        Amount(self.0 * rate_percent / 100.0)
    }

    /// Checks whether two amounts agree within the presentation tolerance.
    #[inline]
    pub fn approx_eq(&self, other: Amount) -> bool {
        (self.0 - other.0).abs() <= PRESENTATION_TOLERANCE
    }

    /// Formats the rounded value with a currency symbol prefix.
    ///
    /// ## Example
    /// ```rust
    /// use folio_core::amount::Amount;
    ///
    /// assert_eq!(Amount::new(1099.5).format_with("R"), "R1099.50");
    /// assert_eq!(Amount::new(-5.5).format_with("$"), "-$5.50");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let rounded = self.rounded();
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{}{}{:.2}", sign, symbol, rounded.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the two-decimal presentation value without a symbol.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::zero()
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Amount(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Amount(self.0 - other.0)
    }
}

/// Multiplication by a (possibly fractional) quantity.
impl Mul<f64> for Amount {
    type Output = Self;

    #[inline]
    fn mul(self, qty: f64) -> Self {
        Amount(self.0 * qty)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| acc + *a)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_two_decimals() {
        assert_eq!(Amount::new(230.0).to_string(), "230.00");
        assert_eq!(Amount::new(0.125).to_string(), "0.13");
        assert_eq!(Amount::new(10.994).to_string(), "10.99");
        assert_eq!(Amount::zero().to_string(), "0.00");
    }

    #[test]
    fn test_negative_zero_is_not_shown() {
        assert_eq!(Amount::new(-0.001).to_string(), "0.00");
        assert_eq!(Amount::new(-0.001).format_with("R"), "R0.00");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Amount::new(230.0).format_with(DEFAULT_CURRENCY_SYMBOL), "R230.00");
        assert_eq!(Amount::new(-5.5).format_with("$"), "-$5.50");
    }

    #[test]
    fn test_arithmetic_keeps_full_precision() {
        let third = Amount::new(1.0 / 3.0);
        let total: Amount = [third, third, third].iter().sum();
        assert_eq!(total.to_string(), "1.00");

        // Rounding each third first would have lost a cent
        let pre_rounded = Amount::new(third.rounded()) * 3.0;
        assert_eq!(pre_rounded.to_string(), "0.99");
    }

    #[test]
    fn test_percent() {
        assert_eq!(Amount::new(200.0).percent(15.0), Amount::new(30.0));
        assert!(Amount::new(100.0).percent(0.0).is_zero());
    }

    #[test]
    fn test_approx_eq() {
        assert!(Amount::new(1.0).approx_eq(Amount::new(1.009)));
        assert!(!Amount::new(1.0).approx_eq(Amount::new(1.02)));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Amount::new(12.5)).unwrap();
        assert_eq!(json, "12.5");
    }
}
