//! # Domain Types
//!
//! Invoice line and total types shared by the invoice form, the print page
//! and the render service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │ LineComputation  │   │  InvoiceTotals  │       │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │       │
//! │  │  description    │──►│  net_total       │──►│  subtotal       │       │
//! │  │  quantity       │   │  tax_amount      │   │  tax_total      │       │
//! │  │  unit_price     │   │  gross_amount    │   │  grand_total    │       │
//! │  │  tax_rate_%     │   └──────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘        (derived, never persisted)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::amount::Amount;

// =============================================================================
// Line Item
// =============================================================================

/// One billable line on an invoice, as entered on the invoice form.
///
/// The calculator takes these values literally. Range checks live in
/// [`crate::validation`] and run before computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Free-text description ("Description of goods" on the print page).
    #[serde(default)]
    pub description: String,

    /// Quantity; fractional for labour hours.
    pub quantity: f64,

    /// Price of one unit, tax exclusive.
    pub unit_price: Amount,

    /// Tax (VAT) rate as a percentage, 15.0 = 15%.
    #[serde(alias = "vat_rate")]
    pub tax_rate_percent: f64,
}

impl LineItem {
    /// Creates a line item.
    pub fn new(
        description: impl Into<String>,
        quantity: f64,
        unit_price: f64,
        tax_rate_percent: f64,
    ) -> Self {
        LineItem {
            description: description.into(),
            quantity,
            unit_price: Amount::new(unit_price),
            tax_rate_percent,
        }
    }
}

// =============================================================================
// Derived Values
// =============================================================================

/// Derived per-line figures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineComputation {
    /// quantity × unit_price
    pub net_total: Amount,

    /// net_total × tax_rate_percent / 100
    pub tax_amount: Amount,

    /// net_total + tax_amount
    pub gross_amount: Amount,
}

/// Derived invoice-level figures.
///
/// ## Invariant
/// `grand_total` equals the sum of every line's `gross_amount` within
/// [`crate::amount::PRESENTATION_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    /// Σ net_total
    pub subtotal: Amount,

    /// Σ tax_amount
    pub tax_total: Amount,

    /// subtotal + tax_total
    pub grand_total: Amount,
}

/// Result of computing a whole invoice: one entry per input line, in order,
/// plus the aggregate totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceComputation {
    pub lines: Vec<LineComputation>,
    pub totals: InvoiceTotals,
}

impl InvoiceComputation {
    /// Returns the presentation strings for the totals box on the print page.
    pub fn display(&self, currency_symbol: &str) -> TotalsDisplay {
        TotalsDisplay {
            subtotal: self.totals.subtotal.format_with(currency_symbol),
            tax_total: self.totals.tax_total.format_with(currency_symbol),
            grand_total: self.totals.grand_total.format_with(currency_symbol),
        }
    }
}

/// Totals rounded once and formatted for display ("R230.00").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub tax_total: String,
    pub grand_total: String,
}
