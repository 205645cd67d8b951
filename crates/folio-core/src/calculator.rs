//! # Invoice Calculator
//!
//! Per-line and aggregate totals for an invoice.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each LineItem (in order)                                           │
//! │      net_total    = quantity × unit_price                               │
//! │      tax_amount   = net_total × tax_rate_percent / 100                  │
//! │      gross_amount = net_total + tax_amount                              │
//! │                                                                         │
//! │  subtotal    = Σ net_total        ┐                                     │
//! │  tax_total   = Σ tax_amount       ├─ full precision, no rounding        │
//! │  grand_total = subtotal + tax_total┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure. Inputs are taken literally: a negative
//! quantity produces a negative line. Reject bad input with
//! [`crate::validation::validate_line_items`] before calling in.
//!
//! ## Example
//! ```rust
//! use folio_core::calculator::compute_invoice;
//! use folio_core::LineItem;
//!
//! let items = vec![LineItem::new("Service", 2.0, 100.0, 15.0)];
//! let invoice = compute_invoice(&items);
//!
//! assert_eq!(invoice.lines[0].gross_amount.to_string(), "230.00");
//! assert_eq!(invoice.totals.grand_total.to_string(), "230.00");
//! ```

use crate::amount::Amount;
use crate::types::{InvoiceComputation, InvoiceTotals, LineComputation, LineItem};

/// Computes the derived figures for a single line.
pub fn compute_line(item: &LineItem) -> LineComputation {
    let net_total = item.unit_price * item.quantity;
    let tax_amount = net_total.percent(item.tax_rate_percent);

    LineComputation {
        net_total,
        tax_amount,
        gross_amount: net_total + tax_amount,
    }
}

/// Aggregates already-computed lines into invoice totals.
pub fn compute_totals(lines: &[LineComputation]) -> InvoiceTotals {
    let subtotal: Amount = lines.iter().map(|l| l.net_total).sum();
    let tax_total: Amount = lines.iter().map(|l| l.tax_amount).sum();

    InvoiceTotals {
        subtotal,
        tax_total,
        grand_total: subtotal + tax_total,
    }
}

/// Computes every line and the invoice totals.
pub fn compute_invoice(items: &[LineItem]) -> InvoiceComputation {
    let lines: Vec<LineComputation> = items.iter().map(compute_line).collect();
    let totals = compute_totals(&lines);
    InvoiceComputation { lines, totals }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_line_reference_values() {
        let item = LineItem::new("Service", 2.0, 100.0, 15.0);
        let line = compute_line(&item);

        assert_eq!(line.net_total, Amount::new(200.0));
        assert_eq!(line.tax_amount, Amount::new(30.0));
        assert_eq!(line.gross_amount, Amount::new(230.0));

        let invoice = compute_invoice(&[item]);
        assert_eq!(invoice.totals.subtotal, Amount::new(200.0));
        assert_eq!(invoice.totals.tax_total, Amount::new(30.0));
        assert_eq!(invoice.totals.grand_total, Amount::new(230.0));
    }

    #[test]
    fn test_empty_invoice_is_all_zero() {
        let invoice = compute_invoice(&[]);
        assert!(invoice.lines.is_empty());
        assert!(invoice.totals.subtotal.is_zero());
        assert!(invoice.totals.tax_total.is_zero());
        assert!(invoice.totals.grand_total.is_zero());
    }

    #[test]
    fn test_lines_keep_input_order() {
        let items = vec![
            LineItem::new("Labour", 1.5, 450.0, 15.0),
            LineItem::new("Oil filter", 1.0, 89.99, 15.0),
            LineItem::new("Disposal", 1.0, 20.0, 0.0),
        ];
        let invoice = compute_invoice(&items);

        assert_eq!(invoice.lines.len(), 3);
        assert_eq!(invoice.lines[0].net_total.to_string(), "675.00");
        assert_eq!(invoice.lines[1].tax_amount.to_string(), "13.50");
        assert!(invoice.lines[2].tax_amount.is_zero());
        assert_eq!(invoice.totals.subtotal.to_string(), "784.99");
    }

    #[test]
    fn test_no_mid_calculation_rounding() {
        // 0.333... per line; rounding each line first would give 0.99
        let items: Vec<LineItem> = (0..3)
            .map(|_| LineItem::new("Third", 1.0, 1.0 / 3.0, 0.0))
            .collect();
        let invoice = compute_invoice(&items);
        assert_eq!(invoice.totals.grand_total.to_string(), "1.00");
    }

    #[test]
    fn test_values_taken_literally() {
        // Validation is the caller's job; the calculator does not clamp.
        let item = LineItem::new("Credit", -1.0, 50.0, 120.0);
        let line = compute_line(&item);
        assert_eq!(line.net_total, Amount::new(-50.0));
        assert_eq!(line.tax_amount, Amount::new(-60.0));
    }

    fn line_item_strategy() -> impl Strategy<Value = LineItem> {
        (0.0f64..1_000.0, 0.0f64..100_000.0, 0.0f64..=100.0)
            .prop_map(|(qty, price, rate)| LineItem::new("item", qty, price, rate))
    }

    proptest! {
        #[test]
        fn prop_grand_total_is_subtotal_plus_tax(items in prop::collection::vec(line_item_strategy(), 0..50)) {
            let invoice = compute_invoice(&items);
            let totals = invoice.totals;
            prop_assert_eq!(totals.grand_total, totals.subtotal + totals.tax_total);
        }

        #[test]
        fn prop_subtotal_matches_line_nets(items in prop::collection::vec(line_item_strategy(), 0..50)) {
            let invoice = compute_invoice(&items);
            let summed: Amount = invoice.lines.iter().map(|l| l.net_total).sum();
            prop_assert!(invoice.totals.subtotal.approx_eq(summed));
        }

        #[test]
        fn prop_grand_total_matches_line_gross(items in prop::collection::vec(line_item_strategy(), 0..50)) {
            let invoice = compute_invoice(&items);
            let gross: Amount = invoice.lines.iter().map(|l| l.gross_amount).sum();
            prop_assert!(invoice.totals.grand_total.approx_eq(gross));
        }
    }
}
