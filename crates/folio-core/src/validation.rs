//! # Validation Module
//!
//! Input validation for invoice line items.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Invoice form (TypeScript)                                     │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP boundary (render-api /totals)                            │
//! │  └── THIS MODULE: range checks                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Calculator: takes whatever it is given, literally                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use folio_core::validation::validate_line_items;
//! use folio_core::LineItem;
//!
//! let items = vec![LineItem::new("Service", 2.0, 100.0, 15.0)];
//! assert!(validate_line_items(&items).is_ok());
//!
//! let bad = vec![LineItem::new("Service", -2.0, 100.0, 15.0)];
//! assert!(validate_line_items(&bad).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::LineItem;
use crate::{MAX_DESCRIPTION_LEN, MAX_LINE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates one line item.
///
/// ## Rules
/// - quantity and unit_price are finite and not negative
/// - tax_rate_percent is finite and within [0, 100]
/// - description is at most [`MAX_DESCRIPTION_LEN`] characters
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_non_negative("quantity", item.quantity)?;
    validate_non_negative("unit_price", item.unit_price.value())?;
    validate_tax_rate(item.tax_rate_percent)?;

    if item.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates a whole invoice's lines; the error names the failing line.
pub fn validate_line_items(items: &[LineItem]) -> CoreResult<()> {
    if items.len() > MAX_LINE_ITEMS {
        return Err(CoreError::TooManyItems {
            max: MAX_LINE_ITEMS,
            actual: items.len(),
        });
    }

    for (index, item) in items.iter().enumerate() {
        validate_line_item(item).map_err(|source| CoreError::InvalidLine { index, source })?;
    }

    Ok(())
}

/// Validates a tax rate percentage.
///
/// ## Example
/// ```rust
/// use folio_core::validation::validate_tax_rate;
///
/// assert!(validate_tax_rate(15.0).is_ok());
/// assert!(validate_tax_rate(100.0).is_ok());
/// assert!(validate_tax_rate(100.5).is_err());
/// ```
pub fn validate_tax_rate(rate: f64) -> ValidationResult<()> {
    let field = "tax_rate_percent";
    validate_finite(field, rate)?;

    if !(0.0..=100.0).contains(&rate) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
            value: rate,
        });
    }

    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_item() {
        assert!(validate_line_item(&LineItem::new("Brake pads", 2.0, 100.0, 15.0)).is_ok());
        assert!(validate_line_item(&LineItem::new("", 0.0, 0.0, 0.0)).is_ok());
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let err = validate_line_item(&LineItem::new("x", -1.0, 10.0, 15.0)).unwrap_err();
        assert!(matches!(err, ValidationError::Negative { ref field, .. } if field == "quantity"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = validate_line_item(&LineItem::new("x", 1.0, -10.0, 15.0)).unwrap_err();
        assert!(matches!(err, ValidationError::Negative { ref field, .. } if field == "unit_price"));
    }

    #[test]
    fn test_tax_rate_bounds() {
        assert!(validate_tax_rate(0.0).is_ok());
        assert!(validate_tax_rate(100.0).is_ok());
        assert!(validate_tax_rate(-0.1).is_err());
        assert!(validate_tax_rate(101.0).is_err());
        assert_eq!(
            validate_tax_rate(f64::NAN),
            Err(ValidationError::NotFinite {
                field: "tax_rate_percent".to_string()
            })
        );
    }

    #[test]
    fn test_description_too_long() {
        let item = LineItem::new("x".repeat(MAX_DESCRIPTION_LEN + 1), 1.0, 1.0, 0.0);
        assert!(matches!(
            validate_line_item(&item),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_line_index_reported() {
        let items = vec![
            LineItem::new("ok", 1.0, 1.0, 15.0),
            LineItem::new("bad", 1.0, f64::INFINITY, 15.0),
        ];
        let err = validate_line_items(&items).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLine { index: 1, .. }));
    }

    #[test]
    fn test_too_many_items() {
        let items = vec![LineItem::new("x", 1.0, 1.0, 0.0); MAX_LINE_ITEMS + 1];
        assert!(matches!(
            validate_line_items(&items),
            Err(CoreError::TooManyItems { .. })
        ));
    }
}
