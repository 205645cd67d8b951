//! Invoice totals route.
//!
//! The invoice form and the print view both call this so the figures on
//! screen and on paper come from the same calculator.

use axum::Json;
use folio_core::amount::DEFAULT_CURRENCY_SYMBOL;
use folio_core::validation::validate_line_items;
use folio_core::{compute_invoice, InvoiceTotals, LineComputation, LineItem, TotalsDisplay};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// `POST /totals` body.
#[derive(Debug, Clone, Deserialize)]
pub struct TotalsRequest {
    pub items: Vec<LineItem>,

    /// Currency symbol for the display strings (default `R`).
    #[serde(default)]
    pub currency: Option<String>,
}

/// `POST /totals` response.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsResponse {
    pub lines: Vec<LineComputation>,
    pub totals: InvoiceTotals,
    pub display: TotalsDisplay,
}

/// Validates the line items and computes per-line and invoice totals.
pub async fn compute_totals(
    Json(request): Json<TotalsRequest>,
) -> Result<Json<TotalsResponse>, ApiError> {
    validate_line_items(&request.items)?;

    let computation = compute_invoice(&request.items);
    let symbol = request
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CURRENCY_SYMBOL);
    let display = computation.display(symbol);

    debug!(
        items = request.items.len(),
        grand_total = %computation.totals.grand_total,
        "Computed invoice totals"
    );

    Ok(Json(TotalsResponse {
        lines: computation.lines,
        totals: computation.totals,
        display,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn request(value: serde_json::Value) -> TotalsRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_single_line() {
        let Json(response) = compute_totals(Json(request(json!({
            "items": [
                { "description": "Service", "quantity": 2, "unit_price": 100.0, "tax_rate_percent": 15 }
            ]
        }))))
        .await
        .unwrap();

        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].net_total.rounded(), 200.0);
        assert_eq!(response.lines[0].tax_amount.rounded(), 30.0);
        assert_eq!(response.lines[0].gross_amount.rounded(), 230.0);
        assert_eq!(response.totals.grand_total.rounded(), 230.0);
        assert_eq!(response.display.grand_total, "R230.00");
    }

    #[tokio::test]
    async fn test_vat_rate_alias_and_currency() {
        let Json(response) = compute_totals(Json(request(json!({
            "items": [
                { "description": "Labour", "quantity": 1.5, "unit_price": 450.0, "vat_rate": 15 },
                { "description": "Oil filter", "quantity": 1, "unit_price": 89.99, "vat_rate": 15 }
            ],
            "currency": "$"
        }))))
        .await
        .unwrap();

        assert_eq!(response.display.subtotal, "$764.99");
        assert_eq!(response.display.grand_total, "$879.74");
    }

    #[tokio::test]
    async fn test_empty_items() {
        let Json(response) = compute_totals(Json(request(json!({ "items": [] }))))
            .await
            .unwrap();

        assert!(response.lines.is_empty());
        assert!(response.totals.grand_total.is_zero());
        assert_eq!(response.display.grand_total, "R0.00");
    }

    #[tokio::test]
    async fn test_invalid_line_is_400() {
        let err = compute_totals(Json(request(json!({
            "items": [
                { "description": "Refund", "quantity": -1, "unit_price": 10.0, "tax_rate_percent": 15 }
            ]
        }))))
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
