//! # folio-core: Pure Invoice Math for Folio
//!
//! This crate computes the figures an invoice displays. It has zero I/O
//! dependencies, so the invoice form, the print page and the render service
//! all derive identical numbers from the same line items.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Folio Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Front-end (invoice form, print page)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ POST /totals                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    render-api (axum)                            │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼──────────────────┐    │
//! │  │  ★ folio-core (THIS CRATE) ★    │  │  folio-render             │    │
//! │  │  amount · types · calculator    │  │  headless Chrome → PDF    │    │
//! │  │  validation                     │  │                           │    │
//! │  │  NO I/O • PURE FUNCTIONS        │  │                           │    │
//! │  └─────────────────────────────────┘  └───────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`amount`] - Full-precision monetary value, rounded only for display
//! - [`types`] - LineItem, LineComputation, InvoiceTotals
//! - [`calculator`] - Per-line and aggregate totals
//! - [`validation`] - Range checks callers run before computing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use folio_core::{compute_invoice, LineItem};
//!
//! let items = vec![
//!     LineItem::new("Labour", 1.5, 450.0, 15.0),
//!     LineItem::new("Oil filter", 1.0, 89.99, 15.0),
//! ];
//! let invoice = compute_invoice(&items);
//!
//! assert_eq!(invoice.totals.subtotal.to_string(), "764.99");
//! assert_eq!(invoice.display("R").grand_total, "R879.74");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod calculator;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use amount::Amount;
pub use calculator::{compute_invoice, compute_line, compute_totals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items accepted on one invoice.
pub const MAX_LINE_ITEMS: usize = 200;

/// Maximum characters in a line description.
pub const MAX_DESCRIPTION_LEN: usize = 500;
