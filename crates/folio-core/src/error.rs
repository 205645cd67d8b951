//! # Error Types
//!
//! Domain-specific error types for folio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  folio-core errors (this file)                                          │
//! │  ├── CoreError        - Invoice-level rule violations                   │
//! │  └── ValidationError  - Field-level input failures                      │
//! │                                                                         │
//! │  folio-render errors (separate crate)                                   │
//! │  └── RenderError      - Browser / navigation / export failures          │
//! │                                                                         │
//! │  render-api errors (in app)                                             │
//! │  └── ApiError         - What HTTP callers see                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, line index)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Invoice-level errors raised before computation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invoice has more lines than allowed.
    #[error("Invoice cannot have more than {max} line items (got {actual})")]
    TooManyItems { max: usize, actual: usize },

    /// A single line failed validation.
    #[error("Line {index}: {source}")]
    InvalidLine {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level input validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: f64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// NaN or infinity.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
