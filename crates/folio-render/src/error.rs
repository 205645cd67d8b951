//! # Render Error Types
//!
//! Error types for the rendering pipeline.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Render Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Caller         │  │  Provisioning   │  │  Content                │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidIdent.  │  │  LaunchFailed   │  │  NavigationFailed       │ │
//! │  │  (no browser    │  │  InvalidBaseUrl │  │  NavigationTimeout      │ │
//! │  │   acquired)     │  │                 │  │  ExportFailed           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ReleaseFailed (teardown) is logged by the renderer and never becomes   │
//! │  the outcome of a render.                                               │
//! │                                                                         │
//! │  None of these are retried. The HTTP boundary decides whether to       │
//! │  answer with the plain-text fallback instead.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::handler::RenderStage;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Every way a render can fail.
#[derive(Debug, Error)]
pub enum RenderError {
    // =========================================================================
    // Caller Errors
    // =========================================================================
    /// The document identifier is missing or malformed.
    #[error("Invalid document identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    // =========================================================================
    // Provisioning Errors
    // =========================================================================
    /// The configured application base URL cannot have paths joined onto it.
    #[error("Invalid base application URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The browser process could not be started.
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    // =========================================================================
    // Content Errors
    // =========================================================================
    /// Opening the page or navigating to the document failed outright.
    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    /// The document page never settled within the navigation budget.
    #[error("Document at {url} did not settle within {waited_ms} ms")]
    NavigationTimeout { url: String, waited_ms: u64 },

    /// Print media emulation or PDF export failed after navigation.
    #[error("PDF export failed: {0}")]
    ExportFailed(String),

    // =========================================================================
    // Teardown Errors
    // =========================================================================
    /// The browser process did not shut down cleanly.
    #[error("Browser release failed: {0}")]
    ReleaseFailed(String),
}

impl RenderError {
    /// Returns the pipeline stage this error belongs to.
    pub fn stage(&self) -> RenderStage {
        match self {
            RenderError::InvalidIdentifier(_) => RenderStage::Validating,
            RenderError::InvalidBaseUrl { .. } => RenderStage::LocatingDocument,
            RenderError::LaunchFailed(_) => RenderStage::LaunchingBrowser,
            RenderError::NavigationFailed { .. } | RenderError::NavigationTimeout { .. } => {
                RenderStage::Navigating
            }
            RenderError::ExportFailed(_) => RenderStage::ExportingPdf,
            RenderError::ReleaseFailed(_) => RenderStage::Releasing,
        }
    }

    /// Returns true if the caller sent a bad request (HTTP 400).
    pub fn is_client_error(&self) -> bool {
        matches!(self, RenderError::InvalidIdentifier(_))
    }
}

// =============================================================================
// Identifier Errors
// =============================================================================

/// Why a document identifier was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is missing")]
    Missing,

    #[error("identifier is empty")]
    Empty,

    #[error("expected a single identifier, got {0} values")]
    MultiValued(usize),

    #[error("identifier contains invalid character {0:?}")]
    Malformed(char),

    #[error("identifier is longer than {max} characters")]
    TooLong { max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(
            RenderError::from(IdentifierError::Empty).stage(),
            RenderStage::Validating
        );
        assert_eq!(
            RenderError::LaunchFailed("no chrome".into()).stage(),
            RenderStage::LaunchingBrowser
        );
        assert_eq!(
            RenderError::NavigationTimeout {
                url: "http://x".into(),
                waited_ms: 10
            }
            .stage(),
            RenderStage::Navigating
        );
        assert_eq!(
            RenderError::ExportFailed("boom".into()).stage(),
            RenderStage::ExportingPdf
        );
        assert_eq!(
            RenderError::ReleaseFailed("zombie".into()).stage(),
            RenderStage::Releasing
        );
    }

    #[test]
    fn test_error_categories() {
        assert!(RenderError::from(IdentifierError::Missing).is_client_error());
        assert!(!RenderError::ExportFailed("x".into()).is_client_error());
        assert!(!RenderError::ReleaseFailed("x".into()).is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = RenderError::NavigationTimeout {
            url: "http://localhost:5173/invoices/abc/print?pdf=1".into(),
            waited_ms: 30000,
        };
        assert!(err.to_string().contains("invoices/abc"));
        assert!(err.to_string().contains("30000 ms"));

        let err = RenderError::from(IdentifierError::MultiValued(2));
        assert_eq!(
            err.to_string(),
            "Invalid document identifier: expected a single identifier, got 2 values"
        );
    }
}
