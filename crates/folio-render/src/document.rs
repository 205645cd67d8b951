//! Request and result types for one render.
//!
//! ```text
//! RenderRequest ──► DocumentRenderer ──► RenderedDocument
//!  (per call,                              ├── Pdf(PdfArtifact)
//!   never stored)                          └── TextFallback(TextArtifact)
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::IdentifierError;

/// Longest identifier accepted.
pub const MAX_IDENTIFIER_LEN: usize = 128;

// =============================================================================
// Document Identifier
// =============================================================================

/// A validated, opaque reference to one invoice record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parses an optional raw identifier.
    ///
    /// ## Rules
    /// - present and non-empty after trimming
    /// - a single token: no whitespace, `/` or `,`
    /// - not `.` or `..` (URL paths collapse those segments)
    /// - at most [`MAX_IDENTIFIER_LEN`] characters
    ///
    /// ## Example
    /// ```rust
    /// use folio_render::DocumentId;
    ///
    /// assert!(DocumentId::parse(Some("inv-0042")).is_ok());
    /// assert!(DocumentId::parse(Some("")).is_err());
    /// assert!(DocumentId::parse(None).is_err());
    /// ```
    pub fn parse(raw: Option<&str>) -> Result<Self, IdentifierError> {
        let raw = raw.ok_or(IdentifierError::Missing)?.trim();

        if raw.is_empty() {
            return Err(IdentifierError::Empty);
        }

        if raw.chars().count() > MAX_IDENTIFIER_LEN {
            return Err(IdentifierError::TooLong {
                max: MAX_IDENTIFIER_LEN,
            });
        }

        if let Some(bad) = raw
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || *c == '/' || *c == ',')
        {
            return Err(IdentifierError::Malformed(bad));
        }

        if raw == "." || raw == ".." {
            return Err(IdentifierError::Malformed('.'));
        }

        Ok(DocumentId(raw.to_string()))
    }

    /// Parses an identifier from a possibly repeated input, such as a query
    /// string parameter. Exactly one value is accepted.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Result<Self, IdentifierError> {
        match values {
            [] => Err(IdentifierError::Missing),
            [single] => DocumentId::parse(Some(single.as_ref())),
            many => Err(IdentifierError::MultiValued(many.len())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Render Request
// =============================================================================

/// One inbound render call. Created per request and dropped after the
/// response is produced.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Correlation id for log lines of this render.
    pub request_id: Uuid,
    pub document_id: DocumentId,
    pub issued_at: DateTime<Utc>,
}

impl RenderRequest {
    pub fn new(document_id: DocumentId) -> Self {
        RenderRequest {
            request_id: Uuid::new_v4(),
            document_id,
            issued_at: Utc::now(),
        }
    }
}

// =============================================================================
// Render Results
// =============================================================================

/// PDF bytes produced by the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfArtifact {
    bytes: Vec<u8>,
    byte_length: usize,
}

impl PdfArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        let byte_length = bytes.len();
        PdfArtifact { bytes, byte_length }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Plain-text stand-in for a PDF, delivered as a file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextArtifact {
    pub file_name: String,
    pub body: String,
}

/// What a render produced. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedDocument {
    Pdf(PdfArtifact),
    TextFallback(TextArtifact),
}

impl RenderedDocument {
    pub fn is_pdf(&self) -> bool {
        matches!(self, RenderedDocument::Pdf(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_single_token() {
        let id = DocumentId::parse(Some("  4f1c-99  ")).unwrap();
        assert_eq!(id.as_str(), "4f1c-99");
        assert_eq!(id.to_string(), "4f1c-99");
    }

    #[test]
    fn test_parse_rejects_missing_and_empty() {
        assert_eq!(DocumentId::parse(None), Err(IdentifierError::Missing));
        assert_eq!(DocumentId::parse(Some("")), Err(IdentifierError::Empty));
        assert_eq!(DocumentId::parse(Some("   ")), Err(IdentifierError::Empty));
    }

    #[test]
    fn test_parse_rejects_list_shaped_input() {
        assert_eq!(
            DocumentId::parse(Some("a,b")),
            Err(IdentifierError::Malformed(','))
        );
        assert_eq!(
            DocumentId::parse(Some("a b")),
            Err(IdentifierError::Malformed(' '))
        );
        assert_eq!(
            DocumentId::parse(Some("../etc")),
            Err(IdentifierError::Malformed('/'))
        );
        assert_eq!(
            DocumentId::parse(Some(".")),
            Err(IdentifierError::Malformed('.'))
        );
        assert_eq!(
            DocumentId::parse(Some(" .. ")),
            Err(IdentifierError::Malformed('.'))
        );
        assert!(DocumentId::parse(Some("...")).is_ok());
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(matches!(
            DocumentId::parse(Some(&long)),
            Err(IdentifierError::TooLong { .. })
        ));
    }

    #[test]
    fn test_from_values() {
        let none: [&str; 0] = [];
        assert_eq!(DocumentId::from_values(&none), Err(IdentifierError::Missing));
        assert_eq!(
            DocumentId::from_values(&["a", "b"]),
            Err(IdentifierError::MultiValued(2))
        );
        assert_eq!(DocumentId::from_values(&["abc"]).unwrap().as_str(), "abc");
    }

    #[test]
    fn test_pdf_artifact_length() {
        let artifact = PdfArtifact::new(b"%PDF-1.7".to_vec());
        assert_eq!(artifact.byte_length(), 8);
        assert_eq!(artifact.bytes(), b"%PDF-1.7");
    }

    #[test]
    fn test_render_request_ids_are_unique() {
        let id = DocumentId::parse(Some("x")).unwrap();
        let a = RenderRequest::new(id.clone());
        let b = RenderRequest::new(id);
        assert_ne!(a.request_id, b.request_id);
    }
}
