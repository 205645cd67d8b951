//! # Document Locator
//!
//! Maps a document identifier to the URL of its print view.
//!
//! ```text
//! base  http://localhost:5173          id  inv-42
//!          │                                │
//!          └──────────────┬─────────────────┘
//!                         ▼
//!   http://localhost:5173/invoices/inv-42/print?pdf=1
//!                                        └────┬────┘
//!                 print-only view: no navigation chrome, no buttons
//! ```

use url::Url;

use crate::document::DocumentId;
use crate::error::{RenderError, RenderResult};

/// Default application address (the front-end dev server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Query flag the print page uses to hide interactive controls.
const PRINT_QUERY: (&str, &str) = ("pdf", "1");

/// Resolves identifiers into print-view URLs under one base address.
#[derive(Debug, Clone)]
pub struct DocumentLocator {
    base: Url,
}

impl DocumentLocator {
    /// Creates a locator for the given base application URL.
    ///
    /// A path on the base is kept as a prefix (`https://host/app` →
    /// `https://host/app/invoices/...`).
    pub fn new(base_url: &str) -> RenderResult<Self> {
        let base = Url::parse(base_url).map_err(|e| RenderError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if base.cannot_be_a_base() {
            return Err(RenderError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(DocumentLocator { base })
    }

    /// Builds the print-view URL for a validated identifier.
    pub fn locate(&self, id: &DocumentId) -> RenderResult<Url> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|_| RenderError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["invoices", id.as_str(), "print"]);

        url.query_pairs_mut().append_pair(PRINT_QUERY.0, PRINT_QUERY.1);
        Ok(url)
    }
}
