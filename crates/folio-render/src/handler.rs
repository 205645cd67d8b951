//! # Render Handler
//!
//! Drives one document through the browser and returns its PDF.
//!
//! ## Stages
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Validating ──► LocatingDocument ──► LaunchingBrowser ──► Navigating    │
//! │      │                                    │                   │         │
//! │      │ bad id                             │                   ▼         │
//! │      ▼                                    │          EmulatingPrintMode │
//! │  InvalidIdentifier                        │                   │         │
//! │  (no browser)                             │                   ▼         │
//! │                                           │             ExportingPdf    │
//! │                                           │                   │         │
//! │                                           ▼                   ▼         │
//! │                                ErrorFallback ◄── any error ── Releasing │
//! │                                (boundary only)                │         │
//! │                                                               ▼         │
//! │                                                             Done        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is released on every path once it has been acquired. A
//! release failure is logged and never replaces the render outcome.

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn};

use crate::document::{DocumentId, PdfArtifact, RenderRequest, RenderedDocument};
use crate::error::{RenderError, RenderResult};
use crate::fallback::render_text_fallback;
use crate::locator::DocumentLocator;
use crate::session::{BrowserSession, SessionManager, SessionStatsSnapshot};
use crate::settle::{wait_for_quiescence, SettleConfig};

const MM_PER_INCH: f64 = 25.4;

// =============================================================================
// Render Stage
// =============================================================================

/// Where a render is (or where it failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStage {
    Validating,
    LocatingDocument,
    LaunchingBrowser,
    Navigating,
    EmulatingPrintMode,
    ExportingPdf,
    Releasing,
    Done,
    ErrorFallback,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStage::Validating => "validating",
            RenderStage::LocatingDocument => "locating_document",
            RenderStage::LaunchingBrowser => "launching_browser",
            RenderStage::Navigating => "navigating",
            RenderStage::EmulatingPrintMode => "emulating_print_mode",
            RenderStage::ExportingPdf => "exporting_pdf",
            RenderStage::Releasing => "releasing",
            RenderStage::Done => "done",
            RenderStage::ErrorFallback => "error_fallback",
        };
        f.write_str(name)
    }
}

// =============================================================================
// PDF Layout
// =============================================================================

/// Paper and margin settings for the export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfLayout {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    /// Applied to all four sides.
    pub margin_mm: f64,
    pub print_background: bool,
}

impl PdfLayout {
    /// A4 portrait, 10 mm margins, backgrounds printed.
    pub const A4: PdfLayout = PdfLayout {
        paper_width_in: 8.27,
        paper_height_in: 11.69,
        margin_mm: 10.0,
        print_background: true,
    };

    pub fn margin_inches(&self) -> f64 {
        self.margin_mm / MM_PER_INCH
    }
}

impl Default for PdfLayout {
    fn default() -> Self {
        PdfLayout::A4
    }
}

// =============================================================================
// Document Renderer
// =============================================================================

/// Turns document identifiers into PDF artifacts.
///
/// Blocking: each call owns a browser process for its whole duration. Async
/// callers should run it on a blocking thread.
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    locator: DocumentLocator,
    sessions: SessionManager,
    settle: SettleConfig,
    layout: PdfLayout,
}

impl DocumentRenderer {
    pub fn new(locator: DocumentLocator, sessions: SessionManager) -> Self {
        DocumentRenderer {
            locator,
            sessions,
            settle: SettleConfig::default(),
            layout: PdfLayout::default(),
        }
    }

    pub fn with_settle(mut self, settle: SettleConfig) -> Self {
        self.settle = settle;
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn stats(&self) -> SessionStatsSnapshot {
        self.sessions.stats()
    }

    /// Renders the document with the given raw identifier.
    ///
    /// An invalid identifier fails before any browser is launched.
    pub fn render(
        &self,
        document_id: Option<&str>,
        auth_token: Option<&str>,
    ) -> RenderResult<PdfArtifact> {
        let id = parse_identifier(document_id)?;
        self.render_request(&RenderRequest::new(id), auth_token)
    }

    /// Renders the document, degrading to the plain-text fallback for any
    /// failure that is not the caller's fault.
    pub fn render_or_fallback(
        &self,
        document_id: Option<&str>,
        auth_token: Option<&str>,
    ) -> RenderResult<RenderedDocument> {
        let id = parse_identifier(document_id)?;
        let request = RenderRequest::new(id);

        match self.render_request(&request, auth_token) {
            Ok(pdf) => Ok(RenderedDocument::Pdf(pdf)),
            Err(e) if e.is_client_error() => Err(e),
            Err(e) => {
                warn!(
                    stage = %RenderStage::ErrorFallback,
                    request_id = %request.request_id,
                    document_id = %request.document_id,
                    failed_at = %e.stage(),
                    "Serving text fallback"
                );
                Ok(RenderedDocument::TextFallback(render_text_fallback(
                    &request.document_id,
                    Utc::now(),
                )))
            }
        }
    }

    /// Renders an already validated request.
    pub fn render_request(
        &self,
        request: &RenderRequest,
        auth_token: Option<&str>,
    ) -> RenderResult<PdfArtifact> {
        let span = info_span!(
            "render",
            request_id = %request.request_id,
            document_id = %request.document_id
        );
        let _guard = span.enter();

        let result = self.run(request, auth_token);
        match &result {
            Ok(artifact) => info!(
                stage = %RenderStage::Done,
                bytes = artifact.byte_length(),
                "Rendered document"
            ),
            Err(e) => error!(
                stage = %e.stage(),
                document_id = %request.document_id,
                error = %e,
                "Render failed"
            ),
        }
        result
    }

    fn run(&self, request: &RenderRequest, auth_token: Option<&str>) -> RenderResult<PdfArtifact> {
        let url = self.locator.locate(&request.document_id)?;
        debug!(stage = %RenderStage::LocatingDocument, url = %url, "Located document");

        let session = self.sessions.acquire()?;
        let outcome = self.drive(&session, url.as_str(), auth_token);

        debug!(stage = %RenderStage::Releasing, "Releasing browser");
        if let Err(e) = session.release() {
            warn!(error = %e, "Browser release failed");
        }

        outcome.map(PdfArtifact::new)
    }

    fn drive(
        &self,
        session: &BrowserSession,
        url: &str,
        auth_token: Option<&str>,
    ) -> RenderResult<Vec<u8>> {
        let page = session.open_page()?;

        if let Some(token) = auth_token.map(str::trim).filter(|t| !t.is_empty()) {
            page.set_bearer_token(token)?;
        }

        debug!(stage = %RenderStage::Navigating, url, "Navigating");
        page.navigate(url)?;
        let settled = wait_for_quiescence(page.as_ref(), url, &self.settle)?;
        debug!(settled_ms = settled.as_millis() as u64, "Document settled");

        debug!(stage = %RenderStage::EmulatingPrintMode, "Switching to print media");
        page.emulate_print_media()?;

        debug!(stage = %RenderStage::ExportingPdf, "Exporting PDF");
        let bytes = page.print_pdf(&self.layout)?;
        if bytes.is_empty() {
            return Err(RenderError::ExportFailed(
                "browser returned an empty document".to_string(),
            ));
        }
        Ok(bytes)
    }
}

fn parse_identifier(raw: Option<&str>) -> RenderResult<DocumentId> {
    DocumentId::parse(raw).map_err(|e| {
        warn!(stage = %RenderStage::Validating, error = %e, "Rejected document identifier");
        RenderError::from(e)
    })
}
