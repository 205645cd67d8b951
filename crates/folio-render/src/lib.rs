//! # folio-render: Document Rendering Pipeline
//!
//! Turns an invoice identifier into a PDF by loading the invoice's print view
//! in a headless browser.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          DocumentRenderer                               │
//! │                                                                         │
//! │  raw id ──► DocumentId ──► DocumentLocator ──► print-view URL           │
//! │                                                     │                   │
//! │                    SessionManager::acquire ◄────────┘                   │
//! │                    (LaunchStrategy → LaunchPlan → BrowserLauncher)      │
//! │                                │                                        │
//! │                                ▼                                        │
//! │   bearer header → navigate → wait_for_quiescence → print media → PDF    │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                  BrowserSession released (always)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`document`]: identifiers, requests and artifacts
//! - [`locator`]: identifier → URL
//! - [`profile`]: execution profile detection, launch plans, binary discovery
//! - [`session`]: browser abstraction and per-request sessions
//! - [`chrome`]: `headless_chrome` backend
//! - [`settle`]: quiescence wait
//! - [`handler`]: the render state machine
//! - [`fallback`]: plain-text export
//! - `mock`: scripted browser (`test-utils` feature)
//!
//! Everything here is blocking.

pub mod chrome;
pub mod document;
pub mod error;
pub mod fallback;
pub mod handler;
pub mod locator;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod profile;
pub mod session;
pub mod settle;

pub use chrome::ChromeLauncher;
pub use document::{DocumentId, PdfArtifact, RenderRequest, RenderedDocument, TextArtifact};
pub use error::{IdentifierError, RenderError, RenderResult};
pub use fallback::{fallback_file_name, render_text_fallback};
pub use handler::{DocumentRenderer, PdfLayout, RenderStage};
pub use locator::{DocumentLocator, DEFAULT_BASE_URL};
pub use profile::{
    ChromiumDiscovery, ExecutableDiscovery, ExecutionProfile, LaunchPlan, LaunchStrategy,
    PlatformMarkers,
};
pub use session::{BrowserLauncher, BrowserSession, SessionManager, SessionStatsSnapshot};
pub use settle::SettleConfig;
