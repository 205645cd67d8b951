//! # Folio Render API
//!
//! HTTP server that renders invoices to PDF and computes invoice totals.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Render API Routes                               │
//! │                                                                         │
//! │  ┌──────────────────────────────┐  ┌─────────────────────────────────┐ │
//! │  │  document_service            │  │  totals_service                 │ │
//! │  │                              │  │                                 │ │
//! │  │ • GET /documents/{id}/pdf    │  │ • POST /totals                  │ │
//! │  │ • GET /documents/pdf?id=     │  │   validate → compute → format   │ │
//! │  │ • GET /documents/{id}/       │  │                                 │ │
//! │  │       export-fallback        │  └─────────────────────────────────┘ │
//! │  └──────────────┬───────────────┘                                      │
//! │                 │ render slot (Semaphore)  ┌─────────────────────────┐ │
//! │                 ▼ spawn_blocking           │  health_service         │ │
//! │  ┌──────────────────────────────┐          │ • GET /health           │ │
//! │  │  DocumentRenderer            │◄─────────│ • GET /health/renderer  │ │
//! │  │  (folio-render)              │  stats   └─────────────────────────┘ │
//! │  └──────────────────────────────┘                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ServerConfig`]. Common environment variables:
//! - `PORT` - HTTP port (default: 4000)
//! - `APP_URL` - front-end base address (default: http://localhost:5173)
//! - `SERVICE_TOKEN` - bearer token used when the caller sends none
//! - `FOLIO_EXECUTION_PROFILE` - `constrained` or `unrestricted`
//! - `FALLBACK_ON_FAILURE` - serve the text export when rendering fails

pub mod auth;
pub mod config;
pub mod error;
pub mod services;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use folio_render::{BrowserLauncher, ChromeLauncher, DocumentLocator, DocumentRenderer, SessionManager};
use tokio::sync::Semaphore;

// Re-exports
pub use crate::config::{ConfigError, ServerConfig};
pub use error::ApiError;

/// Shared application state.
pub struct AppState {
    pub config: ServerConfig,
    pub renderer: Arc<DocumentRenderer>,
    /// Admission control for concurrent renders.
    pub render_slots: Arc<Semaphore>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Builds state backed by real Chrome processes.
    pub fn from_config(config: ServerConfig) -> Result<Self, ConfigError> {
        Self::with_launcher(config, Arc::new(ChromeLauncher))
    }

    /// Builds state with a specific browser launcher.
    pub fn with_launcher(
        config: ServerConfig,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, ConfigError> {
        let locator = DocumentLocator::new(&config.app_url).map_err(|e| {
            ConfigError::InvalidValue {
                key: "APP_URL",
                reason: e.to_string(),
            }
        })?;
        let sessions = SessionManager::new(launcher, config.launch_strategy());
        let renderer = DocumentRenderer::new(locator, sessions).with_settle(config.settle_config());

        Ok(AppState {
            render_slots: Arc::new(Semaphore::new(config.max_concurrent_renders)),
            renderer: Arc::new(renderer),
            config,
        })
    }
}

/// Builds the HTTP router.
pub fn router(state: SharedState) -> Router {
    use services::{document_service, health_service, totals_service};

    Router::new()
        .route("/documents/pdf", get(document_service::render_pdf_by_query))
        .route("/documents/{id}/pdf", get(document_service::render_pdf))
        .route(
            "/documents/{id}/export-fallback",
            get(document_service::export_fallback),
        )
        .route("/totals", post(totals_service::compute_totals))
        .route("/health", get(health_service::health))
        .route("/health/renderer", get(health_service::renderer_health))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use ::config::Map;
    use folio_render::mock::{MockBehavior, MockLauncher};

    /// State backed by the scripted browser, with fast settle timings.
    pub fn state(behavior: MockBehavior, extra: &[(&str, &str)]) -> (SharedState, Arc<MockLauncher>) {
        let mut vars: Map<String, String> = [
            ("FOLIO_EXECUTION_PROFILE", "unrestricted"),
            ("NAVIGATION_TIMEOUT_MS", "200"),
            ("QUIET_WINDOW_MS", "10"),
            ("SETTLE_POLL_MS", "2"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = ServerConfig::from_vars(vars).unwrap();
        let launcher = Arc::new(MockLauncher::new(behavior));
        let state = AppState::with_launcher(config, launcher.clone()).unwrap();
        (Arc::new(state), launcher)
    }

    #[test]
    fn test_router_builds() {
        let (state, _) = state(MockBehavior::default(), &[]);
        let _router = router(state);
    }
}
