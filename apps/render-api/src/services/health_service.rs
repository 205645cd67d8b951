//! Health check routes.
//!
//! Provides liveness for monitoring and a renderer diagnostics view that
//! reports how the browser would be launched on this host.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use folio_render::{ExecutionProfile, SessionStatsSnapshot};
use serde::Serialize;
use tracing::debug;

use crate::SharedState;

/// `GET /health` body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

/// `GET /health/renderer` body.
#[derive(Debug, Clone, Serialize)]
pub struct RendererDiagnostics {
    /// `ok`, or `degraded` when a constrained host has no browser binary.
    pub status: &'static str,
    pub execution_profile: ExecutionProfile,
    pub launch_args: Vec<String>,
    pub sandbox: bool,
    pub viewport: (u32, u32),
    pub executable: Option<String>,
    pub executable_error: Option<String>,
    pub sessions: SessionStatsSnapshot,
    pub available_render_slots: usize,
    pub timestamp: DateTime<Utc>,
}

/// Liveness check.
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Render API is running",
        timestamp: Utc::now(),
        environment: state.config.app_env.clone(),
    })
}

/// Reports the launch plan, executable discovery and session counters.
pub async fn renderer_health(State(state): State<SharedState>) -> Json<RendererDiagnostics> {
    let sessions = state.renderer.sessions();
    let plan = sessions.launch_plan();

    let executable_error = match (plan.profile, &plan.executable) {
        (ExecutionProfile::Constrained, None) => sessions
            .strategy()
            .discover_executable()
            .err()
            .map(|e| e.to_string()),
        _ => None,
    };
    let status = if executable_error.is_some() { "degraded" } else { "ok" };

    debug!(status, profile = %plan.profile, "Renderer diagnostics requested");

    Json(RendererDiagnostics {
        status,
        execution_profile: plan.profile,
        launch_args: plan.args,
        sandbox: plan.sandbox,
        viewport: plan.window_size,
        executable: plan.executable.map(|p| p.display().to_string()),
        executable_error,
        sessions: sessions.stats(),
        available_render_slots: state.render_slots.available_permits(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use folio_render::mock::MockBehavior;

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_support::state(MockBehavior::default(), &[("APP_ENV", "staging")]);

        let Json(response) = health(State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.environment, "staging");
    }

    #[tokio::test]
    async fn test_renderer_diagnostics_unrestricted() {
        let (state, _) = test_support::state(MockBehavior::default(), &[]);

        let Json(diag) = renderer_health(State(state)).await;
        assert_eq!(diag.status, "ok");
        assert_eq!(diag.execution_profile, ExecutionProfile::Unrestricted);
        assert!(diag.sandbox);
        assert!(diag.launch_args.is_empty());
        assert_eq!(diag.viewport, (1920, 1080));
        assert_eq!(diag.available_render_slots, 4);
        assert_eq!(diag.sessions.attempts, 0);
    }

    #[tokio::test]
    async fn test_renderer_diagnostics_missing_binary() {
        let (state, _) = test_support::state(
            MockBehavior::default(),
            &[
                ("FOLIO_EXECUTION_PROFILE", "constrained"),
                ("CHROME_PATH", "/definitely/not/here/chromium"),
            ],
        );

        let Json(diag) = renderer_health(State(state)).await;
        assert_eq!(diag.status, "degraded");
        assert!(!diag.sandbox);
        assert!(diag.launch_args.iter().any(|a| a == "--no-sandbox"));
        assert!(diag.executable.is_none());
        assert!(diag
            .executable_error
            .unwrap()
            .contains("/definitely/not/here/chromium"));
    }

    #[tokio::test]
    async fn test_diagnostics_reflect_renders() {
        let (state, _) = test_support::state(MockBehavior::default(), &[]);
        let renderer = state.renderer.clone();
        tokio::task::spawn_blocking(move || renderer.render(Some("inv-1"), None))
            .await
            .unwrap()
            .unwrap();

        let Json(diag) = renderer_health(State(state)).await;
        assert_eq!(diag.sessions.launches, 1);
        assert_eq!(diag.sessions.releases, 1);
        assert_eq!(diag.sessions.live, 0);
    }
}
