//! # Browser Sessions
//!
//! One isolated browser process per render request. Never pooled.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SessionManager::acquire                          │
//! │                                                                         │
//! │   attempts += 1                                                         │
//! │   plan = strategy.plan()                                                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   launcher.launch(plan) ──Err──► launch_failures += 1                   │
//! │        │ Ok                      releases += 1 (no-op)                  │
//! │        ▼                         return LaunchFailed                    │
//! │   launches += 1, live += 1                                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   BrowserSession ─── release() or Drop ──► close process                │
//! │                                            releases += 1, live -= 1     │
//! │                                            (exactly once)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The launcher, process and page are traits so the pipeline can be driven
//! by the real Chrome backend ([`crate::chrome`]) or the scripted mock.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RenderResult;
use crate::handler::PdfLayout;
use crate::profile::{ExecutionProfile, LaunchPlan, LaunchStrategy};

// =============================================================================
// Browser Abstraction
// =============================================================================

/// Starts browser processes.
pub trait BrowserLauncher: Send + Sync {
    /// Launches one process according to `plan`. Errors are `LaunchFailed`.
    fn launch(&self, plan: &LaunchPlan) -> RenderResult<Box<dyn BrowserProcess>>;
}

/// A running browser process owned by one session.
pub trait BrowserProcess: Send {
    fn open_page(&self) -> RenderResult<Box<dyn PageContext>>;

    /// Terminates the process. Called exactly once.
    fn close(&mut self) -> RenderResult<()>;
}

/// What the settle loop sees when it probes the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    /// The document reports `readyState == "complete"`.
    pub ready: bool,
    /// Network resources the page has finished loading so far.
    pub resources: u64,
    /// Requests sent but not yet finished or failed.
    #[serde(default)]
    pub in_flight: u64,
}

/// One page (tab) inside a browser process.
pub trait PageContext {
    /// Attaches `Authorization: Bearer <token>` to every request from this page.
    fn set_bearer_token(&self, token: &str) -> RenderResult<()>;

    fn navigate(&self, url: &str) -> RenderResult<()>;

    fn activity(&self) -> RenderResult<ActivitySnapshot>;

    fn emulate_print_media(&self) -> RenderResult<()>;

    fn print_pdf(&self, layout: &PdfLayout) -> RenderResult<Vec<u8>>;
}

// =============================================================================
// Session Statistics
// =============================================================================

/// Lifetime counters for one manager.
#[derive(Debug, Default)]
pub struct SessionStats {
    attempts: AtomicUsize,
    launches: AtomicUsize,
    launch_failures: AtomicUsize,
    releases: AtomicUsize,
    live: AtomicUsize,
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatsSnapshot {
    pub attempts: usize,
    pub launches: usize,
    pub launch_failures: usize,
    pub releases: usize,
    pub live: usize,
}

impl SessionStats {
    pub fn snapshot(&self) -> SessionStatsSnapshot {
        SessionStatsSnapshot {
            attempts: self.attempts.load(Ordering::SeqCst),
            launches: self.launches.load(Ordering::SeqCst),
            launch_failures: self.launch_failures.load(Ordering::SeqCst),
            releases: self.releases.load(Ordering::SeqCst),
            live: self.live.load(Ordering::SeqCst),
        }
    }

    fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
    }

    fn record_launch(&self) {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
    }

    fn record_launch_failure(&self) {
        self.launch_failures.fetch_add(1, Ordering::SeqCst);
        // Nothing was started, so the matching release is a no-op.
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Browser Session
// =============================================================================

/// Exclusive handle on one browser process.
///
/// Dropping the session closes the process, so every exit path of a render
/// (early return, error, panic) tears the browser down.
pub struct BrowserSession {
    process: Box<dyn BrowserProcess>,
    profile: ExecutionProfile,
    stats: Arc<SessionStats>,
    released: bool,
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("profile", &self.profile)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl BrowserSession {
    pub fn open_page(&self) -> RenderResult<Box<dyn PageContext>> {
        self.process.open_page()
    }

    /// Closes the process now and reports the close error, if any.
    pub fn release(mut self) -> RenderResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> RenderResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let result = self.process.close();
        self.stats.record_release();
        debug!(profile = %self.profile, ok = result.is_ok(), "Browser session released");
        result
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Browser process did not close cleanly");
        }
    }
}

// =============================================================================
// Session Manager
// =============================================================================

/// Provisions and tears down browser sessions.
#[derive(Clone)]
pub struct SessionManager {
    launcher: Arc<dyn BrowserLauncher>,
    strategy: LaunchStrategy,
    stats: Arc<SessionStats>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("strategy", &self.strategy)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, strategy: LaunchStrategy) -> Self {
        SessionManager {
            launcher,
            strategy,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// Launches a fresh browser process for one render.
    pub fn acquire(&self) -> RenderResult<BrowserSession> {
        self.stats.record_attempt();

        let plan = self.strategy.plan();
        debug!(
            profile = %plan.profile,
            args = ?plan.args,
            executable = ?plan.executable,
            sandbox = plan.sandbox,
            "Launching browser"
        );

        match self.launcher.launch(&plan) {
            Ok(process) => {
                self.stats.record_launch();
                info!(profile = %plan.profile, "Browser launched");
                Ok(BrowserSession {
                    process,
                    profile: plan.profile,
                    stats: Arc::clone(&self.stats),
                    released: false,
                })
            }
            Err(e) => {
                self.stats.record_launch_failure();
                warn!(profile = %plan.profile, error = %e, "Browser launch failed");
                Err(e)
            }
        }
    }

    /// Releases a session. Equivalent to dropping it, but surfaces the
    /// close error.
    pub fn release(&self, session: BrowserSession) -> RenderResult<()> {
        session.release()
    }

    pub fn stats(&self) -> SessionStatsSnapshot {
        self.stats.snapshot()
    }

    /// The plan the next acquisition would use.
    pub fn launch_plan(&self) -> LaunchPlan {
        self.strategy.plan()
    }

    pub fn strategy(&self) -> &LaunchStrategy {
        &self.strategy
    }
}
