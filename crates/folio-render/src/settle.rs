//! Quiescence wait: block until the page stops loading things.
//!
//! ```text
//!  probe ──► ready? ──no──────────────────────────┐
//!              │ yes                               │
//!              ▼                                   │
//!   requests in flight? ──yes──► reset quiet ─────┤
//!              │ no                 clock          │
//!              ▼                                   │
//!   resource count changed? ──yes──► reset quiet  │
//!              │ no                   clock        │
//!              ▼                                   │
//!   quiet for >= quiet_window? ──yes──► settled    │
//!              │ no                                │
//!              ▼                                   ▼
//!   past timeout? ──yes──► NavigationTimeout    sleep(poll) ──► probe
//! ```
//!
//! Completed resources alone are not enough: a fetch only shows up in the
//! resource count once it finishes, so the page also reports how many
//! requests are still open.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{RenderError, RenderResult};
use crate::session::PageContext;

/// Timing for the quiescence wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleConfig {
    /// Upper bound on the whole wait.
    pub timeout: Duration,
    /// How long the page must stay idle (nothing in flight, nothing new).
    pub quiet_window: Duration,
    pub poll_interval: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        SettleConfig {
            timeout: Duration::from_secs(30),
            quiet_window: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Polls `page` until it is ready and quiet, returning how long it took.
///
/// A probe that errors (the execution context is often torn down while a
/// navigation commits) counts as "not ready yet".
pub fn wait_for_quiescence(
    page: &dyn PageContext,
    url: &str,
    config: &SettleConfig,
) -> RenderResult<Duration> {
    let started = Instant::now();
    let mut last_resources: Option<u64> = None;
    let mut quiet_since = started;

    loop {
        let now = Instant::now();

        match page.activity() {
            Ok(snapshot) if snapshot.ready && snapshot.in_flight > 0 => {
                trace!(in_flight = snapshot.in_flight, "Requests still in flight");
                last_resources = None;
                quiet_since = now;
            }
            Ok(snapshot) if snapshot.ready => {
                if last_resources != Some(snapshot.resources) {
                    trace!(resources = snapshot.resources, "Page activity changed");
                    last_resources = Some(snapshot.resources);
                    quiet_since = now;
                } else if now.duration_since(quiet_since) >= config.quiet_window {
                    let elapsed = now.duration_since(started);
                    debug!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        resources = snapshot.resources,
                        "Page settled"
                    );
                    return Ok(elapsed);
                }
            }
            Ok(_) => {
                last_resources = None;
                quiet_since = now;
            }
            Err(e) => {
                trace!(error = %e, "Activity probe failed, retrying");
                last_resources = None;
                quiet_since = now;
            }
        }

        let elapsed = now.duration_since(started);
        if elapsed >= config.timeout {
            return Err(RenderError::NavigationTimeout {
                url: url.to_string(),
                waited_ms: elapsed.as_millis() as u64,
            });
        }

        thread::sleep(config.poll_interval.min(config.timeout - elapsed));
    }
}
