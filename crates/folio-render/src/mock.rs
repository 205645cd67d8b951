//! Scripted browser for tests.
//!
//! Available under `cfg(test)` and the `test-utils` feature so the HTTP
//! crate can exercise the full pipeline without Chrome installed.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use folio_render::mock::{MockBehavior, MockLauncher};
//! use folio_render::{DocumentLocator, DocumentRenderer, SessionManager};
//!
//! let launcher = Arc::new(MockLauncher::new(MockBehavior::default()));
//! let sessions = SessionManager::new(launcher.clone(), MockLauncher::strategy());
//! let renderer = DocumentRenderer::new(
//!     DocumentLocator::new("http://localhost:5173").unwrap(),
//!     sessions,
//! );
//!
//! let pdf = renderer.render(Some("inv-1"), None).unwrap();
//! assert!(pdf.byte_length() > 0);
//! assert_eq!(launcher.closed(), 1);
//! ```

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{RenderError, RenderResult};
use crate::handler::PdfLayout;
use crate::profile::{ChromiumDiscovery, ExecutionProfile, LaunchPlan, LaunchStrategy};
use crate::session::{ActivitySnapshot, BrowserLauncher, BrowserProcess, PageContext};

/// Which step the mock should break.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBehavior {
    pub fail_launch: bool,
    pub fail_navigation: bool,
    /// Keep requesting resources forever.
    pub never_settle: bool,
    pub fail_export: bool,
    pub fail_close: bool,
    /// Leave one request open forever while the resource count holds still.
    pub stall_request: bool,
}

#[derive(Debug, Default)]
struct Journal {
    launched: AtomicUsize,
    closed: AtomicUsize,
    print_media: AtomicUsize,
    visited: Mutex<Vec<String>>,
    tokens: Mutex<Vec<String>>,
    plans: Mutex<Vec<LaunchPlan>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Launcher that records what the pipeline asked of it.
#[derive(Debug, Default)]
pub struct MockLauncher {
    behavior: MockBehavior,
    journal: Arc<Journal>,
}

impl MockLauncher {
    pub fn new(behavior: MockBehavior) -> Self {
        MockLauncher {
            behavior,
            journal: Arc::new(Journal::default()),
        }
    }

    /// An unrestricted strategy whose discovery never finds anything.
    pub fn strategy() -> LaunchStrategy {
        LaunchStrategy::new(
            ExecutionProfile::Unrestricted,
            Arc::new(ChromiumDiscovery::new(None).with_candidates(Vec::new())),
            Duration::from_secs(30),
        )
    }

    pub fn launched(&self) -> usize {
        self.journal.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.journal.closed.load(Ordering::SeqCst)
    }

    pub fn print_media_switches(&self) -> usize {
        self.journal.print_media.load(Ordering::SeqCst)
    }

    /// URLs navigated to, in order.
    pub fn visited(&self) -> Vec<String> {
        lock(&self.journal.visited).clone()
    }

    /// Bearer tokens attached to pages, in order.
    pub fn bearer_tokens(&self) -> Vec<String> {
        lock(&self.journal.tokens).clone()
    }

    pub fn plans(&self) -> Vec<LaunchPlan> {
        lock(&self.journal.plans).clone()
    }
}

impl BrowserLauncher for MockLauncher {
    fn launch(&self, plan: &LaunchPlan) -> RenderResult<Box<dyn BrowserProcess>> {
        lock(&self.journal.plans).push(plan.clone());

        if self.behavior.fail_launch {
            return Err(RenderError::LaunchFailed(
                "mock: no browser binary".to_string(),
            ));
        }

        self.journal.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockProcess {
            behavior: self.behavior,
            journal: Arc::clone(&self.journal),
        }))
    }
}

struct MockProcess {
    behavior: MockBehavior,
    journal: Arc<Journal>,
}

impl BrowserProcess for MockProcess {
    fn open_page(&self) -> RenderResult<Box<dyn PageContext>> {
        Ok(Box::new(MockPage {
            behavior: self.behavior,
            journal: Arc::clone(&self.journal),
            url: Mutex::new(String::new()),
            probes: Cell::new(0),
        }))
    }

    fn close(&mut self) -> RenderResult<()> {
        self.journal.closed.fetch_add(1, Ordering::SeqCst);
        if self.behavior.fail_close {
            return Err(RenderError::ReleaseFailed(
                "mock: process did not exit".to_string(),
            ));
        }
        Ok(())
    }
}

struct MockPage {
    behavior: MockBehavior,
    journal: Arc<Journal>,
    url: Mutex<String>,
    probes: Cell<u64>,
}

impl PageContext for MockPage {
    fn set_bearer_token(&self, token: &str) -> RenderResult<()> {
        lock(&self.journal.tokens).push(token.to_string());
        Ok(())
    }

    fn navigate(&self, url: &str) -> RenderResult<()> {
        if self.behavior.fail_navigation {
            return Err(RenderError::NavigationFailed {
                url: url.to_string(),
                reason: "mock: connection refused".to_string(),
            });
        }
        lock(&self.journal.visited).push(url.to_string());
        *lock(&self.url) = url.to_string();
        Ok(())
    }

    fn activity(&self) -> RenderResult<ActivitySnapshot> {
        let probe = self.probes.get() + 1;
        self.probes.set(probe);

        let resources = if self.behavior.never_settle { probe } else { 4 };
        Ok(ActivitySnapshot {
            ready: true,
            resources,
            in_flight: u64::from(self.behavior.stall_request),
        })
    }

    fn emulate_print_media(&self) -> RenderResult<()> {
        self.journal.print_media.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn print_pdf(&self, layout: &PdfLayout) -> RenderResult<Vec<u8>> {
        if self.behavior.fail_export {
            return Err(RenderError::ExportFailed(
                "mock: printing failed".to_string(),
            ));
        }

        let url = lock(&self.url).clone();
        Ok(format!(
            "%PDF-1.7\n% mock {}x{} in\n% {url}\n%%EOF\n",
            layout.paper_width_in, layout.paper_height_in
        )
        .into_bytes())
    }
}
