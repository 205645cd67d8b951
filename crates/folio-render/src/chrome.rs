//! # Chrome Backend
//!
//! [`BrowserLauncher`] implementation on top of `headless_chrome`.
//!
//! ```text
//! LaunchPlan ──► LaunchOptions ──► Browser::new ──► ChromeProcess
//!                                                      │
//!                                            new_tab() ▼
//!                                                  ChromePage
//!                                   headers · navigate · probe · print
//!                                                      ▲
//!                      Network.requestWillBeSent ──────┤ in-flight set
//!                      Network.loadingFinished/Failed ─┘
//! ```
//!
//! Dropping the `Browser` kills the child process, so closing a
//! [`ChromeProcess`] is just dropping its handle.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::sync::{Arc, Mutex, MutexGuard};

use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::{Emulation, Network};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::handler::PdfLayout;
use crate::profile::LaunchPlan;
use crate::session::{ActivitySnapshot, BrowserLauncher, BrowserProcess, PageContext};

/// Evaluated in the page to decide whether it has settled.
const ACTIVITY_PROBE: &str = "JSON.stringify({\
    ready: document.readyState === 'complete', \
    resources: performance.getEntriesByType('resource').length\
})";

/// Launches real Chrome/Chromium processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self, plan: &LaunchPlan) -> RenderResult<Box<dyn BrowserProcess>> {
        let args: Vec<&OsStr> = plan.args.iter().map(OsStr::new).collect();

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(plan.sandbox)
            .window_size(Some(plan.window_size))
            .path(plan.executable.clone())
            .args(args)
            .idle_browser_timeout(plan.idle_timeout)
            .build()
            .map_err(|e| RenderError::LaunchFailed(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options).map_err(|e| RenderError::LaunchFailed(e.to_string()))?;

        debug!(executable = ?plan.executable, "Chrome started");

        Ok(Box::new(ChromeProcess {
            browser: Some(browser),
        }))
    }
}

/// A running Chrome process.
pub struct ChromeProcess {
    browser: Option<Browser>,
}

impl BrowserProcess for ChromeProcess {
    fn open_page(&self) -> RenderResult<Box<dyn PageContext>> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| RenderError::NavigationFailed {
                url: String::new(),
                reason: "browser already closed".to_string(),
            })?;

        let page_setup_failed = |reason: String| RenderError::NavigationFailed {
            url: String::new(),
            reason,
        };

        let tab = browser
            .new_tab()
            .map_err(|e| page_setup_failed(format!("could not open tab: {e}")))?;

        tab.call_method(Network::Enable {
            max_total_buffer_size: None,
            max_resource_buffer_size: None,
            max_post_data_size: None,
            report_direct_socket_traffic: None,
            enable_durable_messages: None,
        })
            .map_err(|e| page_setup_failed(format!("could not enable network events: {e}")))?;

        let network = Arc::new(NetworkTracker::default());
        let listener = Arc::clone(&network);
        tab.add_event_listener(Arc::new(move |event: &Event| listener.observe(event)))
            .map_err(|e| page_setup_failed(format!("could not watch network events: {e}")))?;

        Ok(Box::new(ChromePage { tab, network }))
    }

    fn close(&mut self) -> RenderResult<()> {
        // Browser's Drop terminates the child process.
        drop(self.browser.take());
        Ok(())
    }
}

// =============================================================================
// Network Tracking
// =============================================================================

/// Request ids the page has sent and not yet seen finish or fail.
///
/// A redirect reuses its request id, so the set counts it once.
#[derive(Debug, Default)]
struct NetworkTracker {
    open: Mutex<HashSet<String>>,
}

impl NetworkTracker {
    fn observe(&self, event: &Event) {
        match event {
            Event::NetworkRequestWillBeSent(e) => self.started(&e.params.request_id),
            Event::NetworkLoadingFinished(e) => self.finished(&e.params.request_id),
            Event::NetworkLoadingFailed(e) => self.finished(&e.params.request_id),
            _ => {}
        }
    }

    fn started(&self, request_id: &str) {
        self.lock().insert(request_id.to_string());
    }

    fn finished(&self, request_id: &str) {
        self.lock().remove(request_id);
    }

    fn in_flight(&self) -> u64 {
        self.lock().len() as u64
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.open.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// =============================================================================
// Page
// =============================================================================

/// One Chrome tab.
pub struct ChromePage {
    tab: Arc<Tab>,
    network: Arc<NetworkTracker>,
}

impl PageContext for ChromePage {
    fn set_bearer_token(&self, token: &str) -> RenderResult<()> {
        let value = format!("Bearer {token}");
        let mut headers = HashMap::new();
        headers.insert("Authorization", value.as_str());

        self.tab
            .set_extra_http_headers(headers)
            .map_err(|e| RenderError::NavigationFailed {
                url: String::new(),
                reason: format!("could not set authorization header: {e}"),
            })
    }

    fn navigate(&self, url: &str) -> RenderResult<()> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| RenderError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn activity(&self) -> RenderResult<ActivitySnapshot> {
        let probe_failed = |reason: String| RenderError::NavigationFailed {
            url: self.tab.get_url(),
            reason,
        };

        let result = self
            .tab
            .evaluate(ACTIVITY_PROBE, false)
            .map_err(|e| probe_failed(e.to_string()))?;

        let raw = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| probe_failed("activity probe returned no value".to_string()))?;

        let mut snapshot: ActivitySnapshot = serde_json::from_str(raw)
            .map_err(|e| probe_failed(format!("bad activity probe: {e}")))?;
        snapshot.in_flight = self.network.in_flight();
        Ok(snapshot)
    }

    fn emulate_print_media(&self) -> RenderResult<()> {
        self.tab
            .call_method(Emulation::SetEmulatedMedia {
                media: Some("print".to_string()),
                features: None,
            })
            .map(|_| ())
            .map_err(|e| RenderError::ExportFailed(format!("print media emulation: {e}")))
    }

    fn print_pdf(&self, layout: &PdfLayout) -> RenderResult<Vec<u8>> {
        let margin = layout.margin_inches();
        let options = PrintToPdfOptions {
            paper_width: Some(layout.paper_width_in),
            paper_height: Some(layout.paper_height_in),
            margin_top: Some(margin),
            margin_bottom: Some(margin),
            margin_left: Some(margin),
            margin_right: Some(margin),
            print_background: Some(layout.print_background),
            ..Default::default()
        };

        self.tab
            .print_to_pdf(Some(options))
            .map_err(|e| RenderError::ExportFailed(e.to_string()))
    }
}
