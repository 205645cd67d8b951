//! # Execution Profiles
//!
//! Decides how the browser is launched on the current host.
//!
//! ## Profile Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ExecutionProfile::detect                            │
//! │                                                                         │
//! │   explicit flag set? ──yes──► use it                                    │
//! │          │ no                                                           │
//! │          ▼                                                              │
//! │   serverless markers (VERCEL, AWS_LAMBDA_FUNCTION_NAME)?                │
//! │          │ yes                         │ no                             │
//! │          ▼                             ▼                                │
//! │   ┌──────────────────┐        ┌──────────────────┐                      │
//! │   │   Constrained    │        │   Unrestricted   │                      │
//! │   │  no-sandbox args │        │  default args    │                      │
//! │   │  discover binary │        │  library default │                      │
//! │   └──────────────────┘        └──────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decision is made once, captured in a [`LaunchStrategy`], and turned
//! into a [`LaunchPlan`] at acquisition time. Nothing else branches on the
//! profile.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable naming an explicit browser binary.
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// Viewport used for every launch.
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Launch flags for sandbox-less, memory-capped serverless hosts.
pub const CONSTRAINED_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-zygote",
    "--single-process",
    "--hide-scrollbars",
    "--font-render-hinting=none",
];

/// Where serverless chromium packages unpack their binary.
const RELOCATED_BINARY_PATHS: &[&str] = &[
    "/tmp/chromium",
    "/opt/chromium/chromium",
    "/opt/chrome/chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
];

// =============================================================================
// Execution Profile
// =============================================================================

/// Classification of the host the browser runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionProfile {
    /// Serverless sandbox: no sandboxing syscalls, tight memory ceiling.
    Constrained,
    /// Ordinary host.
    Unrestricted,
}

impl ExecutionProfile {
    /// Resolves the profile from an explicit flag or platform markers.
    ///
    /// ## Example
    /// ```rust
    /// use folio_render::profile::{ExecutionProfile, PlatformMarkers};
    ///
    /// let markers = PlatformMarkers { vercel: Some("1".into()), ..Default::default() };
    /// assert_eq!(
    ///     ExecutionProfile::detect(None, &markers),
    ///     ExecutionProfile::Constrained
    /// );
    /// assert_eq!(
    ///     ExecutionProfile::detect(Some(ExecutionProfile::Unrestricted), &markers),
    ///     ExecutionProfile::Unrestricted
    /// );
    /// ```
    pub fn detect(explicit: Option<ExecutionProfile>, markers: &PlatformMarkers) -> Self {
        if let Some(profile) = explicit {
            return profile;
        }
        if markers.is_serverless() {
            ExecutionProfile::Constrained
        } else {
            ExecutionProfile::Unrestricted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionProfile::Constrained => "constrained",
            ExecutionProfile::Unrestricted => "unrestricted",
        }
    }
}

impl fmt::Display for ExecutionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized profile name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown execution profile {0:?} (expected \"constrained\" or \"unrestricted\")")]
pub struct UnknownProfile(pub String);

impl FromStr for ExecutionProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constrained" | "serverless" => Ok(ExecutionProfile::Constrained),
            "unrestricted" | "host" => Ok(ExecutionProfile::Unrestricted),
            other => Err(UnknownProfile(other.to_string())),
        }
    }
}

/// Environment markers set by serverless platforms.
#[derive(Debug, Clone, Default)]
pub struct PlatformMarkers {
    pub vercel: Option<String>,
    pub aws_lambda_function_name: Option<String>,
}

impl PlatformMarkers {
    /// Reads the markers from the process environment.
    pub fn from_env() -> Self {
        PlatformMarkers {
            vercel: env::var("VERCEL").ok(),
            aws_lambda_function_name: env::var("AWS_LAMBDA_FUNCTION_NAME").ok(),
        }
    }

    pub fn is_serverless(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.vercel) || set(&self.aws_lambda_function_name)
    }
}

// =============================================================================
// Executable Discovery
// =============================================================================

/// Why no browser binary could be discovered.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("configured browser path {} does not exist", .0.display())]
    ConfiguredPathMissing(PathBuf),

    #[error("no browser binary found in {searched:?}")]
    NotFound { searched: Vec<PathBuf> },
}

/// Locates the relocated browser binary on constrained hosts.
pub trait ExecutableDiscovery: Send + Sync {
    fn discover(&self) -> Result<PathBuf, DiscoveryError>;
}

/// Default discovery: an explicit path (or `CHROME_PATH`), then the
/// locations serverless chromium packages unpack to.
#[derive(Debug, Clone, Default)]
pub struct ChromiumDiscovery {
    explicit: Option<PathBuf>,
    candidates: Vec<PathBuf>,
}

impl ChromiumDiscovery {
    /// Builds discovery from `CHROME_PATH` and the standard candidates.
    pub fn from_env() -> Self {
        ChromiumDiscovery::new(env::var_os(CHROME_PATH_ENV).map(PathBuf::from))
    }

    pub fn new(explicit: Option<PathBuf>) -> Self {
        ChromiumDiscovery {
            explicit,
            candidates: RELOCATED_BINARY_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replaces the candidate list.
    pub fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }
}

impl ExecutableDiscovery for ChromiumDiscovery {
    fn discover(&self) -> Result<PathBuf, DiscoveryError> {
        if let Some(path) = &self.explicit {
            return if is_file(path) {
                Ok(path.clone())
            } else {
                Err(DiscoveryError::ConfiguredPathMissing(path.clone()))
            };
        }

        self.candidates
            .iter()
            .find(|p| is_file(p))
            .cloned()
            .ok_or_else(|| DiscoveryError::NotFound {
                searched: self.candidates.clone(),
            })
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

// =============================================================================
// Launch Strategy & Plan
// =============================================================================

/// Everything the launcher needs for one browser process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchPlan {
    pub profile: ExecutionProfile,
    pub args: Vec<String>,
    /// `None` lets the automation library pick its own default binary.
    pub executable: Option<PathBuf>,
    pub sandbox: bool,
    pub window_size: (u32, u32),
    /// How long the browser may sit without DevTools traffic before the
    /// library gives up on it.
    #[serde(skip)]
    pub idle_timeout: Duration,
}

/// The launch decision for this host, resolved once.
#[derive(Clone)]
pub struct LaunchStrategy {
    profile: ExecutionProfile,
    discovery: Arc<dyn ExecutableDiscovery>,
    idle_timeout: Duration,
}

impl fmt::Debug for LaunchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchStrategy")
            .field("profile", &self.profile)
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}

impl LaunchStrategy {
    pub fn new(
        profile: ExecutionProfile,
        discovery: Arc<dyn ExecutableDiscovery>,
        idle_timeout: Duration,
    ) -> Self {
        LaunchStrategy {
            profile,
            discovery,
            idle_timeout,
        }
    }

    pub fn profile(&self) -> ExecutionProfile {
        self.profile
    }

    /// Runs executable discovery without building a plan.
    pub fn discover_executable(&self) -> Result<PathBuf, DiscoveryError> {
        self.discovery.discover()
    }

    /// Produces the launch plan for one process.
    ///
    /// On constrained hosts a discovery failure is logged and the plan
    /// carries no executable override.
    pub fn plan(&self) -> LaunchPlan {
        match self.profile {
            ExecutionProfile::Constrained => {
                let executable = match self.discovery.discover() {
                    Ok(path) => {
                        debug!(path = %path.display(), "Resolved browser executable");
                        Some(path)
                    }
                    Err(e) => {
                        warn!(error = %e, "Browser executable discovery failed, using library default");
                        None
                    }
                };

                LaunchPlan {
                    profile: self.profile,
                    args: CONSTRAINED_ARGS.iter().map(|a| a.to_string()).collect(),
                    executable,
                    sandbox: false,
                    window_size: DEFAULT_WINDOW_SIZE,
                    idle_timeout: self.idle_timeout,
                }
            }
            ExecutionProfile::Unrestricted => LaunchPlan {
                profile: self.profile,
                args: Vec::new(),
                executable: None,
                sandbox: true,
                window_size: DEFAULT_WINDOW_SIZE,
                idle_timeout: self.idle_timeout,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDiscovery(Option<PathBuf>);

    impl ExecutableDiscovery for FixedDiscovery {
        fn discover(&self) -> Result<PathBuf, DiscoveryError> {
            self.0.clone().ok_or(DiscoveryError::NotFound { searched: vec![] })
        }
    }

    fn strategy(profile: ExecutionProfile, found: Option<&str>) -> LaunchStrategy {
        LaunchStrategy::new(
            profile,
            Arc::new(FixedDiscovery(found.map(PathBuf::from))),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_detect_prefers_explicit_flag() {
        let markers = PlatformMarkers {
            vercel: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(
            ExecutionProfile::detect(Some(ExecutionProfile::Unrestricted), &markers),
            ExecutionProfile::Unrestricted
        );
    }

    #[test]
    fn test_detect_from_markers() {
        let none = PlatformMarkers::default();
        assert_eq!(ExecutionProfile::detect(None, &none), ExecutionProfile::Unrestricted);

        let lambda = PlatformMarkers {
            aws_lambda_function_name: Some("render".into()),
            ..Default::default()
        };
        assert_eq!(ExecutionProfile::detect(None, &lambda), ExecutionProfile::Constrained);

        let blank = PlatformMarkers {
            vercel: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(ExecutionProfile::detect(None, &blank), ExecutionProfile::Unrestricted);
    }

    #[test]
    fn test_parse_profile() {
        assert_eq!("Constrained".parse(), Ok(ExecutionProfile::Constrained));
        assert_eq!(" unrestricted ".parse(), Ok(ExecutionProfile::Unrestricted));
        assert_eq!(
            "lambda".parse::<ExecutionProfile>(),
            Err(UnknownProfile("lambda".into()))
        );
    }

    #[test]
    fn test_constrained_plan_disables_sandbox() {
        let plan = strategy(ExecutionProfile::Constrained, Some("/tmp/chromium")).plan();
        assert!(!plan.sandbox);
        assert!(plan.args.iter().any(|a| a == "--no-sandbox"));
        assert_eq!(plan.executable, Some(PathBuf::from("/tmp/chromium")));
    }

    #[test]
    fn test_constrained_plan_survives_discovery_failure() {
        let plan = strategy(ExecutionProfile::Constrained, None).plan();
        assert_eq!(plan.executable, None);
        assert!(!plan.sandbox);
    }

    #[test]
    fn test_unrestricted_plan_keeps_sandbox() {
        let plan = strategy(ExecutionProfile::Unrestricted, Some("/tmp/chromium")).plan();
        assert!(plan.sandbox);
        assert!(plan.args.is_empty());
        assert_eq!(plan.executable, None);
        assert_eq!(plan.window_size, DEFAULT_WINDOW_SIZE);
    }

    #[test]
    fn test_chromium_discovery_missing_paths() {
        let discovery = ChromiumDiscovery::new(None)
            .with_candidates(vec![PathBuf::from("/definitely/not/here/chromium")]);
        assert!(matches!(
            discovery.discover(),
            Err(DiscoveryError::NotFound { .. })
        ));

        let explicit = ChromiumDiscovery::new(Some(PathBuf::from("/definitely/not/here")));
        assert!(matches!(
            explicit.discover(),
            Err(DiscoveryError::ConfiguredPathMissing(_))
        ));
    }

    #[test]
    fn test_chromium_discovery_finds_candidate() {
        let exe = std::env::current_exe().unwrap();
        let discovery = ChromiumDiscovery::new(None).with_candidates(vec![
            PathBuf::from("/definitely/not/here"),
            exe.clone(),
        ]);
        assert_eq!(discovery.discover().unwrap(), exe);
    }
}
