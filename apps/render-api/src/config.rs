//! Render API configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional `folio.toml`
//! next to the binary, then environment variables (`PORT`, `APP_URL`, ...).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File, Map};
use folio_render::{
    ChromiumDiscovery, DocumentLocator, ExecutionProfile, LaunchStrategy, PlatformMarkers,
    SettleConfig, DEFAULT_BASE_URL,
};
use serde::{Deserialize, Serialize};

/// Headroom on top of the navigation timeout before the browser library
/// considers an idle process dead.
const IDLE_TIMEOUT_HEADROOM: Duration = Duration::from_secs(30);

/// Settings exactly as they arrive from defaults, file and environment.
#[derive(Debug, Deserialize)]
struct RawSettings {
    port: u16,
    bind_addr: String,
    app_url: Option<String>,
    vercel_url: Option<String>,
    folio_execution_profile: Option<String>,
    vercel: Option<String>,
    aws_lambda_function_name: Option<String>,
    chrome_path: Option<String>,
    service_token: Option<String>,
    navigation_timeout_ms: u64,
    quiet_window_ms: u64,
    settle_poll_ms: u64,
    max_concurrent_renders: usize,
    fallback_on_failure: bool,
    app_env: String,
}

/// Render API configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// HTTP listen address
    pub bind_addr: IpAddr,

    /// Base address of the front-end that serves the print views
    pub app_url: String,

    /// Resolved execution profile (explicit or detected)
    pub execution_profile: ExecutionProfile,

    /// Explicit browser binary
    pub chrome_path: Option<PathBuf>,

    /// Bearer token used when the caller sends none
    #[serde(skip)]
    pub service_token: Option<String>,

    /// Upper bound on waiting for the document to settle
    pub navigation_timeout: Duration,

    /// How long the page must go without new requests
    pub quiet_window: Duration,

    /// Settle poll interval
    pub settle_poll: Duration,

    /// Simultaneous renders allowed
    pub max_concurrent_renders: usize,

    /// Answer PDF requests with the text export when rendering fails
    pub fallback_on_failure: bool,

    /// Environment name reported by `/health`
    pub app_env: String,
}

impl ServerConfig {
    /// Load configuration from defaults, `folio.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(File::with_name("folio").required(false))
            .add_source(Environment::default())
            .build()?;

        Self::from_raw(settings.try_deserialize()?)
    }

    /// Load configuration from defaults and the given variables only.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(Environment::default().source(Some(vars)))
            .build()?;

        Self::from_raw(settings.try_deserialize()?)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let bind_addr = raw
            .bind_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid("BIND_ADDR", "not an IP address"))?;

        let app_url = match (non_empty(raw.app_url), non_empty(raw.vercel_url)) {
            (Some(url), _) => url,
            (None, Some(host)) => format!("https://{host}"),
            (None, None) => DEFAULT_BASE_URL.to_string(),
        };
        DocumentLocator::new(&app_url)
            .map_err(|e| ConfigError::invalid("APP_URL", e.to_string()))?;

        let explicit = non_empty(raw.folio_execution_profile)
            .map(|p| p.parse::<ExecutionProfile>())
            .transpose()
            .map_err(|e| ConfigError::invalid("FOLIO_EXECUTION_PROFILE", e.to_string()))?;
        let markers = PlatformMarkers {
            vercel: raw.vercel,
            aws_lambda_function_name: raw.aws_lambda_function_name,
        };

        if raw.navigation_timeout_ms == 0 {
            return Err(ConfigError::invalid("NAVIGATION_TIMEOUT_MS", "must be greater than 0"));
        }
        if raw.quiet_window_ms == 0 {
            return Err(ConfigError::invalid("QUIET_WINDOW_MS", "must be greater than 0"));
        }
        if raw.settle_poll_ms == 0 {
            return Err(ConfigError::invalid("SETTLE_POLL_MS", "must be greater than 0"));
        }
        if raw.quiet_window_ms >= raw.navigation_timeout_ms {
            return Err(ConfigError::invalid(
                "QUIET_WINDOW_MS",
                "must be shorter than NAVIGATION_TIMEOUT_MS",
            ));
        }
        if raw.max_concurrent_renders == 0 {
            return Err(ConfigError::invalid("MAX_CONCURRENT_RENDERS", "must be at least 1"));
        }

        Ok(ServerConfig {
            port: raw.port,
            bind_addr,
            app_url,
            execution_profile: ExecutionProfile::detect(explicit, &markers),
            chrome_path: non_empty(raw.chrome_path).map(PathBuf::from),
            service_token: non_empty(raw.service_token),
            navigation_timeout: Duration::from_millis(raw.navigation_timeout_ms),
            quiet_window: Duration::from_millis(raw.quiet_window_ms),
            settle_poll: Duration::from_millis(raw.settle_poll_ms),
            max_concurrent_renders: raw.max_concurrent_renders,
            fallback_on_failure: raw.fallback_on_failure,
            app_env: raw.app_env,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn settle_config(&self) -> SettleConfig {
        SettleConfig {
            timeout: self.navigation_timeout,
            quiet_window: self.quiet_window,
            poll_interval: self.settle_poll,
        }
    }

    pub fn launch_strategy(&self) -> LaunchStrategy {
        LaunchStrategy::new(
            self.execution_profile,
            std::sync::Arc::new(ChromiumDiscovery::new(self.chrome_path.clone())),
            self.navigation_timeout + IDLE_TIMEOUT_HEADROOM,
        )
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("port", 4000_i64)?
        .set_default("bind_addr", "0.0.0.0")?
        .set_default("navigation_timeout_ms", 30_000_i64)?
        .set_default("quiet_window_ms", 500_i64)?
        .set_default("settle_poll_ms", 100_i64)?
        .set_default("max_concurrent_renders", 4_i64)?
        .set_default("fallback_on_failure", false)?
        .set_default("app_env", "development")?)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}
