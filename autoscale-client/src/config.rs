//! Client configuration

use std::path::PathBuf;

/// Configuration for talking to the autoscaling console proxy
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | AUTOSCALING_BASE_URL | http://localhost:8888 | Console proxy base URL |
/// | REQUEST_TIMEOUT_SECS | 30 | Transport timeout (seconds) |
/// | XSRF_TOKEN | - | Static CSRF token; otherwise read from the `_xsrf` cookie |
/// | MESSAGE_CATALOG | - | `.properties` file overriding the built-in messages |
/// | LOG_LEVEL | info | Default log level when `RUST_LOG` is unset |
/// | LOG_DIR | - | Directory for daily rolling log files |
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL (e.g., "http://localhost:8888")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Static CSRF token
    pub xsrf_token: Option<String>,

    /// Message catalog override
    pub message_catalog: Option<PathBuf>,

    pub log_level: String,

    pub log_dir: Option<String>,
}

impl SyncConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            xsrf_token: None,
            message_catalog: None,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("AUTOSCALING_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8888".into()),
            timeout: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            xsrf_token: std::env::var("XSRF_TOKEN").ok().filter(|t| !t.is_empty()),
            message_catalog: std::env::var("MESSAGE_CATALOG").ok().map(PathBuf::from),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Use a fixed CSRF token instead of the cookie
    pub fn with_xsrf_token(mut self, token: impl Into<String>) -> Self {
        self.xsrf_token = Some(token.into());
        self
    }

    /// Override built-in messages with a `.properties` file
    pub fn with_message_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.message_catalog = Some(path.into());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<String>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("http://localhost:8888")
    }
}
