//! Backend addressing and status-inference settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4040";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_STATUS_PATH: &str = "/api/status";
const DEFAULT_STARTUP_BANNER: &str = "Uvicorn running on";
const DEFAULT_EXPECTED_STATUS: &str = "Backend is running";

const MIN_PORT: u16 = 1024;
const LOOPBACK_HOSTS: [&str; 3] = ["127.0.0.1", "localhost", "[::1]"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Backend base address (loopback only)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Path probed by `probe_status`
    #[serde(default = "default_status_path")]
    pub status_path: String,

    /// Stdout substring that marks the backend as up
    #[serde(default = "default_startup_banner")]
    pub startup_banner: String,

    /// `status` text a healthy backend reports; unchecked when absent
    #[serde(default = "default_expected_status")]
    pub expected_status: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_status_path() -> String {
    DEFAULT_STATUS_PATH.into()
}
fn default_startup_banner() -> String {
    DEFAULT_STARTUP_BANNER.into()
}
fn default_expected_status() -> Option<String> {
    Some(DEFAULT_EXPECTED_STATUS.into())
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            status_path: default_status_path(),
            startup_banner: default_startup_banner(),
            expected_status: default_expected_status(),
        }
    }
}

impl FacadeConfig {
    /// Default settings pointed at another base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL for a backend path.
    pub fn url_for(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }

    /// Check settings, returning a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid backend base URL {}: {e}", self.base_url))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!("Backend base URL must be http(s), got {}", url.scheme()));
        }

        let host = url.host_str().unwrap_or_default();
        if !LOOPBACK_HOSTS.contains(&host) {
            return Err(format!(
                "Backend host must be a loopback address, got {host}"
            ));
        }

        let port = url.port_or_known_default().unwrap_or_default();
        if port < MIN_PORT {
            return Err(format!("Backend port must be >= {MIN_PORT}, got {port}"));
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be > 0".into());
        }

        if !self.status_path.starts_with('/') {
            return Err("Status path must start with '/'".into());
        }

        if self.startup_banner.trim().is_empty() {
            return Err("Startup banner must not be empty".into());
        }

        Ok(())
    }
}
