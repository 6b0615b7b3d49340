//! Client configuration: API location and polling cadence.

use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::{BenchError, BenchResult};

/// Environment variable selecting the API base URL.
pub const API_URL_ENV: &str = "SPARKBENCH_API_URL";

pub const DEFAULT_API_URL: &str = "/api";
pub const DEFAULT_SERVER_ORIGIN: &str = "http://localhost:8000";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base, absolute or relative to `server_origin`.
    pub api_url: String,
    /// Origin used to resolve a relative `api_url`.
    pub server_origin: String,
    pub poll_interval_ms: u64,
    /// Hold on the "uploading" stage so the transition is visible.
    pub stage_pause_ms: u64,
    /// Delay before a terminal projection is cleared.
    pub clear_delay_ms: u64,
    /// Maximum total time spent polling before falling back.
    pub max_wait_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            server_origin: DEFAULT_SERVER_ORIGIN.to_string(),
            poll_interval_ms: 1500,
            stage_pause_ms: 500,
            clear_delay_ms: 3000,
            max_wait_secs: 600,
            request_timeout_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Load from a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> BenchResult<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("failed to read {}: {e}", path.display())))?;
        let cfg: ClientConfig = toml::from_str(&s).map_err(|e| BenchError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `SPARKBENCH_API_URL` if set.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    fn with_api_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(BenchError::Config("poll_interval_ms must be positive".into()));
        }
        if self.max_wait_secs == 0 {
            return Err(BenchError::Config("max_wait_secs must be positive".into()));
        }
        self.base_url().map(|_| ())
    }

    /// Resolve the API base to an absolute URL ending in `/`.
    pub fn base_url(&self) -> BenchResult<Url> {
        let mut base = match Url::parse(&self.api_url) {
            Ok(url) => url,
            Err(_) => {
                let origin = Url::parse(&self.server_origin).map_err(|e| {
                    BenchError::Config(format!("invalid server origin '{}': {e}", self.server_origin))
                })?;
                origin.join(&self.api_url).map_err(|e| {
                    BenchError::Config(format!("invalid api url '{}': {e}", self.api_url))
                })?
            }
        };
        if base.cannot_be_a_base() {
            return Err(BenchError::Config(format!("api url '{}' cannot be a base", self.api_url)));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stage_pause(&self) -> Duration {
        Duration::from_millis(self.stage_pause_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
