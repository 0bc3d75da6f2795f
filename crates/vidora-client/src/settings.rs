//! Client settings.
//!
//! Settings are layered: built-in defaults, then an optional file (format
//! picked from the extension), then `VIDORA_*` environment variables.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use vidora_cache::{CacheConfig, SweepConfig};

use crate::error::ClientError;

/// Prefix of the environment variables read by [`ClientSettings::load`].
pub const ENV_PREFIX: &str = "VIDORA";

/// Settings for [`RequestClient`](crate::RequestClient) and its sweeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Prefix for every endpoint, e.g. `https://vidora.example.com`.
    #[serde(default)]
    base_url: String,

    /// TTL for cached reads when the call does not set one.
    #[serde(default = "default_ttl_ms")]
    default_ttl_ms: u64,

    /// Interval between background sweeps.
    #[serde(default = "default_sweep_interval_ms")]
    sweep_interval_ms: u64,

    /// Overall request timeout enforced by the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,

    /// Bearer token attached to requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

fn default_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_sweep_interval_ms() -> u64 {
    10 * 60 * 1000
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_ttl_ms: default_ttl_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            timeout_ms: None,
            token: None,
        }
    }
}

impl ClientSettings {
    /// Loads settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ClientError> {
        Self::load_from(path, Some(ENV_PREFIX))
    }

    fn load_from(path: Option<&Path>, env_prefix: Option<&str>) -> Result<Self, ClientError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(Environment::with_prefix(prefix).try_parsing(true));
        }

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validated()
    }

    /// Checks invariants and normalizes the base URL.
    pub fn validated(mut self) -> Result<Self, ClientError> {
        if self.sweep_interval_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "sweep_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(ClientError::InvalidConfig(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if !self.base_url.is_empty()
            && !self.base_url.starts_with("http://")
            && !self.base_url.starts_with("https://")
        {
            return Err(ClientError::InvalidConfig(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        let trimmed_len = self.base_url.trim_end_matches('/').len();
        self.base_url.truncate(trimmed_len);
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Cache configuration derived from these settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: self.default_ttl(),
        }
    }

    /// Sweeper configuration derived from these settings.
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            interval: self.sweep_interval(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_ms = millis(ttl);
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = millis(interval);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(millis(timeout));
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
