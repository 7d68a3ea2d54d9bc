//! Configuration loading for the gateway
//!
//! A JSON file supplies any subset of:
//! - Listen address and trusted reverse proxies
//! - Upstream registry location, timeout and cache TTL
//! - Rate-limit bucket parameters
//! - Pagination budget
//! - Maintenance sweep interval
//!
//! Missing fields fall back to defaults, and a few environment variables
//! override the file.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::application::{PaginationConfig, RateLimitConfig};
use crate::domain::MAX_PAGE_SIZE;
use crate::infrastructure::registry::DEFAULT_BASE_URL;

/// Root configuration for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Registry location and response caching
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Per-client token bucket
    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    /// Budget for multi-page aggregations
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

impl GatewayConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `HOST`, `PORT`, `TRUSTED_PROXIES` and `UPSTREAM_BASE_URL` from the process environment
    pub fn apply_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "PORT".to_string(),
                value: port,
            })?;
        }
        if let Some(proxies) = lookup("TRUSTED_PROXIES") {
            self.server.trusted_proxies = proxies
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<IpAddr>())
                .collect::<Result<_, _>>()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: "TRUSTED_PROXIES".to_string(),
                    value: proxies.clone(),
                })?;
        }
        if let Some(base_url) = lookup("UPSTREAM_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.rate_limits;
        if limits.capacity.is_nan() || limits.capacity < 1.0 {
            return Err(ConfigError::Invalid(
                "rate_limits.capacity must be at least 1".to_string(),
            ));
        }
        if limits.refill_per_second.is_nan() || limits.refill_per_second <= 0.0 {
            return Err(ConfigError::Invalid(
                "rate_limits.refill_per_second must be positive".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.pagination.page_size) {
            return Err(ConfigError::Invalid(format!(
                "pagination.page_size must be within 1..={}",
                MAX_PAGE_SIZE
            )));
        }
        if self.pagination.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "pagination.max_pages must be at least 1".to_string(),
            ));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "upstream.timeout_secs must be positive".to_string(),
            ));
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "upstream.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Listen address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Peers allowed to name the client in `X-Forwarded-For`
    ///
    /// Empty means the header is ignored and clients are keyed by peer address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lifetime of a cached response
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Periodic eviction of idle rate-limit buckets and stale cache entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl MaintenanceConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: String, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
