use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Token bucket parameters, shared by every client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket size, also the burst a fresh client may spend at once
    pub capacity: f64,
    /// Tokens regained per second
    pub refill_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            capacity: 50.0,
            refill_per_second: 0.1,
        }
    }
}

impl RateLimitConfig {
    /// Time after which an untouched bucket is full again
    pub fn idle_horizon(&self) -> Duration {
        if self.refill_per_second <= 0.0 {
            return Duration::MAX;
        }
        Duration::try_from_secs_f64(self.capacity / self.refill_per_second).unwrap_or(Duration::MAX)
    }
}

/// Request denied; `retry_after` is the wait until one token is available
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rate limit exceeded")]
pub struct RateLimited {
    pub retry_after: Option<Duration>,
}

// ============================================================================
// Focused Rate Limiter Traits
// ============================================================================

/// Per-client admission check for inbound requests
#[async_trait]
pub trait RequestRateLimiter: Send + Sync {
    /// Take one token for `client_id`, or fail without consuming anything
    async fn check_and_consume(&self, client_id: &str) -> Result<(), RateLimited>;
}

/// Housekeeping on the limiter store
pub trait RateLimitAdmin: Send + Sync {
    /// Drop buckets that have refilled completely; returns how many were removed
    fn evict_idle(&self) -> usize;

    /// Number of clients currently tracked
    fn tracked_clients(&self) -> usize;
}

/// Full rate limiter combining both capabilities
pub trait RateLimiter: RequestRateLimiter + RateLimitAdmin {}

impl<T: RequestRateLimiter + RateLimitAdmin> RateLimiter for T {}
