use crate::application::ports::{
    RateLimitAdmin, RateLimitConfig, RateLimited, RequestRateLimiter,
};
use crate::domain::{Clock, Timestamp};
use async_trait::async_trait;
use chrono::TimeDelta;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Per-client token bucket rate limiter
///
/// Buckets live in a sharded map, each behind its own mutex, so the
/// refill/consume step for one client is atomic while different clients
/// never wait on each other. Time comes from the injected clock.
pub struct TokenBucketRateLimiter<C: Clock> {
    config: RateLimitConfig,
    clock: Arc<C>,
    /// Per-client bucket state
    buckets: Arc<DashMap<String, Mutex<TokenBucket>>>,
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Timestamp,
}

impl TokenBucket {
    fn full(config: &RateLimitConfig, now: Timestamp) -> Self {
        TokenBucket {
            tokens: config.capacity,
            last_refill: now,
        }
    }

    /// Refill then take one token. A denied attempt leaves the bucket untouched
    /// so the partial credit accrued since `last_refill` is kept.
    fn try_consume(&mut self, config: &RateLimitConfig, now: Timestamp) -> Result<(), Duration> {
        let elapsed = (now - self.last_refill)
            .to_std()
            .unwrap_or_default()
            .as_secs_f64();
        let tokens = (self.tokens + elapsed * config.refill_per_second).min(config.capacity);

        if tokens < 1.0 {
            let deficit = 1.0 - tokens;
            let wait = Duration::try_from_secs_f64(deficit / config.refill_per_second)
                .unwrap_or(Duration::MAX);
            return Err(wait);
        }

        self.tokens = tokens - 1.0;
        self.last_refill = self.last_refill.max(now);
        Ok(())
    }
}

impl<C: Clock> TokenBucketRateLimiter<C> {
    pub fn new(config: RateLimitConfig, clock: Arc<C>) -> Self {
        TokenBucketRateLimiter {
            config,
            clock,
            buckets: Arc::new(DashMap::new()),
        }
    }

    fn consume(&self, client_id: &str) -> Result<(), Duration> {
        let now = self.clock.now();

        if let Some(bucket) = self.buckets.get(client_id) {
            return bucket.lock().try_consume(&self.config, now);
        }

        // Insert under the shard lock, then drop to a shared reference
        let bucket = self
            .buckets
            .entry(client_id.to_string())
            .or_insert_with(|| Mutex::new(TokenBucket::full(&self.config, now)))
            .downgrade();
        bucket.lock().try_consume(&self.config, now)
    }
}

impl<C: Clock> Clone for TokenBucketRateLimiter<C> {
    fn clone(&self) -> Self {
        TokenBucketRateLimiter {
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
            buckets: Arc::clone(&self.buckets),
        }
    }
}

#[async_trait]
impl<C: Clock> RequestRateLimiter for TokenBucketRateLimiter<C> {
    async fn check_and_consume(&self, client_id: &str) -> Result<(), RateLimited> {
        self.consume(client_id).map_err(|retry_after| {
            warn!(
                client_id,
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            RateLimited {
                retry_after: Some(retry_after),
            }
        })
    }
}

impl<C: Clock> RateLimitAdmin for TokenBucketRateLimiter<C> {
    fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let horizon = TimeDelta::from_std(self.config.idle_horizon()).unwrap_or(TimeDelta::MAX);

        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now - bucket.get_mut().last_refill < horizon);
        before.saturating_sub(self.buckets.len())
    }

    fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}
