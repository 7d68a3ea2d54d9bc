use chrono::TimeDelta;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{Clock, Timestamp};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    body: Value,
    inserted_at: Timestamp,
}

/// Decoded registry responses keyed by request signature
///
/// Only complete, successfully decoded bodies are inserted. Entries older
/// than the TTL are never served and are dropped lazily or by
/// [`ResponseCache::purge_expired`].
///
/// Fetches of one signature are serialized through
/// [`ResponseCache::lock_signature`] so that concurrent misses reach the
/// network once.
pub struct ResponseCache<C: Clock> {
    entries: DashMap<String, CacheEntry>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    ttl: TimeDelta,
    clock: Arc<C>,
}

/// Exclusive right to fetch one signature
///
/// Released on drop, including when the fetching future is cancelled.
pub struct FetchGuard<'a, C: Clock> {
    cache: &'a ResponseCache<C>,
    signature: String,
    _permit: OwnedMutexGuard<()>,
}

impl<C: Clock> Drop for FetchGuard<'_, C> {
    fn drop(&mut self) {
        // Map entry plus our own permit; anything more is a waiter
        self.cache
            .in_flight
            .remove_if(&self.signature, |_, lock| Arc::strong_count(lock) <= 2);
    }
}

impl<C: Clock> ResponseCache<C> {
    pub fn new(ttl: Duration, clock: Arc<C>) -> Self {
        ResponseCache {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    pub fn get(&self, signature: &str) -> Option<Value> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(signature) {
            if now - entry.inserted_at < self.ttl {
                return Some(entry.body.clone());
            }
        }

        self.entries
            .remove_if(signature, |_, entry| now - entry.inserted_at >= self.ttl);
        None
    }

    pub fn insert(&self, signature: impl Into<String>, body: Value) {
        self.entries.insert(
            signature.into(),
            CacheEntry {
                body,
                inserted_at: self.clock.now(),
            },
        );
    }

    /// Wait for exclusive fetch rights on `signature`
    ///
    /// Holders re-check [`ResponseCache::get`] after acquiring, since a
    /// previous holder may have filled the entry meanwhile.
    pub async fn lock_signature(&self, signature: &str) -> FetchGuard<'_, C> {
        let lock = Arc::clone(&self.in_flight.entry(signature.to_string()).or_default());
        let permit = lock.lock_owned().await;
        FetchGuard {
            cache: self,
            signature: signature.to_string(),
            _permit: permit,
        }
    }

    /// Signatures currently being fetched or waited on
    pub fn pending_fetches(&self) -> usize {
        self.in_flight.len()
    }

    /// Drop every stale entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now - entry.inserted_at < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
