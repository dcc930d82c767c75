//! In-memory TTL cache layered over another `ApiClient`.
//!
//! Caches both positive (body) and negative (404) results to avoid
//! repeated network calls. Every other error goes to the inner client.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{ApiClient, ApiError};

#[derive(Debug, Clone)]
enum CachedOutcome {
    Body(String),
    NotFound,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: CachedOutcome,
    stored_at: Instant,
}

/// Caching decorator for any `ApiClient`.
pub struct CachingApiClient<C> {
    inner: C,
    ttl: Duration,
    memory: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<C: ApiClient> CachingApiClient<C> {
    /// Wrap `inner` with a cache whose entries live for `ttl`.
    ///
    /// A zero TTL disables caching.
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            memory: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Returns (hits, misses).
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Look up a live entry. An expired entry is evicted on the way out.
    fn get(&self, url: &str) -> Option<CachedOutcome> {
        {
            let cache = self.memory.read().ok()?;
            let entry = cache.get(url)?;
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.outcome.clone());
            }
        }

        if let Ok(mut cache) = self.memory.write() {
            if cache
                .get(url)
                .is_some_and(|entry| entry.stored_at.elapsed() >= self.ttl)
            {
                cache.remove(url);
            }
        }
        None
    }

    fn set(&self, url: &str, outcome: CachedOutcome) {
        if let Ok(mut cache) = self.memory.write() {
            cache.insert(
                url.to_string(),
                CacheEntry {
                    outcome,
                    stored_at: Instant::now(),
                },
            );
        }
    }
}

#[async_trait]
impl<C: ApiClient> ApiClient for CachingApiClient<C> {
    async fn fetch(&self, url: &str) -> Result<String, ApiError> {
        if self.ttl.is_zero() {
            return self.inner.fetch(url).await;
        }

        if let Some(cached) = self.get(url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(url, "cache hit");
            return match cached {
                CachedOutcome::Body(body) => Ok(body),
                CachedOutcome::NotFound => Err(ApiError::NotFound),
            };
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = self.inner.fetch(url).await;

        match &result {
            Ok(body) => self.set(url, CachedOutcome::Body(body.clone())),
            Err(ApiError::NotFound) => self.set(url, CachedOutcome::NotFound),
            Err(_) => {}
        }

        result
    }
}
