//! Bounded in-memory TTL cache.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::fingerprint::QueryFingerprint;
use super::singleflight::{SingleFlight, SingleFlightError};

/// Cache hit/miss/size counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl Stats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// A bounded, single-tier, single-flight-protected TTL cache: check the
/// cache, populate on miss, with a bespoke size-bounded eviction policy.
pub struct TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    entries: DashMap<String, Entry<V>>,
    max_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    single_flight: SingleFlight<String, V, String>,
    clock: Arc<dyn Clock>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self::with_clock(max_size, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(max_size: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            max_size,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            single_flight: SingleFlight::new(),
            clock,
        }
    }

    /// `Get(key) -> value|absent`. Lazily drops an expired entry on miss.
    #[must_use]
    pub fn get(&self, key: &QueryFingerprint) -> Option<V> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key.as_str()) {
            if entry.expires_at > now {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }
        // Either absent or expired; drop the stale row if present.
        self.entries.remove(key.as_str());
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// `Set(key, value, ttl)`.
    pub fn set(&self, key: &QueryFingerprint, value: V, ttl: Duration) {
        self.evict_if_needed();
        let expires_at = self.clock.now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        self.entries
            .insert(key.as_str().to_string(), Entry { value, expires_at });
    }

    /// `GetOrCompute(key, ttl, producer)`. Prevents duplicate concurrent
    /// computation for a missing key by funneling concurrent misses through
    /// a single-flight group.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &QueryFingerprint,
        ttl: Duration,
        producer: F,
    ) -> Result<V, String>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, String>> + Send,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let key_owned = key.as_str().to_string();
        let result = self
            .single_flight
            .do_work(key_owned, producer())
            .await
            .map_err(|e| match e {
                SingleFlightError::WorkerFailed => {
                    "single-flight producer dropped or panicked".to_string()
                }
                SingleFlightError::Inner(inner) => inner,
            })?;

        self.set(key, result.clone(), ttl);
        Ok(result)
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.len(),
        }
    }

    /// Evict ~10% of entries ordered by earliest `expiresAt` first, when size
    /// would exceed `maxSize` on insertion of a new key.
    fn evict_if_needed(&self) {
        if self.entries.len() < self.max_size {
            return;
        }

        let evict_count = (self.max_size / 10).max(1);
        let mut candidates: Vec<(String, DateTime<Utc>)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().expires_at))
            .collect();
        candidates.sort_by_key(|(_, expires_at)| *expires_at);

        for (key, _) in candidates.into_iter().take(evict_count) {
            self.entries.remove(&key);
        }
        debug!(evicted = evict_count, "ttl_cache eviction");
    }

    /// Remove every expired entry eagerly. Used by the optional background
    /// sweeper; lazy expiry-on-read alone is sufficient without it.
    pub fn sweep(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

/// Spawn a periodic background sweeper that removes expired entries on an
/// interval. Optional — callers that skip this rely on lazy
/// expiry-on-read alone.
pub fn spawn_sweeper<V>(cache: Arc<TtlCache<V>>, interval: Duration) -> tokio::task::JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            cache.sweep();
        }
    })
}
