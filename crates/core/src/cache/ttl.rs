//! The TTL cache itself.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use super::{CacheKey, Clock, SystemClock};
use crate::metrics::{CACHE_EVICTIONS, CACHE_LOOKUPS};

/// Default time-to-live for cached catalog responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub name: String,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub ttl_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Key/value store whose entries expire a fixed time after insertion.
///
/// The map sits behind a mutex that is never held across a fetch, so
/// concurrent misses on the same key may each run their fetch; the last one
/// to finish wins the slot.
#[derive(Debug)]
pub struct TtlCache<V> {
    name: &'static str,
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: Option<usize>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache using the system clock.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self::with_clock(name, ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source.
    pub fn with_clock(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: None,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Bound the number of entries. A bound of zero is ignored.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries.filter(|max| *max > 0);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.ttl
    }

    /// Return the cached value for `key` if present and fresh.
    ///
    /// An expired entry is dropped on the way out.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let (value, result) = match entries.get(key) {
            Some(entry) if !self.is_expired(entry, now) => (Some(entry.value.clone()), "hit"),
            Some(_) => {
                entries.remove(key);
                (None, "expired")
            }
            None => (None, "miss"),
        };
        drop(entries);

        CACHE_LOOKUPS.with_label_values(&[self.name, result]).inc();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit: cache={}, key={}", self.name, key);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("Cache {}: cache={}, key={}", result, self.name, key);
        }
        value
    }

    /// Store a value, stamping it with the current time.
    pub fn insert(&self, key: CacheKey, value: V) {
        let now = self.clock.now();
        let mut entries = self.lock();

        if let Some(max) = self.max_entries {
            if !entries.contains_key(&key) && entries.len() >= max {
                let before = entries.len();
                entries.retain(|_, entry| !self.is_expired(entry, now));
                let mut evicted = before - entries.len();

                while entries.len() >= max {
                    let oldest = entries
                        .iter()
                        .min_by_key(|(_, entry)| entry.inserted_at)
                        .map(|(k, _)| k.clone());
                    match oldest {
                        Some(oldest) => {
                            entries.remove(&oldest);
                            evicted += 1;
                        }
                        None => break,
                    }
                }

                if evicted > 0 {
                    self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
                    CACHE_EVICTIONS
                        .with_label_values(&[self.name])
                        .inc_by(evicted as u64);
                    debug!("Evicted {} entries from cache {}", evicted, self.name);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Return the fresh cached value for `key`, or run `fetch` and cache its
    /// successful result.
    ///
    /// A failed fetch leaves the cache untouched and hands the error back, so
    /// the next call for the same key fetches again.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop a single entry. Returns whether anything was removed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Drop expired entries and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            name: self.name.to_string(),
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
            max_entries: self.max_entries,
        }
    }
}
