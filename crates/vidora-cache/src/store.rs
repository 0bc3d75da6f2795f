//! In-memory TTL store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::metrics::{CacheMetrics, EvictionReason};

/// Default time-to-live for entries stored without an explicit TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Configuration for a [`TtlCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL used by [`TtlCache::set_default`] (default: 5 minutes).
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
        }
    }
}

/// Point-in-time view of the store contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries, including expired ones not yet purged.
    pub size: usize,
    /// Stored keys, sorted.
    pub keys: Vec<String>,
}

struct CacheEntry<V> {
    value: V,
    /// `None` only when `now + ttl` overflows `Instant`.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

struct Inner<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    metrics: CacheMetrics,
}

/// Process-local key/value store with per-entry expiration.
///
/// Entries are visible only while `now < expires_at`. An expired entry is
/// indistinguishable from a missing one: [`get`](Self::get) purges it on
/// lookup and [`sweep`](Self::sweep) removes the ones nobody asks for.
///
/// Cloning a `TtlCache` yields another handle to the same store, so one
/// instance built at startup can be handed to the request client and the
/// sweeper alike.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vidora_cache::TtlCache;
///
/// let cache: TtlCache<u32> = TtlCache::new();
/// cache.set("views:abc", 100, Duration::from_secs(60));
/// assert_eq!(cache.get("views:abc"), Some(100));
/// assert_eq!(cache.get("views:zzz"), None);
/// ```
pub struct TtlCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.inner.entries.lock().len())
            .field("default_ttl", &self.inner.default_ttl)
            .field("clock", &self.inner.clock)
            .finish()
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    /// Creates an empty cache with the default configuration and system clock.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates an empty cache with the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                clock,
                default_ttl: config.default_ttl,
                metrics: CacheMetrics::new(),
            }),
        }
    }

    /// TTL applied by [`set_default`](Self::set_default).
    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    /// Metrics recorded by this store.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.inner.metrics
    }

    /// Inserts or replaces the entry for `key`, expiring `ttl` from now.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let expires_at = self.inner.clock.now().checked_add(ttl);

        let count = {
            let mut entries = self.inner.entries.lock();
            entries.insert(key.clone(), CacheEntry { value, expires_at });
            entries.len()
        };

        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Cache set");
        self.inner.metrics.update_entry_count(count);
    }

    /// Inserts or replaces the entry for `key` with the default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.inner.default_ttl);
    }

    /// Returns true if `key` holds a live entry. Does not purge.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.inner.clock.now();
        self.inner
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Removes the entry for `key`. Returns whether an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        let (removed, count) = {
            let mut entries = self.inner.entries.lock();
            let removed = entries.remove(key).is_some();
            (removed, entries.len())
        };

        if removed {
            debug!(key = %key, "Cache entry deleted");
            self.inner.metrics.record_evictions(EvictionReason::Manual, 1);
            self.inner.metrics.update_entry_count(count);
        }
        removed
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.inner.entries.lock();
            let removed = entries.len();
            entries.clear();
            removed
        };

        info!(count = removed, "All cache entries cleared");
        self.inner.metrics.record_evictions(EvictionReason::Cleared, removed);
        self.inner.metrics.update_entry_count(0);
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = self.inner.clock.now();
        let (removed, count) = self.inner.metrics.time_operation("sweep", || {
            let mut entries = self.inner.entries.lock();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_live(now));
            (before - entries.len(), entries.len())
        });

        if removed > 0 {
            debug!(count = removed, "Swept expired cache entries");
        }
        self.inner.metrics.record_evictions(EvictionReason::Swept, removed);
        self.inner.metrics.update_entry_count(count);
        removed
    }

    /// Snapshot of all stored keys, including expired entries not yet purged.
    ///
    /// The list is detached from the store; later mutations are not reflected.
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.lock().keys().cloned().collect()
    }

    /// Number of stored entries, including expired entries not yet purged.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    /// Size and sorted key list of the store.
    pub fn stats(&self) -> CacheStats {
        let mut keys = self.keys();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }

    /// Removes the given keys; returns how many were present.
    pub(crate) fn remove_keys(&self, keys: &[String]) -> usize {
        let (removed, count) = {
            let mut entries = self.inner.entries.lock();
            let removed = keys.iter().filter(|k| entries.remove(*k).is_some()).count();
            (removed, entries.len())
        };

        self.inner.metrics.record_evictions(EvictionReason::Manual, removed);
        self.inner.metrics.update_entry_count(count);
        removed
    }
}

impl<V: Clone> TtlCache<V> {
    /// Returns the value for `key` if it is present and not expired.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<V> {
        let start = Instant::now();
        let now = self.inner.clock.now();

        // `purged` carries the entry count left after removing an expired entry.
        let (value, purged) = {
            let mut entries = self.inner.entries.lock();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => (Some(entry.value.clone()), None),
                Some(_) => {
                    entries.remove(key);
                    (None, Some(entries.len()))
                },
                None => (None, None),
            }
        };

        if value.is_some() {
            debug!(key = %key, "Cache hit");
            self.inner.metrics.record_hit();
        } else {
            debug!(key = %key, expired = purged.is_some(), "Cache miss");
            self.inner.metrics.record_miss();
        }
        if let Some(count) = purged {
            self.inner.metrics.record_evictions(EvictionReason::Expired, 1);
            self.inner.metrics.update_entry_count(count);
        }
        self.inner
            .metrics
            .record_operation_duration("get", start.elapsed());

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn manual_cache() -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(CacheConfig::default(), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_set_and_get() {
        let (cache, _clock) = manual_cache();
        cache.set("k", "v".to_string(), Duration::from_secs(1));
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_get_missing_is_none() {
        let (cache, _clock) = manual_cache();
        assert_eq!(cache.get("nope"), None);
        assert_eq!(cache.metrics().misses(), 1);
    }

    #[test]
    fn test_entry_expires_at_boundary() {
        let (cache, clock) = manual_cache();
        cache.set("k", "v".to_string(), Duration::from_millis(100));

        clock.advance(Duration::from_millis(99));
        assert!(cache.contains("k"));

        clock.advance(Duration::from_millis(1));
        assert!(!cache.contains("k"));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_get_purges_expired_entry() {
        let (cache, clock) = manual_cache();
        cache.set("k", "v".to_string(), Duration::from_millis(10));
        clock.advance(Duration::from_millis(20));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.metrics().evictions(), 1);
    }

    #[test]
    fn test_lazy_purge_updates_entry_gauge() {
        let (cache, clock) = manual_cache();
        cache.set("stale", "v".to_string(), Duration::from_millis(10));
        cache.set("fresh", "v".to_string(), Duration::from_secs(60));
        assert_eq!(cache.metrics().entries(), 2);

        clock.advance(Duration::from_millis(20));
        assert_eq!(cache.get("stale"), None);

        assert_eq!(cache.metrics().entries(), 1);
    }

    #[test]
    fn test_zero_ttl_is_never_visible() {
        let (cache, _clock) = manual_cache();
        cache.set("k", "v".to_string(), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_overwrite_resets_expiry() {
        let (cache, clock) = manual_cache();
        cache.set("k", "first".to_string(), Duration::from_millis(100));
        clock.advance(Duration::from_millis(80));
        cache.set("k", "second".to_string(), Duration::from_millis(100));
        clock.advance(Duration::from_millis(80));

        assert_eq!(cache.get("k"), Some("second".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let (cache, clock) = manual_cache();
        cache.set("k", "v".to_string(), Duration::MAX);
        clock.advance(Duration::from_secs(86_400 * 365));
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_set_default_uses_configured_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u8> = TtlCache::with_clock(
            CacheConfig {
                default_ttl: Duration::from_secs(2),
            },
            clock.clone(),
        );

        cache.set_default("k", 1);
        clock.advance(Duration::from_millis(1999));
        assert_eq!(cache.get("k"), Some(1));
        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_delete() {
        let (cache, _clock) = manual_cache();
        cache.set("k", "v".to_string(), Duration::from_secs(1));

        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (cache, _clock) = manual_cache();
        for i in 0..5 {
            cache.set(format!("k{i}"), "v".to_string(), Duration::from_secs(60));
        }

        cache.clear();
        cache.clear();

        assert!(cache.is_empty());
        for i in 0..5 {
            assert_eq!(cache.get(&format!("k{i}")), None);
        }
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (cache, clock) = manual_cache();
        cache.set("short", "a".to_string(), Duration::from_secs(1));
        cache.set("long", "b".to_string(), Duration::from_secs(60));
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.keys(), vec!["long".to_string()]);
        assert_eq!(cache.sweep(), 0);
    }

    #[test]
    fn test_keys_include_unswept_expired_entries() {
        let (cache, clock) = manual_cache();
        cache.set("a", "1".to_string(), Duration::from_secs(1));
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_keys_snapshot_is_detached() {
        let (cache, _clock) = manual_cache();
        cache.set("a", "1".to_string(), Duration::from_secs(1));
        let snapshot = cache.keys();
        cache.set("b", "2".to_string(), Duration::from_secs(1));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_stats_are_sorted() {
        let (cache, _clock) = manual_cache();
        cache.set("b", "2".to_string(), Duration::from_secs(1));
        cache.set("a", "1".to_string(), Duration::from_secs(1));

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_clones_share_store() {
        let (cache, _clock) = manual_cache();
        let handle = cache.clone();
        handle.set("k", "v".to_string(), Duration::from_secs(1));

        assert_eq!(cache.get("k"), Some("v".to_string()));
        assert_eq!(cache.metrics().hits(), 1);
    }
}
