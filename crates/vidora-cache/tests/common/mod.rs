#![allow(dead_code)]
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use vidora_cache::{CacheConfig, ManualClock, TtlCache};

/// Cache driven by a manual clock, plus the clock to move it.
pub fn manual_cache() -> (TtlCache<Arc<Value>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::with_clock(CacheConfig::default(), clock.clone());
    (cache, clock)
}

/// Stores `value` under each key with a one hour TTL.
pub fn seed(cache: &TtlCache<Arc<Value>>, keys: &[&str]) {
    for key in keys {
        cache.set(*key, Arc::new(json!({ "key": key })), Duration::from_secs(3600));
    }
}
