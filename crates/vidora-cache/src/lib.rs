//! # Vidora Cache
//!
//! Process-local response cache used by the Vidora API client.
//!
//! ## Features
//!
//! - Per-entry TTL with lazy purge on lookup
//! - Order-independent cache keys derived from endpoint and parameters
//! - Invalidation by key substring or glob pattern
//! - Background sweeper with a stop handle
//! - Injectable clock for deterministic expiry in tests
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use vidora_cache::{CacheKey, TtlCache};
//!
//! let cache: TtlCache<String> = TtlCache::new();
//! let key = CacheKey::derive("/api/videos", [("page", "1")]);
//!
//! cache.set(key.as_str(), "[...]".to_string(), Duration::from_secs(300));
//! assert!(cache.get(key.as_str()).is_some());
//!
//! cache.invalidate_matching("/api/videos");
//! assert!(cache.get(key.as_str()).is_none());
//! ```

pub mod clock;
pub mod invalidation;
pub mod keys;
pub mod metrics;
pub mod store;
pub mod sweep;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use invalidation::InvalidationResult;
pub use keys::CacheKey;
pub use metrics::{CacheMetrics, EvictionReason, register_cache_metrics};
pub use store::{CacheConfig, CacheStats, DEFAULT_TTL, TtlCache};
pub use sweep::{SweepConfig, SweepHandle, SweepScheduler};
