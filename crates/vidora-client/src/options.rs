//! Per-request options.

use std::time::Duration;

/// Options for a single client call.
///
/// `cache` and `cache_ttl` only affect reads; writes never touch the cache.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Whether a read may be served from and stored into the cache.
    pub cache: bool,
    /// TTL for the stored response. `None` uses the client default.
    pub cache_ttl: Option<Duration>,
    /// Extra headers, applied after the defaults.
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            cache: true,
            cache_ttl: None,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips the cache for this read.
    pub fn no_cache(mut self) -> Self {
        self.cache = false;
        self
    }

    /// Sets the TTL for the stored response.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
