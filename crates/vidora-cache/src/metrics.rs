//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Motivo por el que una entrada salio del cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Purgada en un `get` al estar expirada.
    Expired,
    /// Eliminada por el sweep periodico.
    Swept,
    /// Eliminada explicitamente (delete o invalidacion por patron).
    Manual,
    /// Eliminada por `clear`.
    Cleared,
}

impl EvictionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Swept => "swept",
            Self::Manual => "manual",
            Self::Cleared => "cleared",
        }
    }
}

/// Registra las descripciones de las metricas de cache.
/// Llamar una vez al inicio.
pub fn register_cache_metrics() {
    metrics::describe_counter!("vidora_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("vidora_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "vidora_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!("vidora_cache_entries", "Current number of entries in cache");
    metrics::describe_histogram!(
        "vidora_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos ademas del facade `metrics`.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
    entries: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
            entries: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("vidora_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("vidora_cache_misses_total").increment(1);
    }

    /// Registra `count` evictions por el motivo dado
    pub fn record_evictions(&self, reason: EvictionReason, count: usize) {
        if count == 0 {
            return;
        }
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
        counter!("vidora_cache_evictions_total", "reason" => reason.as_str()).increment(count as u64);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: usize) {
        self.entries.store(count as u64, Ordering::Relaxed);
        gauge!("vidora_cache_entries").set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("vidora_cache_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Helper para medir tiempo de operacion
    pub fn time_operation<T, F: FnOnce() -> T>(&self, operation: &'static str, f: F) -> T {
        let start = Instant::now();
        let result = f();
        self.record_operation_duration(operation, start.elapsed());
        result
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Ultimo valor publicado en el gauge de entries
    pub fn entries(&self) -> u64 {
        self.entries.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}
