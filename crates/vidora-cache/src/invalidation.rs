//! Cache invalidation by key substring or glob pattern.

use glob::Pattern;
use tracing::{debug, info};

use crate::store::TtlCache;

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationResult {
    /// Número de entries invalidadas.
    pub count: usize,
    /// Patrones aplicados.
    pub patterns: Vec<String>,
}

impl<V> TtlCache<V> {
    /// Invalida todas las entries cuya key contiene `pattern`.
    ///
    /// Se usa tras una escritura para descartar las lecturas que pudieran
    /// haber quedado obsoletas.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::time::Duration;
    /// # use vidora_cache::TtlCache;
    /// let cache: TtlCache<u8> = TtlCache::new();
    /// cache.set("videos/123", 1, Duration::from_secs(60));
    /// cache.set("videos/123/comments", 2, Duration::from_secs(60));
    /// cache.set("videos/456", 3, Duration::from_secs(60));
    ///
    /// let result = cache.invalidate_matching("videos/123");
    /// assert_eq!(result.count, 2);
    /// assert_eq!(cache.get("videos/456"), Some(3));
    /// ```
    pub fn invalidate_matching(&self, pattern: &str) -> InvalidationResult {
        let matched: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|key| key.contains(pattern))
            .collect();

        let count = self.remove_keys(&matched);

        info!(
            pattern = %pattern,
            count = count,
            "Cache entries invalidated by pattern"
        );

        InvalidationResult {
            count,
            patterns: vec![pattern.to_string()],
        }
    }

    /// Invalida entries usando un patrón glob (`*`, `?`, `[..]`).
    ///
    /// Un patrón inválido no invalida nada.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::time::Duration;
    /// # use vidora_cache::TtlCache;
    /// let cache: TtlCache<u8> = TtlCache::new();
    /// cache.set("/api/videos/1?{}", 1, Duration::from_secs(60));
    /// cache.set("/api/users/1?{}", 2, Duration::from_secs(60));
    ///
    /// let result = cache.invalidate_by_glob("/api/videos/*");
    /// assert_eq!(result.count, 1);
    /// ```
    pub fn invalidate_by_glob(&self, pattern_str: &str) -> InvalidationResult {
        let pattern = match Pattern::new(pattern_str) {
            Ok(p) => p,
            Err(e) => {
                debug!(pattern = %pattern_str, error = %e, "Invalid glob pattern");
                return InvalidationResult {
                    count: 0,
                    patterns: vec![pattern_str.to_string()],
                };
            },
        };

        let matched: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|key| pattern.matches(key))
            .collect();

        let count = self.remove_keys(&matched);

        info!(
            pattern = %pattern_str,
            count = count,
            "Cache entries invalidated by glob"
        );

        InvalidationResult {
            count,
            patterns: vec![pattern_str.to_string()],
        }
    }

    /// Invalida por varios substrings a la vez.
    pub fn invalidate_by_patterns(&self, patterns: &[&str]) -> InvalidationResult {
        let mut total_count = 0;
        let mut all_patterns = Vec::new();

        for pattern in patterns {
            let result = self.invalidate_matching(pattern);
            total_count += result.count;
            all_patterns.extend(result.patterns);
        }

        InvalidationResult {
            count: total_count,
            patterns: all_patterns,
        }
    }
}
