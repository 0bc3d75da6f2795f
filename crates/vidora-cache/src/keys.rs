//! Cache key generation and normalization.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Key unica para una lectura cacheada.
///
/// Se deriva de un endpoint y un conjunto de parametros. Los parametros se
/// ordenan lexicograficamente antes de serializarse, por lo que el orden de
/// insercion no afecta a la key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Deriva una key a partir de endpoint y parametros.
    ///
    /// El formato es `{endpoint}?{objeto JSON ordenado}`. Si un parametro se
    /// repite, gana el ultimo valor.
    ///
    /// # Examples
    ///
    /// ```
    /// use vidora_cache::CacheKey;
    ///
    /// let a = CacheKey::derive("/api/videos", [("page", "1"), ("limit", "12")]);
    /// let b = CacheKey::derive("/api/videos", [("limit", "12"), ("page", "1")]);
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str(), r#"/api/videos?{"limit":"12","page":"1"}"#);
    /// ```
    pub fn derive<I, K, V>(endpoint: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let sorted: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut key = String::with_capacity(endpoint.len() + 2 + sorted.len() * 16);
        key.push_str(endpoint);
        key.push_str("?{");
        for (i, (k, v)) in sorted.into_iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            key.push_str(&Value::String(k).to_string());
            key.push(':');
            key.push_str(&Value::String(v).to_string());
        }
        key.push('}');

        Self(key)
    }

    /// Retorna la key como `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume la key y retorna el `String` interno.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
