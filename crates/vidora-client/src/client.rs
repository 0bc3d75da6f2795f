//! Caching request client.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use vidora_cache::{CacheKey, CacheStats, InvalidationResult, TtlCache};

use crate::auth::TokenStore;
use crate::error::ClientError;
use crate::options::RequestOptions;
use crate::params::Params;
use crate::settings::ClientSettings;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Cache shared between the client and the sweeper.
pub type ResponseCache = TtlCache<Arc<Value>>;

/// Mediates all reads and writes to the backend.
///
/// Reads (`get`) are served from the [`ResponseCache`] when possible and
/// successful responses are stored for the requested TTL. Writes (`post`,
/// `put`, `delete`) never read or write the cache; callers invalidate the
/// affected reads afterwards with [`clear_cache`](Self::clear_cache).
///
/// Concurrent reads of the same uncached key each hit the backend; the last
/// response stored wins.
///
/// # Example
///
/// ```no_run
/// use vidora_client::{ClientSettings, Params, RequestClient, RequestOptions};
///
/// # async fn run() -> Result<(), vidora_client::ClientError> {
/// let client = RequestClient::from_settings(&ClientSettings::load(None)?)?;
///
/// let videos = client
///     .get("/api/videos", &Params::new().with("page", 1), &RequestOptions::default())
///     .await?;
/// println!("{}", videos);
///
/// client.clear_cache("/api/videos");
/// # Ok(())
/// # }
/// ```
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    tokens: TokenStore,
    base_url: String,
    default_ttl: Duration,
}

impl RequestClient {
    /// Creates a client over an existing transport and cache.
    ///
    /// The cache is injected so the same instance can be shared with a
    /// [`SweepScheduler`](vidora_cache::SweepScheduler).
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: ResponseCache,
        settings: &ClientSettings,
    ) -> Self {
        let tokens = match settings.token() {
            Some(token) => TokenStore::with_token(token),
            None => TokenStore::new(),
        };

        Self {
            transport,
            cache,
            tokens,
            base_url: settings.base_url().to_string(),
            default_ttl: settings.default_ttl(),
        }
    }

    /// Creates a client with an HTTP transport and a fresh cache.
    ///
    /// Settings are validated first, so a zero timeout is rejected instead
    /// of reaching the transport.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let settings = settings.clone().validated()?;
        let transport = HttpTransport::new(settings.timeout())?;
        let cache = TtlCache::with_config(settings.cache_config());
        Ok(Self::new(Arc::new(transport), cache, &settings))
    }

    /// Replaces the token store, e.g. to share it with a login flow.
    pub fn with_token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The cache backing this client.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Cache key of a read: absolute URL plus params, with the method mixed
    /// into the parameter set.
    pub fn cache_key(&self, method: Method, endpoint: &str, params: &Params) -> CacheKey {
        let url = self.url(endpoint);
        CacheKey::derive(
            &url,
            params
                .iter()
                .filter(|(k, _)| *k != "method")
                .chain(std::iter::once(("method", method.as_str()))),
        )
    }

    /// Reads `endpoint`, using the cache unless `options.cache` is false.
    ///
    /// # Errors
    ///
    /// - `ClientError::Status` if the backend answered with a non-2xx status
    /// - `ClientError::Transport` if the backend could not be reached
    ///
    /// Neither outcome touches the cache.
    pub async fn get(
        &self,
        endpoint: &str,
        params: &Params,
        options: &RequestOptions,
    ) -> Result<Arc<Value>, ClientError> {
        let key = self.cache_key(Method::Get, endpoint, params);

        if options.cache
            && let Some(cached) = self.cache.get(key.as_str())
        {
            return Ok(cached);
        }

        let response = self
            .execute(Method::Get, endpoint, params.clone(), None, options)
            .await?;
        let body = Arc::new(response.body);

        if options.cache {
            let ttl = options.cache_ttl.unwrap_or(self.default_ttl);
            self.cache.set(key.into_string(), Arc::clone(&body), ttl);
        }

        Ok(body)
    }

    /// Reads `endpoint` and decodes the body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params,
        options: &RequestOptions,
    ) -> Result<T, ClientError> {
        let body = self.get(endpoint, params, options).await?;
        T::deserialize(body.as_ref()).map_err(|e| ClientError::decode(endpoint, e))
    }

    /// Sends a POST. Never cached.
    pub async fn post(
        &self,
        endpoint: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        let response = self
            .execute(Method::Post, endpoint, Params::new(), Some(body.clone()), options)
            .await?;
        Ok(response.body)
    }

    /// Sends a PUT. Never cached.
    pub async fn put(
        &self,
        endpoint: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        let response = self
            .execute(Method::Put, endpoint, Params::new(), Some(body.clone()), options)
            .await?;
        Ok(response.body)
    }

    /// Sends a DELETE. Never cached.
    pub async fn delete(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        let response = self
            .execute(Method::Delete, endpoint, Params::new(), None, options)
            .await?;
        Ok(response.body)
    }

    /// Drops every cached read whose key contains `pattern`.
    pub fn clear_cache(&self, pattern: &str) -> InvalidationResult {
        let result = self.cache.invalidate_matching(pattern);
        debug!(pattern = %pattern, keys = result.count, "Cleared cache for pattern");
        result
    }

    /// Drops every cached read whose key matches the glob `pattern`.
    pub fn clear_cache_glob(&self, pattern: &str) -> InvalidationResult {
        self.cache.invalidate_by_glob(pattern)
    }

    /// Drops every cached read.
    pub fn clear_all_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: Params,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let mut headers: Vec<(String, String)> =
            self.tokens.authorization_header().into_iter().collect();
        headers.extend(options.headers.iter().cloned());

        let request = ApiRequest {
            method,
            url: self.url(endpoint),
            query,
            body,
            headers,
        };

        debug!(
            method = %method,
            endpoint = %endpoint,
            transport = self.transport.name(),
            "API request"
        );

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(method = %method, endpoint = %endpoint, error = %e, "API request failed");
            ClientError::from(e)
        })?;

        if !response.is_success() {
            warn!(
                method = %method,
                endpoint = %endpoint,
                status = response.status,
                "API request returned error status"
            );
            return Err(ClientError::Status {
                method: method.as_str(),
                endpoint: endpoint.to_string(),
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }
}
