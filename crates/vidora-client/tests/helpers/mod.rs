//! Test helpers para vidora-client.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use vidora_client::vidora_cache::{CacheConfig, ManualClock, TtlCache};
use vidora_client::{
    ApiRequest, ApiResponse, ClientSettings, Method, RequestClient, Transport, TransportError,
};

pub const BASE_URL: &str = "http://vidora.test";

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

/// Transport falso: responde con un closure, registra cada request y puede
/// simular latencia.
pub struct MockTransport {
    responder: Box<Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Echoes method, path and body back with status 200.
    pub fn echo() -> Self {
        Self::new(|req| {
            Ok(ApiResponse::ok(json!({
                "method": req.method.as_str(),
                "url": req.full_url(),
                "body": req.body.clone().unwrap_or(Value::Null),
            })))
        })
    }

    /// Always answers with `status`.
    pub fn status(status: u16) -> Self {
        Self::new(move |_| Ok(ApiResponse::new(status, json!({ "error": "failed" }))))
    }

    /// Always fails before a response arrives.
    pub fn unreachable() -> Self {
        Self::new(|_| Err(TransportError::connection("connection refused")))
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn calls_with(&self, method: Method) -> usize {
        self.requests.lock().iter().filter(|r| r.method == method).count()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Client over `transport` with a manual clock driving the cache.
pub fn client_with_clock(transport: Arc<MockTransport>) -> (RequestClient, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let settings = ClientSettings::default().with_base_url(BASE_URL);
    let cache = TtlCache::with_clock(settings.cache_config(), clock.clone());
    (RequestClient::new(transport, cache, &settings), clock)
}

/// Client over `transport` with a real clock.
pub fn client(transport: Arc<MockTransport>) -> RequestClient {
    let settings = ClientSettings::default().with_base_url(BASE_URL);
    RequestClient::new(transport, TtlCache::with_config(CacheConfig::default()), &settings)
}
