//! reqwest-based HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::TransportError;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Transport that sends JSON requests over HTTP.
///
/// Every request gets `Content-Type: application/json` and an
/// `x-request-id` (UUID v7) unless the caller already set one.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with an optional overall request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_headers(request: &ApiRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        if !headers.contains_key(REQUEST_ID_HEADER) {
            let id = Uuid::now_v7().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
        }

        Ok(headers)
    }
}

/// Decodes a response body.
///
/// Empty bodies become `null`. A body that is not JSON is an error on a
/// successful response and is kept as a string on a failed one.
fn decode_body(status: u16, bytes: &[u8]) -> Result<Value, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(e) if (200..300).contains(&status) => Err(TransportError::Decode(e.to_string())),
        Err(_) => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let headers = Self::build_headers(&request)?;
        let url = request.full_url();

        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        debug!(url = %url, status = status, bytes = bytes.len(), "Received response");

        Ok(ApiResponse {
            status,
            body: decode_body(status, &bytes)?,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
