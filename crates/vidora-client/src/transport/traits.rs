//! Transport trait definition.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::params::Params;

/// HTTP method of an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL (base URL + endpoint), without query string.
    pub url: String,
    pub query: Params,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// URL with the query string appended, if any.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.query.to_query_string())
        }
    }

    /// Returns the value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and decoded JSON body of a backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 response with the given body.
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can carry an [`ApiRequest`] to the backend.
///
/// Implementations report failures to reach the backend as
/// [`TransportError`]; any response that arrives, including 4xx/5xx, is
/// returned as an [`ApiResponse`] so the client decides what counts as
/// success.
///
/// # Implementors
///
/// - `HttpTransport` - reqwest-based HTTP transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the backend response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Returns the name of this transport, for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            Ok(ApiResponse::ok(json!({
                "method": request.method.as_str(),
                "url": request.full_url(),
            })))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn request(query: Params) -> ApiRequest {
        ApiRequest {
            method: Method::Get,
            url: "http://localhost/api/videos".to_string(),
            query,
            body: None,
            headers: vec![("Authorization".to_string(), "Bearer t".to_string())],
        }
    }

    #[tokio::test]
    async fn test_echo_transport() {
        let transport = EchoTransport;
        let response = transport
            .send(request(Params::new().with("page", 2)))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body["url"], "http://localhost/api/videos?page=2");
        assert_eq!(transport.name(), "echo");
    }

    #[test]
    fn test_full_url_without_query() {
        assert_eq!(request(Params::new()).full_url(), "http://localhost/api/videos");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request(Params::new());
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("x-request-id"), None);
    }

    #[test]
    fn test_success_range() {
        assert!(ApiResponse::new(204, Value::Null).is_success());
        assert!(!ApiResponse::new(304, Value::Null).is_success());
        assert!(!ApiResponse::new(500, Value::Null).is_success());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
