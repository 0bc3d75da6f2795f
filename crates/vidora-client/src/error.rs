//! Error types for the API client.

use serde_json::Value;

/// Errors raised by a [`Transport`](crate::transport::Transport) before a
/// response status is available.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client failed (connect, TLS, timeout, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A header name or value could not be encoded.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// Creates a new connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Returns true if retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Connection(_) => true,
            Self::InvalidHeader { .. } | Self::Decode(_) => false,
        }
    }
}

/// Errors returned by [`RequestClient`](crate::RequestClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The backend answered with a non-success status.
    #[error("{method} {endpoint} failed with status {status}")]
    Status {
        method: &'static str,
        endpoint: String,
        status: u16,
        body: Value,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response could not be decoded into the requested type.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Settings could not be loaded.
    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// Settings were loaded but are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Creates a new decode error.
    pub fn decode(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status of a failed response, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(e) => e.is_transient(),
            _ => false,
        }
    }
}
