//! Transport abstraction for issuing a single HTTP request.

use async_trait::async_trait;
use reqwest::Method;

use crate::error::TransportError;

/// One HTTP request as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL without query string.
    pub url: String,
    /// Ordered parameters; query string for GET, body otherwise.
    pub params: Vec<(String, String)>,
}

impl TransportRequest {
    /// Looks up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What came back from the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    /// Declared `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

/// Trait for performing one HTTP exchange.
///
/// Implementations do not retry and do not interpret the body; they classify
/// failures they observe below HTTP with a [`FailureKind`](crate::FailureKind).
/// Non-success statuses are returned as responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the raw response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
