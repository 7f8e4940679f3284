//! HTTP transport using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Proxy, RequestBuilder};
use tracing::debug;

use crate::error::TransportError;
use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::Result;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A transport backed by a reqwest client.
///
/// GET parameters are URL-encoded into the query string; other methods send
/// them as a JSON object body.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Starts building a transport with custom settings.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Creates an `HttpTransport` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn prepare(&self, request: TransportRequest) -> RequestBuilder {
        let rb = self.client.request(request.method.clone(), &request.url);
        if request.method == Method::GET {
            return rb.query(&request.params);
        }
        let body: serde_json::Map<String, serde_json::Value> = request
            .params
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        rb.json(&body)
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    user_agent: String,
    timeout: Option<Duration>,
    proxy: Option<String>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            proxy: None,
        }
    }
}

impl HttpTransportBuilder {
    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Routes all requests through a proxy (http, https or socks5 URL).
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Builds the transport.
    pub fn build(self) -> Result<HttpTransport> {
        let mut builder = Client::builder().user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        Ok(HttpTransport {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> std::result::Result<TransportResponse, TransportError> {
        let response = self.prepare(request).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(status, url = %final_url, ?content_type, "response received");

        let body = response.text().await?;
        Ok(TransportResponse {
            status,
            final_url,
            content_type,
            body,
        })
    }
}
