//! Content-negotiating fetch with retry.
//!
//! [`Fetcher`] wraps a [`Transport`] and turns each call into at most
//! `max_attempts` requests:
//!
//! - a final URL containing `"500"` or a 202 status is a retryable failure
//! - 418 (bot detected) aborts immediately
//! - any other status besides 200 yields nothing for that attempt
//! - on 200 the body is returned as text or parsed JSON depending on the
//!   declared content type; an unrecognised content type yields nothing for
//!   that attempt
//! - `text/plain` is treated like HTML and `javascript` like JSON, since the
//!   backend serves both under those labels
//! - failures on earlier attempts are logged and swallowed; the last one is
//!   surfaced as [`SearchError::FatalHttp`]

use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FailureKind, TransportError};
use crate::params::RequestParams;
use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::{Result, SearchError};

/// Retry settings for [`Fetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    #[serde(default = "default_retry_delay", with = "duration_secs")]
    pub retry_delay: Duration,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(3)
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Parsed JSON document.
    Json(serde_json::Value),
    /// Raw text, typically HTML.
    Text(String),
}

impl ResponsePayload {
    /// Returns the text body, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Returns the JSON document, if this is a JSON payload.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

/// Retrying, content-negotiating wrapper around a [`Transport`].
pub struct Fetcher<T> {
    transport: T,
    config: FetchConfig,
}

impl<T: Transport> Fetcher<T> {
    /// Creates a fetcher with default retry settings.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, FetchConfig::default())
    }

    /// Creates a fetcher with custom retry settings.
    pub fn with_config(transport: T, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the retry settings.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consumes the fetcher, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Fetches `url` with `params`.
    ///
    /// `Ok(None)` means every attempt completed without a usable payload and
    /// none failed fatally.
    pub async fn fetch<P: RequestParams + ?Sized>(
        &self,
        method: Method,
        url: &str,
        params: &P,
    ) -> Result<Option<ResponsePayload>> {
        let request = TransportRequest {
            method,
            url: url.to_string(),
            params: params
                .pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        };

        let attempts = self.config.max_attempts.max(1);
        for attempt in 0..attempts {
            debug!(method = %request.method, url, attempt, "fetching");
            match self.attempt(request.clone()).await {
                Ok(Some(payload)) => return Ok(Some(payload)),
                Ok(None) => {}
                Err(err) => {
                    warn!(url, attempt, error = %err, "fetch attempt failed");
                    if err.is_fatal_http() || attempt + 1 >= attempts {
                        return Err(err.into_fatal());
                    }
                }
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
        Ok(None)
    }

    async fn attempt(&self, request: TransportRequest) -> Result<Option<ResponsePayload>> {
        let response = self.transport.send(request).await?;
        check_response(&response)?;
        if response.status != 200 {
            return Ok(None);
        }
        negotiate(response)
    }
}

fn check_response(response: &TransportResponse) -> Result<()> {
    if response.final_url.contains("500") {
        return Err(TransportError::new(
            FailureKind::ServerError,
            format!("error marker in final url {}", response.final_url),
        )
        .into());
    }
    if let Some(kind) = FailureKind::from_status(response.status) {
        return Err(TransportError::new(kind, format!("{} returned {}", response.final_url, response.status)).into());
    }
    Ok(())
}

fn negotiate(response: TransportResponse) -> Result<Option<ResponsePayload>> {
    let content_type = response
        .content_type
        .as_deref()
        .map(str::to_ascii_lowercase);

    match content_type.as_deref() {
        Some(ct) if ct.contains("text/html") || ct.contains("text/plain") => {
            Ok(Some(ResponsePayload::Text(response.body)))
        }
        Some(ct) if ct.contains("json") || ct.contains("javascript") => {
            match serde_json::from_str(&response.body) {
                Ok(value) => Ok(Some(ResponsePayload::Json(value))),
                Err(err) => {
                    debug!(error = %err, "declared JSON body did not parse");
                    Ok(None)
                }
            }
        }
        Some(ct) => {
            debug!(content_type = ct, "unrecognised content type");
            Ok(None)
        }
        // Undeclared: best effort.
        None => Ok(Some(
            serde_json::from_str(&response.body)
                .map(ResponsePayload::Json)
                .unwrap_or(ResponsePayload::Text(response.body)),
        )),
    }
}
