//! Error types for the search client.

use std::fmt;

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Structured classification of a failed HTTP exchange.
///
/// Retry decisions are made on this tag rather than on error message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// HTTP 418, the backend's bot-detection signal. Never retried.
    BotDetected,
    /// HTTP 202, a challenge or rate-limit page.
    SoftBlock,
    /// The final response URL carries a "500" marker.
    ServerError,
    /// Any other non-success status reported by a transport.
    Status(u16),
    /// Connection, TLS or timeout failure below HTTP.
    Network,
    /// The body could not be read or decoded.
    Decode,
}

impl FailureKind {
    /// Maps an HTTP status to a failure kind.
    ///
    /// Only 418 and 202 are failures; any other status that is not 200 simply
    /// yields no payload for that attempt.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            418 => Some(Self::BotDetected),
            202 => Some(Self::SoftBlock),
            _ => None,
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::BotDetected)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BotDetected => write!(f, "bot detected (418)"),
            Self::SoftBlock => write!(f, "soft block (202)"),
            Self::ServerError => write!(f, "server error"),
            Self::Status(code) => write!(f, "status {}", code),
            Self::Network => write!(f, "network"),
            Self::Decode => write!(f, "decode"),
        }
    }
}

/// Error raised by a [`Transport`](crate::Transport) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    /// What went wrong.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub message: String,
}

impl TransportError {
    /// Creates a new transport error.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = match err.status() {
            Some(status) => {
                FailureKind::from_status(status.as_u16()).unwrap_or(FailureKind::Network)
            }
            None if err.is_decode() || err.is_body() => FailureKind::Decode,
            None => FailureKind::Network,
        };
        Self::new(kind, err.to_string())
    }
}

/// Errors that can occur during search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Keywords were empty; raised before any request is made.
    #[error("Keywords are mandatory")]
    MissingKeywords,

    /// The vqd token probe failed or no token marker was found.
    #[error("Could not obtain vqd token for {0:?}")]
    TokenUnavailable(String),

    /// A retryable failure on a single attempt.
    #[error("Transient HTTP failure ({kind}): {message}")]
    TransientHttp { kind: FailureKind, message: String },

    /// A bot-detection signal, or the retry budget was exhausted.
    #[error("HTTP request failed ({kind}): {message}")]
    FatalHttp { kind: FailureKind, message: String },

    /// Payload present but not in the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured endpoint is not a valid absolute URL.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SearchError {
    /// Failure kind for HTTP errors, if any.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::TransientHttp { kind, .. } | Self::FatalHttp { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this error is the fatal HTTP kind that terminates a sequence.
    pub fn is_fatal_http(&self) -> bool {
        matches!(self, Self::FatalHttp { .. })
    }

    pub(crate) fn transient(err: TransportError) -> Self {
        Self::TransientHttp {
            kind: err.kind,
            message: err.message,
        }
    }

    pub(crate) fn into_fatal(self) -> Self {
        match self {
            Self::TransientHttp { kind, message } => Self::FatalHttp { kind, message },
            other => other,
        }
    }
}

impl From<TransportError> for SearchError {
    fn from(err: TransportError) -> Self {
        if err.kind.is_retryable() {
            Self::transient(err)
        } else {
            Self::FatalHttp {
                kind: err.kind,
                message: err.message,
            }
        }
    }
}
