//! vqd session token acquisition.

use reqwest::Method;
use tracing::{debug, warn};

use crate::fetcher::{Fetcher, ResponsePayload};
use crate::params::TokenParams;
use crate::transport::Transport;

/// Start/end marker pairs, tried in order.
const TOKEN_MARKERS: [(&str, &str); 3] = [("vqd=\"", "\""), ("vqd=", "&"), ("vqd='", "'")];

/// Probes `root_url` for the vqd token bound to `keywords`.
///
/// Returns `None` when the probe fails, the payload is not text, or no marker
/// is present.
pub async fn acquire_token<T: Transport>(
    fetcher: &Fetcher<T>,
    root_url: &str,
    keywords: &str,
) -> Option<String> {
    let payload = match fetcher
        .fetch(Method::GET, root_url, &TokenParams { keywords })
        .await
    {
        Ok(payload) => payload,
        Err(err) => {
            warn!(keywords, error = %err, "vqd probe failed");
            return None;
        }
    };

    let token = payload.as_ref().and_then(ResponsePayload::as_text).and_then(extract_token);
    match &token {
        Some(vqd) => debug!(keywords, vqd = %vqd, "vqd acquired"),
        None => warn!(keywords, "vqd not found"),
    }
    token
}

/// Extracts the token using the first marker pair whose start and end are
/// both present.
pub fn extract_token(body: &str) -> Option<String> {
    TOKEN_MARKERS.iter().find_map(|(open, close)| {
        let start = body.find(open)? + open.len();
        let len = body[start..].find(close)?;
        Some(body[start..start + len].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::fetcher::FetchConfig;
    use crate::testing::{html, json, MockTransport};
    use std::time::Duration;

    fn fetcher(transport: MockTransport) -> Fetcher<MockTransport> {
        Fetcher::with_config(
            transport,
            FetchConfig {
                max_attempts: 3,
                retry_delay: Duration::ZERO,
            },
        )
    }

    #[test]
    fn test_extract_double_quoted() {
        assert_eq!(
            extract_token(r#"<script>nrj('/d.js?q=cat&vqd="ABC123"&p=1')</script>"#),
            Some("ABC123".to_string())
        );
    }

    #[test]
    fn test_extract_ampersand_delimited() {
        assert_eq!(
            extract_token("/d.js?q=cat&vqd=4-1234567&kl=wt-wt"),
            Some("4-1234567".to_string())
        );
    }

    #[test]
    fn test_extract_single_quoted() {
        assert_eq!(extract_token("vqd='Z9'"), Some("Z9".to_string()));
    }

    #[test]
    fn test_extract_first_pattern_wins() {
        assert_eq!(
            extract_token(r#"vqd="first" then vqd=second&"#),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract_token("<html>no token here</html>"), None);
        assert_eq!(extract_token(""), None);
    }

    #[tokio::test]
    async fn test_acquire_token_from_html() {
        let fetcher = fetcher(MockTransport::new().respond(html(r#"vqd="ABC123""#)));
        let token = acquire_token(&fetcher, "https://duckduckgo.com", "cat").await;
        assert_eq!(token, Some("ABC123".to_string()));

        let requests = fetcher.transport().requests();
        assert_eq!(requests[0].url, "https://duckduckgo.com");
        assert_eq!(requests[0].param("q"), Some("cat"));
    }

    #[tokio::test]
    async fn test_acquire_token_non_text_payload() {
        let fetcher = fetcher(MockTransport::new().respond(json(r#"{"vqd":"x"}"#)));
        assert_eq!(acquire_token(&fetcher, "https://duckduckgo.com", "cat").await, None);
    }

    #[tokio::test]
    async fn test_acquire_token_fetch_failure() {
        let fetcher = fetcher(MockTransport::new().fail(FailureKind::BotDetected));
        assert_eq!(acquire_token(&fetcher, "https://duckduckgo.com", "cat").await, None);
    }
}
