//! Image search pagination.

use async_stream::try_stream;
use futures::Stream;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use super::Endpoints;
use crate::fetcher::Fetcher;
use crate::normalize::normalize_url;
use crate::paginate::{cursor_from_next, decode_row, parse_page, PaginationState};
use crate::params::ImageParams;
use crate::token::acquire_token;
use crate::transport::Transport;
use crate::{ImageResult, Result, SearchError, SearchQuery};

/// Upper bound on image pages fetched per call.
pub const MAX_IMAGE_ROUNDS: usize = 10;

#[derive(Deserialize)]
struct ImagesPage {
    results: Option<Vec<serde_json::Value>>,
    next: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ImageRow {
    title: Option<String>,
    image: Option<String>,
    thumbnail: Option<String>,
    url: Option<String>,
    height: Option<serde_json::Value>,
    width: Option<serde_json::Value>,
    source: Option<String>,
}

/// Reads a pixel dimension the backend may send as an integer, a float or a
/// numeric string. Anything else is zero.
fn dimension(value: Option<&serde_json::Value>) -> u64 {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.round() as u64)
        .unwrap_or_default()
}

impl ImageRow {
    fn into_result(self, image: String) -> ImageResult {
        ImageResult {
            title: self.title.unwrap_or_default(),
            image: normalize_url(&image),
            thumbnail: normalize_url(self.thumbnail.as_deref().unwrap_or_default()),
            url: normalize_url(self.url.as_deref().unwrap_or_default()),
            height: dimension(self.height.as_ref()),
            width: dimension(self.width.as_ref()),
            source: self.source.unwrap_or_default(),
        }
    }
}

/// Streams image results for `query`, following the backend's `next` cursor.
///
/// Ends quietly on a missing payload, a malformed page, a page with no new
/// images, or a page without a `next` link.
pub(crate) fn image_stream<'a, T: Transport>(
    fetcher: &'a Fetcher<T>,
    endpoints: &'a Endpoints,
    query: SearchQuery,
) -> impl Stream<Item = Result<ImageResult>> + Send + 'a {
    try_stream! {
        let vqd = acquire_token(fetcher, &endpoints.root, &query.keywords)
            .await
            .ok_or_else(|| SearchError::TokenUnavailable(query.keywords.clone()))?;

        let mut params = ImageParams::new(&query, vqd);
        let mut state = PaginationState::new();

        while state.rounds() < MAX_IMAGE_ROUNDS {
            let round = state.next_round();
            let payload = fetcher.fetch(Method::GET, &endpoints.images, &params).await?;
            let page = match payload.map(parse_page::<ImagesPage>) {
                Some(Ok(page)) => page,
                Some(Err(err)) => {
                    debug!(round, error = %err, "ending image stream");
                    break;
                }
                None => break,
            };
            let rows = match page.results {
                Some(rows) => rows,
                None => break,
            };

            let mut fresh = 0usize;
            for mut row in rows.into_iter().filter_map(decode_row::<ImageRow>) {
                let image = row.image.take().unwrap_or_default();
                if !state.admit(&image) {
                    continue;
                }
                fresh += 1;
                yield row.into_result(image);
            }
            debug!(
                round,
                fresh,
                seen = state.seen_count(),
                cursor = %params.cursor,
                "image page consumed"
            );

            if fresh == 0 {
                break;
            }
            match page.next.as_deref().and_then(cursor_from_next) {
                Some(cursor) => params.cursor = cursor,
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::fetcher::FetchConfig;
    use crate::testing::{html, json, MockTransport};
    use crate::transport::TransportResponse;
    use futures::{pin_mut, StreamExt, TryStreamExt};
    use std::time::Duration;

    const TOKEN_PAGE: &str = r#"<script>vqd="X1"</script>"#;

    fn fetcher(transport: MockTransport) -> Fetcher<MockTransport> {
        Fetcher::with_config(
            transport,
            FetchConfig {
                max_attempts: 3,
                retry_delay: Duration::ZERO,
            },
        )
    }

    fn row(image: &str) -> serde_json::Value {
        serde_json::json!({
            "title": "A cat",
            "image": image,
            "thumbnail": "https://tse.example/th?id=1",
            "url": "https://example.com/cats page",
            "height": 600,
            "width": 800,
            "source": "Bing",
        })
    }

    fn page(rows: Vec<serde_json::Value>, next: Option<&str>) -> String {
        let mut body = serde_json::json!({ "results": rows });
        if let Some(next) = next {
            body["next"] = serde_json::Value::String(next.to_string());
        }
        body.to_string()
    }

    async fn collect(fetcher: &Fetcher<MockTransport>, query: SearchQuery) -> Result<Vec<ImageResult>> {
        let endpoints = Endpoints::default();
        image_stream(fetcher, &endpoints, query).try_collect().await
    }

    #[tokio::test]
    async fn test_single_page_dedups_and_normalizes() {
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(&page(
                vec![row("https://example.com/a.jpg"), row("https://example.com/a.jpg")],
                None,
            )));
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].image, "https://example.com/a.jpg");
        assert_eq!(results[0].url, "https://example.com/cats+page");
        assert_eq!(results[0].height, 600);
        assert_eq!(results[0].width, 800);

        let requests = fetcher.transport().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "https://duckduckgo.com/i.js");
        assert_eq!(requests[1].param("vqd"), Some("X1"));
        assert_eq!(requests[1].param("s"), Some("0"));
    }

    #[tokio::test]
    async fn test_follows_next_cursor() {
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(&page(
                vec![row("https://example.com/1.jpg")],
                Some("i.js?q=cat&o=json&p=1&s=100&u=bing&l=wt-wt"),
            )))
            .respond(json(&page(vec![row("https://example.com/2.jpg")], None)));
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();

        assert_eq!(results.len(), 2);
        let requests = fetcher.transport().requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].param("s"), Some("100"));
    }

    #[tokio::test]
    async fn test_stops_when_round_has_no_new_results() {
        let next = Some("i.js?q=cat&s=100&l=wt-wt");
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(&page(vec![row("https://example.com/1.jpg")], next)))
            .respond(json(&page(vec![row("https://example.com/1.jpg")], next)))
            .respond(json(&page(vec![row("https://example.com/3.jpg")], None)));
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(fetcher.transport().request_count(), 3);
    }

    #[tokio::test]
    async fn test_bounded_to_ten_rounds() {
        let mut transport = MockTransport::new().respond(html(TOKEN_PAGE));
        for i in 0..12 {
            transport = transport.respond(json(&page(
                vec![row(&format!("https://example.com/{}.jpg", i))],
                Some("i.js?q=cat&s=100&l=wt-wt"),
            )));
        }
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();

        assert_eq!(results.len(), MAX_IMAGE_ROUNDS);
        assert_eq!(fetcher.transport().request_count(), 1 + MAX_IMAGE_ROUNDS);
    }

    #[tokio::test]
    async fn test_skips_rows_without_image() {
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(&page(
                vec![serde_json::json!({"title": "no image"}), row("https://example.com/ok.jpg")],
                None,
            )));
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].image, "https://example.com/ok.jpg");
    }

    #[tokio::test]
    async fn test_odd_rows_do_not_drop_the_page() {
        let mut fractional = row("https://example.com/2.jpg");
        fractional["height"] = serde_json::json!(600.5);
        fractional["width"] = serde_json::json!("800");
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(&page(
                vec![
                    row("https://example.com/1.jpg"),
                    fractional,
                    serde_json::json!({"image": 42}),
                    serde_json::json!("not a row"),
                ],
                None,
            )));
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].image, "https://example.com/2.jpg");
        assert_eq!(results[1].height, 601);
        assert_eq!(results[1].width, 800);
    }

    #[test]
    fn test_dimension() {
        use serde_json::json;
        assert_eq!(dimension(Some(&json!(600))), 600);
        assert_eq!(dimension(Some(&json!(600.4))), 600);
        assert_eq!(dimension(Some(&json!(" 320 "))), 320);
        assert_eq!(dimension(Some(&json!(-5))), 0);
        assert_eq!(dimension(Some(&json!("wide"))), 0);
        assert_eq!(dimension(None), 0);
    }

    #[tokio::test]
    async fn test_rejected_status_ends_quietly() {
        let forbidden = || TransportResponse { status: 403, ..json("{}") };
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(forbidden())
            .respond(forbidden())
            .respond(forbidden());
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(fetcher.transport().request_count(), 4);
    }

    #[tokio::test]
    async fn test_missing_results_ends_quietly() {
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(r#"{"query":"cat"}"#));
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_page_ends_quietly() {
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(r#"{"results":"oops"}"#));
        let fetcher = fetcher(transport);
        let results = collect(&fetcher, SearchQuery::new("cat")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_token_unavailable() {
        let transport = MockTransport::new().respond(html("<html>nothing</html>"));
        let fetcher = fetcher(transport);
        let err = collect(&fetcher, SearchQuery::new("cat")).await.unwrap_err();
        assert!(matches!(err, SearchError::TokenUnavailable(ref k) if k == "cat"));
        assert_eq!(fetcher.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_fatal_after_partial_results() {
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(&page(
                vec![row("https://example.com/1.jpg")],
                Some("i.js?q=cat&s=100&l=wt-wt"),
            )))
            .fail(FailureKind::BotDetected);
        let fetcher = fetcher(transport);
        let endpoints = Endpoints::default();
        let stream = image_stream(&fetcher, &endpoints, SearchQuery::new("cat"));
        pin_mut!(stream);

        assert!(stream.next().await.unwrap().is_ok());
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::BotDetected));
        assert!(stream.next().await.is_none());
        assert_eq!(fetcher.transport().request_count(), 3);
    }

    #[tokio::test]
    async fn test_prefix_consumption_stops_fetching() {
        let transport = MockTransport::new()
            .respond(html(TOKEN_PAGE))
            .respond(json(&page(
                vec![row("https://example.com/1.jpg"), row("https://example.com/2.jpg")],
                Some("i.js?q=cat&s=100&l=wt-wt"),
            )));
        let fetcher = fetcher(transport);
        let endpoints = Endpoints::default();
        let first: Vec<ImageResult> = image_stream(&fetcher, &endpoints, SearchQuery::new("cat"))
            .take(1)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(fetcher.transport().request_count(), 2);
    }
}
