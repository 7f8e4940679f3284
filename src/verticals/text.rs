//! Text search pagination over a fixed offset sequence.

use async_stream::try_stream;
use futures::Stream;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use super::Endpoints;
use crate::fetcher::Fetcher;
use crate::normalize::{normalize_text, normalize_url};
use crate::paginate::{decode_row, parse_page, PaginationState};
use crate::params::TextParams;
use crate::token::acquire_token;
use crate::transport::Transport;
use crate::{Result, SearchError, SearchQuery, TextResult};

/// Offsets requested from the links endpoint; nothing exists past the last.
pub const TEXT_OFFSETS: [&str; 4] = ["0", "20", "70", "120"];

#[derive(Deserialize)]
struct TextPage {
    results: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TextRow {
    #[serde(rename = "u")]
    href: Option<String>,
    #[serde(rename = "t")]
    title: Option<String>,
    #[serde(rename = "a")]
    body: Option<String>,
}

/// The placeholder row the backend injects that points back at a Google
/// search for the same keywords.
fn placeholder_href(keywords: &str) -> String {
    format!("http://www.google.com/search?q={}", keywords)
}

/// Streams text results for `query` across [`TEXT_OFFSETS`].
///
/// Ends quietly on a missing payload, a malformed page, or an offset that
/// produced nothing new.
pub(crate) fn text_stream<'a, T: Transport>(
    fetcher: &'a Fetcher<T>,
    endpoints: &'a Endpoints,
    query: SearchQuery,
) -> impl Stream<Item = Result<TextResult>> + Send + 'a {
    try_stream! {
        let vqd = acquire_token(fetcher, &endpoints.root, &query.keywords)
            .await
            .ok_or_else(|| SearchError::TokenUnavailable(query.keywords.clone()))?;

        let placeholder = placeholder_href(&query.keywords);
        let mut params = TextParams::new(&query, vqd);
        let mut state = PaginationState::new();

        for offset in TEXT_OFFSETS {
            let round = state.next_round();
            params.cursor = offset.to_string();
            let payload = fetcher.fetch(Method::GET, &endpoints.text, &params).await?;
            let rows = match payload.map(parse_page::<TextPage>) {
                Some(Ok(TextPage { results: Some(rows) })) => rows,
                Some(Err(err)) => {
                    debug!(round, error = %err, "ending text stream");
                    break;
                }
                _ => break,
            };

            let mut fresh = 0usize;
            for row in rows.into_iter().filter_map(decode_row::<TextRow>) {
                let href = row.href.unwrap_or_default();
                if href == placeholder || !state.admit(&href) {
                    continue;
                }
                let body = normalize_text(row.body.as_deref().unwrap_or_default());
                if body.is_empty() {
                    continue;
                }
                fresh += 1;
                yield TextResult {
                    title: normalize_text(row.title.as_deref().unwrap_or_default()),
                    href: normalize_url(&href),
                    body,
                };
            }
            debug!(round, offset, fresh, "text page consumed");

            if fresh == 0 {
                break;
            }
        }
    }
}
