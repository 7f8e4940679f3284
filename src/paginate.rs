//! Per-call pagination bookkeeping shared by the verticals.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::fetcher::ResponsePayload;
use crate::{Result, SearchError};

/// Dedup set and round counter for one search call.
#[derive(Debug, Default)]
pub struct PaginationState {
    seen: HashSet<String>,
    round: usize,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` and returns whether it was new.
    ///
    /// Empty keys are never admitted.
    pub fn admit(&mut self, key: &str) -> bool {
        !key.is_empty() && self.seen.insert(key.to_string())
    }

    /// Number of distinct keys seen so far.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Advances the round counter and returns the index of the new round.
    pub fn next_round(&mut self) -> usize {
        let round = self.round;
        self.round += 1;
        round
    }

    /// Rounds started so far.
    pub fn rounds(&self) -> usize {
        self.round
    }
}

/// Decodes a JSON payload into a page type.
///
/// Text payloads and shape mismatches are [`SearchError::Malformed`]; the
/// verticals log these and end the sequence rather than surfacing them.
pub fn parse_page<P: DeserializeOwned>(payload: ResponsePayload) -> Result<P> {
    let value = payload
        .into_json()
        .ok_or_else(|| SearchError::Malformed("expected JSON page, got text".to_string()))?;
    serde_json::from_value(value).map_err(|e| SearchError::Malformed(e.to_string()))
}

/// Decodes one result row, skipping it when its fields have the wrong shape.
///
/// A single odd row must not cost the rest of its page.
pub fn decode_row<R: DeserializeOwned>(value: serde_json::Value) -> Option<R> {
    match serde_json::from_value(value) {
        Ok(row) => Some(row),
        Err(err) => {
            debug!(error = %err, "skipping undecodable row");
            None
        }
    }
}

/// Pulls the `s` cursor out of a next-page URL: the text between `s=` and
/// the following `&` (or the end).
pub fn cursor_from_next(next: &str) -> Option<String> {
    let start = next.find("s=")? + 2;
    let rest = &next[start..];
    let end = rest.find('&').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}
