//! Search result types.

use serde::{Deserialize, Serialize};

/// A single image search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    /// Image title.
    pub title: String,
    /// Full-size image URL. Identity key for deduplication.
    pub image: String,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Page hosting the image.
    pub url: String,
    /// Image height in pixels.
    pub height: u64,
    /// Image width in pixels.
    pub width: u64,
    /// Upstream provider reported by the backend.
    pub source: String,
}

/// A single text (web) search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    /// Result title, markup stripped.
    pub title: String,
    /// Result URL. Identity key for deduplication.
    pub href: String,
    /// Result snippet, markup stripped. Never empty.
    pub body: String,
}
