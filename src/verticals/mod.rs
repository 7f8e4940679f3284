//! Paginated result streams, one per search vertical.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Result;

mod images;
mod text;

pub(crate) use images::image_stream;
pub(crate) use text::text_stream;

/// Transport-level URLs of the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Root HTML page probed for the vqd token.
    pub root: String,
    /// Image JSON endpoint.
    pub images: String,
    /// Text (links) JSON endpoint.
    pub text: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            root: "https://duckduckgo.com".to_string(),
            images: "https://duckduckgo.com/i.js".to_string(),
            text: "https://links.duckduckgo.com/d.js".to_string(),
        }
    }
}

impl Endpoints {
    /// Builds endpoints from explicit URLs, rejecting any that do not parse
    /// as absolute URLs.
    pub fn new(root: &str, images: &str, text: &str) -> Result<Self> {
        Ok(Self {
            root: Url::parse(root)?.to_string(),
            images: Url::parse(images)?.to_string(),
            text: Url::parse(text)?.to_string(),
        })
    }

    /// Points every endpoint at `base`, keeping the backend's paths.
    ///
    /// Useful for mirrors and local test servers.
    pub fn with_base(base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        Ok(Self {
            root: base.to_string(),
            images: base.join("/i.js")?.to_string(),
            text: base.join("/d.js")?.to_string(),
        })
    }
}
