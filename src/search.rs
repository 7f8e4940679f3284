//! Public search entry points.

use futures::{Stream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::fetcher::{FetchConfig, Fetcher};
use crate::transport_http::HttpTransport;
use crate::verticals::{image_stream, text_stream, Endpoints};
use crate::{ImageResult, Result, SearchQuery, TextResult, Transport};

/// Client for the image and text search verticals.
///
/// Holds no per-search state: every call acquires its own vqd token and keeps
/// its own pagination and dedup state, so concurrent calls are independent.
pub struct SearchApi<T = HttpTransport> {
    fetcher: Fetcher<T>,
    endpoints: Endpoints,
}

impl SearchApi<HttpTransport> {
    /// Creates a client over a default [`HttpTransport`].
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?))
    }
}

impl<T: Transport> SearchApi<T> {
    /// Creates a client over a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            fetcher: Fetcher::new(transport),
            endpoints: Endpoints::default(),
        }
    }

    /// Sets the retry behaviour.
    pub fn with_fetch_config(self, config: FetchConfig) -> Self {
        let Self { fetcher, endpoints } = self;
        let transport = fetcher.into_transport();
        Self {
            fetcher: Fetcher::with_config(transport, config),
            endpoints,
        }
    }

    /// Overrides the backend URLs.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Returns the backend URLs in use.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Returns the retry behaviour in use.
    pub fn fetch_config(&self) -> &FetchConfig {
        self.fetcher.config()
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        self.fetcher.transport()
    }

    /// Lazily searches images.
    ///
    /// Fails with [`SearchError::MissingKeywords`](crate::SearchError::MissingKeywords)
    /// before any request when the keywords are empty. Nothing is fetched
    /// until the stream is polled, and dropping it stops further requests.
    pub fn images(
        &self,
        query: SearchQuery,
    ) -> Result<impl Stream<Item = Result<ImageResult>> + Send + '_> {
        query.validate()?;
        debug!(keywords = %query.keywords, region = %query.region, "image search");
        Ok(image_stream(&self.fetcher, &self.endpoints, query))
    }

    /// Lazily searches web text results.
    ///
    /// Same laziness and failure rules as [`SearchApi::images`].
    pub fn text(
        &self,
        query: SearchQuery,
    ) -> Result<impl Stream<Item = Result<TextResult>> + Send + '_> {
        query.validate()?;
        debug!(keywords = %query.keywords, region = %query.region, "text search");
        Ok(text_stream(&self.fetcher, &self.endpoints, query))
    }

    /// Collects at most `limit` image results.
    pub async fn collect_images(&self, query: SearchQuery, limit: usize) -> Result<Vec<ImageResult>> {
        self.images(query)?.take(limit).try_collect().await
    }

    /// Collects at most `limit` text results.
    pub async fn collect_text(&self, query: SearchQuery, limit: usize) -> Result<Vec<TextResult>> {
        self.text(query)?.take(limit).try_collect().await
    }
}
