//! # ddg-search
//!
//! A client for DuckDuckGo's unofficial image and text search endpoints.
//!
//! Every search goes through the same pipeline:
//!
//! - acquire a per-keyword `vqd` session token from the root page
//! - fetch result pages with a fixed-delay retry loop that understands the
//!   backend's soft-block (202) and bot-detection (418) signals
//! - paginate lazily, deduplicating results across pages
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddg_search::{SearchApi, SearchQuery};
//! use futures::{pin_mut, StreamExt};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = SearchApi::new()?;
//!
//!     let stream = api.text(SearchQuery::new("rust programming"))?;
//!     pin_mut!(stream);
//!     while let Some(result) = stream.next().await {
//!         let result = result?;
//!         println!("{}: {}", result.title, result.href);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod fetcher;
mod normalize;
mod paginate;
mod params;
mod query;
mod result;
mod search;
mod token;
mod transport;
mod transport_http;
mod verticals;

#[cfg(test)]
mod testing;

pub use error::{FailureKind, Result, SearchError, TransportError};
pub use fetcher::{FetchConfig, Fetcher, ResponsePayload};
pub use normalize::{normalize_text, normalize_url};
pub use params::{ImageParams, NoParams, RequestParams, TextParams, TokenParams};
pub use query::{
    ImageColor, ImageFilters, ImageLayout, ImageLicense, ImageSize, ImageType, SafeSearch,
    SearchQuery, TimeLimit, DEFAULT_REGION,
};
pub use result::{ImageResult, TextResult};
pub use search::SearchApi;
pub use token::{acquire_token, extract_token};
pub use transport::{Transport, TransportRequest, TransportResponse};
pub use transport_http::{HttpTransport, HttpTransportBuilder};
pub use verticals::Endpoints;
