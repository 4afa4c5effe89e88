//! Page fetching against the remote resource collection.
//!
//! One [`PageFetcher::fetch_page`] call retrieves one bounded batch of
//! records. The trait seam exists so the extraction driver can run against
//! stub fetchers in tests; [`HttpFetcher`] is the real implementation.

mod client;
mod error;
mod record;

pub use client::HttpFetcher;
pub use error::FetchError;
pub use record::{FetchedPage, RawPost, Rendered};

use async_trait::async_trait;

use crate::request::ExtractionRequest;

/// Fetches one page of items from the remote collection.
///
/// Implementations classify every failure into a [`FetchError`] so callers
/// can make retry decisions without transport knowledge. End of pagination
/// is signalled by an empty page, a page past the reported total, or a
/// remote page-out-of-range rejection (which implementations must convert
/// into an empty page, not an error).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches page `page` (1-based) with `per_page` records per page.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`] on transport failure, remote
    /// rejection, or an unparseable payload.
    async fn fetch_page(
        &self,
        request: &ExtractionRequest,
        page: u32,
        per_page: u32,
    ) -> Result<FetchedPage, FetchError>;
}
