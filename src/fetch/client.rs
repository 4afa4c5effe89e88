//! HTTP fetcher for the remote REST collection.
//!
//! Builds the paginated collection query, classifies transport and payload
//! failures into [`FetchError`], and parses response bodies into strict
//! record types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::FetchError;
use super::record::{FetchedPage, RawPost, RemoteErrorBody};
use super::PageFetcher;
use crate::request::ExtractionRequest;

/// Connect timeout for collection requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rejection code the remote emits for a page past the end of the
/// collection. Treated as end-of-pagination, not as an error.
const INVALID_PAGE_CODE: &str = "rest_post_invalid_page_number";

/// Response header carrying the total page count.
const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// Fetches pages of a remote resource collection over HTTP.
///
/// Designed to be created once and shared; the underlying reqwest client
/// pools connections.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Creates a new fetcher with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .build()
            .expect("HTTP client builder failed with static configuration");
        Self { client }
    }

    /// Builds the collection endpoint URL for a request.
    fn endpoint(request: &ExtractionRequest) -> Result<Url, FetchError> {
        let path = format!("wp-json/wp/v2/{}", request.post_type());
        // Ensure a trailing slash on the origin so join() appends instead of replacing
        let mut base = request.base_url().clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(&path)
            .map_err(|e| FetchError::malformed_payload(request.base_url().as_str(), e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self, request), fields(post_type = request.post_type(), page))]
    async fn fetch_page(
        &self,
        request: &ExtractionRequest,
        page: u32,
        per_page: u32,
    ) -> Result<FetchedPage, FetchError> {
        let endpoint = Self::endpoint(request)?;
        let url = endpoint.as_str().to_string();

        let mut req = self.client.get(endpoint).query(&[
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("status", "publish".to_string()),
            ("orderby", "date".to_string()),
            ("order", "desc".to_string()),
        ]);
        if let Some(after) = request.after() {
            req = req.query(&[("after", after.format("%Y-%m-%dT%H:%M:%S").to_string())]);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(&url)
            } else {
                FetchError::network(&url, e)
            }
        })?;

        let status = response.status();
        let total_pages = parse_total_pages(&response);

        if !status.is_success() {
            if page > 1 && is_page_out_of_range(status, response).await {
                debug!(page, "page past end of collection, ending pagination");
                return Ok(FetchedPage::empty());
            }
            return Err(FetchError::remote_status(&url, status.as_u16()));
        }

        let posts: Vec<RawPost> = match response.json().await {
            Ok(posts) => posts,
            Err(e) if e.is_decode() => {
                return Err(FetchError::malformed_payload(&url, e.to_string()));
            }
            Err(e) => return Err(FetchError::network(&url, e)),
        };

        debug!(page, posts = posts.len(), ?total_pages, "fetched page");
        Ok(FetchedPage { posts, total_pages })
    }
}

/// Reads the total page count header, if the remote sent one.
fn parse_total_pages(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(TOTAL_PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Checks a rejection body for the page-out-of-range code.
///
/// Consumes the response; only called on non-2xx statuses where the body
/// is already known not to be a record collection.
async fn is_page_out_of_range(status: StatusCode, response: Response) -> bool {
    if status != StatusCode::BAD_REQUEST {
        return false;
    }
    match response.text().await {
        Ok(body) => serde_json::from_str::<RemoteErrorBody>(&body)
            .map(|b| b.code == INVALID_PAGE_CODE)
            .unwrap_or(false),
        Err(e) => {
            warn!(error = %e, "could not read rejection body");
            false
        }
    }
}
