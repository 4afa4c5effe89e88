//! Strict record types for the remote payload boundary.
//!
//! The remote API is loosely typed; everything it returns is parsed into
//! these structs at the fetch boundary. Anything that does not match is
//! rejected as a malformed payload instead of leaking dynamic data inward.

use serde::Deserialize;

/// One raw post record as returned by the remote collection.
///
/// Only the fields the extraction pipeline consumes are kept; unknown
/// fields in the payload are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    /// Remote record id.
    pub id: i64,
    /// Publish date string (site-local ISO-8601, occasionally RFC 3339).
    pub date: String,
    /// Rendered title markup.
    pub title: Rendered,
    /// Rendered body markup.
    pub content: Rendered,
}

/// WordPress wraps rendered markup in a `{ "rendered": ... }` object.
#[derive(Debug, Clone, Deserialize)]
pub struct Rendered {
    /// The rendered HTML fragment.
    pub rendered: String,
}

impl Rendered {
    /// Convenience constructor, mainly for tests and fetcher stubs.
    #[must_use]
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
        }
    }
}

/// One fetched page of the remote collection.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Records in the order the remote returned them.
    pub posts: Vec<RawPost>,
    /// Total page count from the `X-WP-TotalPages` header, when present.
    pub total_pages: Option<u32>,
}

impl FetchedPage {
    /// An empty page signalling end of pagination.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            total_pages: None,
        }
    }
}

/// Error body shape the remote uses for request rejections.
///
/// Only the machine-readable `code` matters: `rest_post_invalid_page_number`
/// marks a page past the end of the collection.
#[derive(Debug, Deserialize)]
pub(super) struct RemoteErrorBody {
    pub code: String,
}
