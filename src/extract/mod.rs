//! Extraction driver: walks every page of a remote collection, normalizes
//! each record, and reports progress after each page.
//!
//! Page processing is strictly sequential so progress counters and item
//! ordering stay deterministic. Transient fetch failures are retried with
//! exponential backoff; everything else aborts the run. A failed run is
//! all-or-nothing: it never reports the items collected before the failure
//! as if they were a result.

mod outcome;
mod retry;

pub use outcome::{ExtractionOutcome, ExtractionStatus, Item, Progress};
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryDecision, RetryPolicy};

use tracing::{debug, info, instrument, warn};

use crate::fetch::{FetchError, FetchedPage, PageFetcher};
use crate::request::ExtractionRequest;

/// Default page size requested from the remote collection.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Callback invoked after each processed page.
pub type ProgressSink<'a> = &'a mut (dyn FnMut(Progress) + Send);

/// Drives a full extraction run over a [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct ExtractionDriver {
    retry_policy: RetryPolicy,
    per_page: u32,
}

impl Default for ExtractionDriver {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), DEFAULT_PER_PAGE)
    }
}

impl ExtractionDriver {
    /// Creates a driver with the given retry policy and page size.
    ///
    /// `per_page` is clamped to at least 1.
    #[must_use]
    pub fn new(retry_policy: RetryPolicy, per_page: u32) -> Self {
        Self {
            retry_policy,
            per_page: per_page.max(1),
        }
    }

    /// Returns the configured page size.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Runs the extraction to a terminal outcome.
    ///
    /// Fetch-path errors never escape: they are converted into a failed
    /// outcome carrying a human-readable description. `sink` is invoked
    /// once before the first page and once after each processed page, with
    /// non-decreasing `processed_items`.
    #[instrument(skip(self, fetcher, request, sink), fields(post_type = request.post_type()))]
    pub async fn run(
        &self,
        fetcher: &dyn PageFetcher,
        request: &ExtractionRequest,
        sink: ProgressSink<'_>,
    ) -> ExtractionOutcome {
        let mut items: Vec<Item> = Vec::new();
        let mut page: u32 = 1;
        let mut total_pages: u32 = 0; // unknown until the remote reports it
        let mut header_seen = false;
        let mut pages_processed: u32 = 0;

        info!("starting extraction");
        sink(Progress {
            current_page: 0,
            total_pages: 0,
            processed_items: 0,
        });

        loop {
            let fetched = match self.fetch_with_retry(fetcher, request, page).await {
                Ok(fetched) => fetched,
                Err((error, attempts)) => {
                    warn!(page, attempts, error = %error, "extraction aborted");
                    // All-or-nothing: items collected so far are dropped
                    return ExtractionOutcome::failed(format!(
                        "failed on page {page} after {attempts} attempt(s): {error}"
                    ));
                }
            };

            if let Some(reported) = fetched.total_pages {
                total_pages = reported;
                header_seen = true;
            }

            if fetched.posts.is_empty() {
                debug!(page, "empty page, ending pagination");
                break;
            }

            for raw in &fetched.posts {
                match Item::from_raw(raw) {
                    Some(item) => items.push(item),
                    None => {
                        warn!(post_id = raw.id, date = %raw.date, "skipping record with unparseable date");
                    }
                }
            }
            pages_processed = page;

            sink(Progress {
                current_page: page,
                total_pages,
                processed_items: items.len(),
            });

            if header_seen && page >= total_pages {
                break;
            }
            page += 1;
        }

        let total_pages = if header_seen {
            total_pages
        } else {
            pages_processed
        };

        info!(
            total_posts = items.len(),
            total_pages, "extraction complete"
        );
        ExtractionOutcome::completed(items, total_pages)
    }

    /// Fetches one page, retrying transient failures per the policy.
    ///
    /// Returns the page, or the final error and total attempt count once
    /// the policy declines to retry.
    async fn fetch_with_retry(
        &self,
        fetcher: &dyn PageFetcher,
        request: &ExtractionRequest,
        page: u32,
    ) -> Result<FetchedPage, (FetchError, u32)> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(page, attempt, "fetching page");

            match fetcher.fetch_page(request, page, self.per_page).await {
                Ok(fetched) => return Ok(fetched),
                Err(error) => match self.retry_policy.should_retry(&error, attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        info!(
                            page,
                            attempt = next_attempt,
                            max_attempts = self.retry_policy.max_attempts(),
                            delay_ms = delay.as_millis(),
                            error = %error,
                            "retrying page fetch"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        debug!(page, %reason, "not retrying page fetch");
                        return Err((error, attempt));
                    }
                },
            }
        }
    }
}
