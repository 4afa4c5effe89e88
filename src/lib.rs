//! Extractor Core Library
//!
//! This library provides the core functionality for the extractor tool,
//! which pulls published posts out of a WordPress-style REST API and
//! normalizes their markup into clean, human-readable text.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`request`] - Validated extraction requests
//! - [`normalize`] - Markup stripping and entity decoding (pure, no I/O)
//! - [`fetch`] - Paginated page fetcher against the remote collection
//! - [`extract`] - Extraction driver with retry and progress reporting
//! - [`job`] - Asynchronous job ledger and dispatcher
//!
//! Two execution paths are supported: a synchronous path for small sites
//! ([`Dispatcher::run_sync`]) and an asynchronous path for large ones
//! ([`Dispatcher::submit`] plus polling the [`Ledger`]).

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod extract;
pub mod fetch;
pub mod job;
pub mod normalize;
pub mod request;

// Re-export commonly used types
pub use extract::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_PER_PAGE, ExtractionDriver, ExtractionOutcome, ExtractionStatus,
    Item, Progress, RetryDecision, RetryPolicy,
};
pub use fetch::{FetchError, FetchedPage, HttpFetcher, PageFetcher, RawPost, Rendered};
pub use job::{
    DEFAULT_WORKERS, Dispatcher, DispatcherError, Job, JobState, Ledger, LedgerError,
    SyncTimeoutError,
};
pub use normalize::{clean_html, clean_html_with_line_breaks};
pub use request::{ExtractionRequest, InputError, parse_after_date};
