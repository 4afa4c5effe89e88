//! Asynchronous job tracking: the ledger of job records and the dispatcher
//! that executes submissions on a worker pool.
//!
//! # Overview
//!
//! The job system consists of:
//! - [`Job`] / [`JobState`] - One tracked extraction and its lifecycle
//!   (`PENDING` → `PROGRESS` → `SUCCESS`/`FAILURE`)
//! - [`Ledger`] - Shared store of job records, written by the executing
//!   worker and polled by submitters
//! - [`Dispatcher`] - Submission, the worker pool, and the synchronous path
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use extractor_core::job::{Dispatcher, Ledger, DEFAULT_JOB_TIME_LIMIT, DEFAULT_WORKERS};
//! use extractor_core::{ExtractionDriver, ExtractionRequest, HttpFetcher};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(
//!     Arc::new(HttpFetcher::new()),
//!     Arc::new(Ledger::default()),
//!     ExtractionDriver::default(),
//!     DEFAULT_WORKERS,
//!     DEFAULT_JOB_TIME_LIMIT,
//! )?;
//!
//! let request = ExtractionRequest::new("https://example.com", "posts", None)?;
//! let id = dispatcher.submit(request);
//! // ... later, from any task:
//! if let Some(job) = dispatcher.poll(&id) {
//!     println!("{}: page {} of {}", job.state, job.current_page, job.total_pages);
//! }
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod ledger;
mod state;

pub use dispatcher::{
    DEFAULT_JOB_TIME_LIMIT, DEFAULT_SYNC_TIMEOUT, DEFAULT_WORKERS, Dispatcher, DispatcherError,
    SyncTimeoutError,
};
pub use ledger::{DEFAULT_RETENTION, Ledger, LedgerError};
pub use state::{Job, JobState};
