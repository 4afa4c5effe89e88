//! Job dispatcher: submission, worker pool, and the synchronous path.
//!
//! A fixed-size pool of workers executes extraction jobs. Admission is a
//! tokio semaphore whose permits are granted in FIFO order, so excess
//! submissions queue until a worker frees up. Each job runs under a coarse
//! hard time budget; exceeding it forces the job into `Failure` with a
//! timeout reason. There is no mid-flight cancellation - abandoned jobs run
//! to completion and expire from the ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::ledger::Ledger;
use super::state::Job;
use crate::extract::{ExtractionDriver, ExtractionOutcome, Progress};
use crate::fetch::PageFetcher;
use crate::request::ExtractionRequest;

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 64;

/// Default worker count if not specified.
pub const DEFAULT_WORKERS: usize = 4;

/// Default hard time budget per asynchronous job (10 minutes).
pub const DEFAULT_JOB_TIME_LIMIT: Duration = Duration::from_secs(600);

/// Default timeout for the synchronous path.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for dispatcher construction.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkerCount {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// The synchronous path exceeded its caller-visible timeout.
///
/// Distinct from a job failure: the extraction may simply be too large for
/// the synchronous path, and the caller should submit it asynchronously.
#[derive(Debug, Error)]
#[error(
    "synchronous extraction exceeded {}s; submit the job asynchronously and poll instead",
    .limit.as_secs()
)]
pub struct SyncTimeoutError {
    /// The timeout that was exceeded.
    pub limit: Duration,
}

/// Accepts extraction submissions and executes them on a worker pool.
pub struct Dispatcher {
    fetcher: Arc<dyn PageFetcher>,
    ledger: Arc<Ledger>,
    driver: ExtractionDriver,
    pool: Arc<Semaphore>,
    workers: usize,
    job_time_limit: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher with `workers` concurrent job slots.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::InvalidWorkerCount`] if `workers` is
    /// outside the valid range (1-64).
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        ledger: Arc<Ledger>,
        driver: ExtractionDriver,
        workers: usize,
        job_time_limit: Duration,
    ) -> Result<Self, DispatcherError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
            return Err(DispatcherError::InvalidWorkerCount { value: workers });
        }

        debug!(workers, job_time_limit_s = job_time_limit.as_secs(), "creating dispatcher");

        Ok(Self {
            fetcher,
            ledger,
            driver,
            pool: Arc::new(Semaphore::new(workers)),
            workers,
            job_time_limit,
        })
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the ledger this dispatcher writes to.
    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Submits a job for asynchronous execution and returns its id.
    ///
    /// The job is recorded as `Pending` before this returns, so a poll for
    /// the returned id always finds it (until retention expires it).
    #[instrument(skip(self, request), fields(post_type = request.post_type()))]
    pub fn submit(&self, request: ExtractionRequest) -> String {
        // Opportunistic cleanup so abandoned jobs do not accumulate
        self.ledger.sweep_expired();

        let id = Uuid::new_v4().to_string();
        self.ledger.insert_pending(Job::new(id.clone(), Utc::now()));
        info!(id, "job submitted");

        tokio::spawn(execute_job(
            Arc::clone(&self.pool),
            Arc::clone(&self.ledger),
            Arc::clone(&self.fetcher),
            self.driver.clone(),
            id.clone(),
            request,
            self.job_time_limit,
        ));

        id
    }

    /// Reads a snapshot of a job. `None` means unknown or expired.
    #[must_use]
    pub fn poll(&self, id: &str) -> Option<Job> {
        self.ledger.get(id)
    }

    /// Runs an extraction inline, without a ledger entry.
    ///
    /// For short-lived calls only; `timeout` is the caller's own budget.
    ///
    /// # Errors
    ///
    /// Returns [`SyncTimeoutError`] when the run exceeds `timeout`; the
    /// caller should use [`Dispatcher::submit`] instead.
    #[instrument(skip(self, request), fields(post_type = request.post_type()))]
    pub async fn run_sync(
        &self,
        request: &ExtractionRequest,
        timeout: Duration,
    ) -> Result<ExtractionOutcome, SyncTimeoutError> {
        let mut sink = |_: Progress| {};
        match tokio::time::timeout(timeout, self.driver.run(self.fetcher.as_ref(), request, &mut sink))
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(_) => Err(SyncTimeoutError { limit: timeout }),
        }
    }
}

/// Executes one job on the pool: waits for a worker slot, runs the driver
/// under the hard time budget, and finalizes the ledger record.
///
/// Ledger writes are best-effort: a refused write (job already terminal,
/// e.g. a duplicate admission of the same id) is logged and ignored, so
/// reprocessing a terminal job is a safe no-op.
async fn execute_job(
    pool: Arc<Semaphore>,
    ledger: Arc<Ledger>,
    fetcher: Arc<dyn PageFetcher>,
    driver: ExtractionDriver,
    id: String,
    request: ExtractionRequest,
    time_limit: Duration,
) {
    let Ok(permit) = pool.acquire_owned().await else {
        warn!(id, "worker pool closed before job started");
        if let Err(e) = ledger.mark_failure(&id, "worker pool shut down before the job started") {
            debug!(id, error = %e, "could not record pool shutdown");
        }
        return;
    };
    let _permit = permit;

    // Duplicate-admission guard: a job that already finished is not re-run
    match ledger.state_of(&id) {
        None => {
            warn!(id, "job record missing at pickup, skipping");
            return;
        }
        Some(state) if state.is_terminal() => {
            debug!(id, %state, "job already terminal, skipping");
            return;
        }
        Some(_) => {}
    }

    let sink_ledger = Arc::clone(&ledger);
    let sink_id = id.clone();
    let mut sink = move |progress: Progress| {
        // Best-effort: a refused progress write must not kill the worker
        if let Err(e) = sink_ledger.mark_progress(&sink_id, progress) {
            warn!(id = sink_id, error = %e, "progress update refused");
        }
    };

    info!(id, "job picked up by worker");
    let outcome = match tokio::time::timeout(time_limit, driver.run(fetcher.as_ref(), &request, &mut sink))
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(id, limit_s = time_limit.as_secs(), "job exceeded hard time limit");
            if let Err(e) = ledger.mark_failure(
                &id,
                format!("job exceeded the {}s time limit", time_limit.as_secs()),
            ) {
                warn!(id, error = %e, "could not record job timeout");
            }
            return;
        }
    };

    let write = if outcome.is_completed() {
        info!(id, total_posts = outcome.total_posts, "job succeeded");
        ledger.mark_success(&id, outcome)
    } else {
        let reason = outcome
            .error
            .clone()
            .unwrap_or_else(|| "extraction failed".to_string());
        warn!(id, error = reason, "job failed");
        ledger.mark_failure(&id, reason)
    };

    if let Err(e) = write {
        warn!(id, error = %e, "could not finalize job record");
    }
}
