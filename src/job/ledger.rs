//! In-process job ledger with atomic snapshots and terminal-state retention.
//!
//! The ledger is the only shared mutable state in the system: one worker
//! writes a given record, any number of pollers read it. Updates replace
//! the whole record under the map shard lock, so a reader never observes a
//! half-written job. Terminal records expire after a retention window;
//! reads after expiry report not-found.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, instrument};

use super::state::{Job, JobState};
use crate::extract::{ExtractionOutcome, Progress};

/// How long terminal job records are kept before expiring (1 hour).
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

/// Errors from ledger write operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The job id is unknown or its record has expired.
    #[error("job {0} not found")]
    JobNotFound(String),

    /// The job already reached a terminal state; the write was refused.
    #[error("job {id} is already {state}")]
    TerminalState {
        /// The job id.
        id: String,
        /// The terminal state the job is in.
        state: JobState,
    },
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

struct LedgerEntry {
    job: Job,
    /// Set when the job reaches a terminal state.
    expires_at: Option<Instant>,
}

/// Durable-within-process store of job records, keyed by job id.
pub struct Ledger {
    jobs: DashMap<String, LedgerEntry>,
    retention: Duration,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl Ledger {
    /// Creates a ledger whose terminal records expire after `retention`.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: DashMap::new(),
            retention,
        }
    }

    /// Inserts a freshly submitted job.
    #[instrument(skip(self, job), fields(id = %job.id))]
    pub fn insert_pending(&self, job: Job) {
        self.jobs.insert(
            job.id.clone(),
            LedgerEntry {
                job,
                expires_at: None,
            },
        );
    }

    /// Reads a snapshot of a job.
    ///
    /// Returns `None` for unknown ids and for records past their retention
    /// window (expired records are dropped on read).
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Job> {
        let expired = match self.jobs.get(id) {
            None => return None,
            Some(entry) => match entry.expires_at {
                Some(at) if Instant::now() >= at => true,
                _ => return Some(entry.job.clone()),
            },
        };
        // Drop outside the read guard to avoid deadlocking the shard
        if expired {
            self.jobs.remove(id);
        }
        None
    }

    /// Returns the current state of a job, if the record still exists.
    #[must_use]
    pub fn state_of(&self, id: &str) -> Option<JobState> {
        self.get(id).map(|job| job.state)
    }

    /// Records page progress, moving the job into `Progress`.
    ///
    /// `processed_items` never decreases even if the caller reports a
    /// smaller value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JobNotFound`] for unknown ids and
    /// [`LedgerError::TerminalState`] when the job already finished.
    #[instrument(skip(self), fields(id))]
    pub fn mark_progress(&self, id: &str, progress: Progress) -> Result<()> {
        self.update(id, |job| {
            job.state = JobState::Progress;
            job.current_page = progress.current_page;
            job.total_pages = progress.total_pages;
            job.processed_items = job.processed_items.max(progress.processed_items);
        })
    }

    /// Finalizes a job as successful.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JobNotFound`] for unknown ids and
    /// [`LedgerError::TerminalState`] when the job already finished.
    #[instrument(skip(self, outcome), fields(id))]
    pub fn mark_success(&self, id: &str, outcome: ExtractionOutcome) -> Result<()> {
        let retention = self.retention;
        self.finalize(id, retention, |job| {
            job.state = JobState::Success;
            job.processed_items = job.processed_items.max(outcome.total_posts);
            job.total_pages = job.total_pages.max(outcome.total_pages);
            job.result = Some(outcome);
            job.error = None;
        })
    }

    /// Finalizes a job as failed with a human-readable description.
    ///
    /// The failed outcome carries no items (all-or-nothing semantics).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JobNotFound`] for unknown ids and
    /// [`LedgerError::TerminalState`] when the job already finished.
    #[instrument(skip(self, error), fields(id))]
    pub fn mark_failure(&self, id: &str, error: impl Into<String>) -> Result<()> {
        let retention = self.retention;
        let error = error.into();
        self.finalize(id, retention, move |job| {
            job.state = JobState::Failure;
            job.result = Some(ExtractionOutcome::failed(error.clone()));
            job.error = Some(error);
        })
    }

    /// Removes every terminal record past its retention window.
    ///
    /// `get` already drops expired records lazily; this sweep exists so
    /// abandoned jobs that nobody polls do not accumulate.
    pub fn sweep_expired(&self) {
        let now = Instant::now();
        self.jobs
            .retain(|_, entry| !matches!(entry.expires_at, Some(at) if now >= at));
    }

    /// Number of live records (test and diagnostics helper).
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut Job)) -> Result<()> {
        let Some(mut entry) = self.jobs.get_mut(id) else {
            return Err(LedgerError::JobNotFound(id.to_string()));
        };
        if entry.job.is_terminal() {
            return Err(LedgerError::TerminalState {
                id: id.to_string(),
                state: entry.job.state,
            });
        }
        apply(&mut entry.job);
        Ok(())
    }

    fn finalize(
        &self,
        id: &str,
        retention: Duration,
        apply: impl FnOnce(&mut Job),
    ) -> Result<()> {
        let Some(mut entry) = self.jobs.get_mut(id) else {
            return Err(LedgerError::JobNotFound(id.to_string()));
        };
        if entry.job.is_terminal() {
            return Err(LedgerError::TerminalState {
                id: id.to_string(),
                state: entry.job.state,
            });
        }
        apply(&mut entry.job);
        entry.expires_at = Some(Instant::now() + retention);
        debug!(id, state = %entry.job.state, "job finalized");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending(ledger: &Ledger, id: &str) {
        ledger.insert_pending(Job::new(id.to_string(), Utc::now()));
    }

    fn progress(page: u32, items: usize) -> Progress {
        Progress {
            current_page: page,
            total_pages: 5,
            processed_items: items,
        }
    }

    #[test]
    fn test_get_unknown_id_returns_none() {
        let ledger = Ledger::default();
        assert!(ledger.get("nope").is_none());
    }

    #[test]
    fn test_insert_then_get_returns_pending_snapshot() {
        let ledger = Ledger::default();
        pending(&ledger, "a");
        let job = ledger.get("a").unwrap();
        assert_eq!(job.state, JobState::Pending);
    }

    #[test]
    fn test_mark_progress_updates_counters() {
        let ledger = Ledger::default();
        pending(&ledger, "a");
        ledger.mark_progress("a", progress(2, 120)).unwrap();

        let job = ledger.get("a").unwrap();
        assert_eq!(job.state, JobState::Progress);
        assert_eq!(job.current_page, 2);
        assert_eq!(job.total_pages, 5);
        assert_eq!(job.processed_items, 120);
    }

    #[test]
    fn test_processed_items_never_decreases() {
        let ledger = Ledger::default();
        pending(&ledger, "a");
        ledger.mark_progress("a", progress(2, 120)).unwrap();
        ledger.mark_progress("a", progress(3, 80)).unwrap();

        let job = ledger.get("a").unwrap();
        assert_eq!(job.current_page, 3);
        assert_eq!(job.processed_items, 120, "counter must be monotonic");
    }

    #[test]
    fn test_no_transition_out_of_terminal_state() {
        let ledger = Ledger::default();
        pending(&ledger, "a");
        ledger
            .mark_success("a", ExtractionOutcome::completed(Vec::new(), 0))
            .unwrap();

        let result = ledger.mark_progress("a", progress(9, 900));
        assert_eq!(
            result,
            Err(LedgerError::TerminalState {
                id: "a".to_string(),
                state: JobState::Success,
            })
        );

        let result = ledger.mark_failure("a", "too late");
        assert!(matches!(result, Err(LedgerError::TerminalState { .. })));

        let job = ledger.get("a").unwrap();
        assert_eq!(job.state, JobState::Success);
        assert_eq!(job.current_page, 0);
    }

    #[test]
    fn test_mark_failure_sets_error_and_failed_result() {
        let ledger = Ledger::default();
        pending(&ledger, "a");
        ledger.mark_progress("a", progress(3, 250)).unwrap();
        ledger.mark_failure("a", "HTTP 500 on page 4").unwrap();

        let job = ledger.get("a").unwrap();
        assert_eq!(job.state, JobState::Failure);
        assert_eq!(job.error.as_deref(), Some("HTTP 500 on page 4"));
        let result = job.result.unwrap();
        assert!(!result.is_completed());
        assert!(result.items.is_empty(), "failed job must carry no items");
    }

    #[test]
    fn test_write_to_unknown_id_returns_job_not_found() {
        let ledger = Ledger::default();
        let result = ledger.mark_progress("ghost", progress(1, 1));
        assert_eq!(result, Err(LedgerError::JobNotFound("ghost".to_string())));
    }

    #[test]
    fn test_terminal_record_expires_after_retention() {
        let ledger = Ledger::new(Duration::from_millis(20));
        pending(&ledger, "a");
        ledger
            .mark_success("a", ExtractionOutcome::completed(Vec::new(), 0))
            .unwrap();
        assert!(ledger.get("a").is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(ledger.get("a").is_none(), "expired record must read as not found");
    }

    #[test]
    fn test_pending_record_does_not_expire() {
        let ledger = Ledger::new(Duration::from_millis(10));
        pending(&ledger, "a");
        std::thread::sleep(Duration::from_millis(30));
        assert!(ledger.get("a").is_some(), "only terminal records expire");
    }

    #[test]
    fn test_sweep_drops_expired_records() {
        let ledger = Ledger::new(Duration::ZERO);
        pending(&ledger, "a");
        pending(&ledger, "b");
        ledger
            .mark_success("a", ExtractionOutcome::completed(Vec::new(), 0))
            .unwrap();

        ledger.sweep_expired();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get("b").is_some());
    }
}
