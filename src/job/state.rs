//! Job records and their lifecycle states.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extract::ExtractionOutcome;

/// Lifecycle state of an asynchronous extraction job.
///
/// Transitions are monotonic: `Pending` → `Progress` → `Success` |
/// `Failure`. There is no transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Accepted, not yet picked up by a worker.
    Pending,
    /// A worker is fetching pages.
    Progress,
    /// Finished with a completed outcome.
    Success,
    /// Finished with a failure (fetch error, timeout, or pool shutdown).
    Failure,
}

impl JobState {
    /// Whether the state is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Stable string form, matching the serialized representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Progress => "PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked extraction job.
///
/// Written only by the worker executing it; read by any number of pollers.
/// Pollers always observe a complete snapshot - the ledger replaces whole
/// records, never individual fields.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Opaque unique identifier.
    pub id: String,
    /// Current lifecycle state.
    pub state: JobState,
    /// Page most recently processed.
    pub current_page: u32,
    /// Best known total page count (0 until the first page reports one).
    pub total_pages: u32,
    /// Items normalized so far.
    pub processed_items: usize,
    /// Terminal outcome, present only in a terminal state.
    pub result: Option<ExtractionOutcome>,
    /// Human-readable failure description, present only on failure.
    pub error: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Creates a freshly submitted job in the `Pending` state.
    #[must_use]
    pub fn new(id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            state: JobState::Pending,
            current_page: 0,
            total_pages: 0,
            processed_items: 0,
            result: None,
            error: None,
            created_at,
        }
    }

    /// Whether the job has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
