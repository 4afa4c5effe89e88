//! Result and progress types for an extraction run.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::fetch::RawPost;
use crate::normalize::{clean_html, clean_html_with_line_breaks};

/// One normalized post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Remote record id.
    pub id: i64,
    /// Publish date.
    pub date: NaiveDateTime,
    /// Title, normalized to a single line.
    pub title: String,
    /// Body, normalized with paragraph breaks preserved.
    pub content: String,
}

impl Item {
    /// Builds a normalized item from one raw remote record.
    ///
    /// Returns `None` when the record's publish date cannot be parsed;
    /// such records are skipped rather than failing the whole extraction,
    /// matching how the service has always treated per-record defects.
    #[must_use]
    pub fn from_raw(raw: &RawPost) -> Option<Self> {
        let date = parse_publish_date(&raw.date)?;
        Some(Self {
            id: raw.id,
            date,
            title: clean_html(&raw.title.rendered),
            content: clean_html_with_line_breaks(&raw.content.rendered),
        })
    }
}

/// Parses the remote publish date, which is site-local ISO-8601 without an
/// offset on standard installs but RFC 3339 behind some gateways.
fn parse_publish_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Terminal status of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Every page was fetched and normalized.
    Completed,
    /// A page failed; no items are reported.
    Failed,
}

/// The finalized result of one extraction run.
///
/// Built incrementally across pages and finalized exactly once. A failed
/// outcome never carries a partial item list: a job either delivers the
/// whole collection or nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Terminal status.
    pub status: ExtractionStatus,
    /// Number of items extracted.
    pub total_posts: usize,
    /// Number of pages in the collection, as far as could be determined.
    pub total_pages: u32,
    /// Items in ascending page order, insertion order within each page.
    pub items: Vec<Item>,
    /// Human-readable failure description, present only on failure.
    pub error: Option<String>,
}

impl ExtractionOutcome {
    /// Builds a successful outcome.
    #[must_use]
    pub fn completed(items: Vec<Item>, total_pages: u32) -> Self {
        Self {
            status: ExtractionStatus::Completed,
            total_posts: items.len(),
            total_pages,
            items,
            error: None,
        }
    }

    /// Builds a failed outcome carrying no items.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Failed,
            total_posts: 0,
            total_pages: 0,
            items: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Whether this outcome is a success.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ExtractionStatus::Completed
    }
}

/// Progress snapshot reported by the driver after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Page most recently processed (0 before the first page).
    pub current_page: u32,
    /// Best known total page count (0 while still unknown).
    pub total_pages: u32,
    /// Items normalized so far.
    pub processed_items: usize,
}
