//! Validated extraction requests.
//!
//! An [`ExtractionRequest`] is checked once, before any network I/O, and is
//! immutable afterwards. Malformed input is rejected with [`InputError`] and
//! is never retried.

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;
use url::Url;

/// Errors produced while validating an extraction request.
#[derive(Debug, Error)]
pub enum InputError {
    /// The base URL could not be parsed or is not an absolute http(s) origin.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The offending URL string.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The post type is empty.
    #[error("post type must not be empty")]
    EmptyPostType,

    /// The post type contains characters the remote collection name cannot.
    #[error("invalid post type {post_type:?}: only letters, digits, '-' and '_' are allowed")]
    InvalidPostType {
        /// The offending post type string.
        post_type: String,
    },

    /// The lower-bound publish date could not be parsed.
    #[error("invalid after date {value:?}: expected ISO-8601 (e.g. 2024-01-31T00:00:00)")]
    InvalidAfterDate {
        /// The offending date string.
        value: String,
    },
}

/// A validated request to extract all posts of one type from one site.
///
/// `after`, when present, is forwarded to the remote query as an inclusive
/// lower bound on the publish date. Whether the remote API honors the filter
/// is part of the remote collaborator's contract; the standard WordPress
/// REST API does. Against a remote that ignores the parameter the returned
/// set is unfiltered - this is a documented limitation, not silent behavior
/// of this crate.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    base_url: Url,
    post_type: String,
    after: Option<NaiveDateTime>,
}

impl ExtractionRequest {
    /// Validates and builds a request.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] when the base URL is not an absolute http(s)
    /// origin or the post type is empty or contains invalid characters.
    pub fn new(
        base_url: &str,
        post_type: &str,
        after: Option<NaiveDateTime>,
    ) -> Result<Self, InputError> {
        let url = Url::parse(base_url).map_err(|e| InputError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(InputError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(InputError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "missing host".to_string(),
            });
        }

        let post_type = post_type.trim();
        if post_type.is_empty() {
            return Err(InputError::EmptyPostType);
        }
        if !post_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InputError::InvalidPostType {
                post_type: post_type.to_string(),
            });
        }

        Ok(Self {
            base_url: url,
            post_type: post_type.to_string(),
            after,
        })
    }

    /// Returns the validated site origin.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the remote resource collection name (e.g. `posts`, `pages`).
    #[must_use]
    pub fn post_type(&self) -> &str {
        &self.post_type
    }

    /// Returns the inclusive lower bound on publish dates, if any.
    #[must_use]
    pub fn after(&self) -> Option<NaiveDateTime> {
        self.after
    }
}

/// Parses a user-supplied lower-bound date string.
///
/// Accepts RFC 3339 (`2024-01-31T00:00:00Z`), a naive ISO date-time
/// (`2024-01-31T00:00:00`), or a bare date (`2024-01-31`, midnight assumed).
///
/// # Errors
///
/// Returns [`InputError::InvalidAfterDate`] when none of the accepted
/// formats match.
pub fn parse_after_date(value: &str) -> Result<NaiveDateTime, InputError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(InputError::InvalidAfterDate {
        value: value.to_string(),
    })
}
