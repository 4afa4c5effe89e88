//! Error types for the fetch module.
//!
//! Every failure mode of a page fetch is classified here so the extraction
//! driver can decide, without inspecting transports, whether retrying can
//! possibly help.

use thiserror::Error;

/// Errors that can occur while fetching one page from the remote collection.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, reset, ...).
    /// Transient: the caller may retry.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before a response arrived. Transient.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The remote answered with a non-2xx status. Not retried: the remote
    /// made a decision and repeating the request will not change it.
    #[error("HTTP {status} fetching {url}")]
    RemoteStatus {
        /// The URL that was rejected.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be parsed as the expected record
    /// collection. Never retried - the payload shape will not change.
    #[error("malformed payload from {url}: {reason}")]
    MalformedPayload {
        /// The URL that returned the payload.
        url: String,
        /// Why parsing failed.
        reason: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a remote status error.
    pub fn remote_status(url: impl Into<String>, status: u16) -> Self {
        Self::RemoteStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed payload error.
    pub fn malformed_payload(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether this failure may succeed on retry.
    ///
    /// Only network-level failures and timeouts are transient; a remote
    /// rejection or an unparseable body will repeat identically.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}
