//! Fetch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Individual attempt failures
//! ([`Transport`](ErrorKind::Transport), [`Status`](ErrorKind::Status)) end up
//! as children of the [`Network`](ErrorKind::Network) error raised once the
//! retry budget is spent.

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every attempt failed; the resource could not be fetched.
    #[display("failed to fetch {url} after {attempts} attempt(s)")]
    Network {
        /// The request URL.
        url: String,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// A single attempt failed before a response arrived (timeout, DNS,
    /// refused connection, ...).
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// A single attempt got a non-success status.
    #[display("HTTP {status} from {url}")]
    Status {
        /// The request URL.
        url: String,
        /// The response status code.
        status: u16,
    },
    /// The request could not be built at all; retrying won't help.
    #[display("invalid request: {_0}")]
    Request(#[error(not(source))] String),
    /// JSON was expected but the server sent an HTML page (the upstream site
    /// does this with a 200 status when it's unhappy).
    #[display("expected JSON but got HTML from {_0}")]
    UnexpectedHtml(#[error(not(source))] String),
    /// JSON was expected but the body isn't JSON.
    #[display("failed to parse JSON from {_0}")]
    InvalidJson(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Transport(_) | Self::Status { .. })
    }

    /// Returns `true` for failures to get a response at all, as opposed to
    /// getting a response that couldn't be parsed.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Transport(_) | Self::Status { .. } | Self::Request(_))
    }

    /// Returns `true` for responses that arrived but weren't the expected shape.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::UnexpectedHtml(_) | Self::InvalidJson(_))
    }
}
