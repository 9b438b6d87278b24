//! Extraction Error Types
//!
//! Extraction itself never fails: missing or odd markup degrades to defaults
//! (see [`Extracted`](crate::Extracted)). The only errors that come out of
//! this crate are fetch failures, sorted into "couldn't get it" and "got
//! something that isn't what the endpoint promised", with the fetch error tree
//! kept as a child.

use derive_more::{Display, Error};
use velodata_fetch::error::Error as FetchError;

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be reached, even after retrying.
    #[display("failed to fetch source data")]
    Network,
    /// The source answered with something unusable (an HTML error page
    /// instead of JSON, or broken JSON).
    #[display("source returned malformed data")]
    Parse,
}
impl ErrorKind {
    /// Wrap a fetch error, preserving the fetch crate's `Exn` frame (error
    /// tree) as a child in its own error tree.
    #[track_caller]
    pub fn fetch(err: FetchError) -> Error {
        let kind = if err.is_parse() { Self::Parse } else { Self::Network };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }
}
