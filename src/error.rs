//! Top-level Error Types
//!
//! Errors from the extraction layer keep their kind (network or parse) so
//! callers can decide whether to retry without walking the error tree.

use derive_more::{Display, Error};
use velodata_extract::error::{Error as ExtractError, ErrorKind as ExtractErrorKind};

/// A velodata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for velodata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A state, permit or id was rejected before anything was fetched.
    #[display("invalid input: {_0}")]
    InvalidInput(#[error(not(source))] String),
    /// Fetching from the source failed.
    #[display("extraction failed: {_0}")]
    Extraction(#[error(not(source))] ExtractErrorKind),
    /// The client couldn't be built from its configuration.
    #[display("invalid configuration")]
    Config,
}
impl ErrorKind {
    /// Wrap an extraction error, preserving its `Exn` frame (error tree) as a
    /// child in our own error tree.
    #[track_caller]
    pub fn extract(err: ExtractError) -> Error {
        let kind = *err;
        err.raise(Self::Extraction(kind))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Extraction(kind) => kind.is_retryable(),
            Self::InvalidInput(_) | Self::Config => false,
        }
    }
}
