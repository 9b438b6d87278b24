//! Configuration Error Types

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration source (file or environment) couldn't be read or
    /// didn't fit the expected shape.
    #[display("failed to load configuration")]
    Load,
    /// The configuration loaded but a value is out of range.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
}
impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Configuration doesn't fix itself; it needs editing.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
