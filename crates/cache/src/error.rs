//! Cache Error Types
//!
//! These never reach callers of [`ResponseCache`](crate::ResponseCache); a
//! failing read is a miss and a failing write is logged. They exist so the
//! internals can use `?` and log one error tree instead of a flat message.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Cache file exists but isn't a cache entry we understand.
    #[display("invalid cache entry: {}", _0.display())]
    InvalidData(#[error(not(source))] PathBuf),
    /// Payload could not be serialized for writing.
    #[display("unserializable cache payload for key: {_0}")]
    Serialize(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
