//! Response cache for velodata.
//!
//! Raw fetch results are stored one file per canonical request key, wrapped
//! in a small JSON envelope:
//!
//! ```json
//! { "url": "...", "cachedAt": "2024-05-01T12:00:00Z", "expiresAt": 1714568400.0, "response": "..." }
//! ```
//!
//! Entries past their expiry are treated as absent. Older cache files used
//! snake_case keys and ISO 8601 string expiries; both are still read.

mod entry;
pub mod error;
mod key;
mod store;

use std::time::Duration;

pub use crate::entry::{CacheEntry, Timestamp};
pub use crate::key::{canonical_key, file_name};
pub use crate::store::ResponseCache;

/// How long a fetched response stays valid unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
