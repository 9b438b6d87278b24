//! Fetch, cache and extract race results from the legacy USA Cycling results
//! site.
//!
//! [`Client`] is the entry point. Each query is validated, fetched through a
//! rate-limited, retrying [`Fetcher`](velodata_fetch::Fetcher) backed by an
//! on-disk response cache, and extracted into plain records that serialize
//! with `serde`.
//!
//! ```no_run
//! use velodata::{Client, Config};
//!
//! # fn main() -> velodata::error::Result<()> {
//! let client = Client::new(&Config::default())?;
//! let events = client.events("CO", 2020)?;
//! for event in events.get() {
//!     println!("{} {}", event.permit, event.name);
//! }
//! let event = client.complete_event("2020-26", true)?;
//! for warning in &event.warnings {
//!     eprintln!("{warning}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;
mod validate;

pub use crate::client::{Client, CompleteEvent};
pub use velodata_config::Config;
pub use velodata_extract::Extracted;
pub use velodata_extract::models;
