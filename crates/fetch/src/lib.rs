//! Resilient fetching from the legacy USA Cycling results site.
//!
//! A [`Fetcher`] checks the [`ResponseCache`](velodata_cache::ResponseCache)
//! first, then sends the request through its [`Transport`] with a browser-like
//! identity, backing off exponentially on failures and waiting out 429s
//! without spending retries. Successful bodies are cached.
//!
//! ```no_run
//! use velodata_cache::ResponseCache;
//! use velodata_fetch::{Fetcher, FetcherConfig, endpoints};
//!
//! # fn main() -> velodata_fetch::error::Result<()> {
//! let fetcher = Fetcher::new(FetcherConfig::default(), ResponseCache::new("/tmp/velodata"))?;
//! let html = fetcher.fetch_text(&endpoints::permit("2020-26"))?;
//! # Ok(())
//! # }
//! ```

mod consts;
pub mod endpoints;
pub mod error;
mod fetcher;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod payload;
mod request;
mod transport;

pub use crate::consts::{API_URL, BASE_URL, RESULTS_URL};
pub use crate::fetcher::{Fetcher, FetcherConfig};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MockResponse, MockTransport};
pub use crate::payload::{ListingItem, Payload};
pub use crate::request::{FetchRequest, FetchResult, Method};
pub use crate::transport::{HttpTransport, Transport};
