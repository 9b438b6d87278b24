//! The four extractors.
//!
//! Each comes as a pure `parse_*` function over already-fetched content, plus
//! an [`Extractor`] method that fetches through the injected
//! [`Fetcher`](velodata_fetch::Fetcher) first. Parsing never fails; only the
//! fetch can.

mod categories;
mod details;
mod events;
mod results;

pub use self::categories::parse_categories;
pub use self::details::{parse_disciplines, parse_event_header};
pub use self::events::parse_event_list;
pub use self::results::parse_race_results;
use velodata_fetch::Fetcher;

/// Fetch-and-extract entry point. Holds nothing but a borrowed fetcher, so
/// it's cheap to create and calls don't affect one another.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'f> {
    fetcher: &'f Fetcher,
}
impl<'f> Extractor<'f> {
    pub fn new(fetcher: &'f Fetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &'f Fetcher {
        self.fetcher
    }
}
