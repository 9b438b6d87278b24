//! Extraction of events, event details, categories and race results from
//! the legacy USA Cycling results site.
//!
//! Parsing is tolerant: odd or missing markup degrades to defaults and is
//! reported through [`Extracted::Minimal`] instead of an error. Errors only
//! come from fetching.
//!
//! ```rust
//! use velodata_extract::{Extracted, parse_event_header};
//!
//! let html = r#"<div id="pgcontent"><h3>Hill Climb<br>Golden, CO<br>Jun 5, 2021</h3></div>"#;
//! let details = parse_event_header(html, "2021-101");
//! assert!(details.is_full());
//! assert_eq!(details.get().state, "CO");
//!
//! let missing = parse_event_header("<p>Not found</p>", "2021-101");
//! assert!(matches!(missing, Extracted::Minimal(_)));
//! ```

mod consts;
pub mod error;
mod extract;
pub mod markup;
pub mod models;

pub use crate::extract::{
    Extractor, parse_categories, parse_disciplines, parse_event_header, parse_event_list, parse_race_results,
};
pub use crate::models::Extracted;
