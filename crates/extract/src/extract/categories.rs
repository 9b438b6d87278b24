use super::Extractor;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::markup::{self, Markup, text_opt};
use crate::models::{CategoryRecord, Extracted};
use tracing::instrument;
use velodata_fetch::{Payload, endpoints};

impl Extractor<'_> {
    /// Categories (races) of one discipline.
    #[instrument(skip(self))]
    pub fn categories(&self, info_id: &str, label: &str) -> Result<Extracted<Vec<CategoryRecord>>> {
        let payload = self.fetcher.fetch_payload(&endpoints::load_info(info_id, label)).map_err(ErrorKind::fetch)?;
        Ok(parse_categories(&payload, info_id, label))
    }
}

/// Parses a discipline's category listing.
///
/// A listing payload maps straight onto records. Markup is scanned for
/// `li` elements with a `race_<digits>` id, named by their link text.
pub fn parse_categories(payload: &Payload, info_id: &str, label: &str) -> Extracted<Vec<CategoryRecord>> {
    match payload {
        Payload::Listing(items) => Extracted::Full(
            items
                .iter()
                .map(|item| CategoryRecord::new(&item.id, &item.name, info_id, label))
                .collect(),
        ),
        Payload::Markup(html) => {
            let document = Markup::parse(html);
            let categories = document
                .select(&consts::RACE_ITEM_SELECTOR)
                .filter_map(|item| {
                    let race_id = markup::race_id(item.value().id().unwrap_or_default())?;
                    let name = text_opt(item.select(&consts::ANCHOR_SELECTOR).next());
                    Some(CategoryRecord::new(race_id, name, info_id, label))
                })
                .collect::<Vec<_>>();
            if categories.is_empty() {
                tracing::warn!(info_id, label, "No race categories found");
                return Extracted::Minimal(categories);
            }
            Extracted::Full(categories)
        },
        Payload::Results(_) => {
            tracing::warn!(info_id, label, "Expected a category listing, got race results");
            Extracted::Minimal(Vec::new())
        },
    }
}
