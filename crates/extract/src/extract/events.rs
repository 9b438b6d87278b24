use super::Extractor;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::markup::{self, Markup, text};
use crate::models::{EventRecord, Extracted};
use tracing::instrument;
use velodata_fetch::endpoints;

impl Extractor<'_> {
    /// Events listed for a state and year.
    #[instrument(skip(self))]
    pub fn events(&self, state: &str, year: i32) -> Result<Extracted<Vec<EventRecord>>> {
        let html = self.fetcher.fetch_text(&endpoints::browse(state, year)).map_err(ErrorKind::fetch)?;
        Ok(parse_event_list(&html, state, year))
    }
}

/// Parses the `browse.php` event listing.
///
/// The first two rows of `table.datatable` are headers. A data row has at
/// least four cells and an empty first cell; rows whose first cell has text
/// are sub-headers on this site and are skipped.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn parse_event_list(html: &str, state: &str, year: i32) -> Extracted<Vec<EventRecord>> {
    let document = Markup::parse(html);
    let Some(table) = document.select_first(&consts::EVENT_TABLE_SELECTOR) else {
        tracing::warn!(state, year, "No event table found");
        return Extracted::Minimal(Vec::new());
    };
    let rows = table.select(&consts::TR_SELECTOR).collect::<Vec<_>>();
    if rows.len() <= 2 {
        tracing::warn!(state, year, "No event rows found");
        return Extracted::Minimal(Vec::new());
    }

    let mut events = Vec::new();
    for row in &rows[2..] {
        let cells = row.select(&consts::TD_SELECTOR).collect::<Vec<_>>();
        if cells.len() < 4 || !text(cells[0]).is_empty() {
            continue;
        }
        let Some(link) = cells[2].select(&consts::ANCHOR_SELECTOR).next() else {
            continue;
        };
        let name = text(link);
        let href = link.value().attr("href").unwrap_or_default();
        let permit = consts::PERMIT_PARAM_REGEX
            .captures(href)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let event_date = markup::parse_date(&text(cells[1]));
        events.push(EventRecord {
            id: EventRecord::derive_id(&permit, &name, event_date, state),
            permit_url: markup::resolve_url(href),
            submit_date: markup::parse_date(&text(cells[3])),
            name,
            permit,
            event_date,
            state: state.to_string(),
            year,
        });
    }
    tracing::debug!(count = events.len(), "Parsed event list");
    Extracted::Full(events)
}
