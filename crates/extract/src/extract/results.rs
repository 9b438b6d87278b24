use super::Extractor;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::markup::{Markup, text};
use crate::models::{CategoryTags, Extracted, RaceContext, RaceResultRecord, RiderRecord};
use scraper::ElementRef;
use serde_json::{Map, Value};
use tracing::instrument;
use velodata_fetch::{Payload, endpoints};

impl Extractor<'_> {
    /// Results of one race.
    ///
    /// An `Unauthorized access!` answer is not kept in the cache, so the next
    /// call asks the site again.
    #[instrument(skip(self))]
    pub fn race_results(&self, race_id: &str) -> Result<Extracted<RaceResultRecord>> {
        let request = endpoints::race_results(race_id);
        let payload = self.fetcher.fetch_payload(&request).map_err(ErrorKind::fetch)?;
        if payload.as_markup().is_some_and(|html| html.contains(consts::UNAUTHORIZED_MARKER)) {
            self.fetcher.cache().invalidate(&request.cache_key());
        }
        Ok(parse_race_results(&payload, race_id))
    }

    /// [`race_results`](Self::race_results), completed with what the caller
    /// already knows about the race (its category, event and date).
    pub fn race_results_with(&self, race_id: &str, context: &RaceContext) -> Result<Extracted<RaceResultRecord>> {
        let mut extracted = self.race_results(race_id)?;
        extracted.get_mut().apply(context);
        Ok(extracted)
    }
}

/// Parses a race results payload.
///
/// - Pre-extracted results are taken as they are (if they're for this race).
/// - `Unauthorized access!` means the site wouldn't serve results; that's an
///   empty, [`Minimal`](Extracted::Minimal) record rather than an error.
/// - Markup is read either as `div.tablerow` rows with cells at fixed
///   positions, or as a `table.results-table` keyed by its header row.
#[instrument(skip(payload))]
pub fn parse_race_results(payload: &Payload, race_id: &str) -> Extracted<RaceResultRecord> {
    match payload {
        Payload::Results(value) => from_value(value, race_id),
        Payload::Markup(html) if html.contains(consts::UNAUTHORIZED_MARKER) => {
            tracing::warn!(race_id, "Unauthorized access, returning empty results");
            Extracted::Minimal(RaceResultRecord::empty(race_id))
        },
        Payload::Markup(html) => from_markup(html, race_id),
        Payload::Listing(_) => {
            tracing::warn!(race_id, "Expected race results, got a category listing");
            Extracted::Minimal(RaceResultRecord::empty(race_id))
        },
    }
}

fn from_markup(html: &str, race_id: &str) -> Extracted<RaceResultRecord> {
    let document = Markup::parse(html);
    let mut record = RaceResultRecord::empty(race_id);
    let title = document
        .select_first(&consts::RACE_TITLE_SELECTOR)
        .or_else(|| document.select_first(&consts::RACE_NAME_SELECTOR));
    if let Some(title) = title {
        record.name = text(title);
        record.category = CategoryTags::without_age(&record.name);
    }

    let rows = document.select(&consts::RESULT_ROW_SELECTOR).collect::<Vec<_>>();
    if !rows.is_empty() {
        record.riders = rows.into_iter().filter_map(rider_from_row).collect();
    } else if let Some(table) = document.select_first(&consts::RESULTS_TABLE_SELECTOR) {
        record.riders = riders_from_table(table);
    } else {
        tracing::warn!(race_id, "No results rows or table found");
        return Extracted::Minimal(record);
    }
    tracing::debug!(race_id, riders = record.riders.len(), "Parsed race results");
    Extracted::Full(record)
}

/// One `div.tablerow`. Cells, by position: 1 place, 2 points, 4 name,
/// 5 location, 6 time, 8 license, 9 bib, 10 team.
fn rider_from_row(row: ElementRef<'_>) -> Option<RiderRecord> {
    let cells = row.select(&consts::RESULT_CELL_SELECTOR).collect::<Vec<_>>();
    if cells.len() < 6 {
        return None;
    }
    let cell = |index: usize| cells.get(index).map(|cell| text(*cell)).filter(|value| !value.is_empty());

    let mut rider = RiderRecord::with_place(text(cells[1]));
    rider.points = cell(2).and_then(|points| points.parse().ok());
    rider.name = cells[4].select(&consts::ANCHOR_SELECTOR).next().map_or_else(|| text(cells[4]), text);
    rider.set_location(&text(cells[5]));
    rider.time = cell(6);
    rider.license = cell(8);
    rider.bib = cell(9);
    rider.team = cell(10);
    Some(rider)
}

/// Rows of a `table.results-table`, with columns identified by header text.
fn riders_from_table(table: ElementRef<'_>) -> Vec<RiderRecord> {
    let headers = table.select(&consts::RESULTS_HEADER_SELECTOR).map(|th| text(th).to_lowercase()).collect::<Vec<_>>();
    table
        .select(&consts::RESULTS_BODY_ROW_SELECTOR)
        .filter_map(|row| {
            let mut rider = RiderRecord::default();
            let mut filled = false;
            for (header, cell) in headers.iter().zip(row.select(&consts::TD_SELECTOR)) {
                let value = text(cell);
                if value.is_empty() {
                    continue;
                }
                filled |= set_field(&mut rider, header, value);
            }
            filled.then(|| {
                rider.classify_place();
                rider
            })
        })
        .collect()
}

/// Stores `value` in the rider field named by `header`. Returns `false` for
/// columns that don't map to a field.
fn set_field(rider: &mut RiderRecord, header: &str, value: String) -> bool {
    match header {
        "place" | "pl" | "pos" => rider.place = value,
        "name" | "rider" => rider.name = value,
        "team" | "club" => rider.team = Some(value),
        "time" => rider.time = Some(value),
        "points" | "pts" => rider.points = value.parse().ok(),
        "license" | "lic" => rider.license = Some(value),
        "bib" => rider.bib = Some(value),
        "city" => rider.city = Some(value),
        "state" => rider.state = Some(value),
        "location" => rider.set_location(&value),
        _ => return false,
    }
    true
}

/// Results the fetch layer already extracted.
fn from_value(value: &Value, race_id: &str) -> Extracted<RaceResultRecord> {
    let id = value.get("id").map(json_text).unwrap_or_default();
    if id != race_id {
        tracing::warn!(race_id, found = %id, "Pre-extracted results are for a different race");
        return Extracted::Minimal(RaceResultRecord::empty(race_id));
    }
    let mut record = RaceResultRecord::empty(race_id);
    record.name = value.get("name").map(json_text).unwrap_or_default();
    record.category = CategoryTags::without_age(&record.name);
    record.riders = value
        .get("riders")
        .and_then(Value::as_array)
        .map(|riders| riders.iter().filter_map(Value::as_object).map(rider_from_object).collect())
        .unwrap_or_default();
    Extracted::Full(record)
}

fn rider_from_object(object: &Map<String, Value>) -> RiderRecord {
    let field = |name: &str| object.get(name).map(json_text).filter(|value| !value.is_empty());
    let mut rider = RiderRecord::with_place(field("place").unwrap_or_default());
    rider.name = field("name").unwrap_or_default();
    rider.city = field("city");
    rider.state = field("state");
    if rider.city.is_none()
        && rider.state.is_none()
        && let Some(location) = field("location")
    {
        rider.set_location(&location);
    }
    rider.team = field("team");
    rider.license = field("license");
    rider.bib = field("bib");
    rider.time = field("time");
    rider.points = field("points").and_then(|points| points.parse().ok());
    rider
}

/// A JSON scalar as text; `null` (and anything structured) is empty.
fn json_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}
