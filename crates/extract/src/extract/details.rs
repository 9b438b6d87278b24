use super::Extractor;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::markup::{self, Markup, text};
use crate::models::{DisciplineCategories, DisciplineRef, EventDetailsRecord, Extracted};
use scraper::{ElementRef, Node};
use time::OffsetDateTime;
use tracing::instrument;
use velodata_fetch::endpoints;

impl Extractor<'_> {
    /// Details of one event, including the categories of every discipline.
    ///
    /// Categories are fetched one discipline at a time. A discipline whose
    /// categories can't be fetched is logged and left with an empty list; it
    /// doesn't fail the event.
    #[instrument(skip(self))]
    pub fn event_details(&self, permit: &str) -> Result<Extracted<EventDetailsRecord>> {
        let mut extracted = self.event_header(permit)?;
        let record = extracted.get_mut();
        record.categories = record
            .disciplines
            .iter()
            .map(|discipline| {
                self.discipline_categories(discipline).unwrap_or_else(|err| {
                    tracing::warn!(
                        permit,
                        load_info_id = %discipline.load_info_id,
                        error = %err,
                        "Failed to fetch discipline categories"
                    );
                    DisciplineCategories::empty(discipline)
                })
            })
            .collect();
        Ok(extracted)
    }

    /// [`event_details`](Self::event_details) without fetching any
    /// categories.
    #[instrument(skip(self))]
    pub fn event_header(&self, permit: &str) -> Result<Extracted<EventDetailsRecord>> {
        let html = self.fetcher.fetch_text(&endpoints::permit(permit)).map_err(ErrorKind::fetch)?;
        Ok(parse_event_header(&html, permit))
    }

    /// Categories of one discipline. A discipline without a load-info id has
    /// nothing to fetch and no categories.
    pub fn discipline_categories(&self, discipline: &DisciplineRef) -> Result<DisciplineCategories> {
        let mut found = DisciplineCategories::empty(discipline);
        if !discipline.load_info_id.is_empty() {
            found.categories = self.categories(&discipline.load_info_id, &discipline.discipline)?.into_inner();
        }
        Ok(found)
    }

    /// Disciplines listed on an event page, without fetching their
    /// categories.
    #[instrument(skip(self))]
    pub fn disciplines(&self, permit: &str) -> Result<Vec<DisciplineRef>> {
        let html = self.fetcher.fetch_text(&endpoints::permit(permit)).map_err(ErrorKind::fetch)?;
        Ok(parse_disciplines(&html))
    }
}

/// Parses an event page into details (categories are left empty).
///
/// The header block reads, one line per `<br>`:
///
/// ```text
/// USA Cycling December VRL
/// Colorado Springs, CO
/// Dec 2, 2020 - Dec 30, 2020
/// ```
///
/// Anything missing keeps its default. Without a header block at all the
/// record is [`Minimal`](Extracted::Minimal).
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn parse_event_header(html: &str, permit: &str) -> Extracted<EventDetailsRecord> {
    let document = Markup::parse(html);
    let mut record = EventDetailsRecord::defaults(permit, permit_year(permit));
    record.disciplines = disciplines(&document);

    let Some(header) = document.select_first(&consts::EVENT_HEADER_SELECTOR).filter(|h| !text(*h).is_empty()) else {
        tracing::warn!(permit, "No event header found");
        return Extracted::Minimal(record);
    };
    let lines = header_lines(header);
    if let Some(name) = lines.first() {
        record.name.clone_from(name);
    }
    if let Some(location) = lines.get(1)
        && let Some((place, rest)) = location.split_once(',')
    {
        record.location = place.trim().to_string();
        record.state = consts::STATE_REGEX
            .captures(rest)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
    }
    if let Some(range) = lines.get(2) {
        let mut dates = consts::LONG_DATE_REGEX.find_iter(range).map(|m| m.as_str());
        record.start_date = dates.next().and_then(markup::parse_date);
        record.end_date = match dates.next() {
            Some(end) => markup::parse_date(end),
            None => record.start_date,
        };
    }
    Extracted::Full(record)
}

/// Parses the discipline links of an event page.
pub fn parse_disciplines(html: &str) -> Vec<DisciplineRef> {
    disciplines(&Markup::parse(html))
}

fn disciplines(document: &Markup) -> Vec<DisciplineRef> {
    document
        .select(&consts::DISCIPLINE_LINK_SELECTOR)
        .filter_map(|link| {
            let label = text(link);
            if label.is_empty() {
                return None;
            }
            let onclick = link.value().attr("onclick").unwrap_or_default();
            Some(DisciplineRef {
                load_info_id: markup::load_info_id(onclick).unwrap_or_default(),
                discipline: consts::TRAILING_DATE_REGEX.replace(&label, "").into_owned(),
                race_date: consts::SLASH_DATE_REGEX.find(onclick).and_then(|m| markup::parse_date(m.as_str())),
            })
        })
        .collect()
}

/// Splits the header on `<br>` elements, or on newlines when it has none.
fn header_lines(header: ElementRef<'_>) -> Vec<String> {
    let has_breaks = header
        .children()
        .any(|child| matches!(child.value(), Node::Element(element) if element.name() == "br"));
    let raw_lines = if has_breaks {
        let mut lines = Vec::new();
        let mut current = String::new();
        for child in header.children() {
            match child.value() {
                Node::Element(element) if element.name() == "br" => lines.push(std::mem::take(&mut current)),
                Node::Text(fragment) => current.push_str(fragment),
                Node::Element(_) => current.extend(ElementRef::wrap(child).into_iter().flat_map(|el| el.text())),
                _ => {},
            }
        }
        lines.push(current);
        lines
    } else {
        header.text().collect::<String>().lines().map(str::to_string).collect()
    };
    raw_lines
        .iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// The year a permit was issued (`2020-26` is 2020), or this year if the
/// permit doesn't say.
fn permit_year(permit: &str) -> i32 {
    consts::PERMIT_YEAR_REGEX
        .captures(permit)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_else(|| OffsetDateTime::now_utc().year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::testing;
    use crate::models::Gender;
    use time::macros::date;
    use velodata_fetch::{MockResponse, MockTransport};

    const PERMIT_PAGE: &str = r##"
        <html><body><div id="pgcontent">
            <h3>USA Cycling December VRL<br/>Colorado Springs, CO<br/>Dec 2, 2020 - Dec 30, 2020</h3>
            <ul>
                <li><a href="#" onclick="loadInfoID(132893, 'Road Race 12/02/2020')">Road Race 12/02/2020</a></li>
                <li><a href="#" onclick="loadInfoID(132894, 'Criterium 12/03/2020')">Criterium</a></li>
                <li><a href="#" onclick="loadInfoID(132895)"></a></li>
            </ul>
        </div></body></html>
    "##;

    #[test]
    fn header_scenario() {
        let extracted = parse_event_header(PERMIT_PAGE, "2020-26");
        assert!(extracted.is_full());
        let record = extracted.into_inner();
        assert_eq!(record.id, "2020-26");
        assert_eq!(record.permit_number, "2020-26");
        assert_eq!(record.name, "USA Cycling December VRL");
        assert_eq!(record.location, "Colorado Springs");
        assert_eq!(record.state, "CO");
        assert_eq!(record.start_date, Some(date!(2020-12-02)));
        assert_eq!(record.end_date, Some(date!(2020-12-30)));
        assert_eq!(record.year, 2020);
        assert!(record.is_usac_sanctioned);
        assert_eq!(record.promoter, None);
    }

    #[test]
    fn discipline_links() {
        let disciplines = parse_disciplines(PERMIT_PAGE);
        assert_eq!(
            disciplines,
            vec![
                DisciplineRef {
                    load_info_id: "132893".to_string(),
                    discipline: "Road Race".to_string(),
                    race_date: Some(date!(2020-12-02)),
                },
                DisciplineRef {
                    load_info_id: "132894".to_string(),
                    discipline: "Criterium".to_string(),
                    race_date: Some(date!(2020-12-03)),
                },
            ]
        );
    }

    #[test]
    fn single_date_is_start_and_end() {
        let html = r#"<div id="pgcontent"><h3>Hill Climb<br>Golden, CO<br>Jun 5, 2021</h3></div>"#;
        let record = parse_event_header(html, "2021-101").into_inner();
        assert_eq!(record.start_date, Some(date!(2021-06-05)));
        assert_eq!(record.end_date, Some(date!(2021-06-05)));
    }

    #[test]
    fn newline_separated_header() {
        let html = "<div id=\"pgcontent\"><h3>\n  Gravel Grinder\n  Moab,  Utah UT\n  June 5, 2021 - June 6, 2021\n</h3></div>";
        let record = parse_event_header(html, "2021-7").into_inner();
        assert_eq!(record.name, "Gravel Grinder");
        assert_eq!(record.location, "Moab");
        assert_eq!(record.state, "UT");
        assert_eq!(record.end_date, Some(date!(2021-06-06)));
    }

    #[test]
    fn partial_header_keeps_defaults() {
        let html = r#"<div id="pgcontent"><h3>Mystery Race<br/>Somewhere without a comma</h3></div>"#;
        let record = parse_event_header(html, "2019-55").into_inner();
        assert_eq!(record.name, "Mystery Race");
        assert_eq!(record.location, "Unknown");
        assert_eq!(record.state, "");
        assert_eq!(record.start_date, None);
    }

    #[test]
    fn missing_header_is_minimal() {
        let extracted = parse_event_header("<html><body></body></html>", "bogus");
        assert!(extracted.is_minimal());
        let record = extracted.into_inner();
        assert_eq!(record.name, "Event bogus");
        assert_eq!(record.location, "Unknown");
        assert_eq!(record.year, OffsetDateTime::now_utc().year());
        assert!(record.disciplines.is_empty());
    }

    #[test]
    fn nested_category_failure_does_not_abort() {
        let transport = MockTransport::default()
            .route("permit=2020-26", [MockResponse::ok(PERMIT_PAGE)])
            .route(
                "info_id=132893",
                [MockResponse::ok(r#"{"message": "<ul><li id=\"race_1001\"><a>Men Category B 40+</a></li></ul>"}"#)],
            )
            .route("info_id=132894", [MockResponse::fail("connection reset")]);
        let fetcher = testing::fetcher(&transport);
        let record = Extractor::new(&fetcher).event_details("2020-26").unwrap().into_inner();

        assert_eq!(record.categories.len(), 2);
        assert_eq!(record.categories[0].discipline, "Road Race");
        assert_eq!(record.categories[0].categories.len(), 1);
        assert_eq!(record.categories[0].categories[0].race_id, "1001");
        assert_eq!(record.categories[0].categories[0].tags.gender, Some(Gender::Men));
        assert_eq!(record.categories[1].discipline, "Criterium");
        assert!(record.categories[1].categories.is_empty());
        assert_eq!(transport.requests_matching("info_id=132894"), 2);
    }

    #[test]
    fn disciplines_do_not_fetch_categories() {
        let transport = MockTransport::with_bodies([("permit=2020-26", PERMIT_PAGE)]);
        let fetcher = testing::fetcher(&transport);
        let disciplines = Extractor::new(&fetcher).disciplines("2020-26").unwrap();
        assert_eq!(disciplines.len(), 2);
        assert_eq!(transport.request_count(), 1);
    }
}
