use crate::error::{ErrorKind, Result};
use crate::validate;
use exn::ResultExt;
use serde::Serialize;
use tracing::instrument;
use velodata_config::Config;
use velodata_extract::Extractor;
use velodata_extract::models::{
    CategoryRecord, DisciplineCategories, DisciplineRef, EventDetailsRecord, EventRecord, Extracted, RaceContext,
    RaceResultRecord,
};
use velodata_fetch::Fetcher;

/// Everything known about one event: its details, the categories of every
/// discipline and (optionally) the results of every category.
///
/// Sub-fetches that failed are listed in `warnings` and leave a gap rather
/// than failing the whole event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteEvent {
    #[serde(flatten)]
    pub details: EventDetailsRecord,
    pub results: Vec<RaceResultRecord>,
    pub warnings: Vec<String>,
}
impl CompleteEvent {
    fn warn(&mut self, message: String) {
        tracing::warn!(permit = %self.details.permit_number, "{message}");
        self.warnings.push(message);
    }
}

/// Answers queries about the legacy results site.
///
/// Inputs are validated before anything is fetched; everything after that is
/// delegated to an [`Extractor`] over the client's [`Fetcher`].
#[derive(Debug)]
pub struct Client {
    fetcher: Fetcher,
}
impl Client {
    /// A client talking HTTP, configured by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate().or_raise(|| ErrorKind::Config)?;
        let cache = config.response_cache().or_raise(|| ErrorKind::Config)?;
        let fetcher = Fetcher::new(config.fetcher_config(), cache).or_raise(|| ErrorKind::Config)?;
        Ok(Self::with_fetcher(fetcher))
    }

    pub fn with_fetcher(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    fn extractor(&self) -> Extractor<'_> {
        Extractor::new(&self.fetcher)
    }

    /// Events listed for a state (two-letter code) and year.
    #[instrument(skip(self))]
    pub fn events(&self, state: &str, year: i32) -> Result<Extracted<Vec<EventRecord>>> {
        let state = validate::state(state)?;
        let year = validate::year(year)?;
        self.extractor().events(&state, year).map_err(ErrorKind::extract)
    }

    #[instrument(skip(self))]
    pub fn event_details(&self, permit: &str) -> Result<Extracted<EventDetailsRecord>> {
        let permit = validate::permit(permit)?;
        self.extractor().event_details(permit).map_err(ErrorKind::extract)
    }

    #[instrument(skip(self))]
    pub fn disciplines(&self, permit: &str) -> Result<Vec<DisciplineRef>> {
        let permit = validate::permit(permit)?;
        self.extractor().disciplines(permit).map_err(ErrorKind::extract)
    }

    #[instrument(skip(self))]
    pub fn categories(&self, info_id: &str, label: &str) -> Result<Extracted<Vec<CategoryRecord>>> {
        let info_id = validate::numeric_id("info_id", info_id)?;
        self.extractor().categories(info_id, label).map_err(ErrorKind::extract)
    }

    #[instrument(skip(self))]
    pub fn race_results(&self, race_id: &str) -> Result<Extracted<RaceResultRecord>> {
        let race_id = validate::numeric_id("race_id", race_id)?;
        self.extractor().race_results(race_id).map_err(ErrorKind::extract)
    }

    /// Details, categories and (if `include_results`) results of one event.
    ///
    /// Only a failure to fetch the event page itself is an error. Any later
    /// fetch that fails is recorded as a warning and skipped.
    #[instrument(skip(self))]
    pub fn complete_event(&self, permit: &str, include_results: bool) -> Result<CompleteEvent> {
        let permit = validate::permit(permit)?;
        let extractor = self.extractor();
        let header = extractor.event_header(permit).map_err(ErrorKind::extract)?;
        let header_found = header.is_full();
        let mut event = CompleteEvent {
            details: header.into_inner(),
            results: Vec::new(),
            warnings: Vec::new(),
        };
        if !header_found {
            event.warn(format!("event page for {permit} has no header"));
        }

        let disciplines = event.details.disciplines.clone();
        for discipline in &disciplines {
            let categories = match extractor.discipline_categories(discipline) {
                Ok(categories) => categories,
                Err(err) => {
                    event.warn(format!("categories for {} unavailable: {err}", discipline.discipline));
                    DisciplineCategories::empty(discipline)
                },
            };
            if include_results {
                for category in &categories.categories {
                    let context = RaceContext {
                        category: Some(category.tags.clone()),
                        event_id: Some(permit.to_string()),
                        race_date: discipline.race_date,
                    };
                    match extractor.race_results_with(&category.race_id, &context) {
                        Ok(Extracted::Full(results)) => event.results.push(results),
                        Ok(Extracted::Minimal(results)) => {
                            event.warn(format!("no results found for race {}", category.race_id));
                            event.results.push(results);
                        },
                        Err(err) => event.warn(format!("results for race {} unavailable: {err}", category.race_id)),
                    }
                }
            }
            event.details.categories.push(categories);
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use time::macros::date;
    use velodata_cache::ResponseCache;
    use velodata_extract::error::ErrorKind as ExtractErrorKind;
    use velodata_fetch::{FetcherConfig, MockResponse, MockTransport};

    const PERMIT_PAGE: &str = r##"
        <html><body><div id="pgcontent">
            <h3>USA Cycling December VRL<br/>Colorado Springs, CO<br/>Dec 2, 2020 - Dec 30, 2020</h3>
            <a href="#" onclick="loadInfoID(132893, 'Road Race 12/02/2020')">Road Race 12/02/2020</a>
            <a href="#" onclick="loadInfoID(132894, 'Criterium 12/03/2020')">Criterium 12/03/2020</a>
        </div></body></html>
    "##;

    const ROAD_CATEGORIES: &str = r#"{"message": "<ul><li id=\"race_1001\"><a>Men Category B 40+</a></li><li id=\"race_1002\"><a>Women Category A</a></li></ul>"}"#;

    const RESULTS: &str = r#"
        <h4 class="race-title">Men Category B</h4>
        <div class="tablerow odd">
            <div class="tablecell results"></div>
            <div class="tablecell results">1</div>
            <div class="tablecell results">20</div>
            <div class="tablecell results"></div>
            <div class="tablecell results"><a href="/r/1">Jane Doe</a></div>
            <div class="tablecell results">Boulder, CO</div>
        </div>
    "#;

    fn client(transport: &MockTransport) -> Client {
        let config = FetcherConfig {
            max_retries: 2,
            retry_delay: Duration::ZERO,
            rate_limit: false,
            ..FetcherConfig::default()
        };
        Client::with_fetcher(Fetcher::with_transport(transport.clone(), ResponseCache::disabled(), config))
    }

    fn event_site() -> MockTransport {
        MockTransport::default()
            .route("permit=2020-26", [MockResponse::ok(PERMIT_PAGE)])
            .route("info_id=132893", [MockResponse::ok(ROAD_CATEGORIES)])
            .route("info_id=132894", [MockResponse::fail("connection reset")])
            .route("race_id=1001", [MockResponse::ok(RESULTS)])
            .route("race_id=1002", [MockResponse::status(500, "Internal Server Error")])
    }

    #[test]
    fn complete_event_tolerates_failed_sub_fetches() {
        let transport = event_site();
        let event = client(&transport).complete_event("2020-26", true).unwrap();

        assert_eq!(event.details.name, "USA Cycling December VRL");
        assert_eq!(event.details.categories.len(), 2);
        assert_eq!(event.details.categories[0].categories.len(), 2);
        assert!(event.details.categories[1].categories.is_empty());

        assert_eq!(event.results.len(), 1);
        let results = &event.results[0];
        assert_eq!(results.id, "1001");
        assert_eq!(results.riders[0].name, "Jane Doe");
        assert_eq!(results.event_id.as_deref(), Some("2020-26"));
        assert_eq!(results.date, Some(date!(2020-12-02)));
        assert_eq!(results.category.age_range.as_deref(), Some("40+"));

        assert_eq!(event.warnings.len(), 2);
        assert!(event.warnings[0].contains("Criterium") || event.warnings[1].contains("Criterium"));
        assert!(event.warnings.iter().any(|warning| warning.contains("race 1002")));
    }

    #[test]
    fn complete_event_without_results() {
        let transport = event_site();
        let event = client(&transport).complete_event("2020-26", false).unwrap();
        assert!(event.results.is_empty());
        assert_eq!(event.warnings.len(), 1);
        assert_eq!(transport.requests_matching("act=loadresults"), 0);
    }

    #[test]
    fn complete_event_needs_the_event_page() {
        let transport = MockTransport::default().route("permit=2020-26", [MockResponse::fail("timed out")]);
        let err = client(&transport).complete_event("2020-26", true).unwrap_err();
        assert_eq!(*err, ErrorKind::Extraction(ExtractErrorKind::Network));
        assert!(err.is_retryable());
    }

    #[test]
    fn complete_event_serializes_flat() {
        let transport = event_site();
        let event = client(&transport).complete_event("2020-26", false).unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["permit_number"], "2020-26");
        assert_eq!(json["start_date"], "2020-12-02");
        assert!(json["results"].as_array().unwrap().is_empty());
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn invalid_input_is_rejected_before_fetching() {
        let transport = MockTransport::default();
        let client = client(&transport);
        assert!(matches!(*client.events("Colorado", 2020).unwrap_err(), ErrorKind::InvalidInput(_)));
        assert!(matches!(*client.event_details("permit").unwrap_err(), ErrorKind::InvalidInput(_)));
        assert!(matches!(*client.categories("abc", "Road").unwrap_err(), ErrorKind::InvalidInput(_)));
        assert!(matches!(*client.race_results("").unwrap_err(), ErrorKind::InvalidInput(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn state_is_normalized() {
        let transport = MockTransport::with_bodies([("browse.php", "<html><body></body></html>")]);
        let extracted = client(&transport).events("co", 2020).unwrap();
        assert!(extracted.is_minimal());
        assert_eq!(transport.requests_matching("state=CO"), 1);
    }

    #[test]
    fn server_errors_surface_after_retries() {
        let transport = event_site();
        let err = client(&transport).race_results("1002").unwrap_err();
        assert_eq!(*err, ErrorKind::Extraction(ExtractErrorKind::Network));
        assert!(err.is_retryable());
        assert_eq!(transport.requests_matching("race_id=1002"), 2);
    }
}
