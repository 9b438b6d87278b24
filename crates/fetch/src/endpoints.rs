//! Request builders for the legacy results site.

use crate::consts::{API_URL, BROWSE_URL, RESULTS_URL};
use crate::request::FetchRequest;

/// Event listing for a state and year.
pub fn browse(state: &str, year: i32) -> FetchRequest {
    FetchRequest::get(BROWSE_URL).query("state", state).query("race", "").query("fyear", year)
}

/// Event page for a permit.
pub fn permit(permit: &str) -> FetchRequest {
    FetchRequest::get(RESULTS_URL).query("permit", permit)
}

/// Public URL of a permit's event page.
pub fn permit_url(permit: &str) -> String {
    self::permit(permit).cache_key()
}

/// Category listing of one discipline.
pub fn load_info(info_id: &str, label: &str) -> FetchRequest {
    FetchRequest::get(API_URL)
        .query("ajax", 1)
        .query("act", "infoid")
        .query("info_id", info_id)
        .query("label", label)
}

/// Results of one race (category). The endpoint refuses requests that don't
/// look like they came from a results page.
pub fn race_results(race_id: &str) -> FetchRequest {
    FetchRequest::get(API_URL)
        .query("ajax", 1)
        .query("act", "loadresults")
        .query("race_id", race_id)
        .header("Referer", RESULTS_URL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_key() {
        assert_eq!(
            browse("CO", 2020).cache_key(),
            "https://legacy.usacycling.org/results/browse.php?fyear=2020&race=&state=CO"
        );
    }

    #[test]
    fn load_info_encodes_label() {
        assert_eq!(
            load_info("132893", "Road Race 12/02/2020").cache_key(),
            "https://legacy.usacycling.org/results/index.php?act=infoid&ajax=1&info_id=132893&label=Road+Race+12%2F02%2F2020"
        );
    }

    #[test]
    fn race_results_sends_referer() {
        let request = race_results("1234567");
        assert_eq!(request.header_value("referer"), Some(RESULTS_URL));
        assert!(request.cache_key().ends_with("?act=loadresults&ajax=1&race_id=1234567"));
    }

    #[test]
    fn permit_urls() {
        assert_eq!(permit_url("2020-26"), "https://legacy.usacycling.org/results/?permit=2020-26");
    }
}
