use super::iso_date;
use serde::{Deserialize, Serialize};
use time::Date;

/// One row of a state's event listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The permit when there is one, otherwise a slug of name, date and state.
    pub id: String,
    pub name: String,
    pub permit: String,
    /// Absolute URL of the event page.
    pub permit_url: String,
    #[serde(with = "iso_date::option")]
    pub event_date: Option<Date>,
    /// When results were submitted.
    #[serde(with = "iso_date::option")]
    pub submit_date: Option<Date>,
    pub state: String,
    pub year: i32,
}
impl EventRecord {
    /// Stable id for an event: the permit, or (for listings without one) the
    /// first 20 characters of the name, lowercased with spaces as `_`, plus
    /// date and state.
    pub fn derive_id(permit: &str, name: &str, event_date: Option<Date>, state: &str) -> String {
        if !permit.is_empty() {
            return permit.to_string();
        }
        let name_part = name.chars().take(20).collect::<String>().replace(' ', "_").to_lowercase();
        let date_part = event_date.map(|date| date.to_string()).unwrap_or_default();
        format!("{name_part}_{date_part}_{state}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::date;

    #[rstest]
    #[case("2020-26", "Anything", None, "CO", "2020-26")]
    #[case("", "Boulder Roubaix Spring Classic", Some(date!(2020-04-05)), "CO", "boulder_roubaix_spri_2020-04-05_CO")]
    #[case("", "Crit", None, "UT", "crit__UT")]
    fn ids(
        #[case] permit: &str,
        #[case] name: &str,
        #[case] event_date: Option<Date>,
        #[case] state: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(EventRecord::derive_id(permit, name, event_date, state), expected);
    }

    #[test]
    fn dates_serialize_as_iso() {
        let record = EventRecord {
            id: "2020-26".to_string(),
            name: "USA Cycling December VRL".to_string(),
            permit: "2020-26".to_string(),
            permit_url: "https://legacy.usacycling.org/results/?permit=2020-26".to_string(),
            event_date: Some(date!(2020-12-02)),
            submit_date: None,
            state: "CO".to_string(),
            year: 2020,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event_date"], "2020-12-02");
        assert!(json["submit_date"].is_null());
    }
}
