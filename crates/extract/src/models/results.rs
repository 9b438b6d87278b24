use super::{CategoryTags, iso_date};
use serde::{Deserialize, Serialize};
use time::Date;

/// One finisher (or non-finisher) in a race.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderRecord {
    /// Place as printed: `"14"`, `"DNF"`, ...
    pub place: String,
    /// Numeric place, when the rider has one.
    pub place_number: Option<u32>,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub team: Option<String>,
    pub license: Option<String>,
    pub bib: Option<String>,
    /// Raw time string, unparsed.
    pub time: Option<String>,
    pub points: Option<u32>,
    pub is_dnf: bool,
    pub is_dns: bool,
    pub is_dq: bool,
}
impl RiderRecord {
    /// A rider with `place` classified and everything else empty.
    ///
    /// ```rust
    /// use velodata_extract::models::RiderRecord;
    /// let dnf = RiderRecord::with_place("DNF");
    /// assert!(dnf.is_dnf);
    /// assert_eq!(dnf.place_number, None);
    /// ```
    pub fn with_place(place: impl Into<String>) -> Self {
        let mut rider = Self { place: place.into(), ..Self::default() };
        rider.classify_place();
        rider
    }

    /// Sets the DNF/DNS/DQ flags and numeric place from [`place`](Self::place).
    /// A place that is neither flagged nor numeric leaves `place_number` unset.
    pub fn classify_place(&mut self) {
        let place = self.place.trim().to_lowercase();
        self.is_dnf = place.contains("dnf");
        self.is_dns = place.contains("dns");
        self.is_dq = place.contains("dq") || place.contains("dsq");
        self.place_number = if self.is_dnf || self.is_dns || self.is_dq {
            None
        } else {
            place.parse().ok()
        };
    }

    /// Split a `"City, ST"` location into city and state.
    pub fn set_location(&mut self, location: &str) {
        if location.trim().is_empty() {
            return;
        }
        let mut parts = location.split(',').map(str::trim);
        self.city = parts.next().filter(|city| !city.is_empty()).map(str::to_string);
        self.state = parts.next().filter(|state| !state.is_empty()).map(str::to_string);
    }
}

/// Results of one race (one category of one discipline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResultRecord {
    pub id: String,
    pub name: String,
    pub riders: Vec<RiderRecord>,
    pub category: CategoryTags,
    pub event_id: Option<String>,
    #[serde(with = "iso_date::option")]
    pub date: Option<Date>,
}
impl RaceResultRecord {
    /// No name, no riders.
    pub fn empty(race_id: &str) -> Self {
        Self {
            id: race_id.to_string(),
            name: String::new(),
            riders: Vec::new(),
            category: CategoryTags::default(),
            event_id: None,
            date: None,
        }
    }

    /// Applies what the caller already knows about this race.
    pub fn apply(&mut self, context: &RaceContext) {
        if let Some(category) = &context.category {
            self.category.merge(category);
        }
        if context.event_id.is_some() {
            self.event_id.clone_from(&context.event_id);
        }
        if context.race_date.is_some() {
            self.date = context.race_date;
        }
    }
}

/// Caller-supplied facts about a race that its results page doesn't carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceContext {
    pub category: Option<CategoryTags>,
    pub event_id: Option<String>,
    pub race_date: Option<Date>,
}
