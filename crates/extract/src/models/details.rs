use super::{CategoryRecord, iso_date};
use serde::{Deserialize, Serialize};
use time::Date;

/// A discipline (road race, criterium, ...) listed on an event page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineRef {
    /// Id used to fetch the discipline's category listing; empty if the link
    /// didn't carry one.
    pub load_info_id: String,
    /// Link label with any trailing date removed.
    pub discipline: String,
    #[serde(with = "iso_date::option")]
    pub race_date: Option<Date>,
}

/// The categories found for one discipline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineCategories {
    pub load_info_id: String,
    pub discipline: String,
    pub categories: Vec<CategoryRecord>,
}
impl DisciplineCategories {
    /// `discipline` with no categories (yet).
    pub fn empty(discipline: &DisciplineRef) -> Self {
        Self {
            load_info_id: discipline.load_info_id.clone(),
            discipline: discipline.discipline.clone(),
            categories: Vec::new(),
        }
    }
}

/// Everything the event page says about one permit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetailsRecord {
    pub id: String,
    pub permit_number: String,
    pub name: String,
    #[serde(with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(with = "iso_date::option")]
    pub end_date: Option<Date>,
    pub location: String,
    pub state: String,
    pub year: i32,
    pub disciplines: Vec<DisciplineRef>,
    pub categories: Vec<DisciplineCategories>,
    pub is_usac_sanctioned: bool,
    pub promoter: Option<String>,
    pub promoter_email: Option<String>,
    pub website: Option<String>,
    pub registration_url: Option<String>,
    pub description: Option<String>,
}
impl EventDetailsRecord {
    /// The record for `permit` before anything has been read from markup.
    pub fn defaults(permit: &str, year: i32) -> Self {
        Self {
            id: permit.to_string(),
            permit_number: permit.to_string(),
            name: format!("Event {permit}"),
            start_date: None,
            end_date: None,
            location: "Unknown".to_string(),
            state: String::new(),
            year,
            disciplines: Vec::new(),
            categories: Vec::new(),
            is_usac_sanctioned: true,
            promoter: None,
            promoter_email: None,
            website: None,
            registration_url: None,
            description: None,
        }
    }
}
