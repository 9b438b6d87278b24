mod category;
mod details;
mod event;
mod extracted;
mod results;

pub use self::category::{CategoryRecord, CategoryTags, CategoryType, Gender};
pub use self::details::{DisciplineCategories, DisciplineRef, EventDetailsRecord};
pub use self::event::EventRecord;
pub use self::extracted::Extracted;
pub use self::results::{RaceContext, RaceResultRecord, RiderRecord};

// Dates are exchanged as plain ISO dates, e.g. `2020-12-02`.
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
