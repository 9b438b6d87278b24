use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

selector!(ANCHOR_SELECTOR, "a");
selector!(TD_SELECTOR, "td");
selector!(TR_SELECTOR, "tr");

// Event listing (browse.php).
selector!(EVENT_TABLE_SELECTOR, "table.datatable");
regex!(PERMIT_PARAM_REGEX, r"permit=([^&]+)");

// Event page (?permit=).
selector!(EVENT_HEADER_SELECTOR, "#pgcontent h3");
regex!(STATE_REGEX, r"\b([A-Z]{2})\b");
regex!(LONG_DATE_REGEX, r"([A-Za-z]+ \d+, \d{4})");
regex!(PERMIT_YEAR_REGEX, r"^(\d{4})-");
selector!(DISCIPLINE_LINK_SELECTOR, r#"a[onclick^="loadInfoID"]"#);
regex!(LOAD_INFO_ID_REGEX, r"loadInfoID\((\d+)");
regex!(SLASH_DATE_REGEX, r"\d{2}/\d{2}/\d{4}");
regex!(TRAILING_DATE_REGEX, r"\s+\d{2}/\d{2}/\d{4}$");

// Category listing (act=infoid).
selector!(RACE_ITEM_SELECTOR, r#"li[id^="race_"]"#);
regex!(RACE_ID_REGEX, r"race_(\d+)");
regex!(GENDER_REGEX, r"\b(Men|Women)\b");
regex!(RANK_REGEX, r"Category\s+([A-Z])");
regex!(AGE_RANGE_REGEX, r"(\d+(?:\s*[-+]\s*\d*)?)");

// Race results (act=loadresults).
pub(crate) const UNAUTHORIZED_MARKER: &str = "Unauthorized access!";
selector!(RACE_TITLE_SELECTOR, "h4.race-title");
selector!(RACE_NAME_SELECTOR, "span.race-name");
selector!(RESULT_ROW_SELECTOR, "div.tablerow.odd, div.tablerow.even");
selector!(RESULT_CELL_SELECTOR, "div.tablecell.results");
selector!(RESULTS_TABLE_SELECTOR, "table.results-table");
selector!(RESULTS_HEADER_SELECTOR, "thead th");
selector!(RESULTS_BODY_ROW_SELECTOR, "tbody tr");
