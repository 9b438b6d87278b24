//! Tolerant helpers over parsed markup, shared by every extractor.

use crate::consts;
use scraper::{ElementRef, Html, Selector};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use url::Url;
use velodata_fetch::BASE_URL;

/// Date formats seen on the site, in the order they're tried.
const DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
];

/// A parsed document or fragment.
#[derive(Debug)]
pub struct Markup {
    document: Html,
}
impl Markup {
    /// Parse raw HTML. Never fails; broken markup just yields a sparser tree.
    pub fn parse(html: &str) -> Self {
        Self { document: Html::parse_document(html) }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> scraper::html::Select<'a, 'b> {
        self.document.select(selector)
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }
}

/// Trimmed, whitespace-collapsed text of an element.
///
/// Malformed source markup sometimes leaves escaped tags inside text nodes;
/// anything from the first `<` onwards is dropped.
///
/// ```rust
/// use scraper::{Html, Selector};
/// use velodata_extract::markup::text;
/// let html = Html::parse_fragment("<p>  Boulder\n  Roubaix &lt;br/&gt; junk </p>");
/// let p = html.select(&Selector::parse("p").unwrap()).next().unwrap();
/// assert_eq!(text(p), "Boulder Roubaix");
/// ```
pub fn text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<String>();
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.split_once('<') {
        Some((before, _)) => before.trim_end().to_string(),
        None => collapsed,
    }
}

/// [`text`] for an element that may not exist; missing elements are `""`.
pub fn text_opt(element: Option<ElementRef<'_>>) -> String {
    element.map(text).unwrap_or_default()
}

/// Parse a date in any of the formats the site uses.
///
/// Empty input is silently `None`; anything else that doesn't match is `None`
/// with a warning.
pub fn parse_date(input: &str) -> Option<Date> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let parsed = DATE_FORMATS.iter().find_map(|format| Date::parse(input, format).ok());
    if parsed.is_none() {
        tracing::warn!(input, "Failed to parse date");
    }
    parsed
}

/// The numeric id out of an `onclick="loadInfoID(123, ...)"` handler.
pub fn load_info_id(onclick: &str) -> Option<String> {
    capture(&consts::LOAD_INFO_ID_REGEX, onclick)
}

/// The numeric id out of a `race_123` DOM id.
pub fn race_id(dom_id: &str) -> Option<String> {
    capture(&consts::RACE_ID_REGEX, dom_id)
}

fn capture(regex: &regex::Regex, haystack: &str) -> Option<String> {
    regex.captures(haystack).and_then(|captures| captures.get(1)).map(|m| m.as_str().to_string())
}

/// Make a link absolute against the site's base URL. Absolute links and empty
/// strings are returned untouched.
pub fn resolve_url(href: &str) -> String {
    let href = href.trim();
    if href.is_empty() || href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    Url::parse(BASE_URL)
        .and_then(|base| base.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::date;

    #[rstest]
    #[case("12/31/2020", Some(date!(2020-12-31)))]
    #[case("2/3/2021", Some(date!(2021-02-03)))]
    #[case("2020-12-31", Some(date!(2020-12-31)))]
    #[case("December 31, 2020", Some(date!(2020-12-31)))]
    #[case("Dec 2, 2020", Some(date!(2020-12-02)))]
    #[case("  Dec 30, 2020 ", Some(date!(2020-12-30)))]
    #[case("", None)]
    #[case("TBD", None)]
    #[case("13/45/2020", None)]
    fn dates(#[case] input: &str, #[case] expected: Option<Date>) {
        assert_eq!(parse_date(input), expected);
    }

    #[rstest]
    #[case("loadInfoID(132893, 'Road Race 12/02/2020')", Some("132893"))]
    #[case("javascript:loadInfoID(7)", Some("7"))]
    #[case("loadInfoID('x')", None)]
    #[case("", None)]
    fn load_info_ids(#[case] onclick: &str, #[case] expected: Option<&str>) {
        assert_eq!(load_info_id(onclick).as_deref(), expected);
    }

    #[rstest]
    #[case("race_1234567", Some("1234567"))]
    #[case("race_", None)]
    #[case("results_12", None)]
    fn race_ids(#[case] dom_id: &str, #[case] expected: Option<&str>) {
        assert_eq!(race_id(dom_id).as_deref(), expected);
    }

    #[rstest]
    #[case("/results/?permit=2020-26", "https://legacy.usacycling.org/results/?permit=2020-26")]
    #[case("?permit=2020-26", "https://legacy.usacycling.org/?permit=2020-26")]
    #[case("https://example.com/x", "https://example.com/x")]
    #[case("", "")]
    fn urls(#[case] href: &str, #[case] expected: &str) {
        assert_eq!(resolve_url(href), expected);
    }

    #[test]
    fn text_of_missing_element_is_empty() {
        assert_eq!(text_opt(None), "");
    }

    #[test]
    fn text_collapses_whitespace() {
        let markup = Markup::parse("<p>  Men \n <b>Category</b>\tB  </p>");
        let p = markup.select_first(&Selector::parse("p").unwrap()).unwrap();
        assert_eq!(text(p), "Men Category B");
    }
}
