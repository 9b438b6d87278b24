use std::time::Duration;
use velodata_cache::canonical_key;

/// HTTP method of a [`FetchRequest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Post,
}
impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A single request, built per call.
///
/// # Examples
///
/// ```rust
/// use velodata_fetch::FetchRequest;
/// let request = FetchRequest::get("https://legacy.usacycling.org/results/")
///     .query("permit", "2020-26")
///     .header("Referer", "https://legacy.usacycling.org/");
/// assert_eq!(request.cache_key(), "https://legacy.usacycling.org/results/?permit=2020-26");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
}
impl FetchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            query: Vec::new(),
            headers: Vec::new(),
            form: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Sets a header, replacing any existing header with the same
    /// (case-insensitive) name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn form(mut self, fields: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        self.form = Some(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// The canonical cache key: URL plus sorted query string.
    pub fn cache_key(&self) -> String {
        canonical_key(&self.url, &self.query)
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Returns a copy with `defaults` applied underneath this request's own
    /// headers; headers set on the request win.
    pub(crate) fn with_default_headers(&self, defaults: &[(String, String)]) -> Self {
        let mut merged: Vec<(String, String)> = defaults
            .iter()
            .filter(|(name, _)| self.header_value(name).is_none())
            .cloned()
            .collect();
        merged.extend(self.headers.iter().cloned());
        Self { headers: merged, ..self.clone() }
    }
}

/// What came back from a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}
impl FetchResult {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into(), headers: Vec::new() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// `Retry-After`, only when it's a plain number of seconds.
    pub fn retry_after(&self) -> Option<Duration> {
        let value = self.header("Retry-After")?.trim();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        value.parse::<u64>().ok().map(Duration::from_secs)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
}
