use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Naive ISO 8601 timestamps written by older cache versions (no offset,
/// optional fractional seconds). These are read as UTC.
const NAIVE_ISO: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");

/// One cached response, as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The canonical request key.
    pub url: String,
    #[serde(rename = "cachedAt", alias = "cached_at", default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<Timestamp>,
    #[serde(rename = "expiresAt", alias = "expires_at", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    /// Raw payload: a JSON string for text bodies, any JSON value otherwise.
    pub response: Value,
}
impl CacheEntry {
    pub(crate) fn new(url: impl Into<String>, response: Value, now: OffsetDateTime, ttl_secs: f64) -> Self {
        let cached_at = now.format(&Rfc3339).ok().map(Timestamp::Text);
        Self {
            url: url.into(),
            cached_at,
            expires_at: Some(Timestamp::Unix(unix_seconds(now) + ttl_secs)),
            response,
        }
    }

    /// Whether this entry is still usable at `now`.
    ///
    /// Entries without an expiry never expire. An expiry that can't be
    /// understood counts as expired.
    pub fn is_fresh(&self, now: OffsetDateTime) -> bool {
        match &self.expires_at {
            None => true,
            Some(expires_at) => expires_at.to_datetime().is_some_and(|expires_at| now <= expires_at),
        }
    }
}

/// Cache timestamps come in two shapes: unix seconds (current) or an ISO 8601
/// string (legacy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(f64),
    Text(String),
}
impl Timestamp {
    pub fn to_datetime(&self) -> Option<OffsetDateTime> {
        match self {
            Self::Unix(seconds) => {
                if !seconds.is_finite() {
                    return None;
                }
                let nanos = (seconds * 1_000_000_000.0) as i128;
                OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
            },
            Self::Text(text) => {
                let text = text.trim();
                OffsetDateTime::parse(text, &Rfc3339)
                    .ok()
                    .or_else(|| PrimitiveDateTime::parse(text, NAIVE_ISO).ok().map(PrimitiveDateTime::assume_utc))
            },
        }
    }
}

fn unix_seconds(at: OffsetDateTime) -> f64 {
    at.unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    #[rstest]
    #[case(Timestamp::Unix(1_607_000_000.0), Some(datetime!(2020-12-03 12:53:20 UTC)))]
    #[case(Timestamp::Text("2020-12-03T12:53:20Z".to_string()), Some(datetime!(2020-12-03 12:53:20 UTC)))]
    #[case(Timestamp::Text("2020-12-03T12:53:20".to_string()), Some(datetime!(2020-12-03 12:53:20 UTC)))]
    #[case(Timestamp::Text("2020-12-03T12:53:20.250000".to_string()), Some(datetime!(2020-12-03 12:53:20.25 UTC)))]
    #[case(Timestamp::Text("next tuesday".to_string()), None)]
    #[case(Timestamp::Unix(f64::NAN), None)]
    fn timestamp_formats(#[case] input: Timestamp, #[case] expected: Option<OffsetDateTime>) {
        assert_eq!(input.to_datetime(), expected);
    }

    #[test]
    fn legacy_snake_case_entry() {
        let json = r#"{"url":"k","cached_at":"2020-12-03T12:00:00","expires_at":"2020-12-03T13:00:00","response":"<html/>"}"#;
        let entry: CacheEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_fresh(datetime!(2020-12-03 12:30 UTC)));
        assert!(!entry.is_fresh(datetime!(2020-12-03 13:30 UTC)));
        assert_eq!(entry.response, Value::String("<html/>".to_string()));
    }

    #[test]
    fn unparseable_expiry_is_stale() {
        let entry = CacheEntry {
            url: "k".to_string(),
            cached_at: None,
            expires_at: Some(Timestamp::Text("soon".to_string())),
            response: Value::Null,
        };
        assert!(!entry.is_fresh(datetime!(2000-01-01 0:00 UTC)));
    }

    #[test]
    fn missing_expiry_never_expires() {
        let entry: CacheEntry = serde_json::from_str(r#"{"url":"k","response":{"a":1}}"#).unwrap();
        assert!(entry.is_fresh(datetime!(2999-01-01 0:00 UTC)));
    }

    #[test]
    fn new_entry_serializes_camel_case() {
        let entry = CacheEntry::new("k", Value::String("body".to_string()), datetime!(2020-12-03 12:53:20 UTC), 60.0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["cachedAt"], "2020-12-03T12:53:20Z");
        assert_eq!(json["expiresAt"], 1_607_000_060.0);
        assert_eq!(json["response"], "body");
    }
}
