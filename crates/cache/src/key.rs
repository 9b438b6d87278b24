//! Canonical request keys and their on-disk file names.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::form_urlencoded::byte_serialize;

/// Characters left untouched when turning a key into a file name; everything
/// else (including `/`, `:`, `?` and `&`) is percent-encoded.
const FILE_NAME_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Builds the canonical cache key for a request: the URL followed by its
/// query parameters sorted by name then value and form-encoded.
///
/// Two requests with the same parameters in a different order produce the
/// same key.
///
/// # Examples
///
/// ```rust
/// use velodata_cache::canonical_key;
/// let a = canonical_key("https://example.com/browse.php", &[("state", "CO"), ("fyear", "2020")]);
/// let b = canonical_key("https://example.com/browse.php", &[("fyear", "2020"), ("state", "CO")]);
/// assert_eq!(a, b);
/// assert_eq!(a, "https://example.com/browse.php?fyear=2020&state=CO");
/// ```
pub fn canonical_key<K: AsRef<str>, V: AsRef<str>>(url: &str, query: &[(K, V)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let encode = |part: &str| byte_serialize(part.as_bytes()).collect::<String>();
    let mut pairs = query.iter().map(|(k, v)| (encode(k.as_ref()), encode(v.as_ref()))).collect::<Vec<_>>();
    pairs.sort();
    let query = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Filesystem-safe file name for a cache key.
pub fn file_name(key: &str) -> String {
    format!("{}.json", utf8_percent_encode(key, FILE_NAME_SET))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_query_is_the_url() {
        let key = canonical_key::<&str, &str>("https://example.com/a?permit=2020-26", &[]);
        assert_eq!(key, "https://example.com/a?permit=2020-26");
    }

    #[test]
    fn appends_to_existing_query() {
        let key = canonical_key("https://example.com/index.php?ajax=1", &[("race_id", "42")]);
        assert_eq!(key, "https://example.com/index.php?ajax=1&race_id=42");
    }

    #[test]
    fn encodes_values() {
        let key = canonical_key("https://example.com/", &[("label", "Road Race 12/02/2020")]);
        assert_eq!(key, "https://example.com/?label=Road+Race+12%2F02%2F2020");
    }

    #[rstest]
    #[case("https://example.com/a?b=c&d=e", "https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De.json")]
    #[case("plain-key_1.0~", "plain-key_1.0~.json")]
    fn file_names_are_flat(#[case] key: &str, #[case] expected: &str) {
        let name = file_name(key);
        assert_eq!(name, expected);
        assert!(!name.contains('/'));
    }
}
