//! On-disk response cache.
//!
//! One JSON file per canonical request key, stored flat inside the cache
//! directory. Nothing here ever fails the caller: a file that can't be read or
//! understood is a miss, and a write that fails is logged and forgotten.

use crate::entry::CacheEntry;
use crate::error::{ErrorKind, Result};
use crate::key::file_name;
use exn::ResultExt;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::instrument;

/// Time-bounded store of raw fetch results.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use serde_json::json;
/// use velodata_cache::ResponseCache;
///
/// let cache = ResponseCache::new("/tmp/velodata");
/// cache.store("https://example.com/?permit=2020-26", &json!("<html></html>"), Duration::from_secs(60));
/// assert!(cache.lookup("https://example.com/?permit=2020-26").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    enabled: bool,
}
impl ResponseCache {
    /// An enabled cache rooted at `dir`. The directory is created on the
    /// first write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), enabled: true }
    }

    /// A cache that never hits and never writes.
    pub fn disabled() -> Self {
        Self { dir: PathBuf::new(), enabled: false }
    }

    pub fn with_enabled(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self { dir: dir.into(), enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the cache file for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }

    /// Returns the cached payload for `key`, if present and not expired.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        self.lookup_at(key, OffsetDateTime::now_utc())
    }

    /// [`lookup`](Self::lookup) against an explicit clock.
    #[instrument(level = "trace", skip(self))]
    pub fn lookup_at(&self, key: &str, now: OffsetDateTime) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let entry = match self.read_entry(key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key, error = %err, "Ignoring unreadable cache entry");
                return None;
            },
        };
        if !entry.is_fresh(now) {
            tracing::debug!(key, "Cache entry expired");
            return None;
        }
        tracing::debug!(key, "Cache hit");
        Some(entry.response)
    }

    /// Stores `payload` under `key` for `ttl`.
    pub fn store(&self, key: &str, payload: &Value, ttl: Duration) {
        self.store_at(key, payload, ttl, OffsetDateTime::now_utc());
    }

    /// [`store`](Self::store) against an explicit clock.
    #[instrument(level = "trace", skip(self, payload))]
    pub fn store_at(&self, key: &str, payload: &Value, ttl: Duration, now: OffsetDateTime) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry::new(key, payload.clone(), now, ttl.as_secs_f64());
        if let Err(err) = self.write_entry(key, &entry) {
            tracing::warn!(key, error = %err, "Failed to write cache entry");
        }
    }

    /// Removes the entry for `key`. Returns `true` if a file was deleted.
    pub fn invalidate(&self, key: &str) -> bool {
        if !self.enabled {
            return false;
        }
        fs::remove_file(self.path_for(key)).is_ok()
    }

    /// Removes every cache entry in the directory, returning how many were
    /// deleted. Files that aren't cache entries are left alone.
    #[instrument(level = "debug", skip(self), fields(dir = %self.dir.display()))]
    pub fn clear(&self) -> usize {
        if !self.enabled {
            return 0;
        }
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter(|path| fs::remove_file(path).is_ok())
            .count()
    }

    fn read_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => exn::bail!(ErrorKind::Io(err)),
        };
        let entry = serde_json::from_str::<CacheEntry>(&contents).or_raise(|| ErrorKind::InvalidData(path))?;
        Ok(Some(entry))
    }

    fn write_entry(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(ErrorKind::Io)?;
        let json = serde_json::to_string_pretty(entry).or_raise(|| ErrorKind::Serialize(key.to_string()))?;
        fs::write(self.path_for(key), json).map_err(ErrorKind::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    const KEY: &str = "https://legacy.usacycling.org/results/?permit=2020-26";

    #[test]
    fn store_then_lookup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(temp_dir.path());
        let payload = json!("<html><body>permit</body></html>");
        cache.store(KEY, &payload, Duration::from_secs(3600));
        assert_eq!(cache.lookup(KEY), Some(payload));
    }

    #[test]
    fn json_payloads_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(temp_dir.path());
        let payload = json!({"message": "<ul><li id='race_1'><a>Men</a></li></ul>"});
        cache.store(KEY, &payload, Duration::from_secs(3600));
        assert_eq!(cache.lookup(KEY), Some(payload));
    }

    #[test]
    fn expired_entries_miss() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(temp_dir.path());
        let stored_at = datetime!(2024-05-01 12:00 UTC);
        cache.store_at(KEY, &json!("body"), Duration::from_secs(60), stored_at);
        assert!(cache.lookup_at(KEY, datetime!(2024-05-01 12:00:59 UTC)).is_some());
        assert!(cache.lookup_at(KEY, datetime!(2024-05-01 12:01:01 UTC)).is_none());
    }

    #[test]
    fn directory_is_created_lazily() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("nested/cache");
        let cache = ResponseCache::new(&dir);
        assert!(!dir.exists());
        assert!(cache.lookup(KEY).is_none());
        assert!(!dir.exists());
        cache.store(KEY, &json!("body"), Duration::from_secs(60));
        assert!(dir.is_dir());
        assert!(cache.path_for(KEY).is_file());
    }

    #[test]
    fn disabled_cache_never_hits() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::with_enabled(temp_dir.path(), false);
        cache.store(KEY, &json!("body"), Duration::from_secs(60));
        assert!(cache.lookup(KEY).is_none());
        assert!(!cache.path_for(KEY).exists());
        assert!(ResponseCache::disabled().lookup(KEY).is_none());
    }

    #[test]
    fn corrupt_files_are_misses() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(temp_dir.path());
        fs::write(cache.path_for(KEY), "{not json").unwrap();
        assert!(cache.lookup(KEY).is_none());
        fs::write(cache.path_for(KEY), r#"{"url": 12}"#).unwrap();
        assert!(cache.lookup(KEY).is_none());
    }

    #[test]
    fn legacy_iso_expiry_is_honoured() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(temp_dir.path());
        let legacy = r#"{
            "url": "k",
            "cached_at": "2021-03-01T09:00:00.123456",
            "expires_at": "2021-03-01T10:00:00.123456",
            "response": "<html/>"
        }"#;
        fs::write(cache.path_for(KEY), legacy).unwrap();
        assert_eq!(cache.lookup_at(KEY, datetime!(2021-03-01 09:30 UTC)), Some(json!("<html/>")));
        assert!(cache.lookup_at(KEY, datetime!(2021-03-01 10:30 UTC)).is_none());
    }

    #[test]
    fn invalidate_and_clear() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(temp_dir.path());
        cache.store("a", &json!(1), Duration::from_secs(60));
        cache.store("b", &json!(2), Duration::from_secs(60));
        cache.store("c", &json!(3), Duration::from_secs(60));
        fs::write(temp_dir.path().join("notes.txt"), "keep me").unwrap();
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.clear(), 2);
        assert!(cache.lookup("b").is_none());
        assert!(temp_dir.path().join("notes.txt").exists());
    }
}
