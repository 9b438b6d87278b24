//! Configuration for velodata.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. a TOML file (`velodata.toml` in the user's config directory, or an
//!    explicit path),
//! 3. `VELODATA_` environment variables, with `__` separating sections
//!    (`VELODATA_HTTP__MAX_RETRIES=5`).
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_secs = 3600
//!
//! [http]
//! max_retries = 3
//! retry_delay_ms = 2000
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;
use velodata_cache::{DEFAULT_TTL, ResponseCache};
use velodata_fetch::FetcherConfig;

const APPLICATION: &str = "velodata";
const CONFIG_FILE: &str = "velodata.toml";
const ENV_PREFIX: &str = "VELODATA_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Defaults to `velodata` in the user's cache directory.
    pub dir: Option<PathBuf>,
    pub ttl_secs: u64,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Attempts per fetch, including the first. Must be at least one.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub rate_limit: bool,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
    /// Overrides the built-in browser user agent.
    pub user_agent: Option<String>,
    /// Overrides the built-in session cookie.
    pub session_cookie: Option<String>,
}
impl Default for HttpConfig {
    fn default() -> Self {
        let defaults = FetcherConfig::default();
        Self {
            max_retries: defaults.max_retries,
            retry_delay_ms: millis(defaults.retry_delay),
            rate_limit: defaults.rate_limit,
            min_interval_ms: millis(defaults.min_interval),
            timeout_secs: defaults.timeout.as_secs(),
            user_agent: None,
            session_cookie: None,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Config {
    /// Load and validate configuration.
    ///
    /// With `path` unset, the user's `velodata.toml` is read if there is one.
    /// An explicit `path` must exist.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::Invalid(format!("config file not found: {}", path.display())));
            },
            Some(path) => Some(path.to_path_buf()),
            None => default_config_file(),
        };
        let config: Self = Self::figment(file.as_deref()).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// The layered sources, before extraction.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.max_retries == 0 {
            exn::bail!(ErrorKind::Invalid("http.max_retries must be at least 1".to_string()));
        }
        if self.http.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("http.timeout_secs must be at least 1".to_string()));
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            exn::bail!(ErrorKind::Invalid("cache.ttl_secs must be at least 1 while caching".to_string()));
        }
        Ok(())
    }

    /// The configured cache directory, or the user's default one.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache.dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or_raise(|| ErrorKind::Invalid("no cache.dir set and no user cache directory found".to_string()))
    }

    pub fn response_cache(&self) -> Result<ResponseCache> {
        if !self.cache.enabled {
            return Ok(ResponseCache::disabled());
        }
        Ok(ResponseCache::new(self.cache_dir()?))
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        let defaults = FetcherConfig::default();
        FetcherConfig {
            max_retries: self.http.max_retries,
            retry_delay: Duration::from_millis(self.http.retry_delay_ms),
            rate_limit: self.http.rate_limit,
            min_interval: Duration::from_millis(self.http.min_interval_ms),
            cache_ttl: Duration::from_secs(self.cache.ttl_secs),
            timeout: Duration::from_secs(self.http.timeout_secs),
            user_agent: self.http.user_agent.clone().unwrap_or(defaults.user_agent),
            session_cookie: self.http.session_cookie.clone().or(defaults.session_cookie),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
