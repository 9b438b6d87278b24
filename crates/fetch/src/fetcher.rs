//! Cached, rate-limited, retrying fetches.

use crate::consts::{ACCEPT_HTML, ACCEPT_JSON, ACCEPT_LANGUAGE, SESSION_COOKIE, USER_AGENT};
use crate::error::{ErrorKind, Result};
use crate::payload::Payload;
use crate::request::{FetchRequest, FetchResult};
use crate::transport::{HttpTransport, Transport};
use exn::ResultExt;
use serde_json::Value;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::instrument;
use velodata_cache::{DEFAULT_TTL, ResponseCache};

/// Retry, rate-limit and identity settings for a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Attempts per fetch, including the first. Rate-limited (429) responses
    /// don't count.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub retry_delay: Duration,
    /// Whether to space consecutive network calls at least `min_interval`
    /// apart.
    pub rate_limit: bool,
    pub min_interval: Duration,
    /// How long successful responses stay cached.
    pub cache_ttl: Duration,
    /// Per-request socket timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Sent as the `Cookie` header when set.
    pub session_cookie: Option<String>,
}
impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            rate_limit: true,
            min_interval: Duration::from_secs(1),
            cache_ttl: DEFAULT_TTL,
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
            session_cookie: Some(SESSION_COOKIE.to_string()),
        }
    }
}

/// The only way the rest of the workspace gets at the network.
///
/// Every fetch goes cache first; on a miss the request is sent through the
/// [`Transport`] with the browser identity headers, retried with exponential
/// backoff on failure, and the body cached on success. All waiting is
/// blocking.
pub struct Fetcher {
    transport: Box<dyn Transport>,
    cache: ResponseCache,
    config: FetcherConfig,
    last_request: Mutex<Option<Instant>>,
}
impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
impl Fetcher {
    /// A fetcher talking HTTP.
    pub fn new(config: FetcherConfig, cache: ResponseCache) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(transport, cache, config))
    }

    pub fn with_transport(transport: impl Transport + 'static, cache: ResponseCache, config: FetcherConfig) -> Self {
        Self {
            transport: Box::new(transport),
            cache,
            config,
            last_request: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetches a text (HTML) body.
    ///
    /// A cached JSON value left by an older cache version is handed back
    /// re-serialized.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub fn fetch_text(&self, request: &FetchRequest) -> Result<String> {
        let key = request.cache_key();
        if let Some(cached) = self.cache.lookup(&key) {
            return Ok(match cached {
                Value::String(text) => text,
                other => other.to_string(),
            });
        }
        let response = self.send(request, ACCEPT_HTML)?;
        self.cache.store(&key, &Value::String(response.body.clone()), self.config.cache_ttl);
        Ok(response.body)
    }

    /// Fetches and parses a JSON body.
    ///
    /// # Errors
    ///
    /// Besides network failures, a body that isn't JSON fails with
    /// [`UnexpectedHtml`](ErrorKind::UnexpectedHtml) if it looks like an HTML
    /// page and [`InvalidJson`](ErrorKind::InvalidJson) otherwise. Neither is
    /// retried nor cached. A body cached by [`fetch_text`](Self::fetch_text)
    /// goes through the same check.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub fn fetch_json(&self, request: &FetchRequest) -> Result<Value> {
        let key = request.cache_key();
        match self.cache.lookup(&key) {
            Some(Value::String(body)) => return parse_json(&key, &body),
            Some(cached) => return Ok(cached),
            None => {},
        }
        let response = self.send(request, ACCEPT_JSON)?;
        let value = parse_json(&key, &response.body)?;
        self.cache.store(&key, &value, self.config.cache_ttl);
        Ok(value)
    }

    /// Fetches a body and normalizes it into a [`Payload`], unwrapping any
    /// JSON envelope.
    pub fn fetch_payload(&self, request: &FetchRequest) -> Result<Payload> {
        let body = self.fetch_text(request)?;
        Ok(Payload::from_body(&body))
    }

    fn identity(&self, accept: &str) -> Vec<(String, String)> {
        let mut headers = vec![
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            ("Accept".to_string(), accept.to_string()),
            ("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()),
        ];
        if let Some(cookie) = &self.config.session_cookie {
            headers.push(("Cookie".to_string(), cookie.clone()));
        }
        headers
    }

    fn send(&self, request: &FetchRequest, accept: &str) -> Result<FetchResult> {
        let request = request.with_default_headers(&self.identity(accept));
        let url = request.cache_key();
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        loop {
            self.throttle();
            let failure = match self.transport.send(&request) {
                Ok(response) if response.is_rate_limited() => {
                    let wait = self.rate_limit_wait(&response);
                    tracing::warn!(%url, wait_secs = wait.as_secs_f64(), "Rate limited, waiting before retrying");
                    thread::sleep(wait);
                    continue;
                },
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => exn::Exn::from(ErrorKind::Status {
                    url: url.clone(),
                    status: response.status,
                }),
                Err(err) => err,
            };
            attempts += 1;
            if !failure.is_retryable() {
                tracing::warn!(%url, error = %failure, "Request cannot be sent");
                return Err(failure.raise(ErrorKind::Network { url, attempts }));
            }
            tracing::warn!(%url, attempt = attempts, max_attempts, error = %failure, "Request failed");
            if attempts >= max_attempts {
                tracing::error!(%url, attempts, "All retries failed");
                return Err(failure.raise(ErrorKind::Network { url, attempts }));
            }
            let delay = self.backoff(attempts);
            tracing::info!(%url, delay_secs = delay.as_secs_f64(), "Retrying");
            thread::sleep(delay);
        }
    }

    /// Delay after the `attempt`-th (1-based) failed attempt.
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.config.retry_delay.saturating_mul(1 << exponent)
    }

    /// How long to wait after a 429: the server's `Retry-After` if it gave
    /// one in seconds, twice the retry delay otherwise.
    fn rate_limit_wait(&self, response: &FetchResult) -> Duration {
        response.retry_after().unwrap_or(self.config.retry_delay.saturating_mul(2))
    }

    fn throttle(&self) {
        if !self.config.rate_limit {
            return;
        }
        let mut last_request = self.last_request.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < self.config.min_interval {
                let wait = self.config.min_interval - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "Throttling request");
                thread::sleep(wait);
            }
        }
        *last_request = Some(Instant::now());
    }
}

fn parse_json(url: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).or_raise(|| {
        if body.to_ascii_lowercase().contains("<html") {
            tracing::warn!(url, "Expected JSON but got HTML");
            ErrorKind::UnexpectedHtml(url.to_string())
        } else {
            tracing::error!(url, "Failed to parse JSON");
            ErrorKind::InvalidJson(url.to_string())
        }
    })
}
