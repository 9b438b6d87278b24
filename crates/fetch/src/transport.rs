//! The layer that actually talks to the network.
//!
//! [`Fetcher`](crate::Fetcher) owns a boxed [`Transport`] and never touches
//! HTTP directly, so tests can swap in the `mock` feature's `MockTransport`.

use crate::error::{ErrorKind, Result};
use crate::request::{FetchRequest, FetchResult, Method};
use exn::ResultExt;
use std::time::Duration;
use tracing::instrument;

/// Sends a single request, once. Retrying, caching and rate limiting are the
/// fetcher's job.
///
/// A response with a non-success status is still an `Ok`; only failing to
/// get a response at all is an error.
pub trait Transport: Send + Sync {
    fn send(&self, request: &FetchRequest) -> Result<FetchResult>;
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}
impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .or_raise(|| ErrorKind::Request("failed to build HTTP client".to_string()))?;
        Ok(Self { client })
    }
}
impl Transport for HttpTransport {
    #[instrument(level = "trace", skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    fn send(&self, request: &FetchRequest) -> Result<FetchResult> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, &request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().map_err(|err| classify(&request.url, err))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().map_err(|err| classify(&request.url, err))?;
        Ok(FetchResult { status, body, headers })
    }
}

fn classify(url: &str, err: reqwest::Error) -> exn::Exn<ErrorKind> {
    let kind = if err.is_builder() {
        ErrorKind::Request(format!("{url}: {err}"))
    } else {
        ErrorKind::Transport(format!("{url}: {err}"))
    };
    exn::Exn::from(kind)
}
