//! Scripted transport for testing.

use crate::error::{ErrorKind, Result};
use crate::request::{FetchRequest, FetchResult};
use crate::transport::Transport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// A response, whatever its status.
    Reply(FetchResult),
    /// A transport failure (no response at all).
    Fail(String),
}
impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Reply(FetchResult::new(status, body))
    }

    pub fn rate_limited(retry_after: Option<&str>) -> Self {
        let mut result = FetchResult::new(429, "Too Many Requests");
        if let Some(value) = retry_after {
            result = result.with_header("Retry-After", value);
        }
        Self::Reply(result)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

#[derive(Debug, Default)]
struct Inner {
    routes: Vec<(String, VecDeque<MockResponse>)>,
    requests: Vec<FetchRequest>,
}

/// In-memory [`Transport`] replaying scripted responses.
///
/// Each route is matched by substring against the request's canonical key
/// (URL plus sorted query string); the first matching route wins. A route
/// plays its responses in order and then keeps repeating the last one.
/// Clones share the same script and request log, so a test can keep a
/// handle after giving the transport to a fetcher.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "mock")] {
/// use velodata_fetch::{FetchRequest, MockResponse, MockTransport, Transport};
///
/// let transport = MockTransport::default()
///     .route("permit=2020-26", [MockResponse::fail("connection reset"), MockResponse::ok("<html></html>")]);
/// let request = FetchRequest::get("https://legacy.usacycling.org/results/").query("permit", "2020-26");
/// assert!(transport.send(&request).is_err());
/// assert_eq!(transport.send(&request).unwrap().body, "<html></html>");
/// assert_eq!(transport.request_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}
impl MockTransport {
    /// Create a mock transport with a single body per route.
    ///
    /// # Example
    ///
    /// ```
    /// # #[cfg(feature = "mock")] {
    /// use velodata_fetch::MockTransport;
    ///
    /// let transport = MockTransport::with_bodies([
    ///     ("browse.php", "<table class=\"datatable\"></table>"),
    ///     ("permit=2020-26", "<div id=\"pgcontent\"></div>"),
    /// ]);
    /// # }
    /// ```
    pub fn with_bodies(bodies: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        bodies
            .into_iter()
            .fold(Self::default(), |mock, (pattern, body)| mock.route(pattern, [MockResponse::ok(body)]))
    }

    /// Add a route. Panics if `responses` is empty: a route that can't answer
    /// is a broken test setup.
    pub fn route(self, pattern: impl Into<String>, responses: impl IntoIterator<Item = MockResponse>) -> Self {
        let pattern = pattern.into();
        let responses: VecDeque<MockResponse> = responses.into_iter().collect();
        if responses.is_empty() {
            // The panic here is DELIBERATE. MockTransport is intended to be
            // used in tests; panics are expected. There is no error result.
            panic!("MockTransport::route: no responses scripted for {pattern}");
        }
        self.lock().routes.push((pattern, responses));
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of requests sent whose canonical key contains `pattern`.
    pub fn requests_matching(&self, pattern: &str) -> usize {
        self.lock().requests.iter().filter(|request| request.cache_key().contains(pattern)).count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
impl Transport for MockTransport {
    fn send(&self, request: &FetchRequest) -> Result<FetchResult> {
        let key = request.cache_key();
        let mut inner = self.lock();
        inner.requests.push(request.clone());
        let Some((_, queue)) = inner.routes.iter_mut().find(|(pattern, _)| key.contains(pattern.as_str())) else {
            return Ok(FetchResult::new(404, format!("no mock route for {key}")));
        };
        let response = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
        match response {
            Some(MockResponse::Reply(result)) => Ok(result),
            Some(MockResponse::Fail(message)) => exn::bail!(ErrorKind::Transport(message)),
            None => Ok(FetchResult::new(404, format!("no mock response for {key}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_response_repeats() {
        let transport =
            MockTransport::default().route("/alpha", [MockResponse::status(500, ""), MockResponse::ok("fine")]);
        let request = FetchRequest::get("https://example.com/alpha");
        assert_eq!(transport.send(&request).unwrap().status, 500);
        assert_eq!(transport.send(&request).unwrap().body, "fine");
        assert_eq!(transport.send(&request).unwrap().body, "fine");
        assert_eq!(transport.requests_matching("/alpha"), 3);
    }

    #[test]
    fn unmatched_requests_are_not_found() {
        let transport = MockTransport::with_bodies([("/alpha", "body")]);
        let response = transport.send(&FetchRequest::get("https://example.com/beta")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    #[should_panic(expected = "no responses scripted")]
    fn empty_route_panics() {
        let _ = MockTransport::default().route("/alpha", Vec::new());
    }
}
