//! Scripted HTTP client for tests
//!
//! Replies are registered per method and URL. A route answers with its
//! replies in order and keeps repeating the last one.

use crate::client::HttpClient;
use crate::errors::HttpError;
use crate::types::{HttpMethod, HttpRequest, TimedResponse};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// What a scripted route answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(TimedResponse),
    ConnectionFailed,
}

impl MockReply {
    /// A JSON response with zero latency
    pub fn json(status: u16, body: JsonValue) -> Self {
        MockReply::Respond(TimedResponse::new(
            status,
            Duration::ZERO,
            body.to_string().into_bytes(),
        ))
    }

    /// A response with a raw body
    pub fn raw(status: u16, body: &str) -> Self {
        MockReply::Respond(TimedResponse::new(status, Duration::ZERO, body.as_bytes()))
    }

    /// An empty response
    pub fn status(status: u16) -> Self {
        MockReply::Respond(TimedResponse::new(status, Duration::ZERO, Vec::new()))
    }

    /// Report `elapsed` as the response latency
    pub fn after(self, elapsed: Duration) -> Self {
        match self {
            MockReply::Respond(mut response) => {
                response.elapsed = elapsed;
                MockReply::Respond(response)
            }
            other => other,
        }
    }
}

#[derive(Debug)]
struct Route {
    method: HttpMethod,
    url: String,
    replies: VecDeque<MockReply>,
}

/// HTTP client answering from registered routes
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reply for `method` on `url`.
    ///
    /// A URL that has no exact route falls back to the longest registered
    /// route that is a prefix of it.
    pub fn add_mock(&self, method: HttpMethod, url: &str, reply: MockReply) -> &Self {
        let mut routes = self.routes.lock();
        match routes
            .iter_mut()
            .find(|route| route.method == method && route.url == url)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                url: url.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        debug!("Added HTTP mock for {} {}", method, url);
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received with `method`
    pub fn count(&self, method: HttpMethod) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.method == method)
            .count()
    }

    fn next_reply(&self, request: &HttpRequest) -> Option<MockReply> {
        let mut routes = self.routes.lock();
        let index = routes
            .iter()
            .position(|route| route.method == request.method && route.url == request.url)
            .or_else(|| {
                routes
                    .iter()
                    .enumerate()
                    .filter(|(_, route)| {
                        route.method == request.method && request.url.starts_with(&route.url)
                    })
                    .max_by_key(|(_, route)| route.url.len())
                    .map(|(index, _)| index)
            })?;

        let replies = &mut routes[index].replies;
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<TimedResponse, HttpError> {
        let reply = self.next_reply(&request);
        self.requests.lock().push(request.clone());

        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::ConnectionFailed) => Err(HttpError::ConnectionFailed(format!(
                "connection refused: {}",
                request.url
            ))),
            None => Err(HttpError::InvalidUrl(format!(
                "No mock response available for {} {}",
                request.method, request.url
            ))),
        }
    }
}
