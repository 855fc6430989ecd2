//! Test utilities for integration tests.
//!
//! This module provides a scriptable counting collaborator, a logger that
//! records what it is given, and helpers for sending requests.

use std::collections::HashSet;
use std::error::Error;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use share_counts::{CounterError, Counters, Logger, Options, ShareCounts};

// =============================================================================
// Mock Counters
// =============================================================================

/// What `retrieve_counts` does when called.
#[derive(Clone)]
pub enum Outcome {
    Counts(Value),
    Fail(CounterError),
    Panic,
}

/// A collaborator that knows a fixed set of networks and records every call.
#[derive(Clone)]
pub struct MockCounters {
    known: HashSet<String>,
    outcome: Outcome,
    invalid_calls: Arc<Mutex<Vec<Vec<String>>>>,
    retrieve_calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl MockCounters {
    /// Knows facebook, twitter and googleplus; answers `{facebook: 10, twitter: 5}`.
    pub fn new() -> Self {
        Self {
            known: ["facebook", "twitter", "googleplus"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            outcome: Outcome::Counts(json!({"facebook": 10, "twitter": 5})),
            invalid_calls: Arc::new(Mutex::new(Vec::new())),
            retrieve_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn invalid_calls(&self) -> Vec<Vec<String>> {
        self.invalid_calls.lock().unwrap().clone()
    }

    pub fn retrieve_calls(&self) -> Vec<(String, Vec<String>)> {
        self.retrieve_calls.lock().unwrap().clone()
    }
}

impl Default for MockCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Counters for MockCounters {
    fn invalid_networks(&self, networks: &[String]) -> Vec<String> {
        self.invalid_calls.lock().unwrap().push(networks.to_vec());
        networks
            .iter()
            .filter(|n| !self.known.contains(n.as_str()))
            .cloned()
            .collect()
    }

    async fn retrieve_counts(&self, url: &str, networks: &[String]) -> Result<Value, CounterError> {
        self.retrieve_calls
            .lock()
            .unwrap()
            .push((url.to_string(), networks.to_vec()));

        match &self.outcome {
            Outcome::Counts(value) => Ok(value.clone()),
            Outcome::Fail(err) => Err(err.clone()),
            Outcome::Panic => panic!("collaborator blew up"),
        }
    }
}

// =============================================================================
// Recording Logger
// =============================================================================

/// One `Logger::error` call.
#[derive(Debug, Clone)]
pub struct LoggedError {
    pub operation: String,
    pub call: String,
    pub message: String,
}

/// A logger that keeps every error it receives.
#[derive(Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<LoggedError>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LoggedError> {
        self.entries.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn error(&self, operation: &str, call: &str, error: &(dyn Error + 'static)) {
        self.entries.lock().unwrap().push(LoggedError {
            operation: operation.to_string(),
            call: call.to_string(),
            message: error.to_string(),
        });
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// A collected response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.to_str().unwrap())
    }
}

/// Build a router around `counters` with default options and a recording logger.
pub fn router_with(counters: &MockCounters, logger: &RecordingLogger) -> Router {
    router_with_options(counters, Options::new().with_logger(Arc::new(logger.clone())))
}

/// Build a router around `counters` with the given options.
pub fn router_with_options(counters: &MockCounters, options: Options) -> Router {
    ShareCounts::new(options, Arc::new(counters.clone())).router()
}

/// Send a request and collect the whole response.
pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Send `GET uri` with no extra headers.
pub async fn get(router: Router, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}
