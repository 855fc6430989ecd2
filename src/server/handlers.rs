//! HTTP request handlers for the share count router.
//!
//! # Endpoints
//!
//! - `GET /?networks=facebook,twitter[&url=...][&callback=...]` - Share counts
//! - anything else below the mount point - `403 Forbidden`
//!
//! The count route is wrapped in [`cache_control_middleware`], which stamps
//! `Cache-Control: max-age=<n>` on every response it produces.

use std::sync::Arc;

use axum::{
    extract::{RawQuery, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use percent_encoding::percent_decode_str;

use crate::counters::Counters;
use crate::error::{CounterError, RequestError};
use crate::options::Config;

use super::jsonp::JsonpResponse;

// =============================================================================
// Application State
// =============================================================================

/// Shared state of one share count router.
#[derive(Clone)]
pub struct AppState {
    /// The counting collaborator
    pub counters: Arc<dyn Counters>,

    /// Resolved configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(counters: Arc<dyn Counters>, config: Arc<Config>) -> Self {
        Self { counters, config }
    }
}

/// Cache lifetime stamped on count responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// max-age in seconds
    pub max_age: u32,
}

impl CachePolicy {
    pub fn new(max_age: u32) -> Self {
        Self { max_age }
    }

    /// Value of the `Cache-Control` header.
    pub fn header_value(&self) -> String {
        format!("max-age={}", self.max_age)
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters of a count request.
///
/// Parsed leniently from the raw query string so that no request is ever
/// rejected before the handler runs. When a key repeats, the first value
/// wins. A component that does not decode to UTF-8 is kept as raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountQueryParams {
    /// Comma-separated network names
    pub networks: Option<String>,

    /// Target URL (falls back to the `Referer` header)
    pub url: Option<String>,

    /// JSONP callback name
    pub callback: Option<String>,
}

impl CountQueryParams {
    /// Parse the raw query string.
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = Self::default();

        for pair in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match decode_component(key).as_str() {
                "networks" => &mut params.networks,
                "url" => &mut params.url,
                "callback" => &mut params.callback,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(decode_component(value));
            }
        }

        params
    }

    /// Split `networks` into its raw, ordered tokens.
    ///
    /// Tokens are not trimmed or deduplicated; the collaborator decides what
    /// is valid.
    pub fn network_list(&self) -> Result<Vec<String>, RequestError> {
        match self.networks.as_deref() {
            Some(networks) if !networks.is_empty() => {
                Ok(networks.split(',').map(str::to_string).collect())
            }
            _ => Err(RequestError::MissingNetworks),
        }
    }

    /// Resolve the URL to count: the `url` parameter, else the referrer.
    pub fn target_url(&self, headers: &HeaderMap) -> Result<String, RequestError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Ok(url.to_string());
        }

        headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .filter(|referer| !referer.is_empty())
            .map(str::to_string)
            .ok_or(RequestError::MissingUrl)
    }
}

/// Decode one `application/x-www-form-urlencoded` component.
///
/// Falls back to the raw text (with `+` as space) when the percent-decoded
/// bytes are not UTF-8, so nothing is replaced with U+FFFD.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

impl RequestError {
    /// Build the error response, wrapped in `callback` when one was given.
    ///
    /// Client errors are logged at debug level. Retrieval failures are
    /// reported through the configured [`crate::logger::Logger`] by the
    /// handler, before this is called.
    pub fn into_jsonp(self, callback: Option<String>) -> JsonpResponse {
        let status = self.status();

        if status.is_client_error() {
            debug!(status = status.as_u16(), "Client error: {}", self);
        }

        JsonpResponse::error(status, self.public_message()).with_callback(callback)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        self.into_jsonp(None).into_response()
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Stamp `Cache-Control: max-age=<n>` on the response.
///
/// Applies to error responses too, so a CDN also absorbs repeated bad
/// requests.
pub async fn cache_control_middleware(
    State(policy): State<CachePolicy>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::try_from(policy.header_value()) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }

    response
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle share count requests.
///
/// # Endpoint
///
/// `GET /`
///
/// # Query Parameters
///
/// - `networks`: Comma-separated network names (required)
/// - `url`: URL to count (optional, defaults to the `Referer` header)
/// - `callback`: JSONP callback name (optional)
///
/// # Response
///
/// - `200 OK`: Counts as returned by the collaborator, e.g. `{"facebook":10,"twitter":5}`
/// - `422 Unprocessable Entity`: Missing networks, unknown networks, or no URL
/// - `500 Internal Server Error`: The collaborator failed (details are logged, not returned)
pub async fn count_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let params = CountQueryParams::parse(query.as_deref());

    match count(&state, &params, &headers).await {
        Ok(counts) => JsonpResponse::new(StatusCode::OK, counts)
            .with_callback(params.callback)
            .into_response(),
        Err(err) => err.into_jsonp(params.callback).into_response(),
    }
}

/// Run the validation pipeline and the retrieval, stopping at the first failure.
async fn count(
    state: &AppState,
    params: &CountQueryParams,
    headers: &HeaderMap,
) -> Result<Value, RequestError> {
    let networks = params.network_list()?;

    let unknown = state.counters.invalid_networks(&networks);
    if !unknown.is_empty() {
        return Err(RequestError::UnknownNetworks(unknown));
    }

    let url = params.target_url(headers)?;

    retrieve(state, url, networks).await.map_err(|e| {
        state
            .config
            .logger
            .error("count_handler", "Counters::retrieve_counts", &e);
        RequestError::Retrieval(e)
    })
}

/// Call the collaborator on its own task so a panic inside it still ends in
/// a 500 response.
async fn retrieve(
    state: &AppState,
    url: String,
    networks: Vec<String>,
) -> Result<Value, CounterError> {
    let counters = Arc::clone(&state.counters);

    tokio::spawn(async move { counters.retrieve_counts(&url, &networks).await })
        .await
        .map_err(|e| CounterError::Aborted(e.to_string()))?
}

/// Reject anything the count route did not claim.
///
/// # Response
///
/// `403 Forbidden` with `{"error":"Forbidden"}` (JSONP when `callback` is given).
pub async fn forbidden_handler(RawQuery(query): RawQuery) -> Response {
    let params = CountQueryParams::parse(query.as_deref());
    RequestError::Forbidden
        .into_jsonp(params.callback)
        .into_response()
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health` (mounted by the host binary, outside the share count router)
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
