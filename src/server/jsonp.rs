//! JSON / JSONP response writer.
//!
//! Every response the share count router produces, success or error, goes
//! through [`JsonpResponse`] so they all share one shape. When the request
//! carries a non-empty `callback` parameter the JSON body is wrapped for
//! script-tag consumption:
//!
//! ```text
//! /**/ typeof cb === 'function' && cb({"facebook":10});
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use tracing::error;

/// Content type of plain JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type of JSONP responses.
pub const JSONP_CONTENT_TYPE: &str = "text/javascript; charset=utf-8";

/// Strip everything that is not allowed in a callback expression.
///
/// Allowed: ASCII letters, digits, `_`, `$`, `.`, `[` and `]`.
pub fn sanitize_callback(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '[' | ']'))
        .collect()
}

/// A JSON body with a status code and an optional JSONP callback.
#[derive(Debug, Clone)]
pub struct JsonpResponse {
    status: StatusCode,
    body: Value,
    callback: Option<String>,
}

impl JsonpResponse {
    /// Create a plain JSON response.
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            callback: None,
        }
    }

    /// Create an `{"error": message}` response.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }

    /// Wrap the body in `callback` when one was requested.
    ///
    /// `None` and the empty string both mean plain JSON.
    pub fn with_callback(mut self, callback: Option<String>) -> Self {
        self.callback = callback.filter(|c| !c.is_empty());
        self
    }
}

impl IntoResponse for JsonpResponse {
    fn into_response(self) -> Response {
        let json = match serde_json::to_string(&self.body) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let Some(raw_callback) = self.callback else {
            return (
                self.status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                json,
            )
                .into_response();
        };

        let callback = sanitize_callback(&raw_callback);

        // Both separators are valid in JSON strings but end a JavaScript line
        let json = json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029");

        let body = format!(
            "/**/ typeof {callback} === 'function' && {callback}({json});",
            callback = callback,
            json = json
        );

        (
            self.status,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(JSONP_CONTENT_TYPE),
                ),
                (
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ),
            ],
            body,
        )
            .into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
