//! HTTP layer of the share count component.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │              GET /?networks=...&url=...&callback=...            │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    jsonp    │  │        routes           │  │
//! │  │ (pipeline)  │  │  (writer)   │  │  (router, options)      │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod jsonp;
pub mod routes;

pub use handlers::{
    cache_control_middleware, count_handler, forbidden_handler, health_handler, AppState,
    CachePolicy, CountQueryParams, HealthResponse,
};
pub use jsonp::{sanitize_callback, JsonpResponse, JSONP_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use routes::{create_router, ShareCounts};
