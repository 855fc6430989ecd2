//! # Share Counts
//!
//! An embeddable Axum router that answers "how many likes, shares and the
//! like does this URL have?".
//!
//! The router validates the request, asks a counting collaborator for the
//! numbers, and answers with a single JSON (or JSONP) document carrying a
//! `Cache-Control` header, so a CDN in front of it can absorb repeat
//! traffic. The counting itself is delegated to a [`Counters`]
//! implementation supplied by the host.
//!
//! ## Features
//!
//! - **Strict validation**: missing networks, unknown networks and missing URLs are
//!   rejected with `422` and an actionable message
//! - **Referrer fallback**: without `url`, the `Referer` header is counted
//! - **JSONP**: `callback=fn` wraps every response for script-tag consumption
//! - **CDN friendly**: `Cache-Control: max-age=<httpCacheTime>` on every count response
//! - **Opaque failures**: collaborator errors are logged server-side and answered with a
//!   generic `500`
//!
//! ## Architecture
//!
//! - [`options`] - Construction options and the resolved configuration
//! - [`counters`] - Counting collaborator trait and the fixture-backed implementation
//! - [`server`] - Handlers, JSONP writer and router construction
//! - [`logger`] - Failure logging capability
//! - [`config`] - CLI configuration for the host binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use share_counts::{Options, ShareCounts, StaticCounters};
//!
//! #[tokio::main]
//! async fn main() {
//!     let share_counts = ShareCounts::new(Options::new(), Arc::new(StaticCounters::empty()));
//!
//!     let app = axum::Router::new().nest("/counts", share_counts.router());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod config;
pub mod counters;
pub mod error;
pub mod logger;
pub mod options;
pub mod server;

// Re-export commonly used types
pub use config::ServeConfig;
pub use counters::{BuildCounters, Counters, StaticCounters, StaticCountersSettings};
pub use error::{CounterError, RequestError};
pub use logger::{Logger, TracingLogger};
pub use options::{deep_merge, Config, Options, RouterOptions, DEFAULT_HTTP_CACHE_TIME};
pub use server::{create_router, health_handler, JsonpResponse, ShareCounts};
