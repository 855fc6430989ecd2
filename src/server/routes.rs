//! Router construction for the share count component.
//!
//! # Route Structure
//!
//! ```text
//! GET /          - Share counts (Cache-Control: max-age=<httpCacheTime>)
//! *   /*         - 403 Forbidden
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{uri::PathAndQuery, Uri},
    middleware,
    routing::get,
    Router,
};
use tower::{Layer, ServiceExt};
use tower_http::normalize_path::NormalizePathLayer;

use super::handlers::{
    cache_control_middleware, count_handler, forbidden_handler, AppState, CachePolicy,
};
use crate::counters::{BuildCounters, Counters};
use crate::error::CounterError;
use crate::options::{Config, Options, RouterOptions};

// =============================================================================
// ShareCounts
// =============================================================================

/// A configured share count component.
///
/// Holds the resolved configuration and the router built from it. The
/// router is cheap to clone and can be mounted into any host application.
#[derive(Clone)]
pub struct ShareCounts {
    config: Arc<Config>,
    router: Router,
}

impl ShareCounts {
    /// Create the component around an existing collaborator.
    pub fn new(options: Options, counters: Arc<dyn Counters>) -> Self {
        Self::from_config(Config::from_options(options), counters)
    }

    /// Create the component and build its collaborator from `options.counters`.
    ///
    /// The collaborator receives the merged settings object and
    /// [`Config::counters_logger`].
    pub fn build<C: BuildCounters>(options: Options) -> Result<Self, CounterError> {
        let config = Config::from_options(options);
        let counters = C::build(&config.counters, Arc::clone(&config.counters_logger))?;
        Ok(Self::from_config(config, Arc::new(counters)))
    }

    /// Create the component from an already resolved configuration.
    pub fn from_config(config: Config, counters: Arc<dyn Counters>) -> Self {
        let config = Arc::new(config);
        let router = create_router(counters, Arc::clone(&config));
        Self { config, router }
    }

    /// The router to mount into the host application.
    ///
    /// Prefer [`ShareCounts::nest_into`] when mounting below a prefix:
    /// `Router::nest` alone does not route `<prefix>/` to the component.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Mount the component at `path` in `host`.
    ///
    /// Both `<path>` and `<path>/` reach the count route, and everything
    /// below `<path>/` reaches the forbidden fallback. A path of `/` (or
    /// empty) merges the component at the root of `host`.
    pub fn nest_into(&self, host: Router, path: &str) -> Router {
        let prefix = path.trim_end_matches('/');
        if prefix.is_empty() {
            return host.merge(self.router());
        }

        // Unlike `nest`, `nest_service` also claims `<prefix>/`
        host.nest_service(prefix, self.router())
    }

    /// The resolved configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Build the share count router.
///
/// The chain per request is: cache annotation, count handler, and a
/// forbidden fallback for everything the count route does not claim (other
/// methods on `/`, any other path).
pub fn create_router(counters: Arc<dyn Counters>, config: Arc<Config>) -> Router {
    let cache = CachePolicy::new(config.http_cache_time);
    let router_options = config.router_options;
    let state = AppState::new(counters, config);

    let count_route = get(count_handler)
        .route_layer(middleware::from_fn_with_state(
            cache,
            cache_control_middleware,
        ))
        .fallback(forbidden_handler);

    let router = Router::new()
        .route("/", count_route)
        .fallback(forbidden_handler)
        .with_state(state);

    apply_router_options(router, router_options)
}

/// Normalize request paths before routing when the options ask for it.
///
/// Axum matches paths case-sensitively and strictly, so the default options
/// leave the router untouched.
fn apply_router_options(router: Router, options: RouterOptions) -> Router {
    let router = if options.strict {
        router
    } else {
        Router::new().fallback_service(NormalizePathLayer::trim_trailing_slash().layer(router))
    };

    if options.case_sensitive {
        router
    } else {
        Router::new().fallback_service(ServiceExt::<Request>::map_request(router, fold_path_case))
    }
}

/// Lower-case the request path, keeping the query.
fn fold_path_case(request: Request) -> Request {
    let lowered = request.uri().path().to_lowercase();
    if lowered == request.uri().path() {
        return request;
    }
    with_path(request, &lowered)
}

fn with_path(mut request: Request, path: &str) -> Request {
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let Ok(path_and_query) = PathAndQuery::try_from(path_and_query) else {
        return request;
    };
    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);

    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }

    request
}

// =============================================================================
// Tests
// =============================================================================
