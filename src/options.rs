//! Construction-time options for the share count router.
//!
//! Callers pass a partial [`Options`] value; [`Config::from_options`] merges
//! it over the built-in defaults and produces the immutable [`Config`] the
//! router runs with.
//!
//! # Example
//!
//! ```
//! use share_counts::options::{Config, Options};
//!
//! let options: Options = serde_json::from_str(
//!     r#"{ "httpCacheTime": 60, "routerOptions": { "strict": false } }"#,
//! ).unwrap();
//!
//! let config = Config::from_options(options);
//! assert_eq!(config.http_cache_time, 60);
//! assert!(config.router_options.case_sensitive);
//! assert!(!config.router_options.strict);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logger::{Logger, TracingLogger};

// =============================================================================
// Default Values
// =============================================================================

/// Default HTTP cache lifetime in seconds (4 minutes).
pub const DEFAULT_HTTP_CACHE_TIME: u32 = 4 * 60;

// =============================================================================
// Router Options
// =============================================================================

/// Path matching behavior of the share count router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterOptions {
    /// Whether `/Foo` and `/foo` are different paths
    pub case_sensitive: bool,

    /// Whether `/foo/` and `/foo` are different paths
    pub strict: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            strict: true,
        }
    }
}

/// Partial [`RouterOptions`]; omitted fields keep their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterOptionsPatch {
    pub case_sensitive: Option<bool>,
    pub strict: Option<bool>,
}

impl RouterOptionsPatch {
    fn apply(&self, base: RouterOptions) -> RouterOptions {
        RouterOptions {
            case_sensitive: self.case_sensitive.unwrap_or(base.case_sensitive),
            strict: self.strict.unwrap_or(base.strict),
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Caller-supplied options. Every field is optional.
///
/// The plain-data fields deserialize from camelCase JSON. Loggers are
/// capabilities and can only be set in code.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Cache-Control max-age in seconds
    pub http_cache_time: Option<u32>,

    /// Path matching behavior
    pub router_options: Option<RouterOptionsPatch>,

    /// Settings object handed to the counting collaborator's constructor
    pub counters: Option<Value>,

    /// Sink for server-side failures
    #[serde(skip)]
    pub logger: Option<Arc<dyn Logger>>,

    /// Sink handed to the counting collaborator (defaults to `logger`)
    #[serde(skip)]
    pub counters_logger: Option<Arc<dyn Logger>>,
}

impl Options {
    /// Create empty options (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_http_cache_time(mut self, seconds: u32) -> Self {
        self.http_cache_time = Some(seconds);
        self
    }

    /// Set both router options.
    pub fn with_router_options(mut self, router_options: RouterOptions) -> Self {
        self.router_options = Some(RouterOptionsPatch {
            case_sensitive: Some(router_options.case_sensitive),
            strict: Some(router_options.strict),
        });
        self
    }

    /// Set the collaborator settings object.
    pub fn with_counters(mut self, counters: Value) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Set the failure logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the logger handed to the collaborator.
    pub fn with_counters_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.counters_logger = Some(logger);
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("http_cache_time", &self.http_cache_time)
            .field("router_options", &self.router_options)
            .field("counters", &self.counters)
            .field("logger", &self.logger.is_some())
            .field("counters_logger", &self.counters_logger.is_some())
            .finish()
    }
}

// =============================================================================
// Config
// =============================================================================

/// Resolved, immutable configuration of one router instance.
#[derive(Clone)]
pub struct Config {
    /// Cache-Control max-age in seconds
    pub http_cache_time: u32,

    /// Path matching behavior
    pub router_options: RouterOptions,

    /// Settings object handed to the counting collaborator's constructor
    pub counters: Value,

    /// Sink for server-side failures
    pub logger: Arc<dyn Logger>,

    /// Sink handed to the counting collaborator
    pub counters_logger: Arc<dyn Logger>,
}

impl Config {
    /// Merge `options` over the built-in defaults.
    ///
    /// Plain data is merged structurally (the `counters` object deeply).
    /// Loggers are taken by reference after the merge: the collaborator's
    /// logger falls back to the router's logger, which falls back to
    /// [`TracingLogger`].
    pub fn from_options(options: Options) -> Self {
        let defaults = Config::default();

        let router_options = options
            .router_options
            .map(|patch| patch.apply(defaults.router_options))
            .unwrap_or(defaults.router_options);

        let counters = match &options.counters {
            Some(overlay) => deep_merge(&defaults.counters, overlay),
            None => defaults.counters,
        };

        let logger = options.logger.unwrap_or(defaults.logger);
        let counters_logger = options
            .counters_logger
            .unwrap_or_else(|| Arc::clone(&logger));

        Self {
            http_cache_time: options
                .http_cache_time
                .unwrap_or(defaults.http_cache_time),
            router_options,
            counters,
            logger,
            counters_logger,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
        Self {
            http_cache_time: DEFAULT_HTTP_CACHE_TIME,
            router_options: RouterOptions::default(),
            counters: Value::Object(Map::new()),
            counters_logger: Arc::clone(&logger),
            logger,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("http_cache_time", &self.http_cache_time)
            .field("router_options", &self.router_options)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Deep Merge
// =============================================================================

/// Deep-merge `overlay` over `base` without touching either.
///
/// Objects merge key by key, recursively. Any other overlay value (arrays
/// included) replaces the base value.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                let next = match base_map.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

// =============================================================================
// Tests
// =============================================================================
