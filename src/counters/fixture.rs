//! Fixture-backed counting collaborator.
//!
//! [`StaticCounters`] answers from a table loaded at startup. It is what the
//! `share-counts` binary serves when no real network clients are wired in,
//! and it is handy for local development of pages that embed share counts.
//!
//! # Settings
//!
//! ```json
//! {
//!   "networks": ["facebook", "twitter", "googleplus"],
//!   "counts": {
//!     "https://example.com/": { "facebook": 10, "twitter": 5 }
//!   }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::{BuildCounters, Counters};
use crate::error::CounterError;
use crate::logger::{Logger, TracingLogger};

/// Networks supported when the settings do not list any.
pub const DEFAULT_NETWORKS: &[&str] = &["facebook", "twitter", "googleplus"];

fn default_networks() -> Vec<String> {
    DEFAULT_NETWORKS.iter().map(|n| n.to_string()).collect()
}

/// Settings object for [`StaticCounters`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaticCountersSettings {
    /// Supported network names
    #[serde(default = "default_networks")]
    pub networks: Vec<String>,

    /// Known counts, keyed by URL and then by network
    #[serde(default)]
    pub counts: HashMap<String, HashMap<String, u64>>,
}

impl Default for StaticCountersSettings {
    fn default() -> Self {
        Self {
            networks: default_networks(),
            counts: HashMap::new(),
        }
    }
}

/// Counting collaborator backed by a fixed table.
///
/// URLs or networks missing from the table count as 0.
pub struct StaticCounters {
    networks: HashSet<String>,
    counts: HashMap<String, HashMap<String, u64>>,
    logger: Arc<dyn Logger>,
}

impl StaticCounters {
    /// Create a collaborator from typed settings.
    pub fn new(settings: StaticCountersSettings, logger: Arc<dyn Logger>) -> Self {
        Self {
            networks: settings.networks.into_iter().collect(),
            counts: settings.counts,
            logger,
        }
    }

    /// Create a collaborator that knows the default networks and no counts.
    pub fn empty() -> Self {
        Self::new(StaticCountersSettings::default(), Arc::new(TracingLogger))
    }

    fn count_for(&self, url: &str, network: &str) -> u64 {
        self.counts
            .get(url)
            .and_then(|per_network| per_network.get(network))
            .copied()
            .unwrap_or(0)
    }
}

impl fmt::Debug for StaticCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCounters")
            .field("networks", &self.networks)
            .field("urls", &self.counts.len())
            .finish_non_exhaustive()
    }
}

/// Only absolute http(s) URLs can be counted.
fn check_url(url: &str) -> Result<(), CounterError> {
    let parsed = Url::parse(url).map_err(|e| CounterError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(CounterError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, scheme
        ))),
    }
}

#[async_trait]
impl Counters for StaticCounters {
    fn invalid_networks(&self, networks: &[String]) -> Vec<String> {
        networks
            .iter()
            .filter(|name| !self.networks.contains(name.as_str()))
            .cloned()
            .collect()
    }

    async fn retrieve_counts(&self, url: &str, networks: &[String]) -> Result<Value, CounterError> {
        if let Err(e) = check_url(url) {
            self.logger
                .error("StaticCounters::retrieve_counts", "check_url", &e);
            return Err(e);
        }

        let mut counts = Map::new();
        for network in networks {
            counts.insert(network.clone(), Value::from(self.count_for(url, network)));
        }

        Ok(Value::Object(counts))
    }
}

impl BuildCounters for StaticCounters {
    fn build(settings: &Value, logger: Arc<dyn Logger>) -> Result<Self, CounterError> {
        let settings = StaticCountersSettings::deserialize(settings)
            .map_err(|e| CounterError::InvalidSettings(e.to_string()))?;
        Ok(Self::new(settings, logger))
    }
}

// =============================================================================
// Tests
// =============================================================================
