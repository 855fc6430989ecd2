//! Counting collaborator interface.
//!
//! The share count router never talks to social networks itself. It asks a
//! [`Counters`] implementation which networks it knows and how many
//! interactions a URL has on each of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          ShareCounts router             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            Counters Trait               │
//! │  invalid_networks() / retrieve_counts() │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │ StaticCounters  │    │  your implementation│
//! │ (JSON fixture)  │    │  (network clients)  │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use share_counts::counters::Counters;
//!
//! struct MyCounters { /* ... */ }
//!
//! #[async_trait]
//! impl Counters for MyCounters {
//!     fn invalid_networks(&self, networks: &[String]) -> Vec<String> {
//!         // Return the names this implementation does not support
//!     }
//!
//!     async fn retrieve_counts(&self, url: &str, networks: &[String]) -> Result<Value, CounterError> {
//!         // Fetch counts for each network
//!     }
//! }
//! ```

mod fixture;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CounterError;
use crate::logger::Logger;

pub use fixture::{StaticCounters, StaticCountersSettings, DEFAULT_NETWORKS};

// =============================================================================
// Counters Trait
// =============================================================================

/// A counting engine that can report interaction counts per network.
///
/// Implementations are shared across concurrent requests, so they must be
/// `Send + Sync` and safe to call from many tasks at once.
#[async_trait]
pub trait Counters: Send + Sync {
    /// Return the requested names that are not supported networks.
    ///
    /// Order follows `networks`; an empty result means every name is valid.
    fn invalid_networks(&self, networks: &[String]) -> Vec<String>;

    /// Retrieve counts for `url` on each of `networks`.
    ///
    /// The returned value is sent to the client unmodified.
    async fn retrieve_counts(&self, url: &str, networks: &[String]) -> Result<Value, CounterError>;
}

/// A [`Counters`] implementation that can be built from a settings object.
///
/// The share count router uses this to construct its own collaborator from
/// the `counters` field of its options.
pub trait BuildCounters: Counters + Sized + 'static {
    /// Build the collaborator from its settings object and logger.
    fn build(settings: &Value, logger: Arc<dyn Logger>) -> Result<Self, CounterError>;
}
