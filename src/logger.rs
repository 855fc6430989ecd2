//! Error logging capability.
//!
//! The share count router reports collaborator failures through a [`Logger`]
//! rather than a global sink, so hosts can route them wherever they like and
//! tests can observe them. [`TracingLogger`] is the default and forwards to
//! `tracing`.

use std::error::Error;

/// Sink for server-side failures.
pub trait Logger: Send + Sync {
    /// Record a failure.
    ///
    /// # Arguments
    /// * `operation` - The operation that was running (e.g. `"count_handler"`)
    /// * `call` - The call that failed inside that operation
    /// * `error` - The underlying failure
    fn error(&self, operation: &str, call: &str, error: &(dyn Error + 'static));
}

/// Logger that emits `tracing` events at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, operation: &str, call: &str, error: &(dyn Error + 'static)) {
        tracing::error!(operation = operation, call = call, "{}", error);
    }
}
