//! Command-line configuration for the `share-counts` binary.
//!
//! This module covers the host server only; the component's own options
//! live in [`crate::options`]. Settings come from:
//! - Command-line arguments via clap
//! - Environment variables with `SHARE_COUNTS_` prefix
//! - An optional JSON options file (same shape as [`Options`])
//!
//! # Environment Variables
//!
//! - `SHARE_COUNTS_HOST` - Server bind address (default: 0.0.0.0)
//! - `SHARE_COUNTS_PORT` - Server port (default: 3000)
//! - `SHARE_COUNTS_MOUNT_PATH` - Path the router is mounted at (default: /counts)
//! - `SHARE_COUNTS_HTTP_CACHE_TIME` - Cache-Control max-age in seconds (default: 240)
//! - `SHARE_COUNTS_OPTIONS_FILE` - JSON options file
//! - `SHARE_COUNTS_COUNTS_FILE` - JSON fixture for the bundled counters

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::{Map, Value};

use crate::options::{deep_merge, Options};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default mount path of the share count router.
pub const DEFAULT_MOUNT_PATH: &str = "/counts";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Share Counts - social share counts for any URL, as JSON or JSONP.
#[derive(Parser, Debug, Clone)]
#[command(name = "share-counts")]
#[command(author, version, about, long_about = None)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "SHARE_COUNTS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "SHARE_COUNTS_PORT")]
    pub port: u16,

    /// Path the share count router is mounted at.
    #[arg(long, default_value = DEFAULT_MOUNT_PATH, env = "SHARE_COUNTS_MOUNT_PATH")]
    pub mount_path: String,

    // =========================================================================
    // Component Configuration
    // =========================================================================
    /// JSON options file (httpCacheTime, routerOptions, counters).
    ///
    /// Command-line flags take precedence over values in the file.
    #[arg(long, env = "SHARE_COUNTS_OPTIONS_FILE")]
    pub options_file: Option<PathBuf>,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, env = "SHARE_COUNTS_HTTP_CACHE_TIME")]
    pub http_cache_time: Option<u32>,

    /// Match paths case-insensitively.
    #[arg(long, default_value_t = false)]
    pub case_insensitive: bool,

    /// Ignore trailing slashes when matching paths.
    #[arg(long, default_value_t = false)]
    pub non_strict: bool,

    /// JSON fixture with supported networks and known counts.
    #[arg(long, env = "SHARE_COUNTS_COUNTS_FILE")]
    pub counts_file: Option<PathBuf>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.mount_path.starts_with('/') {
            return Err(format!(
                "mount_path must start with '/' (got '{}')",
                self.mount_path
            ));
        }

        if self.mount_path.len() > 1 && self.mount_path.ends_with('/') {
            return Err(format!(
                "mount_path must not end with '/' (got '{}')",
                self.mount_path
            ));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the router is mounted at the root of the host.
    pub fn mounted_at_root(&self) -> bool {
        self.mount_path == "/"
    }

    /// Build the component options from the options file and the flags.
    pub fn load_options(&self) -> Result<Options, String> {
        let mut options = match &self.options_file {
            Some(path) => {
                let contents = read_file(path)?;
                serde_json::from_str::<Options>(&contents)
                    .map_err(|e| format!("Invalid options file {}: {}", path.display(), e))?
            }
            None => Options::new(),
        };

        if let Some(seconds) = self.http_cache_time {
            options.http_cache_time = Some(seconds);
        }

        if self.case_insensitive || self.non_strict {
            let mut patch = options.router_options.unwrap_or_default();
            if self.case_insensitive {
                patch.case_sensitive = Some(false);
            }
            if self.non_strict {
                patch.strict = Some(false);
            }
            options.router_options = Some(patch);
        }

        if let Some(path) = &self.counts_file {
            let contents = read_file(path)?;
            let fixture: Value = serde_json::from_str(&contents)
                .map_err(|e| format!("Invalid counts file {}: {}", path.display(), e))?;

            let base = options
                .counters
                .take()
                .unwrap_or_else(|| Value::Object(Map::new()));
            options.counters = Some(deep_merge(&base, &fixture));
        }

        Ok(options)
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

// =============================================================================
// Tests
// =============================================================================
