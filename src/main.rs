//! Share Counts - standalone host for the share count router.
//!
//! Mounts the router at the configured path, answers counts from a JSON
//! fixture, and serves until interrupted.

use std::process::ExitCode;

use axum::{routing::get, Router};
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use share_counts::server::CachePolicy;
use share_counts::{health_handler, Config, ServeConfig, ShareCounts, StaticCounters};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServeConfig::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = match config.load_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let share_counts = match ShareCounts::build::<StaticCounters>(options) {
        Ok(share_counts) => share_counts,
        Err(e) => {
            error!("Failed to create counters: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log_configuration(&config, share_counts.config());

    let app = build_app(&config, &share_counts);

    let addr = config.bind_address();
    info!("Server listening on: http://{}", addr);
    info!(
        "  Try: curl 'http://{}{}?networks=facebook,twitter&url=https://example.com/'",
        addr,
        if config.mounted_at_root() {
            ""
        } else {
            config.mount_path.as_str()
        }
    );

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
///
/// Output goes to stderr, which is also where collaborator failures end up
/// through the default logger.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "share_counts=debug,tower_http=debug"
    } else {
        "share_counts=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn log_configuration(config: &ServeConfig, resolved: &Config) {
    info!("Configuration:");
    info!("  Mount path: {}", config.mount_path);
    info!(
        "  Cache-Control: {}",
        CachePolicy::new(resolved.http_cache_time).header_value()
    );
    info!(
        "  Router: case_sensitive={}, strict={}",
        resolved.router_options.case_sensitive, resolved.router_options.strict
    );
    match &config.counts_file {
        Some(path) => info!("  Counts fixture: {}", path.display()),
        None => info!("  Counts fixture: none (all counts are 0)"),
    }
}

/// Mount the share count router next to a health endpoint.
fn build_app(config: &ServeConfig, share_counts: &ShareCounts) -> Router {
    let host = Router::new().route("/health", get(health_handler));

    let app = share_counts.nest_into(host, &config.mount_path);

    if config.no_tracing {
        app
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}
