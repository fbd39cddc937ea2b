//! Greetgate: a readiness-gated greeting microservice.
//!
//! This is the application entry point. It initializes tracing, loads
//! configuration from a TOML file, waits for the cluster coordinator to
//! become ready, opens the coordinator session, builds the route table,
//! and serves HTTP until a termination signal arrives.
//!
//! Any failure along the way is logged once at error severity and the
//! process exits non-zero; restarts are the supervisor's job.

mod config;
mod coordinator;
mod error;
mod http;
mod middleware;
mod routes;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER, DEFAULT_LOG_FORMAT};
use coordinator::CoordinatorClient;
use error::BootstrapError;
use routes::create_router;

/// Greetgate: a readiness-gated greeting microservice
#[derive(Parser, Debug)]
#[command(name = "greetgate", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "greetgate=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

/// Initialize tracing exactly once, at process entry.
///
/// All output goes to standard error. The filter priority is CLI > RUST_LOG
/// > built-in default; the format ("text" or "json") comes from config.
fn init_tracing(filter: &str, format: &str) {
    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(filter));

    if format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    // Config errors surface before the configured format is known, so fall
    // back to the default format for reporting them.
    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(error) => {
            init_tracing(&log_filter, DEFAULT_LOG_FORMAT);
            tracing::error!(%error, "Error in bootstrap");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&log_filter, &config.logging.format);
    tracing::info!("Loaded configuration");

    if let Err(error) = run(config).await {
        tracing::error!(%error, "Error in bootstrap");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Drive the bootstrap: WAITING -> CONNECTING -> SERVING.
async fn run(config: AppConfig) -> Result<(), BootstrapError> {
    tracing::info!(
        http = %config.http.addr(),
        coordinator = %config.coordinator.addr(),
        probe = config.coordinator.probe,
        "Configured endpoints"
    );

    // The gate always completes fully before the connect attempt.
    CoordinatorClient::wait_until_ready(&config.coordinator).await?;
    tracing::debug!("Startup gate complete");

    // Held for the life of the process to keep the session open.
    let _coordinator = CoordinatorClient::connect(&config.coordinator).await?;
    tracing::debug!("Coordinator initialized");

    let app = create_router();
    tracing::debug!("Route table built");

    http::start_server(app, &config.http).await?;

    Ok(())
}
