//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server and the dashboard refresher on their own.
//!
//! ## Intended use
//! This binary is useful for development and debugging against a single data directory. The
//! workspace's main `pulse-run` binary does the same with a wider log filter.

use pulse_core::{EnvValues, FeedbackService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Pulse REST API server
///
/// Variables from a `.env` file in the working directory are loaded first, if one exists.
///
/// # Environment Variables
/// - `PULSE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `PULSE_DATA_DIR`, `PULSE_TEMPLATE_DIR`, `PULSE_TARGET_LANGUAGE`, `PULSE_REFRESH_SECS`,
///   `PULSE_TRANSLATE_URL`: core configuration
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the core configuration is invalid or the feedback store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("pulse_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PULSE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting Pulse REST API on {}", addr);

    let cfg = EnvValues::from_process_env().resolve()?;
    let service = FeedbackService::from_config(&cfg)?;

    api_rest::serve(service, &addr, cfg.refresh_interval()).await
}
