use pulse_core::{EnvValues, FeedbackService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Pulse application
///
/// Loads `.env`, resolves the core configuration, then runs the REST server together with the
/// periodic dashboard refresher until Ctrl-C.
///
/// # Environment Variables
/// - `PULSE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PULSE_DATA_DIR`: Directory holding `feedback.jsonl` (default: "data")
/// - `PULSE_TEMPLATE_DIR`: Directory of extra YAML survey templates (optional)
/// - `PULSE_TARGET_LANGUAGE`: Language free text is classified in (default: "en")
/// - `PULSE_REFRESH_SECS`: Dashboard refresh interval in seconds (default: 10)
/// - `PULSE_TRANSLATE_URL`: LibreTranslate-compatible translation service (optional)
///
/// # Returns
/// * `Ok(())` - If the server runs and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulse_run=info".parse()?)
                .add_directive("pulse_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PULSE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = EnvValues::from_process_env().resolve()?;
    tracing::info!(
        "++ Starting Pulse REST on {} (data dir {}, refresh every {:?})",
        rest_addr,
        cfg.data_dir().display(),
        cfg.refresh_interval()
    );

    let service = FeedbackService::from_config(&cfg)?;
    api_rest::serve(service, &rest_addr, cfg.refresh_interval()).await
}
