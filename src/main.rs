use anyhow::Result;

use ambiental::{AmbientalConfig, api::AppState, source, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AmbientalConfig::load()?;
    let _telemetry = telemetry::init(&config.logging, &config.telemetry)?;

    tracing::info!(
        version = ambiental::VERSION,
        strategy = ?config.data.strategy,
        fallback = ?config.data.fallback,
        "Starting ambiental"
    );

    let source = source::build(&config)?;
    let state = AppState::new(source, config.defaults.clone());
    web::run(state, &config.server).await
}
