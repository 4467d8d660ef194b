use std::error::Error;

use ai_llm_service::telemetry;
use tracing::Level;
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file.
    // A missing .env is fine: every setting also has an env/default path.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("no .env loaded: {e}");
    }

    let filter = telemetry::env_filter_with_level("info,api=info,request_log=info", Level::INFO);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| {
                    !meta.target().starts_with(telemetry::TARGET_PREFIX)
                })),
        )
        .with(telemetry::layer())
        .init();

    api::start().await?;

    Ok(())
}
