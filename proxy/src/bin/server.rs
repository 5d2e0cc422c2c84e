//! Emote proxy server binary.
//!
//! Loads configuration, opens the cache store and serves the emote API
//! until Ctrl+C.

use emote_proxy::config::AppConfig;
use emote_proxy::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = emote_proxy::load_dotenv();
    let config = AppConfig::load()?;

    emote_proxy::init_tracing(&config.log_level);
    match dotenv_path {
        Some(path) => tracing::info!("Loaded .env from: {path}"),
        None => tracing::info!("No .env file found, using system environment variables"),
    }

    let state = emote_proxy::build_state(config).await?;
    server::start_server(state).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
