pub mod app;
pub mod config;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use emote_resolver::EmoteResolver;
use twitch_client::AppTokenProvider;
use twitch_client::api::TwitchApiClient;

use app::SharedState;
use config::AppConfig;

/// Load .env from the first candidate path that exists.
///
/// Returns the path that was loaded. Runs before tracing is set up, so
/// the caller logs the outcome.
pub fn load_dotenv() -> Option<&'static str> {
    let candidates = [".env", "../.env"];
    candidates
        .into_iter()
        .find(|path| dotenvy::from_filename(path).is_ok())
}

/// Install the fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wire the cache store, token provider and Helix client into shared state.
pub async fn build_state(config: AppConfig) -> anyhow::Result<SharedState> {
    let store = emote_store::open(&config.redis_url)
        .await
        .context("Failed to open cache store")?;

    let tokens = AppTokenProvider::new(config.client_id.clone(), config.client_secret.clone())
        .with_refresh_margin(Duration::from_secs(config.token_refresh_margin_secs));
    let api = TwitchApiClient::new(config.client_id.clone());

    let resolver = EmoteResolver::new(store, Arc::new(tokens), Arc::new(api))
        .with_emote_ttl(Duration::from_secs(config.emote_cache_ttl_secs));

    Ok(SharedState::new(config, resolver))
}
