//! Twitch integration client library.
//!
//! Provides the app access token flow (client credentials) and a
//! Helix REST client for user lookup and channel emotes.

pub mod api;
pub mod auth;
pub mod emotes;

use async_trait::async_trait;

pub use auth::{AppToken, AppTokenProvider};
pub use emotes::{Emote, EmoteImages};

/// Unified error type for the twitch-client crate.
#[derive(Debug, thiserror::Error)]
pub enum TwitchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch access token (status {status}): {message}")]
    AuthFailed { status: u16, message: String },

    #[error("Twitch API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl TwitchError {
    /// Whether the upstream reported the requested entity as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TwitchError::NotFound(_))
    }
}

/// Source of app access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a token that is valid right now, refreshing it if needed.
    async fn access_token(&self) -> Result<String, TwitchError>;
}

/// The two Helix operations the emote proxy depends on.
#[async_trait]
pub trait EmoteUpstream: Send + Sync {
    /// Replace the bearer token used by subsequent calls.
    fn update_access_token(&self, token: &str);

    /// Resolve a login name to its broadcaster id.
    async fn resolve_broadcaster_id(&self, login: &str) -> Result<String, TwitchError>;

    /// List the channel emotes of a broadcaster, unmodified.
    async fn list_emotes(&self, broadcaster_id: &str) -> Result<Vec<Emote>, TwitchError>;
}

#[async_trait]
impl TokenSource for AppTokenProvider {
    async fn access_token(&self) -> Result<String, TwitchError> {
        self.get_token().await
    }
}

#[async_trait]
impl EmoteUpstream for api::TwitchApiClient {
    fn update_access_token(&self, token: &str) {
        api::TwitchApiClient::update_access_token(self, token);
    }

    async fn resolve_broadcaster_id(&self, login: &str) -> Result<String, TwitchError> {
        api::TwitchApiClient::resolve_broadcaster_id(self, login).await
    }

    async fn list_emotes(&self, broadcaster_id: &str) -> Result<Vec<Emote>, TwitchError> {
        self.get_channel_emotes(broadcaster_id).await
    }
}
