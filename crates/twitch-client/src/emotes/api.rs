use serde::Deserialize;

use super::*;
use crate::TwitchError;
use crate::api::TwitchApiClient;

/// Helix response wrapper for emotes.
#[derive(Debug, Deserialize)]
pub(super) struct EmoteResponse {
    pub(super) data: Vec<Emote>,
}

impl TwitchApiClient {
    /// Fetch channel-specific emotes from Twitch.
    pub async fn get_channel_emotes(&self, broadcaster_id: &str) -> Result<Vec<Emote>, TwitchError> {
        let url = self.endpoint("chat/emotes", &[("broadcaster_id", broadcaster_id)])?;
        let body = self.authenticated_get(url).await?;
        let resp: EmoteResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            count = resp.data.len(),
            broadcaster_id,
            "Fetched channel emotes"
        );
        Ok(resp.data)
    }
}
