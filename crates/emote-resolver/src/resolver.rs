use std::sync::Arc;
use std::time::Duration;

use emote_store::CacheStore;
use twitch_client::{EmoteUpstream, TokenSource, TwitchError};

use crate::error::ResolveError;
use crate::model::{EmoteMap, NamedEmote, fold_emotes};

/// How long a channel's emote set is served from cache.
pub const DEFAULT_EMOTE_TTL: Duration = Duration::from_secs(3600);

/// Cache key for a login → broadcaster id entry.
pub fn user_key(login: &str) -> String {
    format!("user:{login}")
}

/// Cache key for a broadcaster's emote set.
pub fn emotes_key(broadcaster_id: &str) -> String {
    format!("emotes:{broadcaster_id}")
}

/// Resolves usernames to channel emotes through the cache store,
/// falling back to Helix on a miss.
///
/// Concurrent misses for the same user are not coalesced; each one calls
/// upstream and rewrites the same keys with the same values.
pub struct EmoteResolver {
    store: Arc<dyn CacheStore>,
    tokens: Arc<dyn TokenSource>,
    upstream: Arc<dyn EmoteUpstream>,
    emote_ttl: Duration,
}

impl EmoteResolver {
    pub fn new(
        store: Arc<dyn CacheStore>,
        tokens: Arc<dyn TokenSource>,
        upstream: Arc<dyn EmoteUpstream>,
    ) -> Self {
        Self {
            store,
            tokens,
            upstream,
            emote_ttl: DEFAULT_EMOTE_TTL,
        }
    }

    pub fn with_emote_ttl(mut self, ttl: Duration) -> Self {
        self.emote_ttl = ttl;
        self
    }

    /// Resolve a username (any case) to its channel emotes keyed by name.
    pub async fn resolve(&self, username: &str) -> Result<EmoteMap, ResolveError> {
        let login = username.to_lowercase();
        let broadcaster_id = self.broadcaster_id(&login).await?;
        self.emote_set(&broadcaster_id).await
    }

    /// Emotes of a user's channel, as served by `GET /{user}`.
    pub async fn get_emotes_for_user(&self, username: &str) -> Result<EmoteMap, ResolveError> {
        self.resolve(username).await
    }

    /// Look up one emote of a user's channel by name, ignoring case.
    pub async fn get_emote_by_name(
        &self,
        username: &str,
        emote_name: &str,
    ) -> Result<NamedEmote, ResolveError> {
        let emotes = self.resolve(username).await?;
        let wanted = emote_name.to_lowercase();

        emotes
            .into_iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(name, entry)| NamedEmote {
                name,
                id: entry.id,
                sizes: entry.sizes,
            })
            .ok_or_else(|| ResolveError::EmoteNotFound(emote_name.to_string()))
    }

    async fn broadcaster_id(&self, login: &str) -> Result<String, ResolveError> {
        let key = user_key(login);
        if let Some(id) = self.store.get(&key).await? {
            tracing::debug!(login, broadcaster_id = %id, "Broadcaster id cache hit");
            return Ok(id);
        }

        tracing::debug!(login, "Broadcaster id cache miss");
        let id = self
            .fetch_broadcaster_id(login)
            .await
            .map_err(|source| ResolveError::BroadcasterId {
                login: login.to_string(),
                source,
            })?;

        self.store.set(&key, &id).await?;
        Ok(id)
    }

    async fn emote_set(&self, broadcaster_id: &str) -> Result<EmoteMap, ResolveError> {
        let key = emotes_key(broadcaster_id);
        if let Some(cached) = self.store.get(&key).await? {
            tracing::debug!(broadcaster_id, "Emote set cache hit");
            return serde_json::from_str(&cached).map_err(|source| ResolveError::CorruptEntry {
                broadcaster_id: broadcaster_id.to_string(),
                source,
            });
        }

        tracing::debug!(broadcaster_id, "Emote set cache miss");
        let emotes = self
            .fetch_emotes(broadcaster_id)
            .await
            .map_err(|source| ResolveError::EmoteSet {
                broadcaster_id: broadcaster_id.to_string(),
                source,
            })?;

        let map = fold_emotes(&emotes);
        let serialized = serde_json::to_string(&map)?;
        self.store.set_ex(&key, &serialized, self.emote_ttl).await?;
        Ok(map)
    }

    async fn fetch_broadcaster_id(&self, login: &str) -> Result<String, TwitchError> {
        self.authorize().await?;
        self.upstream.resolve_broadcaster_id(login).await
    }

    async fn fetch_emotes(
        &self,
        broadcaster_id: &str,
    ) -> Result<Vec<twitch_client::Emote>, TwitchError> {
        self.authorize().await?;
        self.upstream.list_emotes(broadcaster_id).await
    }

    /// Hand a currently valid token to the upstream client.
    async fn authorize(&self) -> Result<(), TwitchError> {
        let token = self.tokens.access_token().await?;
        self.upstream.update_access_token(&token);
        Ok(())
    }
}
