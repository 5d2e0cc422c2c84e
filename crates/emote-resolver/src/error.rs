use emote_store::StoreError;
use twitch_client::TwitchError;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to get broadcaster ID for {login}: {source}")]
    BroadcasterId {
        login: String,
        #[source]
        source: TwitchError,
    },

    #[error("Failed to get emotes for broadcaster {broadcaster_id}: {source}")]
    EmoteSet {
        broadcaster_id: String,
        #[source]
        source: TwitchError,
    },

    #[error("Emote not found: {0}")]
    EmoteNotFound(String),

    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cached emote set for broadcaster {broadcaster_id} is unreadable: {source}")]
    CorruptEntry {
        broadcaster_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize emote set: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ResolveError {
    /// The upstream failure behind a resolution error, if any.
    pub fn upstream(&self) -> Option<&TwitchError> {
        match self {
            ResolveError::BroadcasterId { source, .. } | ResolveError::EmoteSet { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// Whether the user or the requested emote does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::EmoteNotFound(_))
            || self.upstream().is_some_and(TwitchError::is_not_found)
    }
}
