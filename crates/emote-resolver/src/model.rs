use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use twitch_client::Emote;

/// Emote name → emote, as served to clients and stored in the cache.
pub type EmoteMap = BTreeMap<String, EmoteEntry>;

/// An emote id with its image URL per size label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteEntry {
    pub id: String,
    pub sizes: BTreeMap<String, String>,
}

/// A single emote looked up by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEmote {
    pub name: String,
    pub id: String,
    pub sizes: BTreeMap<String, String>,
}

impl From<&Emote> for EmoteEntry {
    fn from(emote: &Emote) -> Self {
        let sizes = emote
            .images
            .sizes()
            .into_iter()
            .map(|(label, url)| (label.to_string(), url.to_string()))
            .collect();
        Self {
            id: emote.id.clone(),
            sizes,
        }
    }
}

/// Fold the upstream emote list into a name-keyed map.
///
/// Names are not guaranteed unique upstream; a later entry replaces an
/// earlier one with the same name.
pub fn fold_emotes(emotes: &[Emote]) -> EmoteMap {
    let mut map = EmoteMap::new();
    for emote in emotes {
        map.insert(emote.name.clone(), EmoteEntry::from(emote));
    }
    map
}
