//! Twitch channel emotes.
//!
//! Fetches the emote roster of a broadcaster from the Helix API.

mod api;

use serde::{Deserialize, Serialize};

/// A single Twitch emote with image URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emote {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: EmoteImages,
}

/// Image URLs at different scales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EmoteImages {
    pub url_1x: String,
    pub url_2x: String,
    pub url_4x: String,
}

impl EmoteImages {
    /// Size label / URL pairs, smallest first.
    pub fn sizes(&self) -> [(&'static str, &str); 3] {
        [
            ("url_1x", self.url_1x.as_str()),
            ("url_2x", self.url_2x.as_str()),
            ("url_4x", self.url_4x.as_str()),
        ]
    }
}
