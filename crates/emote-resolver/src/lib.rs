//! Username → channel emote resolution with two-level cache-aside.
//!
//! `user:<login>` maps a lowercased login to its broadcaster id and is
//! kept forever. `emotes:<broadcaster_id>` holds the serialized emote map
//! and expires after the configured TTL.

mod error;
mod model;
mod resolver;
#[cfg(test)]
mod tests;

pub use error::ResolveError;
pub use model::{EmoteEntry, EmoteMap, NamedEmote, fold_emotes};
pub use resolver::{DEFAULT_EMOTE_TTL, EmoteResolver, emotes_key, user_key};
