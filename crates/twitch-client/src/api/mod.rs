//! Twitch Helix REST API client.
//!
//! Provides typed access to the Helix endpoints the emote proxy needs,
//! with Bearer token + Client-ID header injection.

mod request;
mod users;

pub mod models;

use std::sync::RwLock;

pub use models::{HelixResponse, TwitchUser};

use crate::TwitchError;

const HELIX_BASE: &str = "https://api.twitch.tv/helix";

/// Twitch Helix API client with automatic auth header injection.
///
/// The bearer token is supplied from outside through
/// [`TwitchApiClient::update_access_token`] so token renewal stays
/// independent of the client's lifetime.
pub struct TwitchApiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) client_id: String,
    pub(crate) base_url: String,
    pub(crate) access_token: RwLock<String>,
}
