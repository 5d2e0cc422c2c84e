//! Runtime application configuration loaded from the environment.

use std::fmt;

use anyhow::{Context, bail};

use super::validation::validate_setting;

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_EMOTE_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_TOKEN_REFRESH_MARGIN_SECS: u64 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";

const REQUIRED_SETTINGS: &[&str] = &["TWITCH_CLIENT_ID", "TWITCH_CLIENT_SECRET"];

/// Runtime configuration for the proxy.
#[derive(Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redis_url: String,
    pub server_port: u16,
    pub emote_cache_ttl_secs: u64,
    pub token_refresh_margin_secs: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redis_url: DEFAULT_REDIS_URL.into(),
            server_port: DEFAULT_PORT,
            emote_cache_ttl_secs: DEFAULT_EMOTE_CACHE_TTL_SECS,
            token_refresh_margin_secs: DEFAULT_TOKEN_REFRESH_MARGIN_SECS,
            log_level: DEFAULT_LOG_LEVEL.into(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redis_url", &mask_url_password(&self.redis_url))
            .field("server_port", &self.server_port)
            .field("emote_cache_ttl_secs", &self.emote_cache_ttl_secs)
            .field("token_refresh_margin_secs", &self.token_refresh_margin_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> Result<Option<String>, anyhow::Error> {
            let Some(value) = lookup(key).filter(|v| !v.is_empty()) else {
                return Ok(None);
            };
            if let Err(msg) = validate_setting(key, &value) {
                bail!("Invalid {key}: {msg}");
            }
            Ok(Some(value))
        };

        let missing: Vec<&str> = REQUIRED_SETTINGS
            .iter()
            .copied()
            .filter(|&key| lookup(key).is_none_or(|v| v.trim().is_empty()))
            .collect();
        if !missing.is_empty() {
            bail!("Missing required settings: {}", missing.join(", "));
        }

        let defaults = Self::default();

        Ok(Self {
            client_id: g("TWITCH_CLIENT_ID")?.unwrap_or_default(),
            client_secret: g("TWITCH_CLIENT_SECRET")?.unwrap_or_default(),
            redis_url: g("REDIS_URL")?.unwrap_or(defaults.redis_url),
            server_port: parse_or(g("PORT")?, defaults.server_port)?,
            emote_cache_ttl_secs: parse_or(
                g("EMOTE_CACHE_TTL_SECS")?,
                defaults.emote_cache_ttl_secs,
            )?,
            token_refresh_margin_secs: parse_or(
                g("TOKEN_REFRESH_MARGIN_SECS")?,
                defaults.token_refresh_margin_secs,
            )?,
            log_level: g("LOG_LEVEL")?.unwrap_or(defaults.log_level),
        })
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v.parse().with_context(|| format!("failed to parse {v:?}")),
        None => Ok(default),
    }
}

fn mask_url_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((userinfo, host)) => {
            let user = userinfo.split_once(':').map_or(userinfo, |(user, _)| user);
            format!("{scheme}://{user}:***@{host}")
        }
        None => url.to_string(),
    }
}
