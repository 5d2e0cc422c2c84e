//! App access token management for Twitch.
//!
//! Obtains an application-scoped token through the client credentials
//! grant and keeps it until shortly before it expires.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::TwitchError;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Default safety buffer subtracted from the declared token lifetime.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Twitch OAuth token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// An app access token and the instant it stops being handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AppToken {
    /// Build a token issued at `issued_at` that lives `expires_in` seconds,
    /// minus the refresh margin. Returns `None` when the lifetime does not
    /// fit a timestamp.
    pub fn issued(
        access_token: String,
        expires_in: i64,
        refresh_margin: TimeDelta,
        issued_at: DateTime<Utc>,
    ) -> Option<Self> {
        let lifetime = expires_in
            .checked_mul(1000)
            .and_then(TimeDelta::try_milliseconds)?;
        let expires_at = issued_at
            .checked_add_signed(lifetime)?
            .checked_sub_signed(refresh_margin)?;
        Some(Self {
            access_token,
            expires_at,
        })
    }

    /// Whether the token may still be used at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Holds a single app access token and renews it lazily.
///
/// Two callers that observe an expired token at the same time will both
/// hit the token endpoint; the last response wins. The exchange is
/// stateless so this only costs a redundant request.
pub struct AppTokenProvider {
    client_id: String,
    client_secret: String,
    token_url: String,
    refresh_margin: TimeDelta,
    http: reqwest::Client,
    current: RwLock<Option<AppToken>>,
}

impl AppTokenProvider {
    /// Create a provider for the given app credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            token_url: TOKEN_URL.to_string(),
            refresh_margin: to_time_delta(DEFAULT_REFRESH_MARGIN),
            http: reqwest::Client::new(),
            current: RwLock::new(None),
        }
    }

    /// Point the provider at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = to_time_delta(margin);
        self
    }

    /// Snapshot of the held token, if any.
    pub fn current_token(&self) -> Option<AppToken> {
        self.read().clone()
    }

    /// Get a valid access token, requesting a new one if the held token
    /// is missing or expired.
    pub async fn get_token(&self) -> Result<String, TwitchError> {
        let cached = self
            .read()
            .as_ref()
            .filter(|t| t.is_valid_at(Utc::now()))
            .map(|t| t.access_token.clone());
        if let Some(token) = cached {
            return Ok(token);
        }

        let token = self.request_token().await?;
        let value = token.access_token.clone();
        *self.write() = Some(token);
        Ok(value)
    }

    /// Perform the client credentials exchange.
    async fn request_token(&self) -> Result<AppToken, TwitchError> {
        tracing::debug!("Requesting Twitch app access token");

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        self.parse_token_response(resp).await
    }

    /// Parse the token endpoint response into an `AppToken`.
    async fn parse_token_response(&self, resp: reqwest::Response) -> Result<AppToken, TwitchError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(TwitchError::AuthFailed {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let body = resp.text().await?;
        let token_resp: TokenResponse = serde_json::from_str(&body)?;

        tracing::debug!(expires_in = token_resp.expires_in, "App access token issued");

        AppToken::issued(
            token_resp.access_token,
            token_resp.expires_in,
            self.refresh_margin,
            Utc::now(),
        )
        .ok_or_else(|| {
            TwitchError::Json(serde::de::Error::custom(format!(
                "expires_in out of range: {}",
                token_resp.expires_in
            )))
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<AppToken>> {
        match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<AppToken>> {
        match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
