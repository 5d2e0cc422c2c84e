use std::sync::RwLock;

use reqwest::header::AUTHORIZATION;
use url::Url;

use super::*;

impl TwitchApiClient {
    pub fn new(client_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            base_url: HELIX_BASE.to_string(),
            access_token: RwLock::new(String::new()),
        }
    }

    /// Point the client at a different Helix base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the bearer token used for subsequent requests.
    pub fn update_access_token(&self, token: &str) {
        let mut guard = match self.access_token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = token.to_string();
    }

    fn bearer(&self) -> String {
        let guard = match self.access_token.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        format!("Bearer {}", *guard)
    }

    /// Build an endpoint URL under the Helix base with the given query.
    pub(crate) fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, TwitchError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    /// Execute a GET request with auth headers.
    pub(crate) async fn authenticated_get(&self, url: Url) -> Result<String, TwitchError> {
        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer())
            .header("Client-Id", &self.client_id)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let message = if body.is_empty() {
                reason.to_string()
            } else {
                format!("{reason}: {body}")
            };
            return Err(TwitchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
