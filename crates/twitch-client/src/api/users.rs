use super::*;

impl TwitchApiClient {
    /// Get user profile by login name.
    pub async fn get_user_by_login(&self, login: &str) -> Result<TwitchUser, TwitchError> {
        let url = self.endpoint("users", &[("login", login)])?;
        let body = self.authenticated_get(url).await?;
        let resp: HelixResponse<TwitchUser> = serde_json::from_str(&body)?;

        resp.data
            .into_iter()
            .next()
            .ok_or_else(|| TwitchError::NotFound(format!("User not found: {login}")))
    }

    /// Resolve a login name to the broadcaster id of that channel.
    pub async fn resolve_broadcaster_id(&self, login: &str) -> Result<String, TwitchError> {
        let user = self.get_user_by_login(login).await?;
        tracing::debug!(login, broadcaster_id = %user.id, "Resolved broadcaster id");
        Ok(user.id)
    }
}
