//! Login token retrieval and credential exchange.

use super::{WikiClient, WikiSession, get_json, param_value, post_json};
use crate::error::{Error, Result};
use serde_json::Value;
use tracing::info;

impl WikiClient {
    /// Fetch a login token (`meta=tokens&type=login`)
    ///
    /// # Errors
    /// - [`Error::Transport`] if the request fails or returns a non-2xx status
    /// - [`Error::ResponseShape`] if the body is not JSON or is an API error
    /// - [`Error::Auth`] if the body has no `query.tokens.logintoken`
    pub async fn fetch_login_token(&self) -> Result<String> {
        let params = [
            ("action", "query"),
            ("meta", "tokens"),
            ("type", "login"),
            ("format", "json"),
        ];
        let data = get_json(
            &self.http_client,
            &self.api_url,
            &params,
            "login token query",
        )
        .await?;

        data.pointer("/query/tokens/logintoken")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Auth("login token missing from token query response".into()))
    }

    /// Exchange credentials for an authenticated session
    ///
    /// Consumes the anonymous client: the returned [`WikiSession`] owns the
    /// cookie jar the wiki just populated.
    ///
    /// # Errors
    /// - [`Error::Auth`] unless `login.result` is `Success`; the wiki's
    ///   `login.reason` is included when present
    /// - [`Error::Transport`] / [`Error::ResponseShape`] as for any API call
    pub async fn login(self, token: &str, username: &str, password: &str) -> Result<WikiSession> {
        let form = [
            ("action", "login"),
            ("lgname", username),
            ("lgpassword", password),
            ("lgtoken", token),
            ("format", "json"),
        ];
        let data = post_json(&self.http_client, &self.api_url, &form, "login").await?;

        let login = data
            .get("login")
            .ok_or_else(|| Error::Auth("login response has no `login` object".into()))?;
        let result = login
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Auth("login response has no `login.result`".into()))?;

        if result != "Success" {
            let reason = login
                .get("reason")
                .map(param_value)
                .unwrap_or_else(|| "No reason provided".to_string());
            return Err(Error::Auth(format!("login {result}: {reason}")));
        }

        info!("Logged in as {}", username);
        Ok(WikiSession {
            http_client: self.http_client,
            api_url: self.api_url,
            username: username.to_string(),
        })
    }
}
