//! MediaWiki Action API client.
//!
//! Authentication is a two-step exchange: fetch a login token, then post the
//! credentials with it. The session cookie lands in the client's cookie store,
//! so [`WikiClient::login`] consumes the anonymous client and hands back a
//! [`WikiSession`], the only value that can query the recent changes feed.
//!
//! ```no_run
//! use rc_digest::wiki::WikiClient;
//! use rc_digest::schedule::previous_week;
//!
//! # async fn demo() -> rc_digest::Result<()> {
//! let client = WikiClient::new("https://wiki.example.org/w/api.php")?;
//! let token = client.fetch_login_token().await?;
//! let session = client.login(&token, "ReportBot", "secret").await?;
//!
//! let window = previous_week(chrono::Utc::now().date_naive());
//! let changes = session
//!     .fetch_recent_changes(window.newer_bound(), window.older_bound())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod recent_changes;

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// User agent sent with every wiki request
const USER_AGENT: &str = concat!("rc-digest/", env!("CARGO_PKG_VERSION"));

/// Anonymous client for a wiki's `api.php` endpoint
pub struct WikiClient {
    /// HTTP client holding the cookie jar
    http_client: reqwest::Client,

    /// Full URL of `api.php`
    api_url: String,
}

impl WikiClient {
    /// Create a client for the given `api.php` URL
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into(),
        })
    }

    /// The `api.php` URL this client talks to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Authenticated wiki session
///
/// Carries the logged-in cookie jar. Obtained from [`WikiClient::login`].
pub struct WikiSession {
    http_client: reqwest::Client,
    api_url: String,
    username: String,
}

impl WikiSession {
    /// Account this session is logged in as
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The `api.php` URL this session talks to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// GET `api.php` with query parameters and return the decoded JSON body
async fn get_json<Q>(
    http_client: &reqwest::Client,
    api_url: &str,
    params: &Q,
    context: &str,
) -> Result<Value>
where
    Q: Serialize + ?Sized,
{
    debug!(context, "GET {}", api_url);
    let response = http_client
        .get(api_url)
        .query(params)
        .send()
        .await?
        .error_for_status()?;

    decode_body(response, context).await
}

/// POST form parameters to `api.php` and return the decoded JSON body
async fn post_json<F>(
    http_client: &reqwest::Client,
    api_url: &str,
    form: &F,
    context: &str,
) -> Result<Value>
where
    F: Serialize + ?Sized,
{
    debug!(context, "POST {}", api_url);
    let response = http_client
        .post(api_url)
        .form(form)
        .send()
        .await?
        .error_for_status()?;

    decode_body(response, context).await
}

/// Parse a response body as JSON and surface API-level errors
///
/// The Action API reports failures with HTTP 200 and an `error` object.
async fn decode_body(response: reqwest::Response, context: &str) -> Result<Value> {
    let body = response.text().await?;
    let value: Value = serde_json::from_str(&body)
        .map_err(|e| Error::response_shape(context, format!("invalid JSON: {e}")))?;

    if let Some(api_error) = value.get("error") {
        let code = api_error
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let info = api_error
            .get("info")
            .and_then(Value::as_str)
            .unwrap_or("no details");
        return Err(Error::response_shape(
            context,
            format!("API error {code}: {info}"),
        ));
    }

    Ok(value)
}

/// Render a JSON scalar as a request parameter value
fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests;
