//! Digest delivery through the Mailgun HTTP API.
//!
//! One synchronous POST per digest, no queuing and no retries. Delivery counts
//! as successful only when the provider answers HTTP 200.

use crate::config::MailConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// What the provider said about an accepted message
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider message id, e.g. `<20240114.1@mg.example.org>`
    #[serde(default)]
    pub id: Option<String>,

    /// Provider status text, e.g. "Queued. Thank you."
    #[serde(default)]
    pub message: Option<String>,
}

/// Sends HTML email via the provider's messages endpoint
pub struct Mailer {
    http_client: reqwest::Client,
    config: MailConfig,
}

impl Mailer {
    /// Create a mailer for the given provider settings
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: MailConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("rc-digest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Send one HTML message
    ///
    /// # Errors
    /// - [`Error::Config`] if the API key, sending domain, or sender address is
    ///   blank; nothing is sent in that case
    /// - [`Error::Transport`] if the request cannot be made
    /// - [`Error::Delivery`] for any status other than 200, carrying the body
    pub async fn send_email(
        &self,
        subject: &str,
        html_body: &str,
        recipient: &str,
    ) -> Result<DeliveryReceipt> {
        self.check_provider_settings()?;

        let url = self.config.messages_url();
        let form = [
            ("from", self.config.sender.as_str()),
            ("to", recipient),
            ("subject", subject),
            ("html", html_body),
        ];

        debug!(url = %url, to = recipient, bytes = html_body.len(), "Posting email");
        let response = self
            .http_client
            .post(&url)
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read provider response body"
                );
                String::new()
            }
        };
        if status != reqwest::StatusCode::OK {
            return Err(Error::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: DeliveryReceipt = serde_json::from_str(&body).unwrap_or_default();
        info!(to = recipient, id = ?receipt.id, "Email sent successfully");
        Ok(receipt)
    }

    fn check_provider_settings(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("MAILGUN_API_KEY", &self.config.api_key),
            ("MAILGUN_DOMAIN", &self.config.domain),
            ("SENDER_EMAIL", &self.config.sender),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::missing_config(missing))
        }
    }
}
