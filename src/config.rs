//! Configuration types for rc-digest
//!
//! Configuration is read once at startup from the process environment (and an
//! optional `.env` file) and passed by reference into every component.
//!
//! | Variable            | Required | Default                      |
//! |---------------------|----------|------------------------------|
//! | `MW_USERNAME`       | yes      | --                           |
//! | `MW_PASSWORD`       | yes      | --                           |
//! | `BASE_DOMAIN`       | yes      | --                           |
//! | `RECIPIENT_EMAIL`   | yes      | --                           |
//! | `MAILGUN_API_KEY`   | yes      | --                           |
//! | `MAILGUN_DOMAIN`    | yes      | --                           |
//! | `SENDER_EMAIL`      | yes      | --                           |
//! | `MAILGUN_API_BASE`  | no       | `https://api.mailgun.net/v3` |
//! | `WIKI_SCHEME`       | no       | `https`                      |
//! | `RC_DIGEST_DRY_RUN` | no       | `false`                      |

use crate::error::{Error, Result};
use std::fmt;

/// Default Mailgun API base URL (US region)
pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";

/// Default scheme used to reach the wiki
pub const DEFAULT_WIKI_SCHEME: &str = "https";

/// Wiki connection settings
#[derive(Clone)]
pub struct WikiConfig {
    /// Bot or user account name
    pub username: String,

    /// Account password (never logged)
    pub password: String,

    /// Wiki host, e.g. `wiki.example.org`
    pub domain: String,

    /// `http` or `https` (default: https)
    pub scheme: String,
}

impl WikiConfig {
    /// Site root, e.g. `https://wiki.example.org`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.domain)
    }

    /// Action API endpoint, e.g. `https://wiki.example.org/w/api.php`
    pub fn api_url(&self) -> String {
        format!("{}/w/api.php", self.base_url())
    }

    /// Short report title: the domain up to its first dot
    pub fn report_title(&self) -> &str {
        self.domain.split('.').next().unwrap_or(&self.domain)
    }
}

impl fmt::Debug for WikiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Mail provider settings
#[derive(Clone)]
pub struct MailConfig {
    /// Provider API key (never logged)
    pub api_key: String,

    /// Sending domain registered with the provider
    pub domain: String,

    /// `from` address
    pub sender: String,

    /// Digest recipient
    pub recipient: String,

    /// Provider API base URL (default: https://api.mailgun.net/v3)
    pub api_base: String,
}

impl MailConfig {
    /// Message submission endpoint for the sending domain
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.domain
        )
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &"<redacted>")
            .field("domain", &self.domain)
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Main configuration for a digest run
#[derive(Clone, Debug)]
pub struct Config {
    /// Wiki account and location
    pub wiki: WikiConfig,

    /// Mail provider and addressing
    pub mail: MailConfig,

    /// Render the digest but do not deliver it
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// variables already set in the environment take precedence.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming every required variable that is unset
    /// or blank, or describing an invalid value.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Blank values are treated as missing. Credentials (`MW_USERNAME`,
    /// `MW_PASSWORD`, `MAILGUN_API_KEY`) are kept exactly as given; every other
    /// value is trimmed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get = |key: &str| raw(key).map(|v| v.trim().to_string());

        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            raw(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let username = require("MW_USERNAME");
        let password = require("MW_PASSWORD");
        let domain = require("BASE_DOMAIN").trim().to_string();
        let recipient = require("RECIPIENT_EMAIL").trim().to_string();
        let api_key = require("MAILGUN_API_KEY");
        let mail_domain = require("MAILGUN_DOMAIN").trim().to_string();
        let sender = require("SENDER_EMAIL").trim().to_string();

        if !missing.is_empty() {
            return Err(Error::missing_config(missing));
        }

        let scheme = get("WIKI_SCHEME").unwrap_or_else(|| DEFAULT_WIKI_SCHEME.to_string());
        let api_base =
            get("MAILGUN_API_BASE").unwrap_or_else(|| DEFAULT_MAILGUN_API_BASE.to_string());
        let dry_run = match get("RC_DIGEST_DRY_RUN") {
            Some(v) => parse_bool("RC_DIGEST_DRY_RUN", &v)?,
            None => false,
        };

        let config = Self {
            wiki: WikiConfig {
                username,
                password,
                domain,
                scheme,
            },
            mail: MailConfig {
                api_key,
                domain: mail_domain,
                sender,
                recipient,
                api_base,
            },
            dry_run,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that are present but unusable
    pub fn validate(&self) -> Result<()> {
        if self.wiki.scheme != "http" && self.wiki.scheme != "https" {
            return Err(invalid("WIKI_SCHEME", "must be `http` or `https`"));
        }

        let parsed = url::Url::parse(&self.wiki.base_url())
            .map_err(|e| invalid("BASE_DOMAIN", &format!("not a valid host: {e}")))?;
        if parsed.host_str().is_none() || parsed.path() != "/" || self.wiki.domain.contains('/') {
            return Err(invalid(
                "BASE_DOMAIN",
                "must be a bare host name such as `wiki.example.org`",
            ));
        }

        url::Url::parse(&self.mail.api_base)
            .map_err(|e| invalid("MAILGUN_API_BASE", &format!("not a valid URL: {e}")))?;

        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> Error {
    Error::Config {
        message: format!("{key} {reason}"),
        keys: vec![key.to_string()],
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, "must be a boolean (true/false)")),
    }
}
