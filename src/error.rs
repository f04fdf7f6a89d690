//! Error types for rc-digest
//!
//! Every error in this crate is fatal for the current run. Components return
//! them up to the binary, which logs them and maps them to a process exit code:
//! - Domain-specific variants (Config, Auth, ResponseShape, Delivery)
//! - Exit code and machine-readable error code mapping via [`ToExitCode`]

use thiserror::Error;

/// Result type alias for rc-digest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rc-digest
///
/// Each variant carries enough context to diagnose the failure from a single
/// log line, since this is a background job with no other user-facing channel.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment keys that caused the error (e.g., "MW_USERNAME")
        keys: Vec<String>,
    },

    /// Login token retrieval or credential exchange failed
    #[error("authentication error: {0}")]
    Auth(String),

    /// Network or HTTP failure talking to the wiki or the mail provider
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response did not have the expected JSON structure
    #[error("unexpected response from {context}: {message}")]
    ResponseShape {
        /// Which call produced the response (e.g., "login token query")
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// The mail provider rejected the message
    #[error("email delivery failed with HTTP {status}: {body}")]
    Delivery {
        /// HTTP status returned by the provider
        status: u16,
        /// Response body, kept for diagnostics
        body: String,
    },
}

impl Error {
    /// Configuration error for a set of missing keys
    pub fn missing_config<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Error::Config {
            message: format!("missing required settings: {}", keys.join(", ")),
            keys,
        }
    }

    /// Response shape error with the call it came from
    pub fn response_shape(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ResponseShape {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Convert errors to process exit codes
///
/// The binary uses this to turn the top-level result into an exit status and
/// to tag the final log line with a stable error code.
pub trait ToExitCode {
    /// Get the process exit code for this error
    fn exit_code(&self) -> u8;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> u8 {
        match self {
            Error::Config { .. }
            | Error::Auth(_)
            | Error::Transport(_)
            | Error::ResponseShape { .. }
            | Error::Delivery { .. } => 1,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Auth(_) => "auth_error",
            Error::Transport(_) => "transport_error",
            Error::ResponseShape { .. } => "response_shape_error",
            Error::Delivery { .. } => "delivery_error",
        }
    }
}
