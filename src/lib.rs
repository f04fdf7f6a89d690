//! # rc-digest
//!
//! Weekly recent-changes digest for a private MediaWiki wiki.
//!
//! A run logs in to the wiki, fetches every change made during the most
//! recently completed Sunday-to-Saturday week, groups them by day and by
//! consecutive user/page runs, renders the result as HTML, and mails it
//! through Mailgun. It is meant to be started by a scheduler (cron, Heroku
//! Scheduler, a systemd timer) once a week.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rc_digest::{Config, RunOutcome, run_digest};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let today = chrono::Utc::now().date_naive();
//!
//!     match run_digest(&config, today).await? {
//!         RunOutcome::NothingToReport => println!("quiet week"),
//!         RunOutcome::DryRun { html, .. } => println!("{html}"),
//!         RunOutcome::Sent { edits, .. } => println!("mailed {edits} edits"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Email delivery
pub mod mailer;
/// Grouping and HTML rendering of edits
pub mod report;
/// Reporting window computation
pub mod schedule;
/// Core types
pub mod types;
/// Escaping and encoding helpers
pub mod utils;
/// MediaWiki API client
pub mod wiki;

// Re-export commonly used types
pub use config::{Config, MailConfig, WikiConfig};
pub use error::{Error, Result, ToExitCode};
pub use mailer::{DeliveryReceipt, Mailer};
pub use report::{DateSection, EditGroup, Report, build_report, email_subject, format_changes};
pub use types::{EditRecord, ReportWindow, RevisionId};
pub use wiki::{WikiClient, WikiSession};

use chrono::NaiveDate;
use tracing::info;

/// How a digest run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The week had no changes; no email was sent
    NothingToReport,

    /// The digest was rendered but, by configuration, not sent
    DryRun {
        /// Subject line the email would have had
        subject: String,
        /// Rendered digest
        html: String,
    },

    /// The digest was accepted by the mail provider
    Sent {
        /// Number of edits in the digest
        edits: usize,
        /// Provider acknowledgement
        receipt: DeliveryReceipt,
    },
}

/// Run one digest: authenticate, fetch, render, deliver
///
/// `today` is the current UTC date; the report covers the most recently
/// completed Sunday-to-Saturday week before it. Steps run strictly in sequence
/// and the first failure ends the run.
///
/// # Errors
/// Returns the first [`Error`] raised by any stage. An empty week is not an
/// error; it yields [`RunOutcome::NothingToReport`].
pub async fn run_digest(config: &Config, today: NaiveDate) -> Result<RunOutcome> {
    let window = schedule::previous_week(today);
    info!(
        domain = %config.wiki.domain,
        start = %window.start,
        end = %window.end,
        "Starting weekly digest"
    );

    let client = WikiClient::new(config.wiki.api_url())?;
    let token = client.fetch_login_token().await?;
    let session = client
        .login(&token, &config.wiki.username, &config.wiki.password)
        .await?;

    let changes = session
        .fetch_recent_changes(window.newer_bound(), window.older_bound())
        .await?;

    if changes.is_empty() {
        info!("No recent changes found in the last week.");
        return Ok(RunOutcome::NothingToReport);
    }

    let report = build_report(changes, config.wiki.report_title(), window);
    let html = report.render_html(&config.wiki.base_url());
    let subject = email_subject(&config.wiki.domain, &window);
    info!(
        edits = report.edit_count(),
        days = report.sections.len(),
        "Rendered digest"
    );

    if config.dry_run {
        info!(subject = %subject, "Dry run, not sending email");
        return Ok(RunOutcome::DryRun { subject, html });
    }

    let mailer = Mailer::new(config.mail.clone())?;
    let receipt = mailer
        .send_email(&subject, &html, &config.mail.recipient)
        .await?;

    Ok(RunOutcome::Sent {
        edits: report.edit_count(),
        receipt,
    })
}
