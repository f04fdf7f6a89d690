//! `rc-digest` -- weekly MediaWiki recent-changes email.
//!
//! Intended to be run once per week by a scheduler. Configuration comes from
//! the environment (or a `.env` file); see [`rc_digest::config`] for the
//! variables. Exit status is 0 when the digest was sent or the week was empty,
//! and 1 on any failure.

use std::process::ExitCode;

use rc_digest::{Config, Error, RunOutcome, ToExitCode, run_digest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rc_digest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let today = chrono::Utc::now().date_naive();
    match run_digest(&config, today).await {
        Ok(RunOutcome::NothingToReport) => ExitCode::SUCCESS,
        Ok(RunOutcome::DryRun { html, .. }) => {
            println!("{html}");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Sent { edits, .. }) => {
            tracing::info!(edits, "Digest delivered");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn fail(error: &Error) -> ExitCode {
    tracing::error!(error_code = error.error_code(), "{}", error);
    ExitCode::from(error.exit_code())
}
