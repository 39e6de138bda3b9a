//! tg-notify command line entry point
//!
//! Usage: `tg-notify [TOPIC_ID] [EVENT_LABEL]`
//!
//! Credentials and CI metadata come from the environment; see
//! [`tg_notify::config`] for the variable names.

use std::process::ExitCode;
use tg_notify::commit::GitCommitSource;
use tg_notify::error::EXIT_DELIVERED;
use tg_notify::telegram::TelegramClient;
use tg_notify::{Config, notifier};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run().await {
        Ok(()) => ExitCode::from(EXIT_DELIVERED),
        Err(e) => {
            tracing::error!(error = %e, "Notification failed");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> tg_notify::Result<()> {
    let config = Config::from_env()?;
    let commits = GitCommitSource::from_path(&config.repo_dir);
    let client = TelegramClient::new(&config.api_base, config.bot_token.clone())?;

    let report = notifier::run(&config, &commits, &client).await?;
    tracing::info!(
        attempts = report.attempts,
        reopened = report.reopened,
        "Done"
    );
    Ok(())
}
