//! End-to-end notifier run
//!
//! Order matters: the artifact is located before anything touches the
//! network, so a build without output fails without a single Bot API call.

use crate::artifact::locate_artifact;
use crate::caption::compose_caption;
use crate::commit::{CommitSource, describe_last_commit};
use crate::config::Config;
use crate::delivery::DeliveryEngine;
use crate::error::Result;
use crate::telegram::BotApi;
use crate::types::DeliveryReport;

/// Locate, describe, compose and deliver
///
/// # Errors
///
/// Any fatal condition: missing artifact, rejected upload, unrecoverable
/// closed topic, or exhausted transport retries. Commit lookup failures
/// never surface here.
pub async fn run(
    config: &Config,
    commits: &dyn CommitSource,
    api: &dyn BotApi,
) -> Result<DeliveryReport> {
    let artifact = locate_artifact(&config.artifact_glob).await?;

    let commit_text = describe_last_commit(commits).await;
    let run_url = config.run_link.url();
    let caption = compose_caption(&config.event_label, &artifact, &commit_text, &run_url);

    if let Some(thread) = &config.target.thread_id {
        tracing::info!(thread = %thread, "Targeting topic");
    }
    tracing::info!(
        artifact = %artifact.name,
        size_mb = artifact.size_mb(),
        "Dispatching artifact to Telegram"
    );

    DeliveryEngine::new(api, config.delivery.clone())
        .deliver(&config.target, &artifact, &caption)
        .await
}
