//! Artifact delivery with conditional recovery
//!
//! [`DeliveryEngine::deliver`] runs a bounded attempt loop. Each attempt
//! reads the artifact from disk, uploads it, and classifies the reply:
//!
//! | Reply                          | Attempts left                      | None left          |
//! |--------------------------------|------------------------------------|--------------------|
//! | 200                            | succeed                            | succeed            |
//! | 400 containing `TOPIC_CLOSED`  | reopen topic, back off, retry      | retries exhausted  |
//! | any other status               | abort                              | abort              |
//! | transport error                | back off, retry (no reopen)        | abort              |
//!
//! A failed reopen aborts immediately. The caption is borrowed by every
//! attempt and never rebuilt.

use crate::artifact::Artifact;
use crate::caption::Caption;
use crate::config::DeliveryConfig;
use crate::error::{Error, Result};
use crate::telegram::{ApiReply, BotApi, Document};
use crate::types::{DeliveryReport, DeliveryTarget};
use std::fmt;
use std::time::Duration;

/// Where the delivery loop currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryState {
    /// Nothing sent yet
    Idle,
    /// Upload attempt `n` (0-based) in flight
    Attempting(u32),
    /// Attempt `n` hit a closed topic; reopening before attempt `n + 1`
    RecoveringThenRetrying(u32),
    /// Upload accepted
    Succeeded,
    /// Gave up
    Aborted,
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryState::Idle => write!(f, "idle"),
            DeliveryState::Attempting(n) => write!(f, "attempting({n})"),
            DeliveryState::RecoveringThenRetrying(n) => write!(f, "recovering({n})"),
            DeliveryState::Succeeded => write!(f, "succeeded"),
            DeliveryState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Classified result of one upload attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// HTTP 200
    Delivered,
    /// HTTP 400 with `TOPIC_CLOSED`; recoverable by reopening
    TopicClosed(ApiReply),
    /// Connection, timeout or local read failure; retryable without recovery
    Transport(Error),
    /// Anything else; never retried
    Fatal(Error),
}

impl AttemptOutcome {
    /// Classify a reply the Bot API actually sent
    pub fn from_reply(reply: ApiReply) -> Self {
        if reply.is_success() {
            AttemptOutcome::Delivered
        } else if reply.is_topic_closed() {
            AttemptOutcome::TopicClosed(reply)
        } else {
            AttemptOutcome::Fatal(Error::Rejected {
                status: reply.status,
                body: reply.body,
            })
        }
    }

    /// Classify a failure to obtain any reply
    pub fn from_error(error: Error) -> Self {
        if error.is_retryable() {
            AttemptOutcome::Transport(error)
        } else {
            AttemptOutcome::Fatal(error)
        }
    }
}

/// One upload attempt and how it ended
#[derive(Debug)]
pub struct DeliveryAttempt {
    /// 0-based attempt number
    pub index: u32,
    /// Classified result
    pub outcome: AttemptOutcome,
}

/// Ask the Bot API to reopen the target's topic
///
/// Never fails: any error is logged and reported as `false`.
pub async fn reopen_thread(api: &dyn BotApi, target: &DeliveryTarget, timeout: Duration) -> bool {
    let thread = target.thread_label();
    tracing::warn!(thread = %thread, "Topic is closed, attempting to reopen");

    match api.reopen_topic(target, timeout).await {
        Ok(reply) if reply.is_success() => {
            tracing::info!(thread = %thread, "Topic reopened");
            true
        }
        Ok(reply) => {
            tracing::error!(
                thread = %thread,
                status = reply.status,
                description = %reply.description(),
                "Failed to reopen topic"
            );
            false
        }
        Err(e) => {
            tracing::error!(thread = %thread, error = %e, "Error while reopening topic");
            false
        }
    }
}

/// Uploads an artifact, recovering from a closed topic at most once per spare attempt
///
/// # Examples
///
/// ```no_run
/// use tg_notify::config::{BotToken, DeliveryConfig};
/// use tg_notify::delivery::DeliveryEngine;
/// use tg_notify::telegram::TelegramClient;
/// use tg_notify::types::DeliveryTarget;
/// use tg_notify::{artifact, caption};
///
/// # #[tokio::main]
/// # async fn main() -> tg_notify::Result<()> {
/// let client = TelegramClient::new("https://api.telegram.org", BotToken::new("123:abc"))?;
/// let engine = DeliveryEngine::new(&client, DeliveryConfig::default());
///
/// let artifact = artifact::locate_artifact("output/*.zip").await?;
/// let caption = caption::compose_caption("Release", &artifact, "Initial commit", "https://ci");
/// let target = DeliveryTarget::new("-100123456", Some("42"));
///
/// let report = engine.deliver(&target, &artifact, &caption).await?;
/// println!("delivered after {} attempt(s)", report.attempts);
/// # Ok(())
/// # }
/// ```
pub struct DeliveryEngine<'a> {
    api: &'a dyn BotApi,
    config: DeliveryConfig,
}

impl<'a> DeliveryEngine<'a> {
    /// Create an engine over a Bot API implementation
    pub fn new(api: &'a dyn BotApi, config: DeliveryConfig) -> Self {
        Self { api, config }
    }

    /// Deliver `artifact` with `caption` to `target`
    ///
    /// # Errors
    ///
    /// - [`Error::Rejected`] for any non-200 reply other than a closed topic
    /// - [`Error::ReopenFailed`] when a closed topic could not be reopened
    /// - [`Error::RetriesExhausted`] when the topic was still closed on the last attempt
    /// - the transport error of the last attempt when every attempt failed to connect
    pub async fn deliver(
        &self,
        target: &DeliveryTarget,
        artifact: &Artifact,
        caption: &Caption,
    ) -> Result<DeliveryReport> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = DeliveryState::Idle;
        let mut reopened = false;
        let mut index = 0;

        loop {
            state = transition(state, DeliveryState::Attempting(index));
            let attempt = self.attempt(index, target, artifact, caption).await;
            let has_next = index + 1 < max_attempts;

            match attempt.outcome {
                AttemptOutcome::Delivered => {
                    transition(state, DeliveryState::Succeeded);
                    tracing::info!(
                        artifact = %artifact.name,
                        attempts = index + 1,
                        "Artifact delivered"
                    );
                    return Ok(DeliveryReport {
                        attempts: index + 1,
                        reopened,
                    });
                }
                AttemptOutcome::TopicClosed(reply) => {
                    if !has_next {
                        tracing::error!(attempts = index + 1, "Retries exhausted");
                        transition(state, DeliveryState::Aborted);
                        return Err(Error::RetriesExhausted {
                            attempts: index + 1,
                            reason: reply.description(),
                        });
                    }

                    state = transition(state, DeliveryState::RecoveringThenRetrying(index));
                    if !reopen_thread(self.api, target, self.config.reopen_timeout).await {
                        tracing::error!("Could not reopen topic, aborting");
                        transition(state, DeliveryState::Aborted);
                        return Err(Error::ReopenFailed {
                            thread: target.thread_label(),
                        });
                    }
                    reopened = true;

                    tracing::info!(
                        delay_ms = self.config.backoff.as_millis(),
                        "Retrying upload after reopening topic"
                    );
                    tokio::time::sleep(self.config.backoff).await;
                }
                AttemptOutcome::Transport(e) => {
                    if !has_next {
                        tracing::error!(
                            error = %e,
                            attempts = index + 1,
                            "Upload failed after all attempts"
                        );
                        transition(state, DeliveryState::Aborted);
                        return Err(e);
                    }

                    tracing::warn!(
                        error = %e,
                        attempt = index + 1,
                        max_attempts,
                        delay_ms = self.config.backoff.as_millis(),
                        "Transport error, retrying"
                    );
                    tokio::time::sleep(self.config.backoff).await;
                }
                AttemptOutcome::Fatal(e) => {
                    tracing::error!(error = %e, "Upload failed");
                    transition(state, DeliveryState::Aborted);
                    return Err(e);
                }
            }

            index += 1;
        }
    }

    async fn attempt(
        &self,
        index: u32,
        target: &DeliveryTarget,
        artifact: &Artifact,
        caption: &Caption,
    ) -> DeliveryAttempt {
        // fresh read every attempt; nothing is carried over from the last one
        let outcome = match artifact.read().await {
            Ok(bytes) => {
                let document = Document {
                    file_name: artifact.name.clone(),
                    bytes,
                };
                match self
                    .api
                    .send_document(target, document, caption, self.config.upload_timeout)
                    .await
                {
                    Ok(reply) => AttemptOutcome::from_reply(reply),
                    Err(e) => AttemptOutcome::from_error(e),
                }
            }
            Err(e) => AttemptOutcome::from_error(e),
        };

        tracing::debug!(attempt = index, outcome = ?outcome, "Upload attempt finished");
        DeliveryAttempt { index, outcome }
    }
}

fn transition(from: DeliveryState, to: DeliveryState) -> DeliveryState {
    tracing::debug!(from = %from, to = %to, "Delivery state change");
    to
}
