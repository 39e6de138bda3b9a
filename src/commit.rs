//! Commit description lookup
//!
//! The caption quotes the latest commit message. Looking it up is best
//! effort: [`describe_last_commit`] turns every failure into a fixed fallback
//! string, so a missing `git` binary or a shallow checkout never blocks a
//! notification.
//!
//! ## Architecture
//!
//! The version-control collaborator sits behind the [`CommitSource`] trait:
//!
//! - [`GitCommitSource`]: runs `git log -1 --pretty=%B`
//! - [`StaticCommitSource`]: returns a fixed message (dry runs and tests)

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Text used when the commit message cannot be determined
pub const FALLBACK_COMMIT_MESSAGE: &str = "No commit message available.";

/// Upper bound on a git invocation
pub const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of the latest commit message
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Full message of the most recent commit
    async fn last_commit_message(&self) -> Result<String>;

    /// Name of this source, for logs
    fn name(&self) -> &'static str;
}

/// Reads the commit message with the external `git` binary
///
/// # Examples
///
/// ```no_run
/// use tg_notify::commit::{GitCommitSource, describe_last_commit};
///
/// # #[tokio::main]
/// # async fn main() {
/// let source = GitCommitSource::from_path(".");
/// println!("{}", describe_last_commit(&source).await);
/// # }
/// ```
pub struct GitCommitSource {
    binary_path: Option<PathBuf>,
    repo_dir: PathBuf,
    timeout: Duration,
}

impl GitCommitSource {
    /// Create a source with an explicit git binary
    pub fn new(binary_path: PathBuf, repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: Some(binary_path),
            repo_dir: repo_dir.into(),
            timeout: GIT_TIMEOUT,
        }
    }

    /// Find git in PATH
    ///
    /// A missing binary is not an error here; lookups will fail and be
    /// absorbed by [`describe_last_commit`].
    pub fn from_path(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: which::which("git").ok(),
            repo_dir: repo_dir.into(),
            timeout: GIT_TIMEOUT,
        }
    }

    /// Override the invocation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommitSource for GitCommitSource {
    async fn last_commit_message(&self) -> Result<String> {
        let binary = self
            .binary_path
            .as_ref()
            .ok_or_else(|| Error::ExternalTool("git not found in PATH".to_string()))?;

        let mut command = Command::new(binary);
        command
            .args(["log", "-1", "--pretty=%B"])
            .current_dir(&self.repo_dir)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                Error::ExternalTool(format!("git timed out after {:?}", self.timeout))
            })?
            .map_err(|e| Error::ExternalTool(format!("Failed to execute git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool(format!(
                "git exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let message = String::from_utf8(output.stdout)
            .map_err(|e| Error::ExternalTool(format!("git output is not UTF-8: {}", e)))?;
        Ok(message.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "git"
    }
}

/// Fixed commit message
pub struct StaticCommitSource {
    message: String,
}

impl StaticCommitSource {
    /// Always answer with `message`
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl CommitSource for StaticCommitSource {
    async fn last_commit_message(&self) -> Result<String> {
        Ok(self.message.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Describe the latest commit, never failing
///
/// Errors and empty messages both produce [`FALLBACK_COMMIT_MESSAGE`].
pub async fn describe_last_commit(source: &dyn CommitSource) -> String {
    match source.last_commit_message().await {
        Ok(message) if !message.trim().is_empty() => message.trim().to_string(),
        Ok(_) => {
            tracing::warn!(source = source.name(), "Latest commit has an empty message");
            FALLBACK_COMMIT_MESSAGE.to_string()
        }
        Err(e) => {
            tracing::warn!(
                source = source.name(),
                error = %e,
                "Failed to get commit message"
            );
            FALLBACK_COMMIT_MESSAGE.to_string()
        }
    }
}
