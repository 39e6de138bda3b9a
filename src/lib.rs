//! # tg-notify
//!
//! Delivers a CI build artifact to a Telegram chat or forum topic.
//!
//! A run locates the packaged artifact, quotes the latest commit message,
//! links back to the CI run, and uploads everything through the Bot API's
//! `sendDocument`. If the target topic has been closed, the topic is reopened
//! once and the upload retried; transport failures get one plain retry.
//! Anything else is fatal and ends the process with exit code 1.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tg_notify::commit::GitCommitSource;
//! use tg_notify::telegram::TelegramClient;
//! use tg_notify::{Config, notifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let commits = GitCommitSource::from_path(&config.repo_dir);
//!     let client = TelegramClient::new(&config.api_base, config.bot_token.clone())?;
//!
//!     let report = notifier::run(&config, &commits, &client).await?;
//!     println!("delivered in {} attempt(s)", report.attempts);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Artifact discovery
pub mod artifact;
/// Caption composition
pub mod caption;
/// Commit message lookup
pub mod commit;
/// Configuration types
pub mod config;
/// Upload loop with topic recovery
pub mod delivery;
/// Error types
pub mod error;
/// End-to-end run
pub mod notifier;
/// Telegram Bot API client
pub mod telegram;
/// Core types
pub mod types;

// Re-export commonly used types
pub use artifact::{Artifact, locate_artifact};
pub use caption::{Caption, RunLink, compose_caption};
pub use commit::{CommitSource, GitCommitSource, describe_last_commit};
pub use config::{BotToken, Config, DeliveryConfig};
pub use delivery::{DeliveryEngine, reopen_thread};
pub use error::{Error, Result};
pub use telegram::{ApiReply, BotApi, TelegramClient};
pub use types::{DeliveryReport, DeliveryTarget, ThreadId};
