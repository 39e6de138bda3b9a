//! Error types for tg-notify
//!
//! Every failure the notifier can hit is a variant of [`Error`]. The process
//! boundary only exposes one machine-readable signal, the exit code, so
//! [`Error::exit_code`] maps every variant to `1`.
//!
//! Errors fall into three groups:
//! - Fatal preconditions (configuration, missing artifact)
//! - Delivery escalations (closed topic that could not be recovered, rejected upload)
//! - Transport-class failures that the delivery loop may retry ([`Error::is_retryable`])

use thiserror::Error;

/// Result type alias for tg-notify operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code reported when the artifact was delivered
pub const EXIT_DELIVERED: u8 = 0;

/// Exit code reported for any fatal condition
pub const EXIT_FAILURE: u8 = 1;

/// Main error type for tg-notify
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable or setting that caused the error (e.g., "TELEGRAM_CHAT_ID")
        key: Option<String>,
    },

    /// No file matched the artifact pattern
    #[error("no artifact found matching {pattern}")]
    NoArtifactFound {
        /// The glob pattern that produced zero matches
        pattern: String,
    },

    /// The topic was closed and could not be reopened
    #[error("could not reopen closed topic {thread}")]
    ReopenFailed {
        /// The topic that stayed closed ("general" when no topic id was given)
        thread: String,
    },

    /// The topic was still closed when no attempts were left
    #[error("retries exhausted after {attempts} attempt(s): {reason}")]
    RetriesExhausted {
        /// Number of upload attempts made
        attempts: u32,
        /// Description of the last failure
        reason: String,
    },

    /// The Bot API answered with a non-recoverable status
    #[error("upload rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code of the reply
        status: u16,
        /// Raw reply body
        body: String,
    },

    /// Network error (connect, timeout, DNS, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool execution failed (git)
    #[error("external tool error: {0}")]
    ExternalTool(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a named setting
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Returns true for transport-class failures that may succeed on a later attempt
    ///
    /// Network and local I/O failures during an upload attempt are retried
    /// without any corrective action. Everything else is either terminal or
    /// handled by a dedicated branch of the delivery loop.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Io(_) => true,
            Error::Config { .. }
            | Error::NoArtifactFound { .. }
            | Error::ReopenFailed { .. }
            | Error::RetriesExhausted { .. }
            | Error::Rejected { .. }
            | Error::ExternalTool(_) => false,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}
