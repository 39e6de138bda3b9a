//! Configuration types for tg-notify
//!
//! The process environment and positional arguments are read exactly once,
//! into a [`Config`], which is then passed explicitly to everything else.
//! [`Config::from_lookup`] takes the environment as a closure so tests never
//! touch the real process environment.

use crate::caption::RunLink;
use crate::error::{Error, Result};
use crate::types::DeliveryTarget;
use std::{fmt, path::PathBuf, time::Duration};

/// Bot token environment variable (required)
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Destination chat environment variable (required)
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
/// Repository identifier used in the run URL
pub const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
/// Run identifier used in the run URL
pub const ENV_RUN_ID: &str = "GITHUB_RUN_ID";
/// Server base URL used in the run URL
pub const ENV_SERVER_URL: &str = "GITHUB_SERVER_URL";
/// Bot API base URL override
pub const ENV_API_URL: &str = "TELEGRAM_API_URL";
/// Artifact glob override
///
/// Only the file name may use glob syntax (`dist/*.tar.gz`, not `dist*/x.zip`).
pub const ENV_ARTIFACT_GLOB: &str = "TG_NOTIFY_ARTIFACT_GLOB";

/// Event label used when none is passed on the command line
pub const DEFAULT_EVENT_LABEL: &str = "New Yield (新产物)";
/// Where the build leaves its packaged output
pub const DEFAULT_ARTIFACT_GLOB: &str = "output/*.zip";
/// Public Telegram Bot API
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Secret bot token
///
/// `Debug` is redacted so the token cannot leak through `{:?}` logging.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building endpoint URLs only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(***)")
    }
}

/// Upload loop tuning
///
/// The defaults are the production values; tests shrink `backoff` to keep
/// retry scenarios fast.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryConfig {
    /// Total upload attempts, including the first (default: 2)
    pub max_attempts: u32,

    /// Fixed delay before a retry (default: 2 seconds)
    pub backoff: Duration,

    /// Timeout for the document upload (default: 120 seconds)
    pub upload_timeout: Duration,

    /// Timeout for the topic reopen call (default: 30 seconds)
    pub reopen_timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(2),
            upload_timeout: Duration::from_secs(120),
            reopen_timeout: Duration::from_secs(30),
        }
    }
}

/// Everything a notifier run needs, populated once at startup
#[derive(Clone, Debug)]
pub struct Config {
    /// Bot API credential
    pub bot_token: BotToken,

    /// Chat and optional topic to deliver to
    pub target: DeliveryTarget,

    /// Label shown in the caption headline
    pub event_label: String,

    /// Pieces of the CI run URL
    pub run_link: RunLink,

    /// Bot API base URL (default: "https://api.telegram.org")
    pub api_base: String,

    /// Glob selecting the artifact (default: "output/*.zip")
    pub artifact_glob: String,

    /// Repository the commit message is read from (default: ".")
    pub repo_dir: PathBuf,

    /// Upload loop tuning
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Create a configuration with defaults for everything but the credentials
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: BotToken::new(bot_token),
            target: DeliveryTarget::new(chat_id, None),
            event_label: DEFAULT_EVENT_LABEL.to_string(),
            run_link: RunLink::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            artifact_glob: DEFAULT_ARTIFACT_GLOB.to_string(),
            repo_dir: PathBuf::from("."),
            delivery: DeliveryConfig::default(),
        }
    }

    /// Build a configuration from an environment lookup and positional arguments
    ///
    /// `args` excludes the program name: `args[0]` is the optional topic id,
    /// `args[1]` the optional event label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the bot token or chat id is missing or
    /// empty, or when the resulting configuration fails [`Config::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tg_notify::config::Config;
    ///
    /// let env = |key: &str| match key {
    ///     "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
    ///     "TELEGRAM_CHAT_ID" => Some("-100200300".to_string()),
    ///     _ => None,
    /// };
    /// let config = Config::from_lookup(env, &["42".to_string()]).unwrap();
    /// assert_eq!(config.target.thread_label(), "42");
    /// ```
    pub fn from_lookup<F>(lookup: F, args: &[String]) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::config(key, format!("{key} is not set")))
        };

        let bot_token = required(ENV_BOT_TOKEN)?;
        let chat_id = required(ENV_CHAT_ID)?;

        let mut config = Config::new(bot_token, chat_id.clone());
        config.target = DeliveryTarget::new(chat_id, args.first().map(String::as_str));
        if let Some(label) = args.get(1) {
            config.event_label = label.clone();
        }

        config.run_link = RunLink {
            server_url: lookup(ENV_SERVER_URL),
            repository: lookup(ENV_REPOSITORY).unwrap_or_default(),
            run_id: lookup(ENV_RUN_ID).unwrap_or_default(),
        };

        if let Some(api_base) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            config.api_base = api_base;
        }
        if let Some(glob) = lookup(ENV_ARTIFACT_GLOB).filter(|v| !v.is_empty()) {
            config.artifact_glob = glob;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from the real process environment and arguments
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_lookup(|key| std::env::var(key).ok(), &args)
    }

    /// Check settings that would otherwise only fail mid-delivery
    pub fn validate(&self) -> Result<()> {
        let api = url::Url::parse(&self.api_base)
            .map_err(|e| Error::config(ENV_API_URL, format!("invalid Bot API URL: {e}")))?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(Error::config(
                ENV_API_URL,
                format!("unsupported Bot API URL scheme: {}", api.scheme()),
            ));
        }

        if self.artifact_glob.trim().is_empty() {
            return Err(Error::config(ENV_ARTIFACT_GLOB, "artifact pattern is empty"));
        }

        if self.delivery.max_attempts == 0 {
            return Err(Error::config(
                "delivery.max_attempts",
                "at least one upload attempt is required",
            ));
        }

        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![(ENV_BOT_TOKEN, "123:secret"), (ENV_CHAT_ID, "-100987")]
    }

    #[test]
    fn test_defaults_with_only_credentials() {
        let config = Config::from_lookup(env(&credentials()), &[]).unwrap();

        assert_eq!(config.bot_token.expose(), "123:secret");
        assert_eq!(config.target.chat_id, "-100987");
        assert_eq!(config.target.thread_id, None);
        assert_eq!(config.event_label, DEFAULT_EVENT_LABEL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.artifact_glob, DEFAULT_ARTIFACT_GLOB);
        assert_eq!(config.delivery, DeliveryConfig::default());
        assert_eq!(config.run_link.server_url, None);
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let result = Config::from_lookup(env(&[(ENV_CHAT_ID, "-100987")]), &[]);
        match result {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some(ENV_BOT_TOKEN)),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_chat_id_is_config_error() {
        let result = Config::from_lookup(
            env(&[(ENV_BOT_TOKEN, "123:secret"), (ENV_CHAT_ID, "")]),
            &[],
        );
        match result {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some(ENV_CHAT_ID)),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_positional_arguments() {
        let args = vec!["55".to_string(), "Nightly".to_string()];
        let config = Config::from_lookup(env(&credentials()), &args).unwrap();
        assert_eq!(config.target.thread_label(), "55");
        assert_eq!(config.event_label, "Nightly");

        let args = vec!["0".to_string()];
        let config = Config::from_lookup(env(&credentials()), &args).unwrap();
        assert_eq!(config.target.thread_id, None);
        assert_eq!(config.event_label, DEFAULT_EVENT_LABEL);
    }

    #[test]
    fn test_run_link_and_overrides() {
        let mut pairs = credentials();
        pairs.extend([
            (ENV_REPOSITORY, "acme/widget"),
            (ENV_RUN_ID, "991"),
            (ENV_SERVER_URL, "https://git.example.com"),
            (ENV_API_URL, "http://127.0.0.1:8081"),
            (ENV_ARTIFACT_GLOB, "dist/*.tar.gz"),
        ]);
        let config = Config::from_lookup(env(&pairs), &[]).unwrap();

        assert_eq!(
            config.run_link.url(),
            "https://git.example.com/acme/widget/actions/runs/991"
        );
        assert_eq!(config.api_base, "http://127.0.0.1:8081");
        assert_eq!(config.artifact_glob, "dist/*.tar.gz");
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let mut pairs = credentials();
        pairs.push((ENV_API_URL, "not a url"));
        assert!(matches!(
            Config::from_lookup(env(&pairs), &[]),
            Err(Error::Config { .. })
        ));

        let mut pairs = credentials();
        pairs.push((ENV_API_URL, "ftp://api.example.com"));
        assert!(matches!(
            Config::from_lookup(env(&pairs), &[]),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = Config::new("123:secret", "-100987");
        config.delivery.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_never_prints_token() {
        let config = Config::new("123:super-secret", "-100987");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("BotToken(***)"));
    }
}
