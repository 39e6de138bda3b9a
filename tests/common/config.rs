//! Test configuration helpers pointing the notifier at a mock Bot API

use std::time::Duration;
use tg_notify::Config;

/// Bot token used by every test; asserted never to leak into errors
pub const TEST_TOKEN: &str = "123456:TEST-secret-token";

/// Destination chat used by every test
pub const TEST_CHAT: &str = "-1001234567890";

/// Create a config for `api_base` and `artifact_glob` with a short backoff
pub fn test_config(api_base: &str, artifact_glob: &str, thread: Option<&str>) -> Config {
    let env = |key: &str| match key {
        "TELEGRAM_BOT_TOKEN" => Some(TEST_TOKEN.to_string()),
        "TELEGRAM_CHAT_ID" => Some(TEST_CHAT.to_string()),
        "TELEGRAM_API_URL" => Some(api_base.to_string()),
        "TG_NOTIFY_ARTIFACT_GLOB" => Some(artifact_glob.to_string()),
        "GITHUB_REPOSITORY" => Some("acme/meta-hybrid".to_string()),
        "GITHUB_RUN_ID" => Some("4242".to_string()),
        _ => None,
    };
    let args: Vec<String> = thread.map(|t| vec![t.to_string()]).unwrap_or_default();

    let mut config = Config::from_lookup(env, &args).expect("test config should be valid");
    config.delivery.backoff = Duration::from_millis(20);
    config
}

/// Bot API path for `method` under the test token
pub fn method_path(method: &str) -> String {
    format!("/bot{}/{}", TEST_TOKEN, method)
}
