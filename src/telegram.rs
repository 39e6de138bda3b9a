//! Telegram Bot API client
//!
//! Only the two calls the notifier needs are implemented. Replies are
//! handed back as raw [`ApiReply`] values; deciding what a status means is
//! the delivery loop's job.
//!
//! Endpoint URLs embed the bot token, so every `reqwest::Error` leaving this
//! module is stripped of its URL.

use crate::caption::Caption;
use crate::config::BotToken;
use crate::error::{Error, Result};
use crate::types::DeliveryTarget;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

/// Marker Telegram puts in the error description when a forum topic is closed
pub const TOPIC_CLOSED_MARKER: &str = "TOPIC_CLOSED";

/// File to upload, read fresh for each attempt
#[derive(Clone, Debug)]
pub struct Document {
    /// File name shown in the chat
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Status and body of a Bot API reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiReply {
    /// HTTP status code
    pub status: u16,
    /// Raw body text
    pub body: String,
}

/// Error envelope returned by the Bot API
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    description: Option<String>,
}

impl ApiReply {
    /// Whether the call succeeded (HTTP 200)
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Whether this is the recoverable "topic closed" rejection
    pub fn is_topic_closed(&self) -> bool {
        self.status == 400 && self.body.contains(TOPIC_CLOSED_MARKER)
    }

    /// Telegram's `description` field, or the raw body when it is not JSON
    pub fn description(&self) -> String {
        serde_json::from_str::<TelegramResponse>(&self.body)
            .ok()
            .and_then(|r| r.description)
            .unwrap_or_else(|| self.body.clone())
    }
}

/// The Bot API calls the delivery loop depends on
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Upload `document` to the target with `caption` in HTML parse mode
    ///
    /// `Ok` carries any HTTP reply, including error statuses. `Err` means the
    /// request never produced a reply (connect failure, timeout, DNS).
    async fn send_document(
        &self,
        target: &DeliveryTarget,
        document: Document,
        caption: &Caption,
        timeout: Duration,
    ) -> Result<ApiReply>;

    /// Reopen the target's topic with `reopenForumTopic`
    ///
    /// `message_thread_id` is only sent when the target has a topic id; the
    /// Bot API rejects the call without one.
    async fn reopen_topic(&self, target: &DeliveryTarget, timeout: Duration) -> Result<ApiReply>;
}

/// `reqwest` implementation of [`BotApi`]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: BotToken,
}

impl TelegramClient {
    /// Create a client for `api_base` (e.g. "https://api.telegram.org")
    pub fn new(api_base: &str, token: BotToken) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tg-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(e.without_url()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token.expose(), method)
    }

    async fn post(&self, method: &str, request: reqwest::RequestBuilder) -> Result<ApiReply> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(
                method,
                timeout = e.is_timeout(),
                connect = e.is_connect(),
                "Bot API request failed"
            );
            Error::Network(e.without_url())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.without_url()))?;
        Ok(ApiReply { status, body })
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn send_document(
        &self,
        target: &DeliveryTarget,
        document: Document,
        caption: &Caption,
        timeout: Duration,
    ) -> Result<ApiReply> {
        let mut form = Form::new()
            .text("chat_id", target.chat_id.clone())
            .text("caption", caption.as_str().to_string())
            .text("parse_mode", "HTML");

        if let Some(thread) = &target.thread_id {
            form = form.text("message_thread_id", thread.as_str().to_string());
        }

        let part = Part::bytes(document.bytes).file_name(document.file_name);
        form = form.part("document", part);

        let request = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .timeout(timeout);
        self.post("sendDocument", request).await
    }

    async fn reopen_topic(&self, target: &DeliveryTarget, timeout: Duration) -> Result<ApiReply> {
        let mut fields = vec![("chat_id", target.chat_id.as_str())];
        if let Some(thread) = &target.thread_id {
            fields.push(("message_thread_id", thread.as_str()));
        }

        let request = self
            .http
            .post(self.method_url("reopenForumTopic"))
            .form(&fields)
            .timeout(timeout);
        self.post("reopenForumTopic", request).await
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> ApiReply {
        ApiReply {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_topic_closed_requires_400_and_marker() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: TOPIC_CLOSED"}"#;
        assert!(reply(400, body).is_topic_closed());
        assert!(!reply(403, body).is_topic_closed());
        assert!(!reply(400, r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .is_topic_closed());
    }

    #[test]
    fn test_description_prefers_json_field() {
        let r = reply(
            400,
            r#"{"ok":false,"error_code":400,"description":"Bad Request: TOPIC_CLOSED"}"#,
        );
        assert_eq!(r.description(), "Bad Request: TOPIC_CLOSED");

        let r = reply(502, "<html>Bad Gateway</html>");
        assert_eq!(r.description(), "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_method_url_trims_trailing_slash() {
        let client = TelegramClient::new("http://localhost:8081/", BotToken::new("1:a")).unwrap();
        assert_eq!(
            client.method_url("sendDocument"),
            "http://localhost:8081/bot1:a/sendDocument"
        );
    }
}
