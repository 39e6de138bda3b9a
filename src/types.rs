//! Core types for tg-notify

use std::fmt;

/// Identifier of a forum topic inside a chat
///
/// Only constructed through [`ThreadId::parse`], so a value of this type is
/// never empty and never the placeholder `"0"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    /// Parse a topic argument, treating absent, blank and `"0"` as "no topic"
    ///
    /// ```
    /// use tg_notify::types::ThreadId;
    ///
    /// assert!(ThreadId::parse(Some("17")).is_some());
    /// assert!(ThreadId::parse(Some("0")).is_none());
    /// assert!(ThreadId::parse(Some("  ")).is_none());
    /// assert!(ThreadId::parse(None).is_none());
    /// ```
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        if raw.trim().is_empty() || raw == "0" {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// The identifier as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the artifact is delivered
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryTarget {
    /// Destination chat
    pub chat_id: String,
    /// Optional forum topic inside the chat
    pub thread_id: Option<ThreadId>,
}

impl DeliveryTarget {
    /// Create a target from a chat id and a raw topic argument
    pub fn new(chat_id: impl Into<String>, thread_arg: Option<&str>) -> Self {
        Self {
            chat_id: chat_id.into(),
            thread_id: ThreadId::parse(thread_arg),
        }
    }

    /// Human-readable topic label for logs and errors
    pub fn thread_label(&self) -> String {
        match &self.thread_id {
            Some(id) => id.to_string(),
            None => "general".to_string(),
        }
    }
}

/// Summary of a successful delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Number of upload attempts made, including the successful one
    pub attempts: u32,
    /// Whether a closed topic was reopened along the way
    pub reopened: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_id_rejects_placeholders() {
        assert_eq!(ThreadId::parse(None), None);
        assert_eq!(ThreadId::parse(Some("")), None);
        assert_eq!(ThreadId::parse(Some("   ")), None);
        assert_eq!(ThreadId::parse(Some("0")), None);
    }

    #[test]
    fn test_thread_id_keeps_real_ids_verbatim() {
        let id = ThreadId::parse(Some("1234")).map(|t| t.as_str().to_string());
        assert_eq!(id.as_deref(), Some("1234"));

        // "00" is not the placeholder
        assert!(ThreadId::parse(Some("00")).is_some());
    }

    #[test]
    fn test_delivery_target_thread_label() {
        let with_topic = DeliveryTarget::new("-100123", Some("7"));
        assert_eq!(with_topic.thread_label(), "7");

        let general = DeliveryTarget::new("-100123", Some("0"));
        assert_eq!(general.thread_id, None);
        assert_eq!(general.thread_label(), "general");
    }
}
