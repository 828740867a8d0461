//! Message types for channel communication.

use olly_core::Caller;
use serde::{Deserialize, Serialize};

/// An inbound message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Message ID (channel-specific)
    pub id: String,
    /// Channel the message was posted in
    pub channel_id: String,
    /// Author, also their display name
    pub user_id: String,
    /// Whether the author holds administrative rights
    #[serde(default)]
    pub is_admin: bool,
    /// Message text
    pub text: String,
    /// Timestamp (Unix millis)
    pub timestamp: i64,
    /// Correlates log lines for this message
    pub trace_id: String,
}

impl ChannelMessage {
    pub fn new(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            is_admin: false,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            trace_id: olly_common::logging::generate_trace_id(),
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn caller(&self) -> Caller {
        Caller::new(self.user_id.clone(), self.is_admin)
    }
}

/// Outgoing message to send to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Target channel ID
    pub channel_id: String,
    /// Reply to message ID (optional)
    pub reply_to: Option<String>,
    /// Message content
    pub content: OutgoingContent,
}

/// Outgoing message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingContent {
    /// Plain text
    Text { text: String },
    /// Titled announcement with optional body and footer
    Notice {
        title: String,
        description: Option<String>,
        footer: Option<String>,
    },
}

impl OutgoingMessage {
    pub fn text(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            reply_to: None,
            content: OutgoingContent::Text { text: text.into() },
        }
    }

    pub fn notice(
        channel_id: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
        footer: Option<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            reply_to: None,
            content: OutgoingContent::Notice {
                title: title.into(),
                description,
                footer,
            },
        }
    }

    pub fn in_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_defaults() {
        let msg = ChannelMessage::new("general", "alice", ">hi");
        assert!(!msg.is_admin);
        assert_eq!(msg.trace_id.len(), 36);
        assert_eq!(msg.caller(), Caller::member("alice"));
        assert!(msg.with_admin(true).caller().is_admin);
    }

    #[test]
    fn notice_serializes_tagged() {
        let out = OutgoingMessage::notice("general", "hello", None, Some("footer".into()));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["content"]["type"], "notice");
        assert_eq!(json["content"]["footer"], "footer");
    }

    #[test]
    fn reply_sets_target() {
        let out = OutgoingMessage::text("general", "ok").in_reply_to("m1");
        assert_eq!(out.reply_to.as_deref(), Some("m1"));
    }
}
