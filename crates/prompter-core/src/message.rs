use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming chat message that mentioned the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Internal id used to correlate log lines for one pipeline run.
    pub id: Uuid,
    /// Channel name (e.g. "discord").
    pub channel: String,
    /// Platform-specific id of the message itself.
    pub message_id: String,
    /// Platform-specific user ID.
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Raw message text, mentions included.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. Discord channel id).
    pub reply_target: String,
    /// The bot's own user id, used to strip mention tokens from `text`.
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        reply_target: impl Into<String>,
        message_id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            message_id: message_id.into(),
            sender_id: sender_id.into(),
            sender_name: None,
            text: text.into(),
            timestamp: Utc::now(),
            reply_target: reply_target.into(),
            bot_id: None,
        }
    }

    /// Reference to the message itself, for replies.
    pub fn source_ref(&self) -> SentMessageRef {
        SentMessageRef {
            channel_id: self.reply_target.clone(),
            message_id: self.message_id.clone(),
        }
    }

    /// Message text with the bot's own mention tokens removed and whitespace trimmed.
    pub fn stripped_text(&self) -> String {
        match self.bot_id.as_deref() {
            Some(id) => strip_mentions(&self.text, id),
            None => self.text.trim().to_string(),
        }
    }
}

/// Location of a message the bot can reply to or edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentMessageRef {
    pub channel_id: String,
    pub message_id: String,
}

impl SentMessageRef {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// Remove `<@id>` and `<@!id>` tokens for the given user id, then trim.
pub fn strip_mentions(text: &str, user_id: &str) -> String {
    text.replace(&format!("<@!{user_id}>"), "")
        .replace(&format!("<@{user_id}>"), "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming(text: &str, bot_id: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            id: Uuid::new_v4(),
            channel: "discord".into(),
            message_id: "42".into(),
            sender_id: "7".into(),
            sender_name: Some("alice".into()),
            text: text.into(),
            timestamp: Utc::now(),
            reply_target: "100".into(),
            bot_id: bot_id.map(String::from),
        }
    }

    #[test]
    fn test_strip_both_mention_forms() {
        assert_eq!(
            strip_mentions("<@123> hello <@!123> there", "123"),
            "hello  there"
        );
    }

    #[test]
    fn test_strip_leaves_other_users() {
        assert_eq!(
            strip_mentions("<@123> ask <@999> about it", "123"),
            "ask <@999> about it"
        );
    }

    #[test]
    fn test_stripped_text_only_mention_is_empty() {
        let msg = incoming("  <@123>   ", Some("123"));
        assert_eq!(msg.stripped_text(), "");
    }

    #[test]
    fn test_stripped_text_without_bot_id_trims() {
        let msg = incoming("  hi there  ", None);
        assert_eq!(msg.stripped_text(), "hi there");
    }

    #[test]
    fn test_source_ref_points_at_source_message() {
        let msg = incoming("<@1> hello", Some("1"));
        let r = msg.source_ref();
        assert_eq!(r.channel_id, "100");
        assert_eq!(r.message_id, "42");
    }
}
