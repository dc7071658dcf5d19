//! Delivery policy on top of a [`Channel`]: chunking and fallbacks.

use crate::utils::{char_len, split_message, truncate_chars, CHUNK_LEN, MESSAGE_LIMIT};
use prompter_core::{
    error::BotError,
    message::{IncomingMessage, SentMessageRef},
    traits::Channel,
};
use std::sync::Arc;
use tracing::{error, warn};

/// Sends answers through a channel, splitting long text and falling back to
/// plain channel sends when replies fail.
#[derive(Clone)]
pub struct Outbox {
    channel: Arc<dyn Channel>,
    fallback_notice: String,
}

impl Outbox {
    pub fn new(channel: Arc<dyn Channel>, fallback_notice: impl Into<String>) -> Self {
        Self {
            channel,
            fallback_notice: fallback_notice.into(),
        }
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    /// Reply to `original` with `text`, chunked if it does not fit.
    ///
    /// Returns the reference of the last chunk sent. If any reply fails the
    /// text is posted once to the channel instead, prefixed with a mention of
    /// the author and truncated to one chunk.
    pub async fn reply(
        &self,
        original: &IncomingMessage,
        text: &str,
    ) -> Result<SentMessageRef, BotError> {
        let target = original.source_ref();
        let chunks = chunks_for(text);

        let mut last = None;
        for chunk in &chunks {
            match self.channel.reply(&target, chunk).await {
                Ok(sent) => last = Some(sent),
                Err(e) => {
                    error!("{}: reply to {} failed: {e}", self.channel.name(), target.message_id);
                    return self.fallback_send(original, text).await;
                }
            }
        }

        last.ok_or_else(|| BotError::Channel("nothing to send".into()))
    }

    /// Replace the content of `message` with `text`.
    ///
    /// Overflow is sent as follow-up replies to `message`; each follow-up
    /// falls back to a plain channel send. Only a failed edit is an error.
    pub async fn edit(
        &self,
        message: &SentMessageRef,
        text: &str,
    ) -> Result<SentMessageRef, BotError> {
        let chunks = chunks_for(text);
        let Some((first, rest)) = chunks.split_first() else {
            return Err(BotError::Channel("nothing to send".into()));
        };

        let edited = self.channel.edit(message, first).await.map_err(|e| {
            error!("{}: edit of {} failed: {e}", self.channel.name(), message.message_id);
            e
        })?;

        for chunk in rest {
            if let Err(e) = self.channel.reply(message, chunk).await {
                warn!(
                    "{}: follow-up reply failed, sending to channel: {e}",
                    self.channel.name()
                );
                if let Err(e) = self.channel.send(&message.channel_id, chunk).await {
                    error!("{}: follow-up send failed: {e}", self.channel.name());
                }
            }
        }

        Ok(edited)
    }

    /// Show a typing indicator. Failures are logged and ignored.
    pub async fn typing(&self, channel_id: &str) {
        if let Err(e) = self.channel.send_typing(channel_id).await {
            warn!("{}: typing indicator failed: {e}", self.channel.name());
        }
    }

    async fn fallback_send(
        &self,
        original: &IncomingMessage,
        text: &str,
    ) -> Result<SentMessageRef, BotError> {
        let content = format!(
            "{}, {}: {}",
            self.channel.mention(&original.sender_id),
            self.fallback_notice,
            truncate_chars(text, CHUNK_LEN)
        );
        self.channel
            .send(&original.reply_target, &content)
            .await
            .map_err(|e| {
                error!(
                    "{}: channel send after failed reply also failed: {e}",
                    self.channel.name()
                );
                e
            })
    }
}

fn chunks_for(text: &str) -> Vec<String> {
    if char_len(text) <= MESSAGE_LIMIT {
        vec![text.to_string()]
    } else {
        split_message(text, CHUNK_LEN)
    }
}
