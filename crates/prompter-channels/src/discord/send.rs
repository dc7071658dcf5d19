//! REST calls: post, edit, typing.

use super::DiscordChannel;
use prompter_core::{error::BotError, message::SentMessageRef};
use serenity::{
    builder::{CreateMessage, EditMessage},
    model::id::{ChannelId, MessageId},
};
use tracing::debug;

impl DiscordChannel {
    /// Post `text` to a channel, optionally as a reply to `reply_to`.
    pub(crate) async fn post(
        &self,
        channel_id: u64,
        text: &str,
        reply_to: Option<u64>,
    ) -> Result<SentMessageRef, BotError> {
        let channel = ChannelId::new(channel_id);
        let mut builder = CreateMessage::new().content(text);
        if let Some(id) = reply_to {
            builder = builder.reference_message((channel, MessageId::new(id)));
        }

        let sent = channel
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| BotError::Channel(format!("discord send failed: {e}")))?;

        debug!("discord: sent message {} to {channel_id}", sent.id);
        Ok(SentMessageRef::new(channel_id.to_string(), sent.id.to_string()))
    }

    /// Replace the content of a message the bot sent.
    pub(crate) async fn patch(
        &self,
        channel_id: u64,
        message_id: u64,
        text: &str,
    ) -> Result<SentMessageRef, BotError> {
        let edited = ChannelId::new(channel_id)
            .edit_message(
                &*self.http,
                MessageId::new(message_id),
                EditMessage::new().content(text),
            )
            .await
            .map_err(|e| BotError::Channel(format!("discord edit failed: {e}")))?;

        Ok(SentMessageRef::new(channel_id.to_string(), edited.id.to_string()))
    }

    /// Show the typing indicator in a channel.
    pub(crate) async fn typing(&self, channel_id: u64) -> Result<(), BotError> {
        self.http
            .broadcast_typing(ChannelId::new(channel_id))
            .await
            .map_err(|e| BotError::Channel(format!("discord typing failed: {e}")))
    }
}
