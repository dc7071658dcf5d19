//! Gateway event handler: turns mentions of the bot into [`IncomingMessage`]s.

use chrono::{DateTime, Utc};
use prompter_core::message::IncomingMessage;
use serenity::{
    all::{Context, EventHandler, Message, Ready},
    async_trait,
};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub(crate) struct Handler {
    tx: mpsc::Sender<IncomingMessage>,
    bot_id: Arc<OnceLock<u64>>,
}

impl Handler {
    pub(crate) fn new(tx: mpsc::Sender<IncomingMessage>, bot_id: Arc<OnceLock<u64>>) -> Self {
        Self { tx, bot_id }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        if self.bot_id.set(ready.user.id.get()).is_err() {
            debug!("discord: bot id already known (gateway reconnect)");
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(&bot_id) = self.bot_id.get() else {
            return;
        };

        let mentioned: Vec<u64> = msg.mentions.iter().map(|u| u.id.get()).collect();
        if !is_addressed(msg.author.bot, &mentioned, bot_id) {
            return;
        }

        let incoming = IncomingMessage {
            id: Uuid::new_v4(),
            channel: "discord".to_string(),
            message_id: msg.id.to_string(),
            sender_id: msg.author.id.to_string(),
            sender_name: Some(
                msg.author
                    .global_name
                    .clone()
                    .unwrap_or_else(|| msg.author.name.clone()),
            ),
            text: msg.content.clone(),
            timestamp: DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0)
                .unwrap_or_else(Utc::now),
            reply_target: msg.channel_id.to_string(),
            bot_id: Some(bot_id.to_string()),
        };

        if self.tx.send(incoming).await.is_err() {
            warn!("discord: message receiver dropped, ignoring message {}", msg.id);
        }
    }
}

/// A message is for the bot when a human wrote it and it mentions the bot.
pub(crate) fn is_addressed(author_is_bot: bool, mentioned: &[u64], bot_id: u64) -> bool {
    !author_is_bot && mentioned.contains(&bot_id)
}
