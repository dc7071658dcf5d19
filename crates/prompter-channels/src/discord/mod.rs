//! Discord channel over the serenity gateway client.
//!
//! Inbound: a gateway event handler forwards messages that mention the bot.
//! Outbound: REST calls through a standalone [`Http`] client.

mod handler;
mod send;

use async_trait::async_trait;
use prompter_core::{
    config::DiscordConfig,
    error::BotError,
    message::{IncomingMessage, SentMessageRef},
    traits::Channel,
};
use serenity::{all::GatewayIntents, gateway::ShardManager, http::Http, Client};
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};

use handler::Handler;

/// Discord channel using the serenity gateway for events and REST for sends.
pub struct DiscordChannel {
    config: DiscordConfig,
    http: Arc<Http>,
    /// The bot's own user id, known once the gateway reports ready.
    bot_id: Arc<OnceLock<u64>>,
    shard_manager: Mutex<Option<Arc<ShardManager>>>,
}

impl DiscordChannel {
    /// Create a new Discord channel from config.
    pub fn new(config: DiscordConfig) -> Self {
        let http = Arc::new(Http::new(&config.bot_token));
        Self {
            config,
            http,
            bot_id: Arc::new(OnceLock::new()),
            shard_manager: Mutex::new(None),
        }
    }

    /// Gateway intents the bot needs to see guild messages and mentions.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MEMBERS
    }

    /// The bot's user id, if the gateway has reported ready.
    pub fn bot_id(&self) -> Option<u64> {
        self.bot_id.get().copied()
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, BotError> {
        let (tx, rx) = mpsc::channel(64);
        let handler = Handler::new(tx, self.bot_id.clone());

        let mut client = Client::builder(&self.config.bot_token, Self::intents())
            .event_handler(handler)
            .await
            .map_err(|e| BotError::Channel(format!("discord client build failed: {e}")))?;

        *self.shard_manager.lock().await = Some(client.shard_manager.clone());

        tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!("discord gateway stopped: {e}");
            }
        });

        info!("Discord channel started");
        Ok(rx)
    }

    async fn reply(
        &self,
        target: &SentMessageRef,
        text: &str,
    ) -> Result<SentMessageRef, BotError> {
        let channel_id = parse_id(&target.channel_id)?;
        let message_id = parse_id(&target.message_id)?;
        self.post(channel_id, text, Some(message_id)).await
    }

    async fn send(&self, channel_id: &str, text: &str) -> Result<SentMessageRef, BotError> {
        let channel_id = parse_id(channel_id)?;
        self.post(channel_id, text, None).await
    }

    async fn edit(
        &self,
        message: &SentMessageRef,
        text: &str,
    ) -> Result<SentMessageRef, BotError> {
        let channel_id = parse_id(&message.channel_id)?;
        let message_id = parse_id(&message.message_id)?;
        self.patch(channel_id, message_id, text).await
    }

    async fn send_typing(&self, channel_id: &str) -> Result<(), BotError> {
        let channel_id = parse_id(channel_id)?;
        self.typing(channel_id).await
    }

    fn mention(&self, user_id: &str) -> String {
        format!("<@{user_id}>")
    }

    async fn stop(&self) -> Result<(), BotError> {
        if let Some(manager) = self.shard_manager.lock().await.take() {
            manager.shutdown_all().await;
            info!("Discord channel stopped");
        }
        Ok(())
    }
}

/// Parse a Discord snowflake. Zero is not a valid id.
pub(crate) fn parse_id(raw: &str) -> Result<u64, BotError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(BotError::Channel(format!("invalid discord id: {raw:?}"))),
        Ok(id) => Ok(id),
    }
}
