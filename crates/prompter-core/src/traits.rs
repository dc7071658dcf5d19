use crate::{
    error::{BotError, GenerationError},
    message::{IncomingMessage, SentMessageRef},
};
use async_trait::async_trait;

/// AI Provider trait. Turns a filled prompt into an answer.
///
/// The decoding and safety configuration is fixed per provider instance;
/// nothing about a single call changes it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Model identifier used for calls.
    fn model(&self) -> &str;

    /// Generate text for a fully filled prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Check if the provider is reachable with the configured credentials.
    async fn is_available(&self) -> bool;
}

/// Messaging Channel trait. Transport primitives for one chat platform.
///
/// Implementations send exactly what they are given. Length limits,
/// chunking, and fallbacks live in the outbox layered on top.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for messages addressed to the bot.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, BotError>;

    /// Send `text` as a reply to `target`.
    async fn reply(&self, target: &SentMessageRef, text: &str)
        -> Result<SentMessageRef, BotError>;

    /// Send `text` to a channel without a reply reference.
    async fn send(&self, channel_id: &str, text: &str) -> Result<SentMessageRef, BotError>;

    /// Replace the content of a message the bot sent earlier.
    async fn edit(&self, message: &SentMessageRef, text: &str)
        -> Result<SentMessageRef, BotError>;

    /// Send a typing indicator to show the bot is processing.
    async fn send_typing(&self, _channel_id: &str) -> Result<(), BotError> {
        Ok(())
    }

    /// Platform markup that pings a user.
    fn mention(&self, user_id: &str) -> String {
        format!("@{user_id}")
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), BotError>;
}
