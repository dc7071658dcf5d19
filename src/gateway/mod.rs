//! Gateway: the event loop connecting the chat channel, prompt store, and provider.

mod classify;
mod pipeline;


use prompter_channels::Outbox;
use prompter_core::{config::MessagesConfig, traits::Provider};
use prompter_prompts::PromptStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Routes mentions from the channel through the pipeline.
pub struct Gateway {
    provider: Arc<dyn Provider>,
    outbox: Outbox,
    prompts: Arc<PromptStore>,
    messages: MessagesConfig,
}

impl Gateway {
    pub fn new(
        provider: Arc<dyn Provider>,
        outbox: Outbox,
        prompts: Arc<PromptStore>,
        messages: MessagesConfig,
    ) -> Self {
        Self {
            provider,
            outbox,
            prompts,
            messages,
        }
    }

    /// Start the channel and handle mentions until Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        let channel = self.outbox.channel().clone();
        info!(
            "Prompter gateway running | provider: {} ({}) | channel: {} | prompt: {}",
            self.provider.name(),
            self.provider.model(),
            channel.name(),
            self.prompts.describe(),
        );

        let mut rx = channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel {}: {e}", channel.name()))?;
        info!("Channel started: {}", channel.name());

        loop {
            tokio::select! {
                incoming = rx.recv() => match incoming {
                    Some(incoming) => {
                        let gw = self.clone();
                        tokio::spawn(async move {
                            gw.handle_message(incoming).await;
                        });
                    }
                    None => {
                        warn!("{} stopped delivering messages", channel.name());
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn shutdown(&self) {
        info!("Shutting down...");
        let channel = self.outbox.channel();
        if let Err(e) = channel.stop().await {
            warn!("failed to stop {}: {e}", channel.name());
        }
        info!("Shutdown complete.");
    }
}
