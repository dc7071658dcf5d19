//! Message processing pipeline: the handle_message flow.

use super::classify::{classify, ErrorKind};
use super::Gateway;
use prompter_core::{
    message::{IncomingMessage, SentMessageRef},
    template,
};
use tracing::{debug, error, info, warn};

/// Shortest question worth sending to the model, in characters.
pub const MIN_INPUT_CHARS: usize = 5;

impl Gateway {
    /// Process a single mention through the full pipeline.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        // --- 1. STRIP MENTION ---
        let text = incoming.stripped_text();
        info!(
            "[{}] {} says: {}",
            incoming.channel,
            incoming.sender_name.as_deref().unwrap_or("unknown"),
            preview(&text, 60)
        );

        // --- 2. VALIDATE ---
        if text.chars().count() < MIN_INPUT_CHARS {
            let reply = classify(
                ErrorKind::InvalidInput,
                &format!(
                    "{} chars from {} in {}",
                    text.chars().count(),
                    incoming.sender_id,
                    incoming.reply_target
                ),
                &self.messages,
            );
            if let Err(e) = self.outbox.reply(&incoming, reply).await {
                error!("[{}] invalid-input notice dropped: {e}", incoming.id);
            }
            return;
        }

        // --- 3. ACKNOWLEDGE ---
        let ack = self.acknowledge(&incoming).await;

        // --- 4. GENERATE ---
        let answer = match self.generate(&text).await {
            Ok(answer) => answer,
            Err((kind, context)) => classify(kind, &context, &self.messages).to_string(),
        };

        // --- 5. DELIVER ---
        self.deliver(&incoming, ack.as_ref(), &answer).await;
    }

    /// Post the processing notice and a typing indicator.
    ///
    /// Returns the notice so the answer can replace it. `None` when the
    /// notice is disabled or could not be posted.
    async fn acknowledge(&self, incoming: &IncomingMessage) -> Option<SentMessageRef> {
        self.outbox.typing(&incoming.reply_target).await;

        if self.messages.processing.trim().is_empty() {
            return None;
        }

        match self
            .outbox
            .channel()
            .reply(&incoming.source_ref(), &self.messages.processing)
            .await
        {
            Ok(sent) => Some(sent),
            Err(e) => {
                warn!("[{}] ack failed, answering by reply: {e}", incoming.id);
                None
            }
        }
    }

    /// Fill the current template and run the provider in its own task.
    async fn generate(&self, text: &str) -> Result<String, (ErrorKind, String)> {
        let template = self.prompts.current();
        let prompt = template::fill(&template, text);
        info!(
            "generating with {} ({}) for: {}",
            self.provider.name(),
            self.provider.model(),
            preview(text, 50)
        );
        debug!("filled prompt is {} chars", prompt.chars().count());

        let provider = self.provider.clone();
        let task = tokio::spawn(async move { provider.generate(&prompt).await });

        match task.await {
            Ok(Ok(answer)) => {
                info!("generated {} chars", answer.chars().count());
                Ok(answer)
            }
            Ok(Err(e)) => Err((ErrorKind::GenerationFailure, e.to_string())),
            Err(e) => Err((
                ErrorKind::UnexpectedError,
                format!("generation task failed: {e}"),
            )),
        }
    }

    /// Send the final text: edit the ack when there is one, reply otherwise.
    async fn deliver(&self, incoming: &IncomingMessage, ack: Option<&SentMessageRef>, text: &str) {
        let result = match ack {
            Some(ack) => self.outbox.edit(ack, text).await,
            None => self.outbox.reply(incoming, text).await,
        };
        match result {
            Ok(sent) => debug!("[{}] delivered as {}", incoming.id, sent.message_id),
            Err(e) => error!("[{}] answer dropped: {e}", incoming.id),
        }
    }
}

fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let truncated: String = text.chars().take(max).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}
