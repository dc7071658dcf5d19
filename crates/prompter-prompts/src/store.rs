//! The live prompt template slot.

use crate::{FileSource, GoogleDocSource, PromptSource};
use prompter_core::{
    config::{PromptConfig, PromptMode},
    error::BotError,
};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Holds the current prompt template and swaps it atomically on load.
///
/// Readers get an `Arc` snapshot; a load in progress never blocks them.
pub struct PromptStore {
    source: Box<dyn PromptSource>,
    fallback: Arc<String>,
    slot: RwLock<Arc<String>>,
}

impl PromptStore {
    pub fn new(source: Box<dyn PromptSource>, fallback: impl Into<String>) -> Self {
        let fallback = Arc::new(fallback.into());
        Self {
            source,
            slot: RwLock::new(fallback.clone()),
            fallback,
        }
    }

    /// Build the store for the configured mode: a Google Doc when a document
    /// id is set, the template file otherwise.
    pub fn from_config(config: &PromptConfig) -> Self {
        let source: Box<dyn PromptSource> = match config.mode() {
            PromptMode::File => Box::new(FileSource::new(&config.file_path)),
            PromptMode::Document => Box::new(GoogleDocSource::new(
                config.google_doc_id.trim(),
                &config.credentials_path,
                config.token_path(),
            )),
        };
        Self::new(source, config.fallback_for_mode())
    }

    /// Fetch the template from the source and install it.
    ///
    /// On failure the fallback template is installed and the error returned.
    pub async fn load(&self) -> Result<(), BotError> {
        let fetched = self.source.fetch().await.and_then(|text| {
            if text.trim().is_empty() {
                Err(BotError::Prompt(format!(
                    "{} returned an empty template",
                    self.source.describe()
                )))
            } else {
                Ok(text)
            }
        });

        match fetched {
            Ok(text) => {
                info!(
                    "prompt loaded from {} ({} chars)",
                    self.source.describe(),
                    text.chars().count()
                );
                self.install(Arc::new(text));
                Ok(())
            }
            Err(e) => {
                warn!("prompt load failed, using fallback template: {e}");
                self.install(self.fallback.clone());
                Err(e)
            }
        }
    }

    /// Same as [`load`](Self::load).
    pub async fn reload(&self) -> Result<(), BotError> {
        self.load().await
    }

    /// The template in effect right now.
    pub fn current(&self) -> Arc<String> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    fn install(&self, template: Arc<String>) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = template;
    }
}
