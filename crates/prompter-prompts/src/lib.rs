//! # prompter-prompts
//!
//! Prompt template storage: a hot-swappable slot fed by a file or a
//! Google Docs document.

pub mod file;
pub mod google;
pub mod store;

use async_trait::async_trait;
use prompter_core::error::BotError;

pub use file::FileSource;
pub use google::GoogleDocSource;
pub use store::PromptStore;

/// Somewhere a prompt template can be fetched from.
#[async_trait]
pub trait PromptSource: Send + Sync {
    /// Short description for logs and status output.
    fn describe(&self) -> String;

    /// Fetch the raw template text.
    async fn fetch(&self) -> Result<String, BotError>;
}
