use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults::*;

/// Where the prompt template comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Local text file.
    File,
    /// Google Docs document.
    Document,
}

impl PromptMode {
    pub fn display_name(&self) -> &str {
        match self {
            Self::File => "file",
            Self::Document => "google-doc",
        }
    }
}

/// Prompt template source and fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Template file used when no document id is set.
    #[serde(default = "default_prompt_file")]
    pub file_path: String,
    /// Google Docs document id. Non-empty switches to document mode.
    #[serde(default)]
    pub google_doc_id: String,
    /// OAuth client credentials (`installed` or `web` JSON). `token.json` sits beside it.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    /// Template used in file mode when the file cannot be read.
    #[serde(default = "default_fallback_prompt")]
    pub fallback: String,
    /// Template used in document mode when the document cannot be read.
    #[serde(default = "default_unavailable_prompt")]
    pub unavailable: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            file_path: default_prompt_file(),
            google_doc_id: String::new(),
            credentials_path: default_credentials_path(),
            fallback: default_fallback_prompt(),
            unavailable: default_unavailable_prompt(),
        }
    }
}

impl PromptConfig {
    pub fn mode(&self) -> PromptMode {
        if self.google_doc_id.trim().is_empty() {
            PromptMode::File
        } else {
            PromptMode::Document
        }
    }

    /// Template to serve while the configured source is failing.
    pub fn fallback_for_mode(&self) -> &str {
        match self.mode() {
            PromptMode::File => &self.fallback,
            PromptMode::Document => &self.unavailable,
        }
    }

    /// Path of the stored OAuth token, next to the credentials file.
    pub fn token_path(&self) -> PathBuf {
        Path::new(&self.credentials_path)
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("token.json")
    }
}

/// Fixed user-facing strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Shown when generation fails (blocked, empty, upstream errors).
    #[serde(default = "default_api_error")]
    pub api_error: String,
    /// Shown for anything else that goes wrong while answering.
    #[serde(default = "default_unexpected_error")]
    pub unexpected_error: String,
    /// Shown when the message is empty or too short.
    #[serde(default = "default_invalid_input")]
    pub invalid_input: String,
    /// Acknowledgement posted while generation runs; later edited into the answer.
    #[serde(default = "default_processing")]
    pub processing: String,
    /// Prefix used when a reply fails and the text is posted to the channel instead.
    #[serde(default = "default_fallback_notice")]
    pub fallback_notice: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            api_error: default_api_error(),
            unexpected_error: default_unexpected_error(),
            invalid_input: default_invalid_input(),
            processing: default_processing(),
            fallback_notice: default_fallback_notice(),
        }
    }
}
