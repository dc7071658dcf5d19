use std::fmt;
use thiserror::Error;

/// Top-level error type for Prompter.
#[derive(Debug, Error)]
pub enum BotError {
    /// Error from an AI provider outside of a generation call (e.g. model listing).
    #[error("provider error: {0}")]
    Provider(String),

    /// A generation call failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Prompt source could not be read.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a generation call produced no usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// The upstream safety policy blocked the prompt or the answer.
    Blocked,
    /// The response carried no candidate text.
    EmptyResponse,
    /// The requested model identifier is not served by the upstream API.
    ModelUnavailable,
    /// Network, HTTP, auth, or decoding failure.
    Transport,
}

impl GenerationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::EmptyResponse => "empty response",
            Self::ModelUnavailable => "model unavailable",
            Self::Transport => "transport",
        }
    }
}

/// A classified generation failure, with optional upstream detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub detail: Option<String>,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Blocked, reason)
    }

    pub fn empty() -> Self {
        Self {
            kind: GenerationErrorKind::EmptyResponse,
            detail: None,
        }
    }

    pub fn model_unavailable(detail: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::ModelUnavailable, detail)
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Transport, detail)
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "generation failed ({}): {detail}", self.kind.as_str()),
            None => write!(f, "generation failed ({})", self.kind.as_str()),
        }
    }
}

impl std::error::Error for GenerationError {}
