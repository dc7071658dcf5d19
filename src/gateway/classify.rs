//! Maps a failure to the user-facing text configured for it.

use prompter_core::config::MessagesConfig;
use tracing::{error, warn};

/// What went wrong, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The generation call failed or was blocked.
    GenerationFailure,
    /// The mention carried no usable question.
    InvalidInput,
    /// Anything else, including a crashed generation task.
    UnexpectedError,
}

/// Log `context` and return the configured message for `kind`.
///
/// The returned text never carries `context`.
pub fn classify<'a>(kind: ErrorKind, context: &str, messages: &'a MessagesConfig) -> &'a str {
    match kind {
        ErrorKind::InvalidInput => {
            warn!("invalid input: {context}");
            &messages.invalid_input
        }
        ErrorKind::GenerationFailure => {
            error!("generation failed: {context}");
            &messages.api_error
        }
        ErrorKind::UnexpectedError => {
            error!("unexpected error: {context}");
            &messages.unexpected_error
        }
    }
}
