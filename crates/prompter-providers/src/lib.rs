//! # prompter-providers
//!
//! Text generation providers for Prompter.

pub mod gemini;

pub use gemini::{GeminiProvider, ModelInfo};
