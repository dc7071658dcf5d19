//! # prompter-core
//!
//! Core types, traits, configuration, and error handling for the Prompter bot.

pub mod config;
pub mod error;
pub mod message;
pub mod template;
pub mod traits;
