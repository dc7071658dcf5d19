//! # prompter-channels
//!
//! Chat platform integrations and delivery policy for Prompter.

pub mod discord;
pub mod outbox;
pub mod utils;

pub use outbox::Outbox;
