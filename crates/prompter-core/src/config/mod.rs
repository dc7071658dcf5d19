mod channels;
mod defaults;
mod env;
mod prompts;
mod providers;


pub use channels::*;
pub use env::*;
pub use prompts::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::BotError;
use defaults::*;

/// Top-level Prompter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for a daily-rolled log file. Empty = stdout only.
    #[serde(default)]
    pub log_dir: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// HTTP health surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

impl Config {
    /// Overlay environment variables on top of file values.
    ///
    /// Empty variables are ignored. An unparsable `PORT` keeps the file value.
    pub fn apply_env(&mut self, env: &impl ReadEnv) {
        let read = |key: &str| env.var(key).ok().filter(|v| !v.trim().is_empty());

        if let Some(v) = read("DISCORD_TOKEN") {
            self.channel.discord.bot_token = v;
        }
        if let Some(v) = read("GEMINI_API_KEY") {
            self.provider.gemini.api_key = v;
        }
        if let Some(v) = read("GEMINI_MODEL_NAME") {
            self.provider.gemini.model = v;
        }
        if let Some(v) = read("PROMPT_FILE_PATH") {
            self.prompt.file_path = v;
        }
        if let Some(v) = read("GOOGLE_DOC_ID") {
            self.prompt.google_doc_id = v;
        }
        if let Some(v) = read("GOOGLE_CREDENTIALS_PATH") {
            self.prompt.credentials_path = v;
        }
        if let Some(v) = read("ERROR_MESSAGE_API") {
            self.messages.api_error = v;
        }
        if let Some(v) = read("ERROR_MESSAGE_UNEXPECTED") {
            self.messages.unexpected_error = v;
        }
        if let Some(v) = read("MESSAGE_INVALID_INPUT") {
            self.messages.invalid_input = v;
        }
        if let Some(v) = read("LOG_LEVEL") {
            self.bot.log_level = v;
        }
        if let Some(v) = read("PORT") {
            match v.trim().parse::<u16>() {
                Ok(port) => self.api.port = port,
                Err(_) => warn!("ignoring invalid PORT value {v:?}"),
            }
        }
    }

    /// Check that everything required to talk to Discord and Gemini is present.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.channel.discord.bot_token.trim().is_empty() {
            return Err(BotError::Config(
                "Discord bot token is not set (DISCORD_TOKEN or [channel.discord].bot_token)"
                    .into(),
            ));
        }
        if self.provider.gemini.api_key.trim().is_empty() {
            return Err(BotError::Config(
                "Gemini API key is not set (GEMINI_API_KEY or [provider.gemini].api_key)".into(),
            ));
        }
        if self.provider.gemini.model.trim().is_empty() {
            return Err(BotError::Config("Gemini model name is empty".into()));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, BotError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| BotError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| BotError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

/// Load the file, then overlay the environment.
pub fn load_with_env(path: &str, env: &impl ReadEnv) -> Result<Config, BotError> {
    let mut config = load(path)?;
    config.apply_env(env);
    Ok(config)
}
