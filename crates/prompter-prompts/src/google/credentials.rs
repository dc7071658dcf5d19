//! `credentials.json` and `token.json` on disk.

use prompter_core::error::BotError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The file wraps the client in an `installed` or `web` key.
#[derive(Deserialize)]
struct CredentialsFile {
    installed: Option<ClientCredentials>,
    web: Option<ClientCredentials>,
}

impl ClientCredentials {
    pub fn parse(json: &str) -> Result<Self, BotError> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| BotError::Config(format!("invalid google credentials: {e}")))?;
        file.installed.or(file.web).ok_or_else(|| {
            BotError::Config("google credentials have neither `installed` nor `web` client".into())
        })
    }

    pub async fn load(path: &Path) -> Result<Self, BotError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            BotError::Config(format!(
                "google credentials not found at {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&json)
    }

    /// Redirect URI registered for the client. The first one wins.
    pub fn redirect_uri(&self) -> Result<&str, BotError> {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .ok_or_else(|| BotError::Config("google credentials list no redirect_uris".into()))
    }
}

/// Stored user token, in the same shape the Google client libraries write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry as Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

/// Treat a token as expired this long before it really is.
const EXPIRY_SKEW_MS: i64 = 60_000;

impl StoredToken {
    pub async fn load(path: &Path) -> Result<Self, BotError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            BotError::Prompt(format!(
                "google token not found at {} (run `prompter authorize`): {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&json)
            .map_err(|e| BotError::Prompt(format!("invalid google token file: {e}")))
    }

    pub async fn save(&self, path: &Path) -> Result<(), BotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Whether the access token must be refreshed before use at `now_ms`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        match self.expiry_date {
            Some(expiry) => expiry - EXPIRY_SKEW_MS <= now_ms,
            None => false,
        }
    }
}
