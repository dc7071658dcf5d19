//! Installed-app OAuth flow for read-only Docs access.

use super::credentials::{ClientCredentials, StoredToken};
use prompter_core::error::BotError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DOCS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/documents.readonly";

/// Consent page URL. Asks for offline access so a refresh token is issued.
pub fn authorization_url(creds: &ClientCredentials) -> Result<String, BotError> {
    let params = [
        ("client_id", creds.client_id.as_str()),
        ("redirect_uri", creds.redirect_uri()?),
        ("response_type", "code"),
        ("scope", DOCS_READONLY_SCOPE),
        ("access_type", "offline"),
        ("prompt", "consent"),
        ("include_granted_scopes", "true"),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Ok(format!("{}?{query}", creds.auth_uri))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_stored(self, previous_refresh: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(String::from)),
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp_millis() + secs * 1000),
        }
    }
}

async fn token_request(
    client: &reqwest::Client,
    creds: &ClientCredentials,
    form: &[(&str, &str)],
) -> Result<TokenResponse, BotError> {
    let resp = client
        .post(&creds.token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| BotError::Prompt(format!("google token request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BotError::Prompt(format!(
            "google token endpoint returned {status}: {body}"
        )));
    }

    resp.json()
        .await
        .map_err(|e| BotError::Prompt(format!("google token response unreadable: {e}")))
}

/// Trade an authorization code for tokens.
pub async fn exchange_code(
    client: &reqwest::Client,
    creds: &ClientCredentials,
    code: &str,
) -> Result<StoredToken, BotError> {
    let redirect_uri = creds.redirect_uri()?;
    let resp = token_request(
        client,
        creds,
        &[
            ("grant_type", "authorization_code"),
            ("code", code.trim()),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ],
    )
    .await?;
    Ok(resp.into_stored(None))
}

/// Get a new access token. The refresh token is kept when Google omits it.
pub async fn refresh(
    client: &reqwest::Client,
    creds: &ClientCredentials,
    refresh_token: &str,
) -> Result<StoredToken, BotError> {
    let resp = token_request(
        client,
        creds,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
        ],
    )
    .await?;
    Ok(resp.into_stored(Some(refresh_token)))
}

/// Exchange `code` and write `token_path`. Returns the written path.
pub async fn authorize_with_code(
    credentials_path: &Path,
    token_path: &Path,
    code: &str,
) -> Result<PathBuf, BotError> {
    let creds = ClientCredentials::load(credentials_path).await?;
    let token = exchange_code(&reqwest::Client::new(), &creds, code).await?;
    token.save(token_path).await?;
    info!("google token saved to {}", token_path.display());
    Ok(token_path.to_path_buf())
}
