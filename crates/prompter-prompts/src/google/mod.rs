//! Prompt template read from a Google Docs document.
//!
//! Auth is a stored user token (`token.json`) for an OAuth client described
//! by `credentials.json`; an expired token is refreshed and written back.

pub mod credentials;
mod docs;
pub mod oauth;

use crate::PromptSource;
use async_trait::async_trait;
use prompter_core::error::BotError;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use credentials::{ClientCredentials, StoredToken};

const DOCS_BASE_URL: &str = "https://docs.googleapis.com/v1";

pub struct GoogleDocSource {
    client: reqwest::Client,
    document_id: String,
    credentials_path: PathBuf,
    token_path: PathBuf,
    docs_base_url: String,
}

impl GoogleDocSource {
    pub fn new(
        document_id: impl Into<String>,
        credentials_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            document_id: document_id.into(),
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
            docs_base_url: DOCS_BASE_URL.to_string(),
        }
    }

    /// Point document requests at another Docs API root.
    pub fn with_docs_base_url(mut self, url: impl Into<String>) -> Self {
        self.docs_base_url = url.into();
        self
    }

    /// A usable access token, refreshed and persisted if it had expired.
    async fn access_token(&self) -> Result<String, BotError> {
        let creds = ClientCredentials::load(&self.credentials_path).await?;
        let token = StoredToken::load(&self.token_path).await?;

        if !token.is_expired(chrono::Utc::now().timestamp_millis()) {
            return Ok(token.access_token);
        }

        let Some(refresh_token) = token.refresh_token.as_deref() else {
            return Err(BotError::Prompt(
                "google token expired and has no refresh token (run `prompter authorize`)".into(),
            ));
        };

        debug!("google: access token expired, refreshing");
        let fresh = oauth::refresh(&self.client, &creds, refresh_token).await?;
        if let Err(e) = fresh.save(&self.token_path).await {
            warn!("google: refreshed token could not be saved: {e}");
        } else {
            info!("google: refreshed token saved to {}", self.token_path.display());
        }
        Ok(fresh.access_token)
    }
}

#[async_trait]
impl PromptSource for GoogleDocSource {
    fn describe(&self) -> String {
        format!("google doc {}", self.document_id)
    }

    async fn fetch(&self) -> Result<String, BotError> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/documents/{}",
            self.docs_base_url.trim_end_matches('/'),
            urlencoding::encode(&self.document_id)
        );

        let resp = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| BotError::Prompt(format!("google docs request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Prompt(format!(
                "google docs returned {status}: {body}"
            )));
        }

        let document: docs::Document = resp
            .json()
            .await
            .map_err(|e| BotError::Prompt(format!("google docs response unreadable: {e}")))?;

        let text = document.plain_text();
        if text.trim().is_empty() {
            return Err(BotError::Prompt(format!(
                "google doc {} has no text",
                self.document_id
            )));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::path::Path;

    fn write_credentials(dir: &Path, token_uri: &str) -> PathBuf {
        let path = dir.join("credentials.json");
        std::fs::write(
            &path,
            serde_json::json!({"installed": {
                "client_id": "id",
                "client_secret": "secret",
                "redirect_uris": ["http://localhost"],
                "token_uri": token_uri,
            }})
            .to_string(),
        )
        .unwrap();
        path
    }

    fn doc_body(text: &str) -> String {
        serde_json::json!({
            "documentId": "doc-1",
            "body": {"content": [
                {"sectionBreak": {}},
                {"paragraph": {"elements": [{"textRun": {"content": text}}]}}
            ]}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_fetch_with_valid_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/documents/doc-1")
            .match_header("authorization", "Bearer live-token")
            .with_status(200)
            .with_body(doc_body("Answer: {{user_message}}\n"))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let creds = write_credentials(dir.path(), "http://127.0.0.1:1/token");
        let token_path = dir.path().join("token.json");
        std::fs::write(&token_path, r#"{"access_token":"live-token"}"#).unwrap();

        let source =
            GoogleDocSource::new("doc-1", creds, &token_path).with_docs_base_url(server.url());
        assert_eq!(source.fetch().await.unwrap(), "Answer: {{user_message}}\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_saved() {
        let mut server = mockito::Server::new_async().await;
        let refresh = server
            .mock("POST", "/token")
            .match_body(Matcher::UrlEncoded("refresh_token".into(), "rt".into()))
            .with_status(200)
            .with_body(r#"{"access_token":"fresh","expires_in":3600}"#)
            .create_async()
            .await;
        let doc = server
            .mock("GET", "/documents/doc-1")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(doc_body("hi {{user_message}}"))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let creds = write_credentials(dir.path(), &format!("{}/token", server.url()));
        let token_path = dir.path().join("token.json");
        std::fs::write(
            &token_path,
            r#"{"access_token":"stale","refresh_token":"rt","expiry_date":1}"#,
        )
        .unwrap();

        let source =
            GoogleDocSource::new("doc-1", creds, &token_path).with_docs_base_url(server.url());
        assert_eq!(source.fetch().await.unwrap(), "hi {{user_message}}");
        refresh.assert_async().await;
        doc.assert_async().await;

        let saved = StoredToken::load(&token_path).await.unwrap();
        assert_eq!(saved.access_token, "fresh");
        assert_eq!(saved.refresh_token.as_deref(), Some("rt"));
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token() {
        let dir = tempfile::tempdir().unwrap();
        let creds = write_credentials(dir.path(), "http://127.0.0.1:1/token");
        let token_path = dir.path().join("token.json");
        std::fs::write(&token_path, r#"{"access_token":"a","expiry_date":1}"#).unwrap();

        let err = GoogleDocSource::new("doc-1", creds, &token_path)
            .fetch()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("refresh token"));
    }

    #[tokio::test]
    async fn test_empty_document_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/documents/doc-1")
            .with_status(200)
            .with_body(r#"{"body":{"content":[]}}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let creds = write_credentials(dir.path(), "http://127.0.0.1:1/token");
        let token_path = dir.path().join("token.json");
        std::fs::write(&token_path, r#"{"access_token":"t"}"#).unwrap();

        let err = GoogleDocSource::new("doc-1", creds, &token_path)
            .with_docs_base_url(server.url())
            .fetch()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no text"));
    }

    #[tokio::test]
    async fn test_docs_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/documents/doc-1")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let creds = write_credentials(dir.path(), "http://127.0.0.1:1/token");
        let token_path = dir.path().join("token.json");
        std::fs::write(&token_path, r#"{"access_token":"t"}"#).unwrap();

        let err = GoogleDocSource::new("doc-1", creds, &token_path)
            .with_docs_base_url(server.url())
            .fetch()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
