//! Google Gemini API provider.
//!
//! Calls the Gemini `generateContent` endpoint. Auth via URL query param.

use async_trait::async_trait;
use prompter_core::{
    config::GeminiConfig,
    error::{BotError, GenerationError, GenerationErrorKind},
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, warn};

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from config values.
    pub fn from_config(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn request_body(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: self.config.safety_threshold.clone(),
                })
                .collect(),
        }
    }

    /// One `generateContent` call against `model`.
    async fn call(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/models/{model}:generateContent?key={}",
            self.base_url(),
            self.config.api_key
        );
        debug!("gemini: POST models/{model}:generateContent");
        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::transport(format!("gemini request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_http_failure(model, status, &text));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|e| {
            GenerationError::transport(format!("gemini: failed to parse response: {}", e.without_url()))
        })?;

        let text = extract_text(&parsed)?;
        info!(
            "gemini: {model} answered {} chars in {}ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    /// Models available to the API key that support `generateContent`.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, BotError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/models?pageSize=1000&key={}",
                self.base_url(),
                self.config.api_key
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={token}"));
            }

            let resp = self.client.get(&url).send().await.map_err(|e| {
                BotError::Provider(format!("gemini list models failed: {}", e.without_url()))
            })?;

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                return Err(BotError::Provider(format!(
                    "gemini list models returned {status}: {text}"
                )));
            }

            let page: ListModelsResponse = resp.json().await.map_err(|e| {
                BotError::Provider(format!("gemini: failed to parse model list: {}", e.without_url()))
            })?;

            models.extend(
                page.models
                    .into_iter()
                    .filter(|m| {
                        m.supported_generation_methods
                            .iter()
                            .any(|method| method == "generateContent")
                    })
                    .map(|m| ModelInfo {
                        name: m
                            .name
                            .strip_prefix("models/")
                            .unwrap_or(&m.name)
                            .to_string(),
                        display_name: m.display_name,
                    }),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}

/// A model that can serve `generateContent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier without the `models/` prefix, e.g. `gemini-1.5-pro`.
    pub name: String,
    pub display_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<RemoteModel>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Pull the answer out of a successful response body.
fn extract_text(resp: &GeminiResponse) -> Result<String, GenerationError> {
    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        warn!("gemini: prompt blocked by safety filter: {reason}");
        return Err(GenerationError::blocked(reason));
    }

    let Some(candidate) = resp.candidates.as_ref().and_then(|c| c.first()) else {
        warn!("gemini: response has no candidates");
        return Err(GenerationError::empty());
    };

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            warn!("gemini: answer blocked by safety filter");
            return Err(GenerationError::blocked("SAFETY"));
        }
        warn!("gemini: candidate carried no text");
        return Err(GenerationError::empty());
    }

    Ok(text)
}

/// Map a non-2xx response to a generation error.
fn classify_http_failure(
    model: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> GenerationError {
    if status == reqwest::StatusCode::NOT_FOUND
        || body.contains("not found for API version")
        || body.contains("is not supported for generateContent")
    {
        error!("gemini: model {model} is not available to this API key; run `prompter models` to list the ones that are");
        return GenerationError::model_unavailable(format!("{model}: {status}"));
    }

    if body.contains("API key not valid") {
        error!("gemini: API key is invalid; create a new key in Google AI Studio and set GEMINI_API_KEY");
    }

    GenerationError::transport(format!("gemini returned {status}: {body}"))
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let model = &self.config.model;
        match self.call(model, prompt).await {
            Err(e)
                if e.kind == GenerationErrorKind::ModelUnavailable
                    && *model != self.config.fallback_model =>
            {
                let fallback = &self.config.fallback_model;
                warn!("gemini: {model} unavailable, retrying once with {fallback}");
                self.call(fallback, prompt).await
            }
            other => other,
        }
    }

    async fn is_available(&self) -> bool {
        if self.config.api_key.is_empty() {
            warn!("gemini: no API key configured");
            return false;
        }
        let url = format!("{}/models?pageSize=1&key={}", self.base_url(), self.config.api_key);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("gemini not available: {}", e.without_url());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const MODEL_PATH: &str = "/models/gemini-1.5-pro:generateContent";

    fn provider(base_url: &str, model: &str) -> GeminiProvider {
        GeminiProvider::from_config(GeminiConfig {
            api_key: "test-key".into(),
            model: model.into(),
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    fn answer_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_gemini_provider_name() {
        let p = provider("http://localhost", "gemini-1.5-pro");
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_request_carries_fixed_generation_and_safety_config() {
        let p = provider("http://localhost", "gemini-1.5-pro");
        let json = serde_json::to_value(p.request_body("Hello")).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");

        let gen = &json["generationConfig"];
        assert!((gen["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(gen["topK"], 1);
        assert_eq!(gen["topP"], 1.0);
        assert_eq!(gen["maxOutputTokens"], 2048);

        let safety = json["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        assert!(safety
            .iter()
            .all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
        assert_eq!(safety[1]["category"], "HARM_CATEGORY_HATE_SPEECH");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hi "},{"text":"there!"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&resp).unwrap(), "Hi there!");
    }

    #[test]
    fn test_extract_text_block_reason() {
        let resp: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = extract_text(&resp).unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Blocked);
        assert_eq!(err.detail.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_extract_text_safety_finish_without_text() {
        let resp: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(
            extract_text(&resp).unwrap_err().kind,
            GenerationErrorKind::Blocked
        );
    }

    #[test]
    fn test_extract_text_empty() {
        let resp: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(
            extract_text(&resp).unwrap_err().kind,
            GenerationErrorKind::EmptyResponse
        );

        let resp: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert_eq!(
            extract_text(&resp).unwrap_err().kind,
            GenerationErrorKind::EmptyResponse
        );
    }

    #[test]
    fn test_classify_http_failure() {
        let err = classify_http_failure(
            "gemini-x",
            reqwest::StatusCode::BAD_REQUEST,
            "models/gemini-x is not found for API version v1beta",
        );
        assert_eq!(err.kind, GenerationErrorKind::ModelUnavailable);

        let err = classify_http_failure("gemini-x", reqwest::StatusCode::NOT_FOUND, "");
        assert_eq!(err.kind, GenerationErrorKind::ModelUnavailable);

        let err = classify_http_failure(
            "gemini-x",
            reqwest::StatusCode::BAD_REQUEST,
            "API key not valid. Please pass a valid API key.",
        );
        assert_eq!(err.kind, GenerationErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", MODEL_PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Answer: hi"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(answer_body("Hello!"))
            .create_async()
            .await;

        let p = provider(&server.url(), "gemini-1.5-pro");
        assert_eq!(p.generate("Answer: hi").await.unwrap(), "Hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_blocked() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", MODEL_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#)
            .create_async()
            .await;

        let p = provider(&server.url(), "gemini-1.5-pro");
        let err = p.generate("something").await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Blocked);
    }

    #[tokio::test]
    async fn test_generate_falls_back_once() {
        let mut server = mockito::Server::new_async().await;
        let missing = server
            .mock("POST", "/models/gemini-9-ultra:generateContent")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"message":"models/gemini-9-ultra is not found for API version v1beta"}}"#)
            .expect(1)
            .create_async()
            .await;
        let fallback = server
            .mock("POST", MODEL_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(answer_body("from fallback"))
            .expect(1)
            .create_async()
            .await;

        let p = provider(&server.url(), "gemini-9-ultra");
        assert_eq!(p.generate("q").await.unwrap(), "from fallback");
        missing.assert_async().await;
        fallback.assert_async().await;
    }

    #[tokio::test]
    async fn test_fallback_failure_does_not_recurse() {
        let mut server = mockito::Server::new_async().await;
        let missing = server
            .mock("POST", "/models/gemini-9-ultra:generateContent")
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let fallback = server
            .mock("POST", MODEL_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let p = provider(&server.url(), "gemini-9-ultra");
        let err = p.generate("q").await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ModelUnavailable);
        missing.assert_async().await;
        fallback.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_fallback_when_model_is_fallback() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", MODEL_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let p = provider(&server.url(), "gemini-1.5-pro");
        let err = p.generate("q").await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ModelUnavailable);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", MODEL_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let p = provider(&server.url(), "gemini-1.5-pro");
        let err = p.generate("q").await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Transport);
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_list_models_filters_and_pages() {
        let mut server = mockito::Server::new_async().await;
        let page_one = server
            .mock("GET", "/models")
            .match_query(Matcher::Exact("pageSize=1000&key=test-key".into()))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "models": [
                        {"name": "models/gemini-1.5-pro", "displayName": "Gemini 1.5 Pro",
                         "supportedGenerationMethods": ["generateContent", "countTokens"]},
                        {"name": "models/embedding-001",
                         "supportedGenerationMethods": ["embedContent"]}
                    ],
                    "nextPageToken": "p2"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let page_two = server
            .mock("GET", "/models")
            .match_query(Matcher::Exact(
                "pageSize=1000&key=test-key&pageToken=p2".into(),
            ))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "models": [
                        {"name": "models/gemini-1.5-flash",
                         "supportedGenerationMethods": ["generateContent"]}
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let p = provider(&server.url(), "gemini-1.5-pro");
        let models = p.list_models().await.unwrap();
        assert_eq!(
            models,
            vec![
                ModelInfo {
                    name: "gemini-1.5-pro".into(),
                    display_name: Some("Gemini 1.5 Pro".into()),
                },
                ModelInfo {
                    name: "gemini-1.5-flash".into(),
                    display_name: None,
                },
            ]
        );
        page_two.assert_async().await;
        page_one.assert_async().await;
    }

    #[tokio::test]
    async fn test_is_available_without_key() {
        let p = GeminiProvider::from_config(GeminiConfig::default());
        assert!(!p.is_available().await);
    }
}
