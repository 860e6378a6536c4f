// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Vision/language provider client (OpenAI-compatible chat completions)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::{CaptionsError, Result};

/// A provider able to describe images and complete text prompts.
///
/// Every pipeline stage that talks to the outside world goes through this
/// trait, so tests can substitute a mock.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send one image (base64 JPEG) with a prompt and return the completion text
    async fn describe_image(&self, prompt: &str, image_base64: &str) -> Result<String>;

    /// Complete a text-only prompt
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible API client
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    text_model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<serde_json::Value>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u64,
}

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    id: String,
}

impl OpenAiClient {
    /// Create a new client; fails when no API key is configured
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            CaptionsError::Configuration("OPENAI_API_KEY environment variable is required".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CaptionsError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        // Normalize URL
        let base_url = config
            .base_url
            .trim_end_matches('/')
            .replace("/chat/completions", "");

        Ok(Self {
            client,
            base_url,
            api_key,
            model: config.model.clone(),
            text_model: config.text_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Check that the provider is reachable and the key is accepted
    pub async fn health_check(&self) -> Result<()> {
        self.list_models().await.map(|_| ())
    }

    /// List models visible to this API key
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                CaptionsError::provider(format!("Cannot connect to provider at {}: {}", self.base_url, e))
            })?;

        let response = check_status(response).await?;
        let models: ModelsResponse = response.json().await?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    async fn chat(&self, model: &str, content: serde_json::Value) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model,
            messages: vec![json!({ "role": "user", "content": content })],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CaptionsError::provider(format!("Request to {} failed: {}", url, e)))?;

        let response = check_status(response).await?;

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| CaptionsError::provider(format!("Malformed provider response: {}", e)))?;

        if let Some(usage) = &result.usage {
            debug!("Provider usage: {} tokens", usage.total_tokens);
        }

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CaptionsError::provider("Provider returned an empty completion"))
    }
}

#[async_trait]
impl VisionProvider for OpenAiClient {
    async fn describe_image(&self, prompt: &str, image_base64: &str) -> Result<String> {
        debug!("Sending vision request: model={}", self.model);

        let content = json!([
            { "type": "text", "text": prompt },
            {
                "type": "image_url",
                "image_url": { "url": format!("data:image/jpeg;base64,{}", image_base64) }
            }
        ]);

        self.chat(&self.model, content).await
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        debug!("Sending text request: model={}", self.text_model);
        self.chat(&self.text_model, json!(prompt)).await
    }
}

/// Turn a non-success HTTP response into a provider error carrying the status
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail: String = body.chars().take(300).collect();
    warn!("Provider returned {}: {}", status, detail);

    let message = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("authentication failed: {}", detail)
        }
        StatusCode::TOO_MANY_REQUESTS => format!("rate limit exceeded: {}", detail),
        _ => format!("provider returned {}: {}", status, detail),
    };

    Err(CaptionsError::Provider {
        status: Some(status.as_u16()),
        message,
    })
}

/// Strip markdown code fences that models like to wrap JSON replies in
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::routing::{get, post};
    use axum::{Json, Router};

    /// Serve `app` on an ephemeral local port and return its `/v1` base URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn client_for(base_url: String) -> OpenAiClient {
        let config = AiConfig {
            api_key: Some("sk-test".to_string()),
            base_url,
            timeout_secs: 5,
            ..AiConfig::default()
        };
        OpenAiClient::new(&config).unwrap()
    }

    /// A completions endpoint that always answers with `status` and `body`
    fn failing_completions(status: HttpStatus, body: &'static str) -> Router {
        Router::new().route("/v1/chat/completions", post(move || async move { (status, body) }))
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = AiConfig::default();
        let err = OpenAiClient::new(&config).err().unwrap();
        assert!(matches!(err, CaptionsError::Configuration(_)));
    }

    #[test]
    fn test_base_url_normalized() {
        let config = AiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:9999/v1/chat/completions/".to_string(),
            ..AiConfig::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\nplain\n```"), "plain");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_provider_error() {
        let config = AiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            ..AiConfig::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        let err = client.generate_text("hello").await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ProviderError);
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_failure() {
        let base = serve(failing_completions(HttpStatus::UNAUTHORIZED, "invalid api key")).await;
        let err = client_for(base).generate_text("hello").await.unwrap_err();

        match &err {
            CaptionsError::Provider { status, message } => {
                assert_eq!(*status, Some(401));
                assert!(message.starts_with("authentication failed"), "{}", message);
                assert!(message.contains("invalid api key"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_too_many_requests_maps_to_rate_limit() {
        let base = serve(failing_completions(HttpStatus::TOO_MANY_REQUESTS, "slow down")).await;
        let err = client_for(base).describe_image("describe", "aGVsbG8=").await.unwrap_err();

        match err {
            CaptionsError::Provider { status, message } => {
                assert_eq!(status, Some(429));
                assert!(message.starts_with("rate limit exceeded"), "{}", message);
                assert!(message.contains("slow down"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_body() {
        let base = serve(failing_completions(HttpStatus::INTERNAL_SERVER_ERROR, "upstream exploded")).await;
        let err = client_for(base).generate_text("hello").await.unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::ProviderError);
        match err {
            CaptionsError::Provider { status, message } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("500"), "{}", message);
                assert!(message.contains("upstream exploded"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_completion_text_returned_with_bearer_auth() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer sk-test");
                if !authorized {
                    return (HttpStatus::UNAUTHORIZED, Json(serde_json::json!({})));
                }
                (
                    HttpStatus::OK,
                    Json(serde_json::json!({
                        "choices": [{ "message": { "content": "Sunday pasta" } }],
                        "usage": { "total_tokens": 12 }
                    })),
                )
            }),
        );
        let base = serve(app).await;

        let text = client_for(base).generate_text("hello").await.unwrap();
        assert_eq!(text, "Sunday pasta");
    }

    #[tokio::test]
    async fn test_empty_completion_is_provider_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(serde_json::json!({ "choices": [{ "message": { "content": "  " } }] })) }),
        );
        let base = serve(app).await;

        let err = client_for(base).generate_text("hello").await.unwrap_err();
        assert!(err.to_string().contains("empty completion"));
    }

    #[tokio::test]
    async fn test_health_check_and_models() {
        let app = Router::new().route(
            "/v1/models",
            get(|| async { Json(serde_json::json!({ "data": [{ "id": "gpt-4o" }, { "id": "gpt-4o-mini" }] })) }),
        );
        let client = client_for(serve(app).await);

        client.health_check().await.unwrap();
        assert_eq!(client.list_models().await.unwrap(), vec!["gpt-4o", "gpt-4o-mini"]);
    }
}
