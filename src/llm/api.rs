//! OpenAI-compatible chat completion client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{LlmError, Result};

use super::key::ApiKeyResolver;
use super::TextGenerator;

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI error response format.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    code: Option<String>,
}

/// Outcome of checking a candidate API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValidation {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl KeyValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// Single-turn chat completion client.
///
/// Every prompt is sent as one system message with no conversation history.
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    keys: Arc<ApiKeyResolver>,
}

impl ChatCompletionClient {
    /// Create a client from configuration.
    pub fn from_config(config: &LlmConfig, keys: Arc<ApiKeyResolver>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            keys,
        })
    }

    /// The key resolver backing this client.
    pub fn keys(&self) -> &Arc<ApiKeyResolver> {
        &self.keys
    }

    /// Check a candidate key by listing models with it.
    ///
    /// Never fails; transport and API errors become an invalid result.
    pub async fn validate_api_key(&self, api_key: &str) -> KeyValidation {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return KeyValidation::invalid("Key is empty");
        }

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => KeyValidation::valid(),
            Ok(response) => {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                KeyValidation::invalid(error_message(status, &text))
            }
            Err(e) => KeyValidation::invalid(transport_message(&e)),
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.keys.resolve().await?;

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "system",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Api(transport_message(&e)))?;

        let status = response.status();

        if status.is_success() {
            let result: ChatResponse = response
                .json()
                .await
                .map_err(|e| LlmError::Api(format!("Failed to parse response: {}", e)))?;

            let content = result
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .map(|c| c.trim().to_string())
                .unwrap_or_default();

            if content.is_empty() {
                return Err(LlmError::EmptyCompletion.into());
            }
            Ok(content)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Err(LlmError::RateLimited.into())
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            if status == StatusCode::UNAUTHORIZED {
                // The stored key was rotated or revoked.
                self.keys.invalidate().await;
            }

            if is_quota_error(&error_text) {
                return Err(LlmError::RateLimited.into());
            }
            Err(LlmError::Api(error_message(status, &error_text)).into())
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn transport_message(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => format!("API error ({}): {}", status, parsed.error.message),
        Err(_) => format!("API error ({}): {}", status, body),
    }
}

fn is_quota_error(body: &str) -> bool {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => {
            parsed.error.code.as_deref() == Some("insufficient_quota")
                || parsed.error.message.to_lowercase().contains("quota")
        }
        Err(_) => body.to_lowercase().contains("quota"),
    }
}
