//! LLM backend implementations
//!
//! Gemini `generateContent` over HTTPS. Transient failures (network errors,
//! timeouts, 5xx) are retried with exponential backoff up to
//! `max_retries` times; 4xx and decode failures are returned immediately.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use realty_config::{GeminiConfig, RetryConfig};

use crate::prompt::{Message, Role};
use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// API base URL
    pub endpoint: String,
    /// API key; `None` disables the backend
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from_settings(&GeminiConfig::default(), &RetryConfig::default())
    }
}

impl LlmConfig {
    /// Build from the provider sections of `Settings`
    pub fn from_settings(gemini: &GeminiConfig, retry: &RetryConfig) -> Self {
        Self {
            model: gemini.model.clone(),
            endpoint: gemini.base_url.trim_end_matches('/').to_string(),
            api_key: gemini.api_key.clone().filter(|k| !k.trim().is_empty()),
            max_tokens: gemini.max_output_tokens,
            temperature: gemini.temperature,
            timeout: Duration::from_secs(gemini.timeout_secs),
            max_retries: retry.max_retries,
            initial_backoff: Duration::from_millis(retry.backoff_ms),
        }
    }
}

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Total generation time (ms)
    pub total_time_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Safety,
    Other,
}

impl FinishReason {
    fn from_gemini(reason: Option<&str>) -> Self {
        match reason {
            Some("STOP") | None => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") => FinishReason::Safety,
            Some(_) => FinishReason::Other,
        }
    }
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Check if the backend can be called
    fn is_available(&self) -> bool;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Gemini `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate
    fn first_text(&self) -> Option<(String, FinishReason)> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some((text, FinishReason::from_gemini(candidate.finish_reason.as_deref())))
    }
}

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    config: LlmConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    fn build_request(&self, messages: &[Message]) -> GeminiRequest {
        let system: Vec<GeminiPart> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| GeminiPart {
                text: Some(m.content.clone()),
            })
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| GeminiContent {
                role: Some(match m.role {
                    Role::Assistant => "model".to_string(),
                    _ => "user".to_string(),
                }),
                parts: vec![GeminiPart {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction: (!system.is_empty()).then(|| GeminiContent {
                role: None,
                parts: system,
            }),
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }

    async fn execute_request(&self, api_key: &str, request: &GeminiRequest) -> Result<GeminiResponse, LlmError> {
        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            // 5xx errors are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
            }
            return Err(LlmError::Api(format!("{}: {}", status, error)));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let api_key = self.config.api_key.as_deref().ok_or(LlmError::NotConfigured)?;
        let request = self.build_request(messages);
        let start = Instant::now();

        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    ?backoff,
                    attempt,
                    max_retries = self.config.max_retries,
                    "Retrying Gemini request"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(api_key, &request).await {
                Ok(response) => {
                    let (text, finish_reason) = response
                        .first_text()
                        .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

                    return Ok(GenerationResult {
                        text,
                        total_time_ms: start.elapsed().as_millis() as u64,
                        finish_reason,
                    });
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(error = %e, attempt, "Gemini request failed with transient error");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Generation("Retries exhausted".to_string())))
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            model: "gemini-2.0-flash".to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: api_key.map(str::to_string),
            max_tokens: 128,
            temperature: 0.7,
            timeout: Duration::from_millis(500),
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_config_from_settings() {
        let mut gemini = GeminiConfig::default();
        gemini.api_key = Some("  ".to_string());
        gemini.base_url = "https://example.test/".to_string();
        let config = LlmConfig::from_settings(&gemini, &RetryConfig::default());

        assert!(config.api_key.is_none());
        assert_eq!(config.endpoint, "https://example.test");
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_api_url() {
        let backend = GeminiBackend::new(config(Some("k"))).unwrap();
        assert_eq!(
            backend.api_url(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let backend = GeminiBackend::new(config(Some("k"))).unwrap();
        let request = backend.build_request(&[
            Message::system("Be brief."),
            Message::user("Explain."),
        ]);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Explain.");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 128);
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Steady "}, {"text": "growth."}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        let (text, reason) = response.first_text().unwrap();
        assert_eq!(text, "Steady growth.");
        assert_eq!(reason, FinishReason::Stop);

        let empty: GeminiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.first_text().is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_backend() {
        let backend = GeminiBackend::new(config(None)).unwrap();
        assert!(!backend.is_available());
        let err = backend.generate(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
    }

    #[test]
    fn test_retry_classification() {
        assert!(LlmError::Network("reset".into()).is_retryable());
        assert!(LlmError::Timeout.is_retryable());
        assert!(!LlmError::Api("400".into()).is_retryable());
        assert!(!LlmError::InvalidResponse("bad".into()).is_retryable());
    }
}
