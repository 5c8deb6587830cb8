//! Generative text integration
//!
//! Features:
//! - Gemini `generateContent` backend with bounded retry
//! - Prompt types and the investment-explanation prompt
//! - Adapter exposing a backend as the core `TextGenerator`

pub mod adapter;
pub mod backend;
pub mod prompt;

pub use adapter::LlmTextGenerator;
pub use backend::{FinishReason, GeminiBackend, GenerationResult, LlmBackend, LlmConfig};
pub use prompt::{ExplanationPrompt, Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generative text API not configured")]
    NotConfigured,
}

impl LlmError {
    /// Network failures, timeouts and 5xx responses
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Network(_) | LlmError::Timeout)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for realty_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => realty_core::Error::NotConfigured("gemini".to_string()),
            other => realty_core::Error::Llm(other.to_string()),
        }
    }
}
