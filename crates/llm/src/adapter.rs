//! Text generator adapter
//!
//! Bridges the `LlmBackend` trait to the core `TextGenerator` trait so the
//! analysis pipeline only depends on the core crate.

use async_trait::async_trait;
use std::sync::Arc;

use realty_core::{Result, TextGenerator};

use crate::backend::LlmBackend;
use crate::prompt::Message;

/// Adapter that wraps an `LlmBackend` to implement `TextGenerator`
///
/// # Example
///
/// ```ignore
/// let backend = GeminiBackend::new(LlmConfig::from_settings(&gemini, &retry))?;
/// let generator: Arc<dyn TextGenerator> = Arc::new(LlmTextGenerator::new(backend));
/// ```
pub struct LlmTextGenerator {
    backend: Arc<dyn LlmBackend>,
    model_name: String,
}

impl LlmTextGenerator {
    pub fn new<B: LlmBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    pub fn from_arc(backend: Arc<dyn LlmBackend>) -> Self {
        let model_name = backend.model_name().to_string();
        Self { backend, model_name }
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let result = self.backend.generate(&[Message::user(prompt)]).await?;
        tracing::debug!(
            model = %self.model_name,
            elapsed_ms = result.total_time_ms,
            finish_reason = ?result.finish_reason,
            "Generated text"
        );
        Ok(result.text.trim().to_string())
    }

    fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FinishReason, GenerationResult};
    use crate::LlmError;

    struct FixedBackend {
        reply: std::result::Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl LlmBackend for FixedBackend {
        async fn generate(&self, messages: &[Message]) -> std::result::Result<GenerationResult, LlmError> {
            assert_eq!(messages.len(), 1);
            match self.reply {
                Ok(text) => Ok(GenerationResult {
                    text: text.to_string(),
                    total_time_ms: 1,
                    finish_reason: FinishReason::Stop,
                }),
                Err(msg) => Err(LlmError::Api(msg.to_string())),
            }
        }

        fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_generate_trims_output() {
        let generator = LlmTextGenerator::new(FixedBackend {
            reply: Ok("  Solid outlook.\n"),
        });
        assert_eq!(generator.model_name(), "fixed");
        assert_eq!(generator.generate("prompt").await.unwrap(), "Solid outlook.");
    }

    #[tokio::test]
    async fn test_errors_map_to_core() {
        let generator = LlmTextGenerator::new(FixedBackend { reply: Err("403") });
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, realty_core::Error::Llm(_)));
    }
}
