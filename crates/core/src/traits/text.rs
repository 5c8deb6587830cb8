use async_trait::async_trait;

use crate::Result;

/// Generative text collaborator
///
/// Implementations:
/// - `LlmTextGenerator` in the llm crate, backed by Gemini
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate prose for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Whether the backend can be called at all
    fn is_available(&self) -> bool;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.is_empty() {
                return Err(Error::InvalidInput("empty prompt".into()));
            }
            Ok(format!("echo: {}", prompt))
        }

        fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_generator_object_safety() {
        let generator: Box<dyn TextGenerator> = Box::new(EchoGenerator);
        assert!(generator.is_available());
        assert_eq!(generator.generate("hi").await.unwrap(), "echo: hi");
        assert!(generator.generate("").await.is_err());
    }
}
