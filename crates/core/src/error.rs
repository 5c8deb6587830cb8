//! Shared error type
//!
//! Crate-specific errors (`ConfigError`, `LlmError`, `IntegrationError`, ...)
//! convert into this type at crate boundaries.

use thiserror::Error;

/// Core error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Collaborator not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0}s")]
    Timeout(u64),

    #[error("Upstream API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Transient failures worth a bounded retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout(_))
    }
}

/// Result alias used by collaborator traits
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("reset".into()).is_transient());
        assert!(Error::Timeout(10).is_transient());
        assert!(!Error::Api("403".into()).is_transient());
        assert!(!Error::NotConfigured("places".into()).is_transient());
    }
}
