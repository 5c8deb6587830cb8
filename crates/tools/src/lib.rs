//! Collaborator clients
//!
//! Thin HTTP clients for the external services the analysis pipeline
//! consumes, each implementing a core collaborator trait:
//! - `GoogleGeocoder` → `Geocoder`
//! - `GooglePlacesClient` → `PlacesProvider`
//! - `SerpNewsClient` → `NewsSearch`
//! - `SerpListingSearch` → `ListingSearch`
//!
//! `Integrations` wires all of them (plus the Gemini text generator) from
//! `Settings`. A client without credentials reports `is_configured() == false`
//! and refuses calls with `NotConfigured`; callers turn that into a note.

pub mod factory;
pub mod geocode;
pub mod http;
pub mod listings;
pub mod news;
pub mod places;

pub use factory::{CollaboratorStatus, Integrations};
pub use geocode::GoogleGeocoder;
pub use http::{HttpFetcher, RetryPolicy};
pub use listings::SerpListingSearch;
pub use news::SerpNewsClient;
pub use places::GooglePlacesClient;

use thiserror::Error;

/// Collaborator call errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl IntegrationError {
    /// Network failures, timeouts and 5xx responses
    pub fn is_retryable(&self) -> bool {
        match self {
            IntegrationError::Network(_) | IntegrationError::Timeout(_) => true,
            IntegrationError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<IntegrationError> for realty_core::Error {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::NotConfigured(what) => realty_core::Error::NotConfigured(what),
            IntegrationError::Network(msg) => realty_core::Error::Network(msg),
            IntegrationError::Timeout(secs) => realty_core::Error::Timeout(secs),
            IntegrationError::Api { status, message } => {
                realty_core::Error::Api(format!("{}: {}", status, message))
            }
            IntegrationError::InvalidResponse(msg) => realty_core::Error::InvalidResponse(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(IntegrationError::Network("reset".into()).is_retryable());
        assert!(IntegrationError::Timeout(10).is_retryable());
        assert!(IntegrationError::Api { status: 503, message: String::new() }.is_retryable());
        assert!(!IntegrationError::Api { status: 403, message: String::new() }.is_retryable());
        assert!(!IntegrationError::InvalidResponse("bad json".into()).is_retryable());
    }

    #[test]
    fn test_core_conversion() {
        let err: realty_core::Error = IntegrationError::Timeout(20).into();
        assert!(err.is_transient());

        let err: realty_core::Error = IntegrationError::NotConfigured("places".into()).into();
        assert_eq!(err, realty_core::Error::NotConfigured("places".into()));
    }
}
