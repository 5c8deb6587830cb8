//! Collaborator wiring
//!
//! Builds every external collaborator from `Settings` once at start. Tests
//! and alternative deployments swap individual collaborators with the
//! `with_*` builders.
//!
//! # Example
//!
//! ```ignore
//! let integrations = Integrations::from_settings(&settings)?;
//! let status = integrations.status();
//! ```

use serde::Serialize;
use std::sync::Arc;

use realty_config::Settings;
use realty_core::{Geocoder, ListingSearch, NewsSearch, PlacesProvider, TextGenerator};
use realty_llm::{GeminiBackend, LlmConfig, LlmTextGenerator};

use crate::geocode::GoogleGeocoder;
use crate::http::{HttpFetcher, RetryPolicy};
use crate::listings::SerpListingSearch;
use crate::news::SerpNewsClient;
use crate::places::GooglePlacesClient;
use crate::IntegrationError;

/// Which collaborators have credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollaboratorStatus {
    pub geocoding: bool,
    pub places: bool,
    pub news: bool,
    pub listings: bool,
    pub text_generation: bool,
}

/// External collaborators used by the analysis pipeline
#[derive(Clone)]
pub struct Integrations {
    pub geocoder: Arc<dyn Geocoder>,
    pub places: Arc<dyn PlacesProvider>,
    pub news: Arc<dyn NewsSearch>,
    pub listings: Arc<dyn ListingSearch>,
    pub text: Arc<dyn TextGenerator>,
}

impl Integrations {
    /// Build the HTTP clients described by `settings.providers`
    pub fn from_settings(settings: &Settings) -> Result<Self, IntegrationError> {
        let providers = &settings.providers;
        let http = HttpFetcher::new(RetryPolicy::from(&providers.retry))?;

        let backend = GeminiBackend::new(LlmConfig::from_settings(&providers.gemini, &providers.retry))
            .map_err(|e| IntegrationError::Network(e.to_string()))?;

        let integrations = Self {
            geocoder: Arc::new(GoogleGeocoder::new(http.clone(), &providers.google_maps)),
            places: Arc::new(GooglePlacesClient::new(http.clone(), &providers.google_maps)),
            news: Arc::new(SerpNewsClient::new(http.clone(), &providers.serp)),
            listings: Arc::new(SerpListingSearch::new(http, &providers.serp)),
            text: Arc::new(LlmTextGenerator::new(backend)),
        };

        let status = integrations.status();
        tracing::info!(
            geocoding = status.geocoding,
            places = status.places,
            news = status.news,
            listings = status.listings,
            text_generation = status.text_generation,
            "Collaborators configured"
        );

        Ok(integrations)
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn with_places(mut self, places: Arc<dyn PlacesProvider>) -> Self {
        self.places = places;
        self
    }

    pub fn with_news(mut self, news: Arc<dyn NewsSearch>) -> Self {
        self.news = news;
        self
    }

    pub fn with_listings(mut self, listings: Arc<dyn ListingSearch>) -> Self {
        self.listings = listings;
        self
    }

    pub fn with_text_generator(mut self, text: Arc<dyn TextGenerator>) -> Self {
        self.text = text;
        self
    }

    pub fn status(&self) -> CollaboratorStatus {
        CollaboratorStatus {
            geocoding: self.geocoder.is_configured(),
            places: self.places.is_configured(),
            news: self.news.is_configured(),
            listings: self.listings.is_configured(),
            text_generation: self.text.is_available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured_settings() -> Settings {
        let mut settings = Settings::default();
        settings.providers.gemini.api_key = None;
        settings.providers.serp.api_key = None;
        settings.providers.google_maps.api_key = None;
        settings
    }

    #[test]
    fn test_unconfigured_status() {
        let integrations = Integrations::from_settings(&unconfigured_settings()).unwrap();
        let status = integrations.status();
        assert!(!status.geocoding);
        assert!(!status.places);
        assert!(!status.news);
        assert!(!status.listings);
        assert!(!status.text_generation);
    }

    #[test]
    fn test_configured_status() {
        let mut settings = unconfigured_settings();
        settings.providers.serp.api_key = Some("serp".to_string());
        settings.providers.google_maps.api_key = Some("maps".to_string());

        let status = Integrations::from_settings(&settings).unwrap().status();
        assert!(status.geocoding && status.places && status.news && status.listings);
        assert!(!status.text_generation);
    }
}
