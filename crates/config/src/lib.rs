//! Configuration management for the real-estate analysis backend
//!
//! Supports loading configuration from:
//! - YAML/TOML/JSON files under `config/`
//! - Environment variables (`REALTY__` prefix, `__` separator)
//! - Conventional credential variables (`GEMINI_API_KEY`, `SERP_API_KEY`,
//!   `GOOGLE_MAPS_API_KEY`) read once when settings are built
//!
//! Static reference data lives beside the settings:
//! - `PriceTableManager` - base price table (city → area → bedrooms → price/sqft)
//! - `ScoringConfig` - amenity buckets and sentiment keyword lists

pub mod constants;
pub mod pricing;
pub mod scoring;
pub mod settings;

pub use pricing::{PriceLookup, PriceSource, PriceTable, PriceTableManager};
pub use scoring::{AmenityBucket, ScoringConfig};
pub use settings::{
    load_settings, AnalysisConfig, ForecastConfig, GeminiConfig, GoogleMapsConfig,
    ObservabilityConfig, PlaceCategory, PricingConfig, ProvidersConfig, RetryConfig,
    RuntimeEnvironment, SerpConfig, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
