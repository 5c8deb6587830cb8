//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{defaults, endpoints, forecast, pricing, timeouts};
use crate::scoring::ScoringConfig;
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, debug endpoints enabled
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - debug endpoints disabled
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// External collaborators
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Request defaults
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Sequence forecaster
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Base price table
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Amenity buckets and sentiment keywords
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (empty = any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_timeout() -> u64 {
    timeouts::REQUEST_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Read a credential from the environment, treating empty values as absent
fn env_credential(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// External collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub serp: SerpConfig,

    #[serde(default)]
    pub google_maps: GoogleMapsConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

/// Bounded retry applied to every collaborator call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff, doubled per attempt
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    1
}
fn default_backoff_ms() -> u64 {
    250
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Gemini text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_key", skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_gemini_key() -> Option<String> {
    env_credential(&["GEMINI_API_KEY"])
}
fn default_gemini_url() -> String {
    endpoints::GEMINI_DEFAULT.to_string()
}
fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_gemini_timeout() -> u64 {
    timeouts::GEMINI_SECS
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_output_tokens() -> u32 {
    512
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: default_gemini_key(),
            base_url: default_gemini_url(),
            model: default_gemini_model(),
            timeout_secs: default_gemini_timeout(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// SerpAPI news and listing search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpConfig {
    #[serde(default = "default_serp_key", skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_serp_url")]
    pub base_url: String,

    #[serde(default = "default_news_timeout")]
    pub news_timeout_secs: u64,

    #[serde(default = "default_listings_timeout")]
    pub listings_timeout_secs: u64,

    /// Results requested per listing search
    #[serde(default = "default_listings_num")]
    pub listings_num: u32,

    #[serde(default = "default_serp_location")]
    pub location: String,

    #[serde(default = "default_gl")]
    pub gl: String,

    #[serde(default = "default_hl")]
    pub hl: String,
}

fn default_serp_key() -> Option<String> {
    env_credential(&["SERP_API_KEY"])
}
fn default_serp_url() -> String {
    endpoints::SERP_DEFAULT.to_string()
}
fn default_news_timeout() -> u64 {
    timeouts::NEWS_SECS
}
fn default_listings_timeout() -> u64 {
    timeouts::LISTINGS_SECS
}
fn default_listings_num() -> u32 {
    20
}
fn default_serp_location() -> String {
    "India".to_string()
}
fn default_gl() -> String {
    "in".to_string()
}
fn default_hl() -> String {
    "en".to_string()
}

impl Default for SerpConfig {
    fn default() -> Self {
        Self {
            api_key: default_serp_key(),
            base_url: default_serp_url(),
            news_timeout_secs: default_news_timeout(),
            listings_timeout_secs: default_listings_timeout(),
            listings_num: default_listings_num(),
            location: default_serp_location(),
            gl: default_gl(),
            hl: default_hl(),
        }
    }
}

/// One amenity category queried from Places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCategory {
    /// Label used in the amenity inventory
    pub label: String,
    /// Places API `type` parameter
    pub place_type: String,
}

impl PlaceCategory {
    pub fn new(label: &str, place_type: &str) -> Self {
        Self {
            label: label.to_string(),
            place_type: place_type.to_string(),
        }
    }
}

/// Google geocoding and Places nearby search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleMapsConfig {
    #[serde(default = "default_maps_key", skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_maps_url")]
    pub base_url: String,

    #[serde(default = "default_geocode_timeout")]
    pub geocode_timeout_secs: u64,

    #[serde(default = "default_places_timeout")]
    pub places_timeout_secs: u64,

    #[serde(default = "default_categories")]
    pub categories: Vec<PlaceCategory>,
}

fn default_maps_key() -> Option<String> {
    env_credential(&["GOOGLE_MAPS_API_KEY", "GOOGLE_PLACES_API_KEY"])
}
fn default_maps_url() -> String {
    endpoints::GOOGLE_MAPS_DEFAULT.to_string()
}
fn default_geocode_timeout() -> u64 {
    timeouts::GEOCODE_SECS
}
fn default_places_timeout() -> u64 {
    timeouts::PLACES_SECS
}
fn default_categories() -> Vec<PlaceCategory> {
    vec![
        PlaceCategory::new("schools", "school"),
        PlaceCategory::new("hospitals", "hospital"),
        PlaceCategory::new("parks", "park"),
        PlaceCategory::new("metro_stations", "transit_station"),
        PlaceCategory::new("malls", "shopping_mall"),
        PlaceCategory::new("restaurants", "restaurant"),
        PlaceCategory::new("banks", "bank"),
        PlaceCategory::new("gyms", "gym"),
        PlaceCategory::new("pharmacies", "pharmacy"),
        PlaceCategory::new("colleges", "university"),
    ]
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: default_maps_key(),
            base_url: default_maps_url(),
            geocode_timeout_secs: default_geocode_timeout(),
            places_timeout_secs: default_places_timeout(),
            categories: default_categories(),
        }
    }
}

/// Defaults applied when a query leaves a field out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default = "default_bedrooms")]
    pub default_bedrooms: u32,

    #[serde(default = "default_size_sqft")]
    pub default_size_sqft: f64,

    /// Amenity search radius for `/api/analyze`
    #[serde(default = "default_amenity_radius")]
    pub amenity_radius_m: u32,

    /// Amenity search radius for `/properties`
    #[serde(default = "default_property_radius")]
    pub property_radius_m: u32,

    #[serde(default = "default_news_count")]
    pub news_count: usize,

    #[serde(default = "default_horizons")]
    pub horizons: Vec<u32>,
}

fn default_city() -> String {
    defaults::CITY.to_string()
}
fn default_bedrooms() -> u32 {
    defaults::BEDROOMS
}
fn default_size_sqft() -> f64 {
    defaults::SIZE_SQFT
}
fn default_amenity_radius() -> u32 {
    defaults::AMENITY_RADIUS_M
}
fn default_property_radius() -> u32 {
    2000
}
fn default_news_count() -> usize {
    defaults::NEWS_COUNT
}
fn default_horizons() -> Vec<u32> {
    defaults::HORIZONS.to_vec()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            default_bedrooms: default_bedrooms(),
            default_size_sqft: default_size_sqft(),
            amenity_radius_m: default_amenity_radius(),
            property_radius_m: default_property_radius(),
            news_count: default_news_count(),
            horizons: default_horizons(),
        }
    }
}

/// Sequence forecaster knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Historical price series (CSV)
    #[serde(default = "default_history_path")]
    pub history_path: String,

    #[serde(default = "default_price_column")]
    pub price_column: String,

    /// Substitute a linear series when the dataset is missing
    #[serde(default = "default_true")]
    pub synthetic_history: bool,

    #[serde(default = "default_min_history")]
    pub min_history_len: usize,

    #[serde(default = "default_window")]
    pub window: usize,

    #[serde(default = "default_min_windows")]
    pub min_windows: usize,

    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,

    #[serde(default = "default_max_epochs")]
    pub max_epochs: usize,

    #[serde(default = "default_patience")]
    pub patience: usize,

    #[serde(default = "default_min_delta")]
    pub min_delta: f64,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    #[serde(default = "default_annual_growth")]
    pub annual_growth: f64,

    #[serde(default = "default_repair_factor")]
    pub repair_factor: f64,

    /// Weight initialization seed; `None` draws from entropy
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
}

fn default_history_path() -> String {
    forecast::DEFAULT_HISTORY_PATH.to_string()
}
fn default_price_column() -> String {
    forecast::DEFAULT_PRICE_COLUMN.to_string()
}
fn default_min_history() -> usize {
    forecast::MIN_HISTORY_LEN
}
fn default_window() -> usize {
    forecast::WINDOW
}
fn default_min_windows() -> usize {
    forecast::MIN_WINDOWS
}
fn default_hidden_size() -> usize {
    forecast::HIDDEN_SIZE
}
fn default_max_epochs() -> usize {
    forecast::MAX_EPOCHS
}
fn default_patience() -> usize {
    forecast::PATIENCE
}
fn default_min_delta() -> f64 {
    forecast::MIN_DELTA
}
fn default_learning_rate() -> f64 {
    forecast::LEARNING_RATE
}
fn default_annual_growth() -> f64 {
    forecast::ANNUAL_GROWTH
}
fn default_repair_factor() -> f64 {
    forecast::REPAIR_FACTOR
}
fn default_seed() -> Option<u64> {
    Some(forecast::DEFAULT_SEED)
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            price_column: default_price_column(),
            synthetic_history: true,
            min_history_len: default_min_history(),
            window: default_window(),
            min_windows: default_min_windows(),
            hidden_size: default_hidden_size(),
            max_epochs: default_max_epochs(),
            patience: default_patience(),
            min_delta: default_min_delta(),
            learning_rate: default_learning_rate(),
            annual_growth: default_annual_growth(),
            repair_factor: default_repair_factor(),
            seed: default_seed(),
        }
    }
}

/// Base price table location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_table_path")]
    pub table_path: String,

    #[serde(default = "default_price_per_sqft")]
    pub default_price_per_sqft: f64,
}

fn default_table_path() -> String {
    pricing::DEFAULT_TABLE_PATH.to_string()
}
fn default_price_per_sqft() -> f64 {
    pricing::DEFAULT_PRICE_PER_SQFT
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            table_path: default_table_path(),
            default_price_per_sqft: default_price_per_sqft(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable the Prometheus recorder and `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_providers()?;
        self.validate_analysis()?;
        self.validate_forecast()?;
        self.scoring.validate()?;

        if !(self.pricing.default_price_per_sqft > 0.0
            && self.pricing.default_price_per_sqft.is_finite())
        {
            return Err(ConfigError::InvalidValue {
                field: "pricing.default_price_per_sqft".to_string(),
                message: format!("Must be positive, got {}", self.pricing.default_price_per_sqft),
            });
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_providers(&self) -> Result<(), ConfigError> {
        let providers = &self.providers;
        let timeouts = [
            ("providers.gemini.timeout_secs", providers.gemini.timeout_secs),
            ("providers.serp.news_timeout_secs", providers.serp.news_timeout_secs),
            ("providers.serp.listings_timeout_secs", providers.serp.listings_timeout_secs),
            ("providers.google_maps.geocode_timeout_secs", providers.google_maps.geocode_timeout_secs),
            ("providers.google_maps.places_timeout_secs", providers.google_maps.places_timeout_secs),
        ];

        for (field, secs) in timeouts {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Timeout must be at least 1 second".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_analysis(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;

        if analysis.horizons.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analysis.horizons".to_string(),
                message: "At least one horizon is required".to_string(),
            });
        }

        if let Some(bad) = analysis
            .horizons
            .iter()
            .find(|h| !(1..=forecast::MAX_HORIZON).contains(*h))
        {
            return Err(ConfigError::InvalidValue {
                field: "analysis.horizons".to_string(),
                message: format!("Horizons must be between 1 and {}, got {}", forecast::MAX_HORIZON, bad),
            });
        }

        if !(analysis.default_size_sqft > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "analysis.default_size_sqft".to_string(),
                message: format!("Must be positive, got {}", analysis.default_size_sqft),
            });
        }

        Ok(())
    }

    fn validate_forecast(&self) -> Result<(), ConfigError> {
        let forecast = &self.forecast;

        if forecast.window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "forecast.window".to_string(),
                message: "Window must be at least 1".to_string(),
            });
        }

        if forecast.hidden_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "forecast.hidden_size".to_string(),
                message: "Hidden size must be at least 1".to_string(),
            });
        }

        if !(forecast.learning_rate > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "forecast.learning_rate".to_string(),
                message: format!("Must be positive, got {}", forecast.learning_rate),
            });
        }

        if forecast.repair_factor < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "forecast.repair_factor".to_string(),
                message: format!("Must be at least 1.0, got {}", forecast.repair_factor),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("REALTY")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.timeout_seconds, 120);
        assert_eq!(settings.analysis.default_city, "Mumbai");
        assert_eq!(settings.analysis.horizons, vec![2, 3, 5, 10]);
        assert_eq!(settings.forecast.seed, Some(42));
        assert_eq!(settings.providers.retry.max_retries, 1);
        assert_eq!(settings.providers.google_maps.categories.len(), 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.server.timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_horizon_validation() {
        let mut settings = Settings::default();
        settings.analysis.horizons = vec![];
        assert!(settings.validate().is_err());

        settings.analysis.horizons = vec![5, 31];
        match settings.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "analysis.horizons"),
            other => panic!("expected invalid horizons, got {:?}", other),
        }

        settings.analysis.horizons = vec![1, 30];
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_forecast_and_pricing_validation() {
        let mut settings = Settings::default();
        settings.forecast.window = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.pricing.default_price_per_sqft = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.providers.gemini.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
environment: production
server:
  port: 9100
forecast:
  seed: ~
  window: 6
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.environment.is_production());
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.timeout_seconds, 120);
        assert_eq!(settings.forecast.seed, None);
        assert_eq!(settings.forecast.window, 6);
        assert_eq!(settings.forecast.patience, 20);
    }

    #[test]
    fn test_credentials_not_serialized() {
        let mut settings = Settings::default();
        settings.providers.gemini.api_key = Some("secret".to_string());
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_runtime_environment() {
        assert!(!RuntimeEnvironment::Development.is_production());
        assert!(!RuntimeEnvironment::Staging.is_production());
        assert!(RuntimeEnvironment::Production.is_production());
    }
}
