//! Centralized constants for the analysis backend
//!
//! Single source of truth for defaults and fixed model constants. Values that
//! operators may tune are surfaced through `Settings`; the ones here are the
//! defaults those settings start from.

/// Base price lookup
pub mod pricing {
    /// Price per sqft used when the table has nothing for a city
    pub const DEFAULT_PRICE_PER_SQFT: f64 = 2000.0;

    /// Square metres → square feet
    pub const SQM_TO_SQFT: f64 = 10.7639;

    /// Default location of the bundled price table
    pub const DEFAULT_TABLE_PATH: &str = "config/base_prices.json";
}

/// Listing-price sampling
pub mod market {
    /// Lower bound of a plausible listing price (₹5 lakh)
    pub const MIN_PLAUSIBLE_PRICE: f64 = 500_000.0;

    /// Upper bound of a plausible listing price (₹100 crore)
    pub const MAX_PLAUSIBLE_PRICE: f64 = 1_000_000_000.0;

    /// Only the lowest N extracted prices are averaged
    pub const MAX_SAMPLES: usize = 10;
}

/// Multiplicative adjustments applied to the current price
pub mod adjustments {
    /// Full amenity score adds 10%
    pub const AMENITY_WEIGHT: f64 = 0.1;

    /// Full positive sentiment adds 5%, full negative removes 5%
    pub const SENTIMENT_WEIGHT: f64 = 0.05;
}

/// Forecaster defaults
pub mod forecast {
    pub const ANNUAL_GROWTH: f64 = 0.06;
    pub const MIN_HISTORY_LEN: usize = 15;
    pub const WINDOW: usize = 4;
    pub const MIN_WINDOWS: usize = 10;
    pub const HIDDEN_SIZE: usize = 16;
    pub const MAX_EPOCHS: usize = 200;
    pub const PATIENCE: usize = 20;
    pub const MIN_DELTA: f64 = 1e-6;
    pub const LEARNING_RATE: f64 = 0.01;
    pub const REPAIR_FACTOR: f64 = 1.02;
    pub const DEFAULT_SEED: u64 = 42;
    pub const MAX_HORIZON: u32 = 30;

    /// Synthetic history used when no dataset is available
    pub const SYNTHETIC_START: f64 = 2_000_000.0;
    pub const SYNTHETIC_END: f64 = 5_000_000.0;
    pub const SYNTHETIC_POINTS: usize = 50;

    pub const DEFAULT_HISTORY_PATH: &str = "data/price_trend.csv";
    pub const DEFAULT_PRICE_COLUMN: &str = "Price";
}

/// Request defaults applied when extraction finds nothing
pub mod defaults {
    pub const CITY: &str = "Mumbai";
    pub const BEDROOMS: u32 = 2;
    pub const SIZE_SQFT: f64 = 1000.0;
    pub const AMENITY_RADIUS_M: u32 = 10_000;
    pub const NEWS_COUNT: usize = 10;
    pub const HORIZONS: [u32; 4] = [2, 3, 5, 10];
}

/// Service endpoints
pub mod endpoints {
    pub const GEMINI_DEFAULT: &str = "https://generativelanguage.googleapis.com";
    pub const SERP_DEFAULT: &str = "https://serpapi.com/search";
    pub const GOOGLE_MAPS_DEFAULT: &str = "https://maps.googleapis.com/maps/api";
}

/// Collaborator timeouts in seconds
pub mod timeouts {
    pub const GEOCODE_SECS: u64 = 10;
    pub const PLACES_SECS: u64 = 20;
    pub const NEWS_SECS: u64 = 20;
    pub const LISTINGS_SECS: u64 = 15;
    pub const GEMINI_SECS: u64 = 30;
    pub const REQUEST_SECS: u64 = 120;
}
