//! Core traits and types for the real-estate analysis backend
//!
//! This crate provides the foundational types used across all other crates:
//! - Request-scoped value objects (property query, amenities, news, forecast, risk)
//! - Tagged results for optional external signals
//! - Collaborator traits for pluggable external services (geocoding, places,
//!   news search, listing search, text generation)
//! - Error types

pub mod amenity;
pub mod error;
pub mod format;
pub mod forecast;
pub mod geo;
pub mod market;
pub mod news;
pub mod property;
pub mod risk;
pub mod traits;

pub use amenity::{AmenityCategory, AmenityInventory, AmenityReport, PlaceRecord};
pub use error::{Error, Result};
pub use format::{format_grouped, format_inr};
pub use forecast::{value_near_horizon, ForecastMethod, ForecastResult, Horizon};
pub use geo::GeoLocation;
pub use market::MarketSignal;
pub use news::{NewsFeed, NewsItem};
pub use property::PropertyQuery;
pub use risk::{RiskAssessment, RiskLevel};

pub use traits::{Geocoder, ListingSearch, ListingSnippet, NewsSearch, PlacesProvider, TextGenerator};
