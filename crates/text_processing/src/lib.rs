//! Text processing for property queries
//!
//! This crate provides:
//! - **Entity Extraction**: bedroom count, floor area and location from a
//!   free-text property description
//! - **Price Mentions**: listing prices in crore/lakh/rupee notations from
//!   search-result titles and snippets
//!
//! # Example
//!
//! ```ignore
//! use realty_text_processing::{EntityExtractor, QueryDefaults};
//!
//! let extractor = EntityExtractor::with_known_cities(vec!["Pune".into()]);
//! let query = extractor
//!     .extract("3 BHK apartment in Kharadi Pune, 1500 sqft")
//!     .to_query(&QueryDefaults::default());
//! ```

pub mod entities;
pub mod price_mentions;

pub use entities::{EntityExtractor, ExtractedEntities, QueryDefaults, SQM_TO_SQFT};
pub use price_mentions::{PriceBand, PriceMentionExtractor};
