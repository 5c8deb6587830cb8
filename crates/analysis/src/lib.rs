//! Property analysis pipeline
//!
//! Turns a free-text property description into a valuation, a multi-year
//! price forecast, a risk label and a prose explanation:
//!
//! ```text
//! EntityExtractor ─► BasePriceLookup ─┐
//!                    MarketSignal ────┴─► current price
//! AmenityScorer + SentimentScorer ──────► adjusted price
//! SequenceForecaster ───────────────────► predictions
//! RiskAssessor ─────────────────────────► level + rationale
//! ExplanationGenerator ─────────────────► prose
//! ```
//!
//! Every collaborator failure degrades to a documented fallback; only a
//! failure with no fallback surfaces as `AnalysisError`.

pub mod amenity;
pub mod explanation;
pub mod forecast;
pub mod market;
pub mod pipeline;
pub mod risk;
pub mod sentiment;
pub mod valuation;

pub use amenity::{AmenityFetcher, AmenityScore, AmenityScorer};
pub use explanation::{ExplanationGenerator, ExplanationInput, ExplanationTier};
pub use forecast::{ForecastOutcome, HistorySource, PriceHistory, SequenceForecaster};
pub use market::MarketSignalFetcher;
pub use pipeline::{AnalysisPipeline, AnalysisReport, LocationReport, PropertyLookup, METHODOLOGY};
pub use risk::{RiskAssessor, RiskSignals};
pub use sentiment::{NewsFetcher, SentimentScore, SentimentScorer};
pub use valuation::{adjusted_price, investment_score, Valuation};

use thiserror::Error;

/// Forecasting errors
///
/// None of these reach API callers: the forecaster answers every error with
/// the compound-growth curve.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<candle_core::Error> for ForecastError {
    fn from(err: candle_core::Error) -> Self {
        ForecastError::Model(err.to_string())
    }
}

/// Pipeline errors with no fallback
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Valuation failed: {0}")]
    Valuation(String),
}

/// Metric names
pub mod metric_names {
    pub const ANALYSIS_DURATION: &str = "realty_analysis_duration_seconds";
    pub const FORECAST_PATH: &str = "realty_forecast_path_total";
    pub const EXPLANATION_TIER: &str = "realty_explanation_tier_total";
    pub const COLLABORATOR_ERRORS: &str = "realty_collaborator_errors_total";
}

/// Count a degraded collaborator call
pub(crate) fn record_collaborator_error(collaborator: &'static str) {
    metrics::counter!(metric_names::COLLABORATOR_ERRORS, "collaborator" => collaborator).increment(1);
}
