//! Forecast result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forecast horizon in years from now
pub type Horizon = u32;

/// Which path produced the predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Recurrent model trained on the history series
    Lstm,
    /// Fixed compound-growth curve
    FallbackGrowth,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Lstm => "lstm",
            ForecastMethod::FallbackGrowth => "fallback_growth",
        }
    }
}

/// Everything the forecasting step produced for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Horizon → projected price
    pub predictions: BTreeMap<Horizon, f64>,
    pub predicted_5yr: f64,
    /// Adjusted current price the projection starts from
    pub current_price: f64,
    pub base_price: f64,
    pub price_per_sqft: f64,
    pub market_average: Option<f64>,
    pub amenity_score: f64,
    pub amenity_count: usize,
    pub sentiment_score: f64,
    pub sentiment_positive: usize,
    pub sentiment_negative: usize,
    /// Overall investment score in [0, 1]
    pub investment_score: f64,
    pub explanation_path: ForecastMethod,
    /// Forecaster-authored prose, when any
    #[serde(default)]
    pub explanation: Option<String>,
}

impl ForecastResult {
    /// Fractional growth from the current price to the 5-year value
    pub fn five_year_growth(&self) -> f64 {
        if self.current_price > 0.0 {
            (self.predicted_5yr - self.current_price) / self.current_price
        } else {
            0.0
        }
    }
}

/// Value at `target`, else at the horizon nearest to it
///
/// Ties resolve to the later horizon.
pub fn value_near_horizon(predictions: &BTreeMap<Horizon, f64>, target: Horizon) -> Option<f64> {
    if let Some(v) = predictions.get(&target) {
        return Some(*v);
    }
    predictions
        .iter()
        .min_by_key(|(h, _)| (h.abs_diff(target), std::cmp::Reverse(**h)))
        .map(|(_, v)| *v)
}
