//! Price forecasting
//!
//! Two paths:
//! - **fallback growth**: `current × (1 + g)^year`, used whenever the
//!   history is too short or anything in the model path fails
//! - **lstm**: a small recurrent model trained on the history plus the
//!   current price, rolled forward autoregressively
//!
//! Projections from the model path are repaired to be non-decreasing and
//! floored at the current price.
//!
//! # Example
//!
//! ```ignore
//! let forecaster = SequenceForecaster::from_config(settings.forecast.clone());
//! let outcome = forecaster.forecast(14_400_000.0, vec![2, 3, 5, 10]).await;
//! assert_eq!(outcome.predictions.len(), 4);
//! ```

mod history;
mod lstm;

pub use history::{read_price_column, HistorySource, PriceHistory};
pub use lstm::{LstmParams, TrainingSummary};

use std::collections::BTreeMap;
use std::sync::Arc;

use realty_config::ForecastConfig;
use realty_core::{ForecastMethod, Horizon};

use crate::metric_names::FORECAST_PATH;
use crate::ForecastError;

/// Predictions plus the path that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    pub predictions: BTreeMap<Horizon, f64>,
    pub method: ForecastMethod,
    /// Present when the model path ran
    pub training: Option<TrainingSummary>,
}

/// Trains a fresh model per call; holds no state between calls
#[derive(Debug, Clone)]
pub struct SequenceForecaster {
    config: ForecastConfig,
    history: Arc<PriceHistory>,
}

impl SequenceForecaster {
    pub fn new(config: ForecastConfig, history: PriceHistory) -> Self {
        Self {
            config,
            history: Arc::new(history),
        }
    }

    /// Load the history named by the config
    pub fn from_config(config: ForecastConfig) -> Self {
        let history = PriceHistory::load(&config);
        Self::new(config, history)
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Compound growth at the configured annual rate
    pub fn fallback_growth(&self, current_price: f64, horizons: &[Horizon]) -> BTreeMap<Horizon, f64> {
        let rate = 1.0 + self.config.annual_growth;
        horizons
            .iter()
            .map(|&year| (year, current_price * rate.powi(year as i32)))
            .collect()
    }

    /// Forecast on a blocking worker so training never stalls the runtime
    pub async fn forecast(&self, current_price: f64, horizons: Vec<Horizon>) -> ForecastOutcome {
        let forecaster = self.clone();
        let fallback_horizons = horizons.clone();
        match tokio::task::spawn_blocking(move || forecaster.forecast_blocking(current_price, &horizons)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Forecast task failed");
                self.fallback_outcome(current_price, &fallback_horizons)
            }
        }
    }

    /// Synchronous forecast; never fails
    pub fn forecast_blocking(&self, current_price: f64, horizons: &[Horizon]) -> ForecastOutcome {
        match self.try_lstm(current_price, horizons) {
            Ok((predictions, training)) => {
                tracing::info!(
                    epochs = training.epochs,
                    loss = training.final_loss,
                    early_stopped = training.early_stopped,
                    "LSTM forecast complete"
                );
                metrics::counter!(FORECAST_PATH, "path" => ForecastMethod::Lstm.as_str()).increment(1);
                ForecastOutcome {
                    predictions,
                    method: ForecastMethod::Lstm,
                    training: Some(training),
                }
            }
            Err(e) => {
                tracing::info!(reason = %e, "Using fallback growth forecast");
                self.fallback_outcome(current_price, horizons)
            }
        }
    }

    fn fallback_outcome(&self, current_price: f64, horizons: &[Horizon]) -> ForecastOutcome {
        metrics::counter!(FORECAST_PATH, "path" => ForecastMethod::FallbackGrowth.as_str()).increment(1);
        ForecastOutcome {
            predictions: self.fallback_growth(current_price, horizons),
            method: ForecastMethod::FallbackGrowth,
            training: None,
        }
    }

    /// Model path; any error means the caller should fall back
    pub fn try_lstm(
        &self,
        current_price: f64,
        horizons: &[Horizon],
    ) -> Result<(BTreeMap<Horizon, f64>, TrainingSummary), ForecastError> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ForecastError::InvalidInput(format!(
                "current price must be positive, got {}",
                current_price
            )));
        }
        let max_horizon = match horizons.iter().max() {
            Some(&h) if h > 0 && !horizons.contains(&0) => h as usize,
            _ => {
                return Err(ForecastError::InvalidInput(
                    "horizons must be non-empty positive years".to_string(),
                ))
            }
        };

        let mut series = self.history.values().to_vec();
        series.push(current_price);
        if series.len() < self.config.min_history_len {
            return Err(ForecastError::InsufficientData(format!(
                "{} points, need {}",
                series.len(),
                self.config.min_history_len
            )));
        }
        let windows = series.len().saturating_sub(self.config.window);
        if windows < self.config.min_windows {
            return Err(ForecastError::InsufficientData(format!(
                "{} training windows, need {}",
                windows, self.config.min_windows
            )));
        }

        let scaler = MinMaxScaler::fit(&series);
        let scaled: Vec<f32> = series.iter().map(|&v| scaler.transform(v) as f32).collect();

        let (projected, training) = lstm::fit_and_project(&scaled, max_horizon, &LstmParams::from(&self.config))?;

        let mut prices: Vec<f64> = projected
            .iter()
            .map(|&v| scaler.inverse(f64::from(v)))
            .collect();
        repair_monotonic(&mut prices, self.config.repair_factor);
        for price in prices.iter_mut() {
            *price = price.max(current_price);
        }

        let predictions = horizons
            .iter()
            .map(|&year| (year, prices[year as usize - 1]))
            .collect();
        Ok((predictions, training))
    }
}

/// Replace any value below its predecessor with `predecessor × factor`
pub fn repair_monotonic(prices: &mut [f64], factor: f64) {
    for i in 1..prices.len() {
        if prices[i] < prices[i - 1] {
            prices[i] = prices[i - 1] * factor;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MinMaxScaler {
    min: f64,
    range: f64,
}

impl MinMaxScaler {
    fn fit(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        Self {
            min,
            // constant series
            range: if range.is_finite() && range > f64::EPSILON { range } else { 1.0 },
        }
    }

    fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.range
    }

    fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.range + self.min
    }
}
