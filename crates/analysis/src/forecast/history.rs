//! Historical price series used to train the forecaster

use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use realty_config::constants::forecast::{SYNTHETIC_END, SYNTHETIC_POINTS, SYNTHETIC_START};
use realty_config::ForecastConfig;

use crate::ForecastError;

/// Where a history series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    Dataset,
    Synthetic,
    Empty,
}

/// Ordered price observations, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    values: Vec<f64>,
    source: HistorySource,
}

impl PriceHistory {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            source: HistorySource::Dataset,
        }
    }

    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            source: HistorySource::Empty,
        }
    }

    /// Evenly spaced series from ₹20 lakh to ₹50 lakh
    pub fn synthetic() -> Self {
        Self {
            values: linspace(SYNTHETIC_START, SYNTHETIC_END, SYNTHETIC_POINTS),
            source: HistorySource::Synthetic,
        }
    }

    /// Load the configured dataset
    ///
    /// A missing file or missing price column yields the synthetic series
    /// when `synthetic_history` is set, otherwise an empty history.
    pub fn load(config: &ForecastConfig) -> Self {
        match Self::from_csv_file(&config.history_path, &config.price_column) {
            Ok(history) => {
                tracing::info!(
                    path = %config.history_path,
                    points = history.len(),
                    "Loaded price history"
                );
                history
            }
            Err(e) if config.synthetic_history => {
                tracing::warn!(
                    path = %config.history_path,
                    error = %e,
                    "Price history unavailable, using synthetic series"
                );
                Self::synthetic()
            }
            Err(e) => {
                tracing::warn!(path = %config.history_path, error = %e, "Price history unavailable");
                Self::empty()
            }
        }
    }

    pub fn from_csv_file(path: impl AsRef<Path>, column: &str) -> Result<Self, ForecastError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ForecastError::InsufficientData(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_values(read_price_column(file, column)?))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn source(&self) -> HistorySource {
        self.source
    }
}

/// Numeric values of one CSV column; unparseable cells are skipped
pub fn read_price_column<R: Read>(reader: R, column: &str) -> Result<Vec<f64>, ForecastError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let index = csv
        .headers()
        .map_err(|e| ForecastError::InvalidInput(e.to_string()))?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ForecastError::InsufficientData(format!("column '{}' not found", column)))?;

    let mut values = Vec::new();
    for record in csv.records() {
        let record = record.map_err(|e| ForecastError::InvalidInput(e.to_string()))?;
        if let Some(value) = record.get(index).and_then(|v| v.parse::<f64>().ok()) {
            if value.is_finite() {
                values.push(value);
            }
        }
    }
    Ok(values)
}

fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_price_column() {
        let csv = "Year,Price\n2001,2150000\n2002,not-a-number\n2003, 2400000 \n2004,\n";
        let values = read_price_column(csv.as_bytes(), "Price").unwrap();
        assert_eq!(values, vec![2_150_000.0, 2_400_000.0]);
    }

    #[test]
    fn test_missing_column() {
        let err = read_price_column("Year,Value\n2001,1\n".as_bytes(), "Price").unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData(_)));
    }

    #[test]
    fn test_synthetic_series() {
        let history = PriceHistory::synthetic();
        assert_eq!(history.len(), 50);
        assert_eq!(history.values()[0], 2_000_000.0);
        assert!((history.values()[49] - 5_000_000.0).abs() < 1e-6);
        assert_eq!(history.source(), HistorySource::Synthetic);
    }

    #[test]
    fn test_load_fallbacks() {
        let mut config = ForecastConfig {
            history_path: "/nonexistent/price_trend.csv".to_string(),
            ..Default::default()
        };
        assert_eq!(PriceHistory::load(&config).source(), HistorySource::Synthetic);

        config.synthetic_history = false;
        assert!(PriceHistory::load(&config).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Year,Price").unwrap();
        for (i, year) in (2001..2011).enumerate() {
            writeln!(file, "{},{}", year, 2_000_000 + i * 100_000).unwrap();
        }

        let config = ForecastConfig {
            history_path: file.path().display().to_string(),
            ..Default::default()
        };
        let history = PriceHistory::load(&config);
        assert_eq!(history.source(), HistorySource::Dataset);
        assert_eq!(history.len(), 10);
        assert_eq!(history.values()[9], 2_900_000.0);
    }
}
