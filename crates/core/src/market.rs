//! Optional external market signal

use serde::{Deserialize, Serialize};

/// Result of sampling comparable listings
///
/// Absence is a normal outcome (no credentials, no matches, upstream failure)
/// and means "use the base price only".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MarketSignal {
    #[default]
    Absent,
    Sampled(f64),
}

impl MarketSignal {
    pub fn value(&self) -> Option<f64> {
        match self {
            MarketSignal::Absent => None,
            MarketSignal::Sampled(v) => Some(*v),
        }
    }

    pub fn is_sampled(&self) -> bool {
        matches!(self, MarketSignal::Sampled(_))
    }

    /// Blend a base price with the sample (arithmetic mean when present)
    pub fn blend(&self, base_price: f64) -> f64 {
        match self {
            MarketSignal::Absent => base_price,
            MarketSignal::Sampled(v) => (base_price + v) / 2.0,
        }
    }
}

impl From<Option<f64>> for MarketSignal {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() && v > 0.0 => MarketSignal::Sampled(v),
            _ => MarketSignal::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend() {
        assert_eq!(MarketSignal::Absent.blend(100.0), 100.0);
        assert_eq!(MarketSignal::Sampled(300.0).blend(100.0), 200.0);
    }

    #[test]
    fn test_from_option_rejects_invalid() {
        assert_eq!(MarketSignal::from(Some(f64::NAN)), MarketSignal::Absent);
        assert_eq!(MarketSignal::from(Some(-1.0)), MarketSignal::Absent);
        assert_eq!(MarketSignal::from(Some(5.0)).value(), Some(5.0));
    }
}
