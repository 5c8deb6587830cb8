//! Risk assessment types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Unknown,
    Low,
    #[serde(rename = "Low-Medium")]
    LowMedium,
    Medium,
    High,
}

impl RiskLevel {
    /// Map accumulated risk points to a level
    pub fn from_points(points: i32) -> Self {
        if points >= 4 {
            RiskLevel::High
        } else if points >= 1 {
            RiskLevel::Medium
        } else if points <= -2 {
            RiskLevel::Low
        } else {
            RiskLevel::LowMedium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Unknown => "Unknown",
            RiskLevel::Low => "Low",
            RiskLevel::LowMedium => "Low-Medium",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Recommendation sentence closing the rationale; `None` for `Unknown`
    pub fn recommendation(&self) -> Option<&'static str> {
        match self {
            RiskLevel::High => Some(
                "Conduct extensive due diligence. Consider postponing investment until market stabilizes.",
            ),
            RiskLevel::Medium => Some(
                "Monitor market developments closely. Seek professional valuation before proceeding.",
            ),
            RiskLevel::LowMedium => Some("Favorable conditions overall. Standard due diligence recommended."),
            RiskLevel::Low => Some("Strong investment opportunity. Proceed with standard verification processes."),
            RiskLevel::Unknown => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk level plus human-readable rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub rationale: String,
    /// Accumulated points; absent for `Unknown`
    #[serde(default)]
    pub points: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(RiskLevel::from_points(7), RiskLevel::High);
        assert_eq!(RiskLevel::from_points(4), RiskLevel::High);
        assert_eq!(RiskLevel::from_points(3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_points(1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_points(0), RiskLevel::LowMedium);
        assert_eq!(RiskLevel::from_points(-1), RiskLevel::LowMedium);
        assert_eq!(RiskLevel::from_points(-2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_points(-9), RiskLevel::Low);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(
            serde_json::to_value(RiskLevel::LowMedium).unwrap(),
            serde_json::json!("Low-Medium")
        );
        assert_eq!(RiskLevel::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_recommendation_only_for_scored_levels() {
        assert_eq!(RiskLevel::Unknown.recommendation(), None);
        assert!(RiskLevel::High.recommendation().unwrap().starts_with("Conduct extensive due diligence"));
        assert!(RiskLevel::Low.recommendation().is_some());
    }
}
