//! Scoring tables
//!
//! Keyword lists and amenity buckets used by the amenity and sentiment
//! scorers. They are plain data so deployments and tests can substitute
//! their own tables.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One amenity bucket
///
/// A category label belongs to the first bucket whose keyword is a substring
/// of the lower-cased label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityBucket {
    pub name: String,
    pub keywords: Vec<String>,
    /// Contribution of a saturated bucket to the total score
    pub weight: f64,
    /// Count at which the bucket saturates
    pub normalizer: f64,
}

impl AmenityBucket {
    pub fn new(name: &str, keywords: &[&str], weight: f64, normalizer: f64) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            weight,
            normalizer,
        }
    }

    /// Whether a category label falls in this bucket
    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.keywords.iter().any(|k| label.contains(k.as_str()))
    }
}

/// Scorer tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_amenity_buckets")]
    pub amenity_buckets: Vec<AmenityBucket>,

    #[serde(default = "default_positive_keywords")]
    pub positive_keywords: Vec<String>,

    #[serde(default = "default_negative_keywords")]
    pub negative_keywords: Vec<String>,
}

fn default_amenity_buckets() -> Vec<AmenityBucket> {
    vec![
        AmenityBucket::new("education", &["school", "college", "university"], 0.3, 10.0),
        AmenityBucket::new("health", &["hospital", "clinic"], 0.3, 5.0),
        AmenityBucket::new("recreation", &["park", "garden"], 0.2, 5.0),
        AmenityBucket::new("commerce", &["mall", "market"], 0.2, 5.0),
    ]
}

fn default_positive_keywords() -> Vec<String> {
    [
        "flyover",
        "metro",
        "airport",
        "highway",
        "development",
        "growth",
        "investment",
        "opening",
        "approved",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_negative_keywords() -> Vec<String> {
    [
        "flood",
        "crime",
        "closure",
        "delay",
        "pollution",
        "traffic",
        "unsafe",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            amenity_buckets: default_amenity_buckets(),
            positive_keywords: default_positive_keywords(),
            negative_keywords: default_negative_keywords(),
        }
    }
}

impl ScoringConfig {
    /// Bucket for a category label, if any
    pub fn bucket_for(&self, label: &str) -> Option<&AmenityBucket> {
        self.amenity_buckets.iter().find(|b| b.matches(label))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for bucket in &self.amenity_buckets {
            if !(0.0..=1.0).contains(&bucket.weight) {
                return Err(ConfigError::InvalidValue {
                    field: format!("scoring.amenity_buckets.{}.weight", bucket.name),
                    message: format!("Must be between 0.0 and 1.0, got {}", bucket.weight),
                });
            }
            if bucket.normalizer <= 0.0 || !bucket.normalizer.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field: format!("scoring.amenity_buckets.{}.normalizer", bucket.name),
                    message: format!("Must be positive, got {}", bucket.normalizer),
                });
            }
        }
        Ok(())
    }
}
