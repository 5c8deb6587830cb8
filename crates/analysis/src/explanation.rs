//! Investment explanation with a three-tier fallback
//!
//! 1. forecaster-authored text, when it is at least 50 characters
//! 2. generated prose from the text collaborator, when it is at least 20
//!    characters
//! 3. a deterministic template over the numeric outputs
//!
//! The last tier cannot fail, so `explain` always yields non-empty text.

use serde::Serialize;
use std::sync::Arc;

use realty_core::{format_grouped, RiskLevel, TextGenerator};
use realty_llm::ExplanationPrompt;

use crate::metric_names::EXPLANATION_TIER;
use crate::record_collaborator_error;

const MIN_FORECASTER_CHARS: usize = 50;
const MIN_GENERATED_CHARS: usize = 20;

/// Which tier produced the explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationTier {
    Forecaster,
    Generated,
    Template,
}

impl ExplanationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationTier::Forecaster => "forecaster",
            ExplanationTier::Generated => "generated",
            ExplanationTier::Template => "template",
        }
    }
}

/// Numbers the explanation is built from
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationInput {
    pub bedroom_count: u32,
    pub size_sqft: f64,
    pub location: String,
    pub current_price: f64,
    pub price_per_sqft: f64,
    pub amenity_score: f64,
    pub sentiment_score: f64,
    pub risk_level: RiskLevel,
    pub forecast_5yr: f64,
    pub investment_score: f64,
    pub forecaster_text: Option<String>,
}

impl ExplanationInput {
    fn prompt(&self) -> ExplanationPrompt {
        ExplanationPrompt {
            bedroom_count: self.bedroom_count,
            size_sqft: self.size_sqft,
            location: self.location.clone(),
            current_price: self.current_price,
            price_per_sqft: self.price_per_sqft,
            amenity_impact_pct: self.amenity_score * 10.0,
            news_impact_pct: self.sentiment_score * 5.0,
            risk_level: self.risk_level.to_string(),
            forecast_5yr: self.forecast_5yr,
            investment_score: self.investment_score,
        }
    }

    /// Five-year appreciation in percent
    fn growth_pct(&self) -> f64 {
        if self.current_price > 0.0 {
            (self.forecast_5yr - self.current_price) / self.current_price * 100.0
        } else {
            20.0
        }
    }
}

/// Produces the prose explanation for an analysis
#[derive(Clone)]
pub struct ExplanationGenerator {
    text: Arc<dyn TextGenerator>,
}

impl ExplanationGenerator {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self { text }
    }

    pub async fn explain(&self, input: &ExplanationInput) -> (String, ExplanationTier) {
        let (text, tier) = self.select(input).await;
        metrics::counter!(EXPLANATION_TIER, "tier" => tier.as_str()).increment(1);
        tracing::debug!(tier = tier.as_str(), chars = text.len(), "Explanation ready");
        (text, tier)
    }

    async fn select(&self, input: &ExplanationInput) -> (String, ExplanationTier) {
        if let Some(text) = &input.forecaster_text {
            if text.trim().chars().count() >= MIN_FORECASTER_CHARS {
                return (text.clone(), ExplanationTier::Forecaster);
            }
        }

        if self.text.is_available() {
            match self.text.generate(&input.prompt().render()).await {
                Ok(text) if text.trim().chars().count() >= MIN_GENERATED_CHARS => {
                    return (text.trim().to_string(), ExplanationTier::Generated);
                }
                Ok(text) => {
                    tracing::warn!(chars = text.trim().len(), "Generated explanation too short");
                }
                Err(e) => {
                    tracing::warn!(model = self.text.model_name(), error = %e, "Explanation generation failed");
                    record_collaborator_error("text_generation");
                }
            }
        }

        (template(input), ExplanationTier::Template)
    }
}

/// Deterministic explanation from the numeric outputs
pub fn template(input: &ExplanationInput) -> String {
    let growth = input.growth_pct();
    let growth_term = if growth > 30.0 {
        "strong"
    } else if growth > 15.0 {
        "steady"
    } else {
        "modest"
    };
    let score_term = if input.investment_score > 0.7 {
        "attractive"
    } else {
        "balanced"
    };

    format!(
        "The {bhk} BHK property in {location} priced near Rs {price} shows {growth_term} long-term \
         potential with an estimated {growth:.1}% appreciation. The {risk} risk profile is supported \
         by infrastructure and demand patterns, with investment score of {score:.2} indicating a \
         {score_term} opportunity. While short-term fluctuations may occur, fundamentals suggest \
         stable growth prospects.",
        bhk = input.bedroom_count,
        location = input.location,
        price = format_grouped(input.current_price, 0),
        growth_term = growth_term,
        growth = growth,
        risk = input.risk_level.as_str().to_lowercase(),
        score = input.investment_score,
        score_term = score_term,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use realty_core::{Error, Result};

    struct Scripted(Result<String>);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.0.clone()
        }

        fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct Offline;

    #[async_trait]
    impl TextGenerator for Offline {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(Error::NotConfigured("text generation".into()))
        }

        fn is_available(&self) -> bool {
            false
        }

        fn model_name(&self) -> &str {
            "offline"
        }
    }

    fn input() -> ExplanationInput {
        ExplanationInput {
            bedroom_count: 3,
            size_sqft: 1500.0,
            location: "Kharadi, Pune".to_string(),
            current_price: 1_000_000.0,
            price_per_sqft: 9600.0,
            amenity_score: 0.0,
            sentiment_score: 0.0,
            risk_level: RiskLevel::Unknown,
            forecast_5yr: 1_338_225.58,
            investment_score: 0.35,
            forecaster_text: None,
        }
    }

    #[test]
    fn test_template_text() {
        assert_eq!(
            template(&input()),
            "The 3 BHK property in Kharadi, Pune priced near Rs 1,000,000 shows strong long-term \
             potential with an estimated 33.8% appreciation. The unknown risk profile is supported \
             by infrastructure and demand patterns, with investment score of 0.35 indicating a \
             balanced opportunity. While short-term fluctuations may occur, fundamentals suggest \
             stable growth prospects."
        );
    }

    #[test]
    fn test_template_terms() {
        let mut modest = input();
        modest.forecast_5yr = 1_100_000.0;
        modest.investment_score = 0.8;
        let text = template(&modest);
        assert!(text.contains("shows modest long-term potential with an estimated 10.0% appreciation"));
        assert!(text.contains("indicating a attractive opportunity"));

        let mut zero = input();
        zero.current_price = 0.0;
        assert!(template(&zero).contains("estimated 20.0% appreciation"));
    }

    #[tokio::test]
    async fn test_forecaster_text_wins() {
        let generator = ExplanationGenerator::new(Arc::new(Scripted(Ok("unused".into()))));
        let mut input = input();
        input.forecaster_text = Some("x".repeat(60));
        let (text, tier) = generator.explain(&input).await;
        assert_eq!(tier, ExplanationTier::Forecaster);
        assert_eq!(text.len(), 60);
    }

    #[tokio::test]
    async fn test_generated_tier() {
        let generator = ExplanationGenerator::new(Arc::new(Scripted(Ok(
            "  Kharadi shows solid fundamentals driven by IT corridor demand.  ".into(),
        ))));
        let mut input = input();
        input.forecaster_text = Some("too short".into());
        let (text, tier) = generator.explain(&input).await;
        assert_eq!(tier, ExplanationTier::Generated);
        assert_eq!(text, "Kharadi shows solid fundamentals driven by IT corridor demand.");
    }

    #[tokio::test]
    async fn test_template_fallbacks() {
        for generator in [
            ExplanationGenerator::new(Arc::new(Scripted(Ok("Too short.".into())))),
            ExplanationGenerator::new(Arc::new(Scripted(Err(Error::Timeout(30))))),
            ExplanationGenerator::new(Arc::new(Offline)),
        ] {
            let (text, tier) = generator.explain(&input()).await;
            assert_eq!(tier, ExplanationTier::Template);
            assert_eq!(text, template(&input()));
            assert!(!text.is_empty());
        }
    }
}
