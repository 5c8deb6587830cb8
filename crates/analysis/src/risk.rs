//! Rule-based risk assessment
//!
//! Points accumulate over five factors; positive points mean more risk.
//!
//! | factor | condition | points |
//! |---|---|---|
//! | news balance | neg > 1.5×pos / pos > 2×neg / score < −0.3 / score > 0.3 | +3 / −2 / +2 / −1 (first match) |
//! | amenity count | < 10 / > 30 | +2 / −2 |
//! | amenity score | < 0.3 / > 0.7 | +1 / −1 |
//! | news volume | > 8 / < 2 | +1 / +1 |
//! | investment score | < 0.35 / > 0.70 / > 0.55 | +2 / −2 / −1 |
//! | market sample | present | −1 |
//!
//! Without usable news the level is `Unknown` and no points are counted.

use realty_core::{NewsFeed, RiskAssessment, RiskLevel};

use crate::sentiment::SentimentScore;

pub const UNKNOWN_RATIONALE: &str = "Risk assessment unavailable due to insufficient news data.";

/// Numeric inputs to the assessment
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskSignals {
    pub sentiment: SentimentScore,
    pub amenity_score: f64,
    pub amenity_count: usize,
    pub investment_score: f64,
    pub market_sampled: bool,
}

#[derive(Debug, Default)]
struct Tally {
    points: i32,
    concerns: Vec<String>,
    strengths: Vec<String>,
}

impl Tally {
    fn concern(&mut self, points: i32, text: String) {
        self.points += points;
        self.concerns.push(text);
    }

    fn strength(&mut self, points: i32, text: String) {
        self.points -= points;
        self.strengths.push(text);
    }
}

/// Deterministic risk scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAssessor;

impl RiskAssessor {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, location: &str, news: &NewsFeed, signals: &RiskSignals) -> RiskAssessment {
        if !news.is_usable() {
            return RiskAssessment {
                level: RiskLevel::Unknown,
                rationale: UNKNOWN_RATIONALE.to_string(),
                points: None,
            };
        }

        let tally = self.tally(news.items().len(), signals);
        let level = RiskLevel::from_points(tally.points);
        tracing::debug!(points = tally.points, level = %level, "Risk assessed");

        RiskAssessment {
            level,
            rationale: rationale(location, level, &tally),
            points: Some(tally.points),
        }
    }

    fn tally(&self, valid_news: usize, signals: &RiskSignals) -> Tally {
        let mut tally = Tally::default();
        let SentimentScore {
            score,
            positive,
            negative,
        } = signals.sentiment;

        if negative as f64 > positive as f64 * 1.5 {
            tally.concern(
                3,
                format!(
                    "High negative news sentiment ({} negative vs {} positive)",
                    negative, positive
                ),
            );
        } else if positive > negative * 2 {
            tally.strength(2, format!("Strong positive sentiment ({} positive developments)", positive));
        } else if score < -0.3 {
            tally.concern(2, format!("Negative market sentiment (score: {:.2})", score));
        } else if score > 0.3 {
            tally.strength(1, format!("Positive market outlook (score: {:.2})", score));
        }

        let count = signals.amenity_count;
        if count < 10 {
            tally.concern(2, format!("Limited amenities ({} facilities)", count));
        } else if count > 30 {
            tally.strength(2, format!("Excellent amenity infrastructure ({} facilities)", count));
        }

        let amenity = signals.amenity_score;
        if amenity < 0.3 {
            tally.concern(1, format!("Low amenity quality score ({:.2})", amenity));
        } else if amenity > 0.7 {
            tally.strength(1, format!("High-quality amenity mix (score: {:.2})", amenity));
        }

        if valid_news > 8 {
            tally.concern(
                1,
                format!("High market activity ({} recent articles - potential volatility)", valid_news),
            );
        } else if valid_news < 2 {
            tally.concern(1, format!("Limited market information ({} articles)", valid_news));
        }

        let overall = signals.investment_score;
        if overall < 0.35 {
            tally.concern(2, format!("Low investment score ({:.2}/1.0)", overall));
        } else if overall > 0.70 {
            tally.strength(2, format!("Strong investment metrics ({:.2}/1.0)", overall));
        } else if overall > 0.55 {
            tally.strength(1, format!("Good investment potential ({:.2}/1.0)", overall));
        }

        if signals.market_sampled {
            tally.strength(1, "Active market with verified listings".to_string());
        }

        tally
    }
}

fn rationale(location: &str, level: RiskLevel, tally: &Tally) -> String {
    let mut text = format!("Risk assessment for {}:", location);
    if !tally.concerns.is_empty() {
        text.push_str(&format!("\n\n Concerns: {}.", tally.concerns.join(" • ")));
    }
    if !tally.strengths.is_empty() {
        text.push_str(&format!("\n\n Strengths: {}.", tally.strengths.join(" • ")));
    }
    if tally.concerns.is_empty() && tally.strengths.is_empty() {
        text.push_str("\n\n Balanced market conditions with moderate indicators.");
    }
    if let Some(recommendation) = level.recommendation() {
        text.push_str("\n\n Recommendation: ");
        text.push_str(recommendation);
    }
    text
}
