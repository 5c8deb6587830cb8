//! Prompt building
//!
//! Chat message types plus the investment-explanation prompt sent to the
//! generative text API.

use serde::{Deserialize, Serialize};
use std::fmt;

use realty_core::format_grouped;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Numbers embedded in the explanation prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationPrompt {
    pub bedroom_count: u32,
    pub size_sqft: f64,
    pub location: String,
    pub current_price: f64,
    pub price_per_sqft: f64,
    /// Amenity adjustment in percent
    pub amenity_impact_pct: f64,
    /// News adjustment in percent, signed
    pub news_impact_pct: f64,
    pub risk_level: String,
    pub forecast_5yr: f64,
    pub investment_score: f64,
}

impl ExplanationPrompt {
    /// Render the prompt text
    pub fn render(&self) -> String {
        format!(
            "Provide a professional real estate investment analysis.\n\n\
             Property: {bhk} BHK, {size} sqft in {location}\n\
             Current price: Rs {price} (Rs {per_sqft}/sqft)\n\
             Amenities impact: {amenity:.1}%\n\
             News impact: {news:+.1}%\n\
             Risk Level: {risk}\n\
             5-Year Forecast: Rs {forecast}\n\
             Investment Score: {score:.2}/1.0\n\n\
             Explain outlook, drivers, and risks in one paragraph.",
            bhk = self.bedroom_count,
            size = format_grouped(self.size_sqft, 0),
            location = self.location,
            price = format_grouped(self.current_price, 0),
            per_sqft = format_grouped(self.price_per_sqft, 0),
            amenity = self.amenity_impact_pct,
            news = self.news_impact_pct,
            risk = self.risk_level,
            forecast = format_grouped(self.forecast_5yr, 0),
            score = self.investment_score,
        )
    }

    /// Single-turn conversation carrying the prompt
    pub fn to_messages(&self) -> Vec<Message> {
        vec![Message::user(self.render())]
    }
}
