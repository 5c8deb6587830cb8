//! End-to-end property analysis
//!
//! One `analyze` call runs extraction, geocoding, the three external
//! lookups (market sample, amenities, news) concurrently, then valuation,
//! forecasting, risk and explanation. Each call runs in its own span with a
//! fresh request id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use realty_config::{PriceTableManager, Settings};
use realty_core::{
    format_inr, value_near_horizon, AmenityReport, ForecastResult, GeoLocation, Geocoder, Horizon,
    NewsFeed, PropertyQuery, RiskAssessment,
};
use realty_text_processing::{EntityExtractor, ExtractedEntities, QueryDefaults};
use realty_tools::Integrations;

use crate::amenity::{AmenityFetcher, AmenityScore, AmenityScorer};
use crate::explanation::{ExplanationGenerator, ExplanationInput, ExplanationTier};
use crate::forecast::{ForecastOutcome, SequenceForecaster};
use crate::market::MarketSignalFetcher;
use crate::metric_names::ANALYSIS_DURATION;
use crate::record_collaborator_error;
use crate::risk::{RiskAssessor, RiskSignals};
use crate::sentiment::{NewsFetcher, SentimentScore, SentimentScorer};
use crate::valuation::{adjusted_price, investment_score, Valuation};
use crate::AnalysisError;

pub const METHODOLOGY: &str = "LSTM with weighted amenities and news sentiment";

/// Location block of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationReport {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: String,
    pub area: Option<String>,
    /// Raw geocoder result, `{}` when geocoding failed
    pub data: serde_json::Value,
}

impl LocationReport {
    fn new(query: &PropertyQuery, geo: Option<&GeoLocation>) -> Self {
        Self {
            lat: geo.map(|g| g.lat),
            lng: geo.map(|g| g.lng),
            city: query.city.clone(),
            area: query.area.clone(),
            data: geo
                .map(|g| g.raw.clone())
                .filter(|raw| !raw.is_null())
                .unwrap_or_else(|| serde_json::json!({})),
        }
    }
}

/// Everything one analysis produced
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub entities: ExtractedEntities,
    pub query: PropertyQuery,
    pub location: LocationReport,
    pub valuation: Valuation,
    pub amenities: AmenityReport,
    pub amenity: AmenityScore,
    pub news: NewsFeed,
    pub sentiment: SentimentScore,
    pub forecast: ForecastResult,
    pub risk: RiskAssessment,
    pub explanation: String,
    pub explanation_tier: ExplanationTier,
    pub methodology: &'static str,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// One-line description of the property and its adjusted price
    pub fn summary(&self) -> String {
        format!(
            "{} BHK property in {}, {} sqft. Current estimated price: {}",
            self.query.bedroom_count,
            self.query.location_label(),
            format_size(self.query.floor_area_sqft),
            format_inr(self.forecast.current_price)
        )
    }
}

/// Entities, coordinates and amenities for a free-text location
#[derive(Debug, Clone, Serialize)]
pub struct PropertyLookup {
    pub entities: ExtractedEntities,
    pub query: PropertyQuery,
    pub location: Option<GeoLocation>,
    pub amenities: AmenityReport,
}

fn format_size(sqft: f64) -> String {
    if sqft.fract() == 0.0 {
        format!("{:.0}", sqft)
    } else {
        format!("{:.1}", sqft)
    }
}

/// Wires the analysis components to their collaborators
#[derive(Clone)]
pub struct AnalysisPipeline {
    prices: PriceTableManager,
    geocoder: Arc<dyn Geocoder>,
    market: MarketSignalFetcher,
    amenities: AmenityFetcher,
    news: NewsFetcher,
    amenity_scorer: AmenityScorer,
    sentiment_scorer: SentimentScorer,
    forecaster: SequenceForecaster,
    risk: RiskAssessor,
    explainer: ExplanationGenerator,
    defaults: QueryDefaults,
    horizons: Vec<Horizon>,
    amenity_radius_m: u32,
    property_radius_m: u32,
}

impl AnalysisPipeline {
    pub fn new(
        settings: &Settings,
        prices: PriceTableManager,
        forecaster: SequenceForecaster,
        integrations: Integrations,
    ) -> Self {
        let analysis = &settings.analysis;
        Self {
            prices,
            geocoder: integrations.geocoder,
            market: MarketSignalFetcher::new(integrations.listings),
            amenities: AmenityFetcher::new(
                integrations.places,
                settings.providers.google_maps.categories.clone(),
            ),
            news: NewsFetcher::new(integrations.news, analysis.news_count),
            amenity_scorer: AmenityScorer::new(&settings.scoring),
            sentiment_scorer: SentimentScorer::new(&settings.scoring),
            forecaster,
            risk: RiskAssessor::new(),
            explainer: ExplanationGenerator::new(integrations.text),
            defaults: QueryDefaults {
                city: analysis.default_city.clone(),
                bedrooms: analysis.default_bedrooms,
                size_sqft: analysis.default_size_sqft,
            },
            horizons: analysis.horizons.clone(),
            amenity_radius_m: analysis.amenity_radius_m,
            property_radius_m: analysis.property_radius_m,
        }
    }

    pub fn prices(&self) -> &PriceTableManager {
        &self.prices
    }

    pub fn forecaster(&self) -> &SequenceForecaster {
        &self.forecaster
    }

    pub fn default_horizons(&self) -> &[Horizon] {
        &self.horizons
    }

    /// Entities from free text, splitting on cities the price table knows
    pub fn extract(&self, text: &str) -> ExtractedEntities {
        EntityExtractor::with_known_cities(self.prices.snapshot().city_names()).extract(text)
    }

    /// Full analysis of a free-text property description
    pub async fn analyze(&self, text: &str, radius_m: Option<u32>) -> Result<AnalysisReport, AnalysisError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", %request_id);
        let started = Instant::now();

        let result = self
            .run(request_id, text, radius_m.unwrap_or(self.amenity_radius_m))
            .instrument(span)
            .await;

        metrics::histogram!(ANALYSIS_DURATION).record(started.elapsed().as_secs_f64());
        result
    }

    async fn run(&self, request_id: Uuid, text: &str, radius_m: u32) -> Result<AnalysisReport, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::InvalidQuery("query must not be empty".to_string()));
        }

        let entities = self.extract(text);
        let query = entities.to_query(&self.defaults);
        let label = query.location_label();
        tracing::info!(
            city = %query.city,
            area = ?query.area,
            bedrooms = query.bedroom_count,
            size_sqft = query.floor_area_sqft,
            "Analyzing property"
        );

        let geo = self.geocode(&label).await;
        let (market, amenities, news) = tokio::join!(
            self.market.sample_market_price(&query),
            self.amenities.fetch(geo.as_ref(), radius_m),
            self.news.fetch_for_location(&label),
        );

        let table = self.prices.snapshot();
        let valuation = Valuation::estimate(&table, &query, market);
        let amenity = self.amenity_scorer.score_report(&amenities);
        let sentiment = self.sentiment_scorer.score_feed(&news);

        let current_price = adjusted_price(valuation.current_price, amenity.score, sentiment.score);
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(AnalysisError::Valuation(format!(
                "estimated price {} is not a positive amount",
                current_price
            )));
        }

        let outcome = self.forecaster.forecast(current_price, self.horizons.clone()).await;
        let predicted_5yr = value_near_horizon(&outcome.predictions, 5).unwrap_or(current_price);

        let mut forecast = ForecastResult {
            predictions: outcome.predictions,
            predicted_5yr,
            current_price,
            base_price: valuation.base_price,
            price_per_sqft: valuation.price_per_sqft,
            market_average: valuation.market.value(),
            amenity_score: amenity.score,
            amenity_count: amenity.total_count,
            sentiment_score: sentiment.score,
            sentiment_positive: sentiment.positive,
            sentiment_negative: sentiment.negative,
            investment_score: 0.0,
            explanation_path: outcome.method,
            explanation: None,
        };
        let overall = investment_score(amenity.score, sentiment.score, forecast.five_year_growth());
        forecast.investment_score = overall;
        tracing::info!(
            current_price,
            predicted_5yr,
            path = outcome.method.as_str(),
            investment_score = overall,
            "Forecast complete"
        );

        let risk = self.risk.assess(
            &label,
            &news,
            &RiskSignals {
                sentiment,
                amenity_score: amenity.score,
                amenity_count: amenity.total_count,
                investment_score: overall,
                market_sampled: valuation.market.is_sampled(),
            },
        );
        tracing::info!(level = %risk.level, points = ?risk.points, "Risk assessed");

        let (explanation, explanation_tier) = self
            .explainer
            .explain(&ExplanationInput {
                bedroom_count: query.bedroom_count,
                size_sqft: query.floor_area_sqft,
                location: label.clone(),
                current_price,
                price_per_sqft: valuation.price_per_sqft,
                amenity_score: amenity.score,
                sentiment_score: sentiment.score,
                risk_level: risk.level,
                forecast_5yr: predicted_5yr,
                investment_score: overall,
                forecaster_text: forecast.explanation.clone(),
            })
            .await;

        Ok(AnalysisReport {
            request_id,
            location: LocationReport::new(&query, geo.as_ref()),
            entities,
            query,
            valuation,
            amenities,
            amenity,
            news,
            sentiment,
            forecast,
            risk,
            explanation,
            explanation_tier,
            methodology: METHODOLOGY,
            generated_at: Utc::now(),
        })
    }

    /// Price projection for an explicit current price
    pub async fn forecast(&self, current_price: f64, horizons: Vec<Horizon>) -> ForecastOutcome {
        self.forecaster.forecast(current_price, horizons).await
    }

    /// Development news for a free-form query
    pub async fn news(&self, query: &str, count: usize) -> NewsFeed {
        self.news.search(query, count).await
    }

    /// Coordinates and nearby amenities for a free-text location
    pub async fn locate(&self, text: &str, radius_m: Option<u32>) -> PropertyLookup {
        let entities = self.extract(text);
        let query = entities.to_query(&self.defaults);
        let location = self.geocode(&query.location_label()).await;
        let amenities = self
            .amenities
            .fetch(location.as_ref(), radius_m.unwrap_or(self.property_radius_m))
            .await;
        PropertyLookup {
            entities,
            query,
            location,
            amenities,
        }
    }

    async fn geocode(&self, address: &str) -> Option<GeoLocation> {
        if !self.geocoder.is_configured() {
            tracing::debug!(address, "Geocoder not configured");
            return None;
        }
        match self.geocoder.geocode(address).await {
            Ok(Some(location)) => {
                tracing::info!(address, lat = location.lat, lng = location.lng, "Geocoded");
                Some(location)
            }
            Ok(None) => {
                tracing::info!(address, "No geocoding result");
                None
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "Geocoding failed");
                record_collaborator_error("geocode");
                None
            }
        }
    }
}
