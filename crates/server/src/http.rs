//! HTTP Endpoints
//!
//! REST API for property analysis and its building blocks.

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use realty_analysis::{AnalysisError, AnalysisReport, LocationReport};
use realty_core::{AmenityReport, ForecastMethod, Horizon, NewsFeed};
use realty_text_processing::ExtractedEntities;

use crate::metrics::{metrics_handler, track_requests};
use crate::state::AppState;
use crate::ServerError;

const FORECAST_METHODOLOGY: &str = "LSTM-based time series forecasting";
const FORECAST_NOTE: &str = "This is a simple price forecast. For comprehensive analysis with location factors, use /analyze endpoint.";
const MAX_FORECAST_YEAR: i64 = 30;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        // Analysis
        .route("/api/analyze", post(analyze))
        .route("/api/analyze/", post(analyze))
        .route("/forecast", post(forecast))
        .route("/forecast/", post(forecast))
        .route("/news", post(news))
        .route("/news/", post(news))
        .route("/properties", post(properties))
        .route("/properties/", post(properties))
        // Status
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/debug/keys", get(debug_keys))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Admin
        .route("/admin/reload-prices", post(reload_prices))
        .route_layer(middleware::from_fn(track_requests))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - disabled or no origins configured: permissive
/// - otherwise the configured origins; unparseable entries are skipped
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled || origins.is_empty() {
        tracing::info!("CORS allows all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Analysis request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub query: String,
    /// Amenity search radius in metres
    #[serde(default)]
    pub radius: Option<u32>,
}

/// Scores behind the forecast
#[derive(Debug, Serialize)]
pub struct ForecastDetails {
    pub amenity_score: f64,
    pub amenity_count: usize,
    pub news_score: f64,
    pub news_pos: usize,
    pub news_neg: usize,
    pub overall_score: f64,
    pub explanation_path: ForecastMethod,
    pub predicted_5: f64,
}

/// Analysis response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub summary: String,
    /// Horizon (years) to projected price
    pub forecast: BTreeMap<Horizon, f64>,
    pub risk: String,
    pub risk_explanation: String,
    pub estimated_current_price: f64,
    pub base_price: f64,
    pub price_per_sqft: f64,
    pub market_average: Option<f64>,
    pub amenity_boost_pct: f64,
    pub news_impact_pct: f64,
    pub location: LocationReport,
    pub amenities: AmenityReport,
    pub news: NewsFeed,
    pub explanation: String,
    pub forecast_details: ForecastDetails,
    pub methodology: String,
    pub entities: ExtractedEntities,
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
}

impl From<AnalysisReport> for AnalyzeResponse {
    fn from(report: AnalysisReport) -> Self {
        let summary = report.summary();
        let forecast = report.forecast;
        Self {
            summary,
            risk: report.risk.level.as_str().to_string(),
            risk_explanation: report.risk.rationale,
            estimated_current_price: forecast.current_price,
            base_price: forecast.base_price,
            price_per_sqft: forecast.price_per_sqft,
            market_average: forecast.market_average,
            amenity_boost_pct: forecast.amenity_score * 10.0,
            news_impact_pct: forecast.sentiment_score * 5.0,
            location: report.location,
            amenities: report.amenities,
            news: report.news,
            explanation: report.explanation,
            forecast_details: ForecastDetails {
                amenity_score: forecast.amenity_score,
                amenity_count: forecast.amenity_count,
                news_score: forecast.sentiment_score,
                news_pos: forecast.sentiment_positive,
                news_neg: forecast.sentiment_negative,
                overall_score: forecast.investment_score,
                explanation_path: forecast.explanation_path,
                predicted_5: forecast.predicted_5yr,
            },
            forecast: forecast.predictions,
            methodology: report.methodology.to_string(),
            entities: report.entities,
            request_id: report.request_id.to_string(),
            generated_at: report.generated_at,
        }
    }
}

/// POST /api/analyze
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let report = state
        .pipeline
        .analyze(&request.query, request.radius)
        .await
        .map_err(|e| match e {
            AnalysisError::InvalidQuery(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Internal(format!("Analysis failed: {}", other)),
        })?;

    tracing::info!(
        request_id = %report.request_id,
        risk = %report.risk.level,
        tier = report.explanation_tier.as_str(),
        "Analysis complete"
    );
    Ok(Json(report.into()))
}

/// Forecast request
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub current_price: f64,
    /// Horizons in years; server defaults when absent
    #[serde(default)]
    pub years: Option<Vec<i64>>,
}

/// Forecast response
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub forecasts: BTreeMap<Horizon, f64>,
    pub methodology: String,
    pub note: String,
}

/// Check a forecast request and resolve its horizons
fn validate_forecast(request: &ForecastRequest, defaults: &[Horizon]) -> Result<Vec<Horizon>, ServerError> {
    if !(request.current_price > 0.0) || !request.current_price.is_finite() {
        return Err(ServerError::InvalidRequest("Current price must be positive".to_string()));
    }

    let years = match &request.years {
        Some(years) => years.clone(),
        None => defaults.iter().map(|&y| i64::from(y)).collect(),
    };
    if years.is_empty() {
        return Err(ServerError::InvalidRequest(
            "At least one forecast year required".to_string(),
        ));
    }
    if years.iter().any(|&y| y <= 0 || y > MAX_FORECAST_YEAR) {
        return Err(ServerError::InvalidRequest(
            "Forecast years must be between 1 and 30".to_string(),
        ));
    }

    Ok(years.into_iter().map(|y| y as Horizon).collect())
}

/// POST /forecast
async fn forecast(
    State(state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, ServerError> {
    let horizons = validate_forecast(&request, state.pipeline.default_horizons())?;
    let outcome = state.pipeline.forecast(request.current_price, horizons).await;

    tracing::info!(
        current_price = request.current_price,
        path = outcome.method.as_str(),
        "Forecast complete"
    );
    Ok(Json(ForecastResponse {
        forecasts: outcome.predictions,
        methodology: FORECAST_METHODOLOGY.to_string(),
        note: FORECAST_NOTE.to_string(),
    }))
}

/// News request
#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    pub query: String,
    #[serde(default)]
    pub num: Option<usize>,
}

/// POST /news
async fn news(
    State(state): State<AppState>,
    Json(request): Json<NewsRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if request.query.trim().is_empty() {
        return Err(ServerError::InvalidRequest("Query must not be empty".to_string()));
    }
    let count = request.num.unwrap_or(state.settings.analysis.news_count).max(1);
    let feed = state.pipeline.news(request.query.trim(), count).await;
    Ok(Json(serde_json::json!({ "news": feed })))
}

/// Amenity lookup request
#[derive(Debug, Deserialize)]
pub struct PropertyRequest {
    pub query: String,
    #[serde(default)]
    pub radius: Option<u32>,
}

/// Amenity lookup response
#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    pub entities: ExtractedEntities,
    pub lat: f64,
    pub lng: f64,
    pub amenities: AmenityReport,
}

/// POST /properties
async fn properties(
    State(state): State<AppState>,
    Json(request): Json<PropertyRequest>,
) -> Result<Json<PropertyResponse>, ServerError> {
    let lookup = state.pipeline.locate(&request.query, request.radius).await;
    let location = lookup.location.ok_or_else(|| {
        ServerError::Upstream(format!(
            "Geocoding unavailable for '{}'",
            lookup.query.location_label()
        ))
    })?;

    Ok(Json(PropertyResponse {
        entities: lookup.entities,
        lat: location.lat,
        lng: location.lng,
        amenities: lookup.amenities,
    }))
}

/// GET /
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "AI Real Estate Backend is running" }))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let table = state.pipeline.prices().snapshot();
    let history = state.pipeline.forecaster().history();

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.settings.environment,
        "price_table": {
            "cities": table.city_count(),
            "entries": table.entry_count(),
        },
        "history": {
            "points": history.len(),
            "source": history.source(),
        },
        "collaborators": state.collaborators,
    }))
}

/// GET /debug/keys
///
/// Presence of each credential, never the values. Not served in production.
async fn debug_keys(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    if state.settings.environment.is_production() {
        return Err(ServerError::Disabled("Not Found".to_string()));
    }

    let providers = &state.settings.providers;
    Ok(Json(serde_json::json!({
        "env_keys_present": {
            "SERP_API_KEY": providers.serp.api_key.is_some(),
            "GEMINI_API_KEY": providers.gemini.api_key.is_some(),
            "GOOGLE_MAPS_API_KEY": providers.google_maps.api_key.is_some(),
        }
    })))
}

/// POST /admin/reload-prices
///
/// Re-reads the price table file; the previous table stays in place on failure.
async fn reload_prices(State(state): State<AppState>) -> impl IntoResponse {
    match state.reload_prices() {
        Ok(cities) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "message": "Price table reloaded successfully",
                "cities": cities,
            })),
        ),
        Err(e) => {
            tracing::error!("Price table reload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "message": e,
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(price: f64, years: Option<Vec<i64>>) -> ForecastRequest {
        ForecastRequest {
            current_price: price,
            years,
        }
    }

    #[test]
    fn test_forecast_validation() {
        let defaults = [2, 3, 5, 10];
        assert_eq!(validate_forecast(&request(1e6, None), &defaults).unwrap(), vec![2, 3, 5, 10]);
        assert_eq!(validate_forecast(&request(1e6, Some(vec![1, 30])), &defaults).unwrap(), vec![1, 30]);

        let detail = |r: ForecastRequest| validate_forecast(&r, &defaults).unwrap_err().to_string();
        assert_eq!(detail(request(0.0, None)), "Current price must be positive");
        assert_eq!(detail(request(-5.0, None)), "Current price must be positive");
        assert_eq!(detail(request(f64::NAN, None)), "Current price must be positive");
        assert_eq!(detail(request(1e6, Some(vec![]))), "At least one forecast year required");
        assert_eq!(detail(request(1e6, Some(vec![0]))), "Forecast years must be between 1 and 30");
        assert_eq!(detail(request(1e6, Some(vec![5, 31]))), "Forecast years must be between 1 and 30");
    }

    #[test]
    fn test_cors_layers_build() {
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["http://localhost:5173".to_string()], true);
        let _ = build_cors_layer(&["bad\norigin".to_string()], true);
        let _ = build_cors_layer(&[], false);
    }
}
