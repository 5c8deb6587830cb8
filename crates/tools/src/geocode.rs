//! Google geocoding client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use realty_config::GoogleMapsConfig;
use realty_core::{GeoLocation, Geocoder, Result};

use crate::http::HttpFetcher;
use crate::IntegrationError;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

impl GeocodeResponse {
    fn into_location(self) -> std::result::Result<Option<GeoLocation>, IntegrationError> {
        match self.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(None),
            other => {
                return Err(IntegrationError::Api {
                    status: 200,
                    message: format!(
                        "{}: {}",
                        other,
                        self.error_message.unwrap_or_default()
                    ),
                })
            }
        }

        let Some(first) = self.results.into_iter().next() else {
            return Ok(None);
        };
        let location = &first["geometry"]["location"];
        match (location["lat"].as_f64(), location["lng"].as_f64()) {
            (Some(lat), Some(lng)) => Ok(Some(GeoLocation::new(lat, lng).with_raw(first))),
            _ => Err(IntegrationError::InvalidResponse(
                "Geocode result without geometry.location".to_string(),
            )),
        }
    }
}

/// Geocoding via `{base}/geocode/json`
#[derive(Clone)]
pub struct GoogleGeocoder {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GoogleGeocoder {
    pub fn new(http: HttpFetcher, config: &GoogleMapsConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(config.geocode_timeout_secs),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeoLocation>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::NotConfigured("geocoding".to_string()))?;

        let url = format!("{}/geocode/json", self.base_url);
        let response: GeocodeResponse = self
            .http
            .get_json(
                "geocode",
                &url,
                &[("address", address.to_string()), ("key", api_key.clone())],
                self.timeout,
            )
            .await?;

        let location = response.into_location()?;
        tracing::debug!(address, found = location.is_some(), "Geocoded address");
        Ok(location)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> std::result::Result<Option<GeoLocation>, IntegrationError> {
        serde_json::from_value::<GeocodeResponse>(value)
            .unwrap()
            .into_location()
    }

    #[test]
    fn test_ok_response() {
        let location = parse(serde_json::json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Kharadi, Pune, Maharashtra, India",
                "geometry": {"location": {"lat": 18.5515, "lng": 73.9348}}
            }]
        }))
        .unwrap()
        .unwrap();

        assert_eq!(location.lat, 18.5515);
        assert_eq!(location.lng, 73.9348);
        assert_eq!(location.raw["formatted_address"], "Kharadi, Pune, Maharashtra, India");
    }

    #[test]
    fn test_zero_results() {
        assert_eq!(parse(serde_json::json!({"status": "ZERO_RESULTS", "results": []})).unwrap(), None);
        assert_eq!(parse(serde_json::json!({"status": "OK", "results": []})).unwrap(), None);
    }

    #[test]
    fn test_denied_is_error() {
        let err = parse(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }))
        .unwrap_err();
        assert!(matches!(err, IntegrationError::Api { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let mut config = GoogleMapsConfig::default();
        config.api_key = None;
        let geocoder = GoogleGeocoder::new(HttpFetcher::new(Default::default()).unwrap(), &config);

        assert!(!geocoder.is_configured());
        let err = geocoder.geocode("Pune").await.unwrap_err();
        assert!(matches!(err, realty_core::Error::NotConfigured(_)));
    }
}
