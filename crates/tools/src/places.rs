//! Google Places nearby search client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use realty_config::GoogleMapsConfig;
use realty_core::{GeoLocation, PlaceRecord, PlacesProvider, Result};

use crate::http::HttpFetcher;
use crate::IntegrationError;

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
struct NearbyPlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<NearbyPlace> for PlaceRecord {
    fn from(place: NearbyPlace) -> Self {
        let (lat, lng) = match place.geometry {
            Some(g) => (Some(g.location.lat), Some(g.location.lng)),
            None => (None, None),
        };
        PlaceRecord {
            name: place.name.unwrap_or_default(),
            vicinity: place.vicinity,
            rating: place.rating,
            lat,
            lng,
        }
    }
}

impl NearbyResponse {
    fn into_places(self) -> std::result::Result<Vec<PlaceRecord>, IntegrationError> {
        match self.status.as_str() {
            "OK" | "ZERO_RESULTS" | "" => Ok(self.results.into_iter().map(PlaceRecord::from).collect()),
            other => Err(IntegrationError::Api {
                status: 200,
                message: format!("{}: {}", other, self.error_message.unwrap_or_default()),
            }),
        }
    }
}

/// Nearby search via `{base}/place/nearbysearch/json`
#[derive(Clone)]
pub struct GooglePlacesClient {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GooglePlacesClient {
    pub fn new(http: HttpFetcher, config: &GoogleMapsConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(config.places_timeout_secs),
        }
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn nearby(&self, location: &GeoLocation, radius_m: u32, place_type: &str) -> Result<Vec<PlaceRecord>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::NotConfigured("places".to_string()))?;

        let url = format!("{}/place/nearbysearch/json", self.base_url);
        let response: NearbyResponse = self
            .http
            .get_json(
                "places",
                &url,
                &[
                    ("location", format!("{},{}", location.lat, location.lng)),
                    ("radius", radius_m.to_string()),
                    ("type", place_type.to_string()),
                    ("key", api_key.clone()),
                ],
                self.timeout,
            )
            .await?;

        Ok(response.into_places()?)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_places() {
        let response: NearbyResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "name": "City Hospital",
                    "vicinity": "Kharadi Bypass",
                    "rating": 4.3,
                    "geometry": {"location": {"lat": 18.55, "lng": 73.94}}
                },
                {"name": "Clinic Without Geometry"}
            ]
        }))
        .unwrap();

        let places = response.into_places().unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "City Hospital");
        assert_eq!(places[0].rating, Some(4.3));
        assert_eq!(places[0].lat, Some(18.55));
        assert_eq!(places[1].vicinity, None);
        assert_eq!(places[1].lng, None);
    }

    #[test]
    fn test_zero_results_is_empty() {
        let response: NearbyResponse =
            serde_json::from_value(serde_json::json!({"status": "ZERO_RESULTS", "results": []})).unwrap();
        assert!(response.into_places().unwrap().is_empty());
    }

    #[test]
    fn test_over_query_limit_is_error() {
        let response: NearbyResponse =
            serde_json::from_value(serde_json::json!({"status": "OVER_QUERY_LIMIT"})).unwrap();
        assert!(response.into_places().is_err());
    }
}
