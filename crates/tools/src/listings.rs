//! SerpAPI listing search client (market price sampling)

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use realty_config::SerpConfig;
use realty_core::{ListingSearch, ListingSnippet, Result};

use crate::http::HttpFetcher;
use crate::IntegrationError;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl SearchResponse {
    fn into_snippets(self) -> std::result::Result<Vec<ListingSnippet>, IntegrationError> {
        if let Some(error) = self.error {
            if error.contains("hasn't returned any results") {
                return Ok(Vec::new());
            }
            return Err(IntegrationError::Api {
                status: 200,
                message: error,
            });
        }
        Ok(self
            .organic_results
            .into_iter()
            .map(|r| ListingSnippet::new(r.title.unwrap_or_default(), r.snippet.unwrap_or_default()))
            .collect())
    }
}

/// Web search over listings via SerpAPI (`engine=google`)
#[derive(Clone)]
pub struct SerpListingSearch {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    num: u32,
    location: String,
    gl: String,
    hl: String,
}

impl SerpListingSearch {
    pub fn new(http: HttpFetcher, config: &SerpConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(config.listings_timeout_secs),
            num: config.listings_num,
            location: config.location.clone(),
            gl: config.gl.clone(),
            hl: config.hl.clone(),
        }
    }
}

#[async_trait]
impl ListingSearch for SerpListingSearch {
    async fn search_listings(&self, query: &str) -> Result<Vec<ListingSnippet>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::NotConfigured("listing search".to_string()))?;

        let response: SearchResponse = self
            .http
            .get_json(
                "listings",
                &self.base_url,
                &[
                    ("api_key", api_key.clone()),
                    ("engine", "google".to_string()),
                    ("q", query.to_string()),
                    ("location", self.location.clone()),
                    ("gl", self.gl.clone()),
                    ("hl", self.hl.clone()),
                    ("num", self.num.to_string()),
                ],
                self.timeout,
            )
            .await?;

        Ok(response.into_snippets()?)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_organic_results() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "organic_results": [
                {"title": "3 BHK Flat in Kharadi - ₹1.25 Cr", "snippet": "Ready to move"},
                {"title": "No snippet here"}
            ]
        }))
        .unwrap();

        let snippets = response.into_snippets().unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].text(), "3 bhk flat in kharadi - ₹1.25 cr ready to move");
        assert_eq!(snippets[1].snippet, "");
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let mut config = SerpConfig::default();
        config.api_key = None;
        let search = SerpListingSearch::new(HttpFetcher::new(Default::default()).unwrap(), &config);
        assert!(!search.is_configured());
        assert!(search.search_listings("2 bhk flat for sale in Pune").await.is_err());
    }
}
