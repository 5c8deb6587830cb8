//! SerpAPI news search client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use realty_config::SerpConfig;
use realty_core::{NewsItem, NewsSearch, Result};

use crate::http::HttpFetcher;
use crate::IntegrationError;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    news_results: Vec<NewsResult>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    /// A plain name or `{ "name": ... }` depending on the engine version
    #[serde(default)]
    source: serde_json::Value,
    #[serde(default)]
    link: Option<String>,
}

impl From<NewsResult> for NewsItem {
    fn from(result: NewsResult) -> Self {
        let source = match &result.source {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(obj) => obj
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };
        NewsItem {
            title: result.title.unwrap_or_default(),
            snippet: result.snippet.unwrap_or_default(),
            source,
            link: result.link.unwrap_or_default(),
        }
    }
}

impl NewsResponse {
    fn into_items(self) -> std::result::Result<Vec<NewsItem>, IntegrationError> {
        if let Some(error) = self.error {
            // SerpAPI reports an empty search as an error string
            if error.contains("hasn't returned any results") {
                return Ok(Vec::new());
            }
            return Err(IntegrationError::Api {
                status: 200,
                message: error,
            });
        }
        Ok(self.news_results.into_iter().map(NewsItem::from).collect())
    }
}

/// News search via SerpAPI (`engine=google`, `tbm=nws`)
#[derive(Clone)]
pub struct SerpNewsClient {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SerpNewsClient {
    pub fn new(http: HttpFetcher, config: &SerpConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(config.news_timeout_secs),
        }
    }
}

#[async_trait]
impl NewsSearch for SerpNewsClient {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<NewsItem>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::NotConfigured("news search".to_string()))?;

        let response: NewsResponse = self
            .http
            .get_json(
                "news",
                &self.base_url,
                &[
                    ("api_key", api_key.clone()),
                    ("engine", "google".to_string()),
                    ("q", query.to_string()),
                    ("tbm", "nws".to_string()),
                    ("num", count.to_string()),
                ],
                self.timeout,
            )
            .await?;

        let mut items = response.into_items()?;
        items.truncate(count);
        tracing::debug!(query, items = items.len(), "News search complete");
        Ok(items)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
