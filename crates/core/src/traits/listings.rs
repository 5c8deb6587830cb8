use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Text of one listing search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

impl ListingSnippet {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
        }
    }

    /// Title and snippet joined, lower-cased
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.snippet).to_lowercase()
    }
}

/// Web search over property listings
#[async_trait]
pub trait ListingSearch: Send + Sync {
    async fn search_listings(&self, query: &str) -> Result<Vec<ListingSnippet>>;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;
}
