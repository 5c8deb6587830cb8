use async_trait::async_trait;

use crate::{NewsItem, Result};

/// News search
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<NewsItem>>;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;
}
