//! News search and keyword sentiment

use serde::Serialize;
use std::sync::Arc;

use realty_config::ScoringConfig;
use realty_core::{NewsFeed, NewsItem, NewsSearch};

use crate::record_collaborator_error;

pub const NOTE_NO_NEWS: &str = "No news items found for this location.";
pub const NOTE_NEWS_NOT_CONFIGURED: &str = "News search not configured";

/// Keyword polarity over a set of news items
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentScore {
    /// (positive − negative) / (positive + negative), in [-1, 1]
    pub score: f64,
    pub positive: usize,
    pub negative: usize,
}

/// Keyword-presence sentiment scorer
///
/// A keyword counts at most once per item; title and snippet are searched.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl SentimentScorer {
    pub fn new(scoring: &ScoringConfig) -> Self {
        let lower = |words: &[String]| -> Vec<String> { words.iter().map(|w| w.to_lowercase()).collect() };
        Self {
            positive: lower(&scoring.positive_keywords),
            negative: lower(&scoring.negative_keywords),
        }
    }

    pub fn score(&self, items: &[NewsItem]) -> SentimentScore {
        let mut positive = 0;
        let mut negative = 0;

        for item in items {
            let text = item.searchable_text();
            positive += self.positive.iter().filter(|k| text.contains(k.as_str())).count();
            negative += self.negative.iter().filter(|k| text.contains(k.as_str())).count();
        }

        let total = positive + negative;
        if total == 0 {
            return SentimentScore::default();
        }

        let score = (positive as f64 - negative as f64) / total as f64;
        SentimentScore {
            score: score.clamp(-1.0, 1.0),
            positive,
            negative,
        }
    }

    /// Score a feed; notes and errors score zero
    pub fn score_feed(&self, feed: &NewsFeed) -> SentimentScore {
        self.score(feed.items())
    }
}

/// Runs news searches and wraps the outcome as a `NewsFeed`
#[derive(Clone)]
pub struct NewsFetcher {
    news: Arc<dyn NewsSearch>,
    count: usize,
}

impl NewsFetcher {
    pub fn new(news: Arc<dyn NewsSearch>, count: usize) -> Self {
        Self { news, count }
    }

    /// Query used for a location's development news
    pub fn news_query(location: &str) -> String {
        format!("{} real estate development infrastructure", location)
    }

    /// Development news for a location
    pub async fn fetch_for_location(&self, location: &str) -> NewsFeed {
        self.search(&Self::news_query(location), self.count).await
    }

    /// Free-form news search
    pub async fn search(&self, query: &str, count: usize) -> NewsFeed {
        if !self.news.is_configured() {
            return NewsFeed::Note(NOTE_NEWS_NOT_CONFIGURED.to_string());
        }

        match self.news.search(query, count).await {
            Ok(items) if items.is_empty() => {
                tracing::info!(query, "No news found");
                NewsFeed::Note(NOTE_NO_NEWS.to_string())
            }
            Ok(items) => {
                tracing::info!(query, items = items.len(), "News fetched");
                NewsFeed::Items(items)
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "News search failed");
                record_collaborator_error("news");
                NewsFeed::Error(e.to_string())
            }
        }
    }
}
