//! Market price sampling from comparable listings
//!
//! Searches listings for the same bedroom count and location, extracts the
//! prices mentioned in titles and snippets, and averages the lowest few.
//! Absence is a normal outcome: no credentials, no hits, or an upstream
//! failure all produce `MarketSignal::Absent`.

use std::sync::Arc;

use realty_config::constants::market::{MAX_PLAUSIBLE_PRICE, MAX_SAMPLES, MIN_PLAUSIBLE_PRICE};
use realty_core::{ListingSearch, MarketSignal, PropertyQuery};
use realty_text_processing::{PriceBand, PriceMentionExtractor};

use crate::record_collaborator_error;

/// Samples a market price for a property query
#[derive(Clone)]
pub struct MarketSignalFetcher {
    listings: Arc<dyn ListingSearch>,
    extractor: PriceMentionExtractor,
    max_samples: usize,
}

impl MarketSignalFetcher {
    pub fn new(listings: Arc<dyn ListingSearch>) -> Self {
        Self {
            listings,
            extractor: PriceMentionExtractor::new(PriceBand {
                min: MIN_PLAUSIBLE_PRICE,
                max: MAX_PLAUSIBLE_PRICE,
            }),
            max_samples: MAX_SAMPLES,
        }
    }

    /// Search query used for a property
    pub fn listing_query(query: &PropertyQuery) -> String {
        format!(
            "{} bhk flat for sale in {}",
            query.bedroom_count,
            query.location_label()
        )
    }

    /// Mean of the lowest extracted listing prices, or `Absent`
    pub async fn sample_market_price(&self, query: &PropertyQuery) -> MarketSignal {
        if !self.listings.is_configured() {
            tracing::debug!("Listing search not configured, skipping market sample");
            return MarketSignal::Absent;
        }

        let search_query = Self::listing_query(query);
        let snippets = match self.listings.search_listings(&search_query).await {
            Ok(snippets) => snippets,
            Err(e) => {
                tracing::warn!(query = %search_query, error = %e, "Listing search failed");
                record_collaborator_error("listings");
                return MarketSignal::Absent;
            }
        };

        let texts: Vec<String> = snippets.iter().map(|s| s.text()).collect();
        let prices = self.extractor.extract_all(texts.iter().map(String::as_str));
        let signal = MarketSignal::from(mean_of_lowest(prices, self.max_samples));

        tracing::info!(
            query = %search_query,
            listings = snippets.len(),
            sampled = ?signal.value(),
            "Market sample complete"
        );
        signal
    }
}

/// Arithmetic mean of the `n` smallest values
fn mean_of_lowest(mut prices: Vec<f64>, n: usize) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(|a, b| a.total_cmp(b));
    prices.truncate(n);
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use realty_core::{Error, ListingSnippet, Result};

    struct FixedListings(Result<Vec<ListingSnippet>>);

    #[async_trait]
    impl ListingSearch for FixedListings {
        async fn search_listings(&self, _query: &str) -> Result<Vec<ListingSnippet>> {
            self.0.clone()
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    struct Unconfigured;

    #[async_trait]
    impl ListingSearch for Unconfigured {
        async fn search_listings(&self, _query: &str) -> Result<Vec<ListingSnippet>> {
            Err(Error::NotConfigured("listing search".into()))
        }

        fn is_configured(&self) -> bool {
            false
        }
    }

    fn query() -> PropertyQuery {
        PropertyQuery {
            raw_text: String::new(),
            city: "Pune".into(),
            area: Some("Kharadi".into()),
            bedroom_count: 3,
            floor_area_sqft: 1500.0,
        }
    }

    #[test]
    fn test_listing_query() {
        assert_eq!(
            MarketSignalFetcher::listing_query(&query()),
            "3 bhk flat for sale in Kharadi, Pune"
        );
    }

    #[test]
    fn test_mean_of_lowest() {
        assert_eq!(mean_of_lowest(vec![], 10), None);
        assert_eq!(mean_of_lowest(vec![3.0, 1.0, 2.0], 2), Some(1.5));
        let many: Vec<f64> = (1..=15).map(|v| v as f64).collect();
        assert_eq!(mean_of_lowest(many, 10), Some(5.5));
    }

    #[tokio::test]
    async fn test_sample_from_snippets() {
        let fetcher = MarketSignalFetcher::new(Arc::new(FixedListings(Ok(vec![
            ListingSnippet::new("3 BHK Flat in Kharadi - ₹1.2 Cr", "Ready to move"),
            ListingSnippet::new("Spacious 3 BHK", "Price 90 lakh, east facing"),
            ListingSnippet::new("Plot for sale", "₹ 4500 per sqft"),
        ]))));

        let signal = fetcher.sample_market_price(&query()).await;
        assert_eq!(signal, MarketSignal::Sampled(10_500_000.0));
    }

    #[tokio::test]
    async fn test_absent_cases() {
        let no_prices = MarketSignalFetcher::new(Arc::new(FixedListings(Ok(vec![ListingSnippet::new(
            "3 BHK",
            "call for price",
        )]))));
        assert_eq!(no_prices.sample_market_price(&query()).await, MarketSignal::Absent);

        let failing = MarketSignalFetcher::new(Arc::new(FixedListings(Err(Error::Api("403".into())))));
        assert_eq!(failing.sample_market_price(&query()).await, MarketSignal::Absent);

        let unconfigured = MarketSignalFetcher::new(Arc::new(Unconfigured));
        assert_eq!(unconfigured.sample_market_price(&query()).await, MarketSignal::Absent);
    }
}
