//! Amenity inventory fetching and scoring

use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use realty_config::{AmenityBucket, PlaceCategory, ScoringConfig};
use realty_core::{AmenityCategory, AmenityInventory, AmenityReport, GeoLocation, PlacesProvider};

use crate::record_collaborator_error;

pub const NOTE_PLACES_NOT_CONFIGURED: &str =
    "Google Places not configured - amenities unavailable in development";
pub const NOTE_NO_GEOLOCATION: &str = "Amenities skipped - no geolocation available";

/// Weighted amenity density
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AmenityScore {
    /// Weighted density in [0, 1]
    pub score: f64,
    /// Places across every category, classified or not
    pub total_count: usize,
    /// Bucket name → places counted into it
    pub buckets: BTreeMap<String, usize>,
}

/// Converts an inventory into a single density score
///
/// Each category label is assigned to the first bucket with a matching
/// keyword. A bucket contributes `weight × min(sqrt(count / normalizer), 1)`.
#[derive(Debug, Clone)]
pub struct AmenityScorer {
    buckets: Vec<AmenityBucket>,
}

impl Default for AmenityScorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl AmenityScorer {
    pub fn new(scoring: &ScoringConfig) -> Self {
        Self {
            buckets: scoring.amenity_buckets.clone(),
        }
    }

    pub fn score(&self, inventory: &AmenityInventory) -> AmenityScore {
        let mut counts: BTreeMap<String, usize> =
            self.buckets.iter().map(|b| (b.name.clone(), 0)).collect();

        for (label, category) in inventory.iter() {
            if let Some(bucket) = self.buckets.iter().find(|b| b.matches(label)) {
                *counts.entry(bucket.name.clone()).or_default() += category.count;
            }
        }

        let score: f64 = self
            .buckets
            .iter()
            .map(|bucket| {
                let count = counts.get(&bucket.name).copied().unwrap_or(0) as f64;
                bucket.weight * (count / bucket.normalizer).sqrt().min(1.0)
            })
            .sum();

        AmenityScore {
            score: score.clamp(0.0, 1.0),
            total_count: inventory.total_count(),
            buckets: counts,
        }
    }

    /// Score a report; notes and errors score zero
    pub fn score_report(&self, report: &AmenityReport) -> AmenityScore {
        match report.inventory() {
            Some(inventory) => self.score(inventory),
            None => AmenityScore::default(),
        }
    }
}

/// Collects nearby places for every configured category
#[derive(Clone)]
pub struct AmenityFetcher {
    places: Arc<dyn PlacesProvider>,
    categories: Vec<PlaceCategory>,
}

impl AmenityFetcher {
    pub fn new(places: Arc<dyn PlacesProvider>, categories: Vec<PlaceCategory>) -> Self {
        Self { places, categories }
    }

    /// Inventory around `location`, or a note explaining why there is none
    ///
    /// A failed category is kept as an empty entry so one bad category does
    /// not hide the others. When every category fails the report is an error.
    pub async fn fetch(&self, location: Option<&GeoLocation>, radius_m: u32) -> AmenityReport {
        let Some(location) = location else {
            return AmenityReport::note(NOTE_NO_GEOLOCATION);
        };
        if !self.places.is_configured() {
            return AmenityReport::note(NOTE_PLACES_NOT_CONFIGURED);
        }

        let lookups = self.categories.iter().map(|category| async move {
            let result = self.places.nearby(location, radius_m, &category.place_type).await;
            if let Err(e) = &result {
                tracing::warn!(
                    category = %category.label,
                    error = %e,
                    "Places lookup failed"
                );
                record_collaborator_error("places");
            }
            (category.label.clone(), result)
        });
        let results = join_all(lookups).await;

        let failures = results.iter().filter(|(_, result)| result.is_err()).count();
        if failures > 0 && failures == results.len() {
            let reason = results
                .iter()
                .find_map(|(_, result)| result.as_ref().err())
                .map(|e| e.to_string())
                .unwrap_or_default();
            return AmenityReport::error(format!("All amenity lookups failed: {}", reason));
        }

        let inventory: AmenityInventory = results
            .into_iter()
            .map(|(label, result)| (label, result.map(AmenityCategory::from_places).unwrap_or_default()))
            .collect();
        tracing::info!(
            categories = inventory.len(),
            total = inventory.total_count(),
            radius_m,
            "Amenities fetched"
        );
        AmenityReport::Inventory(inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use realty_core::{Error, PlaceRecord, Result};

    fn places(n: usize) -> Vec<PlaceRecord> {
        (0..n).map(|i| PlaceRecord::named(format!("place {}", i))).collect()
    }

    #[test]
    fn test_empty_inventory() {
        let score = AmenityScorer::default().score(&AmenityInventory::new());
        assert_eq!(score.score, 0.0);
        assert_eq!(score.total_count, 0);
    }

    #[test]
    fn test_saturated_inventory() {
        let inventory = AmenityInventory::new()
            .with("schools", AmenityCategory::with_count(10))
            .with("hospitals", AmenityCategory::with_count(5))
            .with("parks", AmenityCategory::with_count(50))
            .with("malls", AmenityCategory::with_count(5));
        let score = AmenityScorer::default().score(&inventory);
        assert!((score.score - 1.0).abs() < 1e-12);
        assert_eq!(score.total_count, 70);
    }

    #[test]
    fn test_partial_inventory() {
        let inventory = AmenityInventory::new()
            .with("schools", AmenityCategory::with_count(4))
            .with("colleges", AmenityCategory::with_count(1))
            .with("banks", AmenityCategory::with_count(7));
        let score = AmenityScorer::default().score(&inventory);

        // education: 5 places against a normalizer of 10
        let expected = 0.3 * (0.5f64).sqrt();
        assert!((score.score - expected).abs() < 1e-12);
        assert_eq!(score.buckets["education"], 5);
        assert_eq!(score.total_count, 12);
    }

    #[test]
    fn test_note_scores_zero() {
        let score = AmenityScorer::default().score_report(&AmenityReport::note("none"));
        assert_eq!(score, AmenityScore::default());
    }

    struct FakePlaces;

    #[async_trait]
    impl PlacesProvider for FakePlaces {
        async fn nearby(&self, _location: &GeoLocation, _radius_m: u32, place_type: &str) -> Result<Vec<PlaceRecord>> {
            match place_type {
                "school" => Ok(places(3)),
                "hospital" => Err(Error::Timeout(20)),
                _ => Ok(vec![]),
            }
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    struct NoPlaces;

    #[async_trait]
    impl PlacesProvider for NoPlaces {
        async fn nearby(&self, _location: &GeoLocation, _radius_m: u32, _place_type: &str) -> Result<Vec<PlaceRecord>> {
            Err(Error::NotConfigured("places".into()))
        }

        fn is_configured(&self) -> bool {
            false
        }
    }

    /// Configured, but every request fails
    struct DownPlaces;

    #[async_trait]
    impl PlacesProvider for DownPlaces {
        async fn nearby(&self, _location: &GeoLocation, _radius_m: u32, _place_type: &str) -> Result<Vec<PlaceRecord>> {
            Err(Error::Timeout(20))
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn categories() -> Vec<PlaceCategory> {
        vec![
            PlaceCategory::new("schools", "school"),
            PlaceCategory::new("hospitals", "hospital"),
            PlaceCategory::new("parks", "park"),
        ]
    }

    #[tokio::test]
    async fn test_fetch_inventory() {
        let fetcher = AmenityFetcher::new(Arc::new(FakePlaces), categories());
        let location = GeoLocation::new(18.55, 73.94);
        let report = fetcher.fetch(Some(&location), 10_000).await;

        let inventory = report.inventory().unwrap();
        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory.get("schools").unwrap().count, 3);
        assert_eq!(inventory.get("hospitals").unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_fetch_notes() {
        let fetcher = AmenityFetcher::new(Arc::new(FakePlaces), categories());
        assert_eq!(fetcher.fetch(None, 10_000).await, AmenityReport::note(NOTE_NO_GEOLOCATION));

        let fetcher = AmenityFetcher::new(Arc::new(NoPlaces), categories());
        let location = GeoLocation::new(18.55, 73.94);
        assert_eq!(
            fetcher.fetch(Some(&location), 10_000).await,
            AmenityReport::note(NOTE_PLACES_NOT_CONFIGURED)
        );
    }

    #[tokio::test]
    async fn test_fetch_error_when_every_category_fails() {
        let fetcher = AmenityFetcher::new(Arc::new(DownPlaces), categories());
        let location = GeoLocation::new(18.55, 73.94);
        let report = fetcher.fetch(Some(&location), 10_000).await;

        let AmenityReport::Error { error } = &report else {
            panic!("expected an error report, got {:?}", report);
        };
        assert!(error.starts_with("All amenity lookups failed"));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"error": error})
        );
        assert_eq!(AmenityScorer::default().score_report(&report), AmenityScore::default());
    }
}
