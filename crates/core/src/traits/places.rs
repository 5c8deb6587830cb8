use async_trait::async_trait;

use crate::{GeoLocation, PlaceRecord, Result};

/// Nearby place search for a single category
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Places of `place_type` within `radius_m` metres of `location`
    async fn nearby(
        &self,
        location: &GeoLocation,
        radius_m: u32,
        place_type: &str,
    ) -> Result<Vec<PlaceRecord>>;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;
}
