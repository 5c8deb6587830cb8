use async_trait::async_trait;

use crate::{GeoLocation, Result};

/// Address → coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve an address; `Ok(None)` when the provider finds nothing
    async fn geocode(&self, address: &str) -> Result<Option<GeoLocation>>;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;
}
