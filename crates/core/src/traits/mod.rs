//! Collaborator traits
//!
//! External services the analysis pipeline consumes. Every collaborator can
//! report whether it is configured; an unconfigured collaborator is a normal
//! state that callers translate into a documented fallback.
//!
//! ```text
//! Location:
//!   - Geocoder: address → coordinates
//!   - PlacesProvider: coordinates + category → nearby places
//!
//! Market context:
//!   - NewsSearch: query → news items
//!   - ListingSearch: query → listing snippets (for price sampling)
//!
//! Language:
//!   - TextGenerator: prompt → prose
//! ```

mod geocoding;
mod listings;
mod news;
mod places;
mod text;

pub use geocoding::Geocoder;
pub use listings::{ListingSearch, ListingSnippet};
pub use news::NewsSearch;
pub use places::PlacesProvider;
pub use text::TextGenerator;
