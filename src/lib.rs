//! Isochrone overlap: the area reachable from every one of a set of locations
//!
//! Locations are resolved to coordinates, each one's isochrone is fetched for
//! a travel mode and time budget, and the polygons are intersected into the
//! common reachable area.

pub mod api;
pub mod config;
pub mod error;
pub mod geoapify;
pub mod intersection;
pub mod isochrone_fetcher;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod session;
pub mod web;

// Re-export core types for public API
pub use config::IsochroneConfig;
pub use error::{ErrorKind, IsochroneError};
pub use geoapify::GeoapifyClient;
pub use intersection::{Intersection, intersect};
pub use isochrone_fetcher::{IsochroneFetcher, IsochroneProvider};
pub use location_resolver::{Geocoder, GeocodingResult, LocationResolver};
pub use models::{IntersectionResult, IsochronePolygon, Location, LocationInput, Marker, TravelMode};
pub use session::IsochroneSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, IsochroneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
