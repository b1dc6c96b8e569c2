//! Data models for the isochrone overlap pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: user input, resolved coordinates and display markers
//! - Travel mode: the closed set of upstream routing profiles
//! - Isochrone: per-location reachable areas and the combined result

pub mod isochrone;
pub mod location;
pub mod travel_mode;

// Re-export all public types for convenient access
pub use isochrone::{IntersectionResult, IsochronePolygon, IsochroneProperties, IsochroneRequest};
pub use location::{Location, LocationInput, Marker};
pub use travel_mode::TravelMode;
