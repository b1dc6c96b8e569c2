//! Location Resolution Module
//!
//! This module handles resolving location inputs (literal coordinates or
//! free-form addresses) into structured Location objects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::{Location, LocationInput};
use crate::{IsochroneError, Result};

/// One geocoding candidate
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeocodingResult {
    /// Formatted address
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<GeocodingResult> for Location {
    fn from(geocoding: GeocodingResult) -> Self {
        Location::new(geocoding.lat, geocoding.lon, geocoding.name)
    }
}

/// Forward geocoding collaborator
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for `address`, best first. Non-success statuses are
    /// reported as [`IsochroneError::GeocodingFailed`].
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodingResult>>;
}

/// Service for resolving location inputs
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve raw user input. Blank input is rejected without a network call.
    pub async fn resolve(&self, input: &str) -> Result<Location> {
        let location_input = LocationInput::parse(input)
            .ok_or_else(|| IsochroneError::invalid_input("Location cannot be empty"))?;
        self.resolve_location(location_input).await
    }

    /// Resolve a location input into a structured Location
    #[instrument(skip(self))]
    pub async fn resolve_location(&self, location_input: LocationInput) -> Result<Location> {
        let location = match location_input {
            LocationInput::Coordinates(lat, lon) => Location::from_coordinates(lat, lon),
            LocationInput::Address(address) => self.resolve_address(&address).await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name, location.latitude, location.longitude
        );

        Ok(location)
    }

    /// Resolve an address via geocoding. The first candidate is authoritative.
    async fn resolve_address(&self, address: &str) -> Result<Location> {
        debug!("Geocoding address: {}", address);

        let geocoding = self
            .geocoder
            .geocode(address)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                IsochroneError::geocoding(address, "No results found for this address")
            })?;

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            geocoding.name, geocoding.lat, geocoding.lon
        );

        Ok(Location::from(geocoding))
    }
}
