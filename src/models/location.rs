//! Location model for user input, resolved coordinates and map markers

use serde::{Deserialize, Serialize};

/// Types of location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Free-form address, trimmed
    Address(String),
    /// Literal coordinates (latitude, longitude)
    Coordinates(f64, f64),
}

impl LocationInput {
    /// Parse raw user input. Blank input yields `None` and is never resolved.
    ///
    /// Input that splits on `,` into exactly two finite numbers is taken as a
    /// literal `lat,lon` pair, everything else is an address.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some((lat, lon)) = Self::parse_coordinates(input) {
            return Some(LocationInput::Coordinates(lat, lon));
        }

        Some(LocationInput::Address(input.to_string()))
    }

    /// Name for errors raised before the input is resolved
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            LocationInput::Address(address) => address.clone(),
            LocationInput::Coordinates(lat, lon) => format!("{lat},{lon}"),
        }
    }

    fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return None;
        }

        let lat = parts[0].parse::<f64>().ok().filter(|v| v.is_finite())?;
        let lon = parts[1].parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some((lat, lon))
    }
}

/// Resolved location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Display name (formatted address or canonical coordinate label)
    pub name: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
        }
    }

    /// Location for literal coordinates, labelled `"{lat},{lon}"`
    #[must_use]
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, format!("{latitude},{longitude}"))
    }

    #[must_use]
    pub fn to_marker(&self) -> Marker {
        Marker {
            coordinate: [self.latitude, self.longitude],
            label: self.name.clone(),
        }
    }
}

/// Display-only pin for one resolved input location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Marker {
    /// `[lat, lon]`
    pub coordinate: [f64; 2],
    pub label: String,
}
