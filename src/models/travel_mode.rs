use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::IsochroneError;

/// Upstream routing profile used for an isochrone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Drive,
    ApproximatedTransit,
    Bicycle,
    Walk,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Drive,
        TravelMode::ApproximatedTransit,
        TravelMode::Bicycle,
        TravelMode::Walk,
    ];

    /// Name used on the wire by the isoline service
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Drive => "drive",
            TravelMode::ApproximatedTransit => "approximated_transit",
            TravelMode::Bicycle => "bicycle",
            TravelMode::Walk => "walk",
        }
    }

    /// Fill colour the map uses for this mode's area
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            TravelMode::Drive => "#1e3a8a",
            TravelMode::ApproximatedTransit => "#7e22ce",
            TravelMode::Bicycle => "#15803d",
            TravelMode::Walk => "#ea580c",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = IsochroneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| {
                IsochroneError::invalid_input(format!(
                    "Unknown travel mode '{}'. Must be one of: drive, approximated_transit, bicycle, walk",
                    s
                ))
            })
    }
}
