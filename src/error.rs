//! Error types and handling for the isochrone overlap pipeline

use thiserror::Error;

/// Main error type for resolving, fetching and intersecting isochrones
#[derive(Error, Debug)]
pub enum IsochroneError {
    /// Nothing usable was supplied (e.g. every location was blank)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The geocoding service returned no candidates or a non-success status
    #[error("Geocoding failed for \"{address}\": {message}")]
    GeocodingFailed { address: String, message: String },

    /// The isoline service returned a non-success status or an unusable body
    #[error("Failed to fetch isochrone for {location}: {message}")]
    IsochroneFetchFailed { location: String, message: String },

    /// Every isochrone was retrieved but they share no common area
    #[error("No reachable area found for the selected locations and travel mode(s)")]
    NoCommonArea,

    /// Transport level failures talking to either upstream service
    #[error("Network error{}: {message}", at_location(.location))]
    Network {
        location: Option<String>,
        message: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Payload-free discriminant of [`IsochroneError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    GeocodingFailed,
    IsochroneFetchFailed,
    NoCommonArea,
    Network,
    Config,
}

impl IsochroneError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new geocoding error for `address`
    pub fn geocoding<A: Into<String>, S: Into<String>>(address: A, message: S) -> Self {
        Self::GeocodingFailed {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create a new isochrone fetch error for `location`
    pub fn isochrone_fetch<L: Into<String>, S: Into<String>>(location: L, message: S) -> Self {
        Self::IsochroneFetchFailed {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            location: None,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::GeocodingFailed { .. } => ErrorKind::GeocodingFailed,
            Self::IsochroneFetchFailed { .. } => ErrorKind::IsochroneFetchFailed,
            Self::NoCommonArea => ErrorKind::NoCommonArea,
            Self::Network { .. } => ErrorKind::Network,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether this is the expected "locations too far apart" outcome
    #[must_use]
    pub fn is_no_common_area(&self) -> bool {
        matches!(self, Self::NoCommonArea)
    }

    /// Attach the human readable location name to isochrone and transport
    /// failures. Other variants pass through untouched.
    #[must_use]
    pub fn for_location(self, name: &str) -> Self {
        match self {
            Self::IsochroneFetchFailed { message, .. } => Self::IsochroneFetchFailed {
                location: name.to_string(),
                message,
            },
            Self::Network { message, .. } => Self::Network {
                location: Some(name.to_string()),
                message,
            },
            other => other,
        }
    }

    /// Get the message the UI renders verbatim
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            IsochroneError::InvalidInput { message } => message.clone(),
            IsochroneError::GeocodingFailed { .. }
            | IsochroneError::IsochroneFetchFailed { .. }
            | IsochroneError::Network { .. } => self.to_string(),
            IsochroneError::NoCommonArea => {
                "No reachable area found for the selected locations and travel mode(s).".to_string()
            }
            IsochroneError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}

fn at_location(location: &Option<String>) -> String {
    location
        .as_deref()
        .map(|name| format!(" for {name}"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for IsochroneError {
    fn from(err: reqwest::Error) -> Self {
        // request URLs carry the API key
        IsochroneError::network(err.without_url().to_string())
    }
}
