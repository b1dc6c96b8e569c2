//! Configuration management for the isochrone overlap service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::IsochroneError;
use crate::models::TravelMode;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable the Geoapify key is read from when not configured
pub const GEOAPIFY_API_KEY_ENV: &str = "GEOAPIFY_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IsochroneConfig {
    /// Geoapify (geocoding + isoline) configuration
    pub geoapify: GeoapifyConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Defaults applied to API requests
    pub defaults: DefaultsConfig,
}

/// Geoapify API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoapifyConfig {
    /// Geoapify API key
    pub api_key: Option<String>,
    /// Base URL for the Geoapify API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// ISO country code geocoding is restricted to
    pub country_filter: Option<String>,
    /// `[lon, lat]` geocoding results are biased towards
    pub proximity_bias: Option<[f64; 2]>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Default request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Travel-time budget in minutes
    pub travel_minutes: u32,
    /// Travel modes computed when a request names none
    pub travel_modes: Vec<TravelMode>,
}

// Default value functions
fn default_geoapify_base_url() -> String {
    "https://api.geoapify.com/v1".to_string()
}

fn default_geoapify_timeout() -> u32 {
    30
}

fn default_country_filter() -> Option<String> {
    Some("at".to_string())
}

fn default_proximity_bias() -> Option<[f64; 2]> {
    Some([16.3738, 48.2082])
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_travel_minutes() -> u32 {
    15
}

fn default_travel_modes() -> Vec<TravelMode> {
    vec![TravelMode::ApproximatedTransit]
}

impl Default for GeoapifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geoapify_base_url(),
            timeout_seconds: default_geoapify_timeout(),
            country_filter: default_country_filter(),
            proximity_bias: default_proximity_bias(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            travel_minutes: default_travel_minutes(),
            travel_modes: default_travel_modes(),
        }
    }
}

impl IsochroneConfig {
    /// Load configuration from file and environment variables. Without a
    /// path the default config location is used.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ISOCHRONE_GEOAPIFY__API_KEY, ISOCHRONE_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("ISOCHRONE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: IsochroneConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.geoapify.api_key.is_none() {
            config.geoapify.api_key = std::env::var(GEOAPIFY_API_KEY_ENV).ok();
        }

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("isochrone-overlap").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geoapify.base_url.is_empty() {
            self.geoapify.base_url = default_geoapify_base_url();
        }
        if self.geoapify.timeout_seconds == 0 {
            self.geoapify.timeout_seconds = default_geoapify_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.defaults.travel_minutes == 0 {
            self.defaults.travel_minutes = default_travel_minutes();
        }
        if self.defaults.travel_modes.is_empty() {
            self.defaults.travel_modes = default_travel_modes();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The API key is optional here, but must look sane when present
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.geoapify.api_key {
            if api_key.trim().is_empty() {
                return Err(IsochroneError::config(
                    "Geoapify API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(IsochroneError::config(
                    "Geoapify API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 100 {
                return Err(IsochroneError::config(
                    "Geoapify API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geoapify.timeout_seconds > 300 {
            return Err(
                IsochroneError::config("Geoapify API timeout cannot exceed 300 seconds").into(),
            );
        }

        if !(1..=180).contains(&self.defaults.travel_minutes) {
            return Err(IsochroneError::config(
                "Default travel time must be between 1 and 180 minutes",
            )
            .into());
        }

        if let Some([lon, lat]) = self.geoapify.proximity_bias {
            if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
                return Err(IsochroneError::config(
                    "Proximity bias must be [lon, lat] with lon in -180..180 and lat in -90..90",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(IsochroneError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(IsochroneError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.geoapify.base_url.starts_with("http://")
            && !self.geoapify.base_url.starts_with("https://")
        {
            return Err(IsochroneError::config(
                "Geoapify base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
