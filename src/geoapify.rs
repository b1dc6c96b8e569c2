//! Geoapify API client
//!
//! Implements both upstream collaborators of the pipeline: forward geocoding
//! (`/geocode/search`) and isolines (`/isoline`). Every call is a single
//! attempt; failures surface to the caller unchanged.

use async_trait::async_trait;
use geojson::FeatureCollection;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::GeoapifyConfig;
use crate::isochrone_fetcher::{IsochroneProvider, fetch_error_message};
use crate::location_resolver::{GeocodingResult, Geocoder};
use crate::models::IsochroneRequest;
use crate::{IsochroneError, Result};

/// Geoapify geocoding + isoline client
pub struct GeoapifyClient {
    client: Client,
    api_key: String,
    base_url: String,
    country_filter: Option<String>,
    proximity_bias: Option<[f64; 2]>,
}

/// Geocoding response (GeoJSON feature collection of candidates)
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    geometry: PointGeometry,
    #[serde(default)]
    properties: GeocodeProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    /// `[lon, lat]`
    coordinates: [f64; 2],
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeProperties {
    formatted: Option<String>,
}

/// Body Geoapify sends with non-success statuses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GeoapifyClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: &GeoapifyConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| IsochroneError::config("Geoapify API key not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("isochrone-overlap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IsochroneError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_filter: config.country_filter.clone(),
            proximity_bias: config.proximity_bias,
        })
    }

    fn geocode_url(&self, address: &str) -> String {
        let mut url = format!(
            "{}/geocode/search?text={}",
            self.base_url,
            urlencoding::encode(address)
        );
        if let Some(country) = &self.country_filter {
            url.push_str(&format!("&filter=countrycode:{}", urlencoding::encode(country)));
        }
        if let Some([lon, lat]) = self.proximity_bias {
            url.push_str(&format!("&bias=proximity:{lon},{lat}"));
        }
        url.push_str(&format!("&apiKey={}", urlencoding::encode(&self.api_key)));
        url
    }

    fn isoline_url(&self, request: &IsochroneRequest) -> String {
        format!(
            "{}/isoline?lat={}&lon={}&type=time&mode={}&range={}&apiKey={}",
            self.base_url,
            request.latitude,
            request.longitude,
            request.mode,
            request.range_seconds,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Body of a non-success response, logged
    async fn error_body(response: Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!("Geoapify returned {}: {}", status, text);
        text
    }

    /// Upstream `message` of an error body, if any
    fn upstream_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
    }

    fn geocode_error(address: &str, body: &str) -> IsochroneError {
        let message = Self::upstream_message(body)
            .unwrap_or_else(|| format!("Geocoding failed for \"{address}\""));
        IsochroneError::geocoding(address, message)
    }

    fn isoline_error(request: &IsochroneRequest, body: &str) -> IsochroneError {
        IsochroneError::isochrone_fetch(
            request.coordinate_label(),
            fetch_error_message(Self::upstream_message(body)),
        )
    }

    fn candidates(response: GeocodeResponse, address: &str) -> Vec<GeocodingResult> {
        response
            .features
            .into_iter()
            .map(|feature| {
                let [lon, lat] = feature.geometry.coordinates;
                GeocodingResult {
                    name: feature
                        .properties
                        .formatted
                        .unwrap_or_else(|| address.to_string()),
                    lat,
                    lon,
                }
            })
            .collect()
    }
}

#[async_trait]
impl Geocoder for GeoapifyClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodingResult>> {
        let start_time = Instant::now();

        let response = self.client.get(self.geocode_url(address)).send().await?;

        if !response.status().is_success() {
            let body = Self::error_body(response).await;
            return Err(Self::geocode_error(address, &body));
        }

        let body: GeocodeResponse = response.json().await?;
        let results = Self::candidates(body, address);

        if results.is_empty() {
            warn!("No geocoding results found for '{}'", address);
        } else {
            info!(
                "Found {} geocoding results for '{}' in {:.3}s",
                results.len(),
                address,
                start_time.elapsed().as_secs_f64()
            );
        }

        Ok(results)
    }
}

#[async_trait]
impl IsochroneProvider for GeoapifyClient {
    #[instrument(skip(self), fields(mode = %request.mode, range = request.range_seconds))]
    async fn isoline(&self, request: &IsochroneRequest) -> Result<FeatureCollection> {
        let start_time = Instant::now();

        let response = self.client.get(self.isoline_url(request)).send().await?;

        if !response.status().is_success() {
            let body = Self::error_body(response).await;
            return Err(Self::isoline_error(request, &body));
        }

        let collection: FeatureCollection = response.json().await?;

        debug!(
            "Isoline for {} retrieved in {:.3}s",
            request.coordinate_label(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(collection)
    }
}
