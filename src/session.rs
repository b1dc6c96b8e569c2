//! Isochrone Session
//!
//! Drives one user-triggered computation: resolve and fetch every non-blank
//! location concurrently, intersect the polygons in input order, and package
//! the result with one marker per location. Nothing survives a `run` call.

use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::intersection;
use crate::isochrone_fetcher::{IsochroneFetcher, IsochroneProvider};
use crate::location_resolver::{Geocoder, LocationResolver};
use crate::models::{IntersectionResult, IsochronePolygon, Location, LocationInput, TravelMode};
use crate::{IsochroneError, Result};

/// Orchestrates Resolver, Fetcher and Intersection Engine
#[derive(Clone)]
pub struct IsochroneSession {
    resolver: LocationResolver,
    fetcher: IsochroneFetcher,
}

impl IsochroneSession {
    pub fn new(resolver: LocationResolver, fetcher: IsochroneFetcher) -> Self {
        Self { resolver, fetcher }
    }

    /// Build a session directly from the two upstream collaborators
    pub fn from_clients(
        geocoder: Arc<dyn Geocoder>,
        provider: Arc<dyn IsochroneProvider>,
    ) -> Self {
        Self::new(LocationResolver::new(geocoder), IsochroneFetcher::new(provider))
    }

    #[must_use]
    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Compute the area reachable from every location within `range_seconds`.
    ///
    /// Blank locations are dropped before any network access. The first
    /// failing location aborts the whole run; sibling results are discarded.
    #[instrument(skip(self, locations), fields(count = locations.len()))]
    pub async fn run(
        &self,
        locations: &[String],
        mode: TravelMode,
        range_seconds: u32,
    ) -> Result<IntersectionResult> {
        let inputs: Vec<LocationInput> = locations
            .iter()
            .filter_map(|raw| LocationInput::parse(raw))
            .collect();

        if inputs.is_empty() {
            return Err(IsochroneError::invalid_input(
                "at least one location is required",
            ));
        }

        if range_seconds == 0 {
            return Err(IsochroneError::invalid_input(
                "travel time must be greater than zero",
            ));
        }

        let start_time = Instant::now();

        let resolved = try_join_all(
            inputs
                .into_iter()
                .map(|input| self.resolve_and_fetch(input, mode, range_seconds)),
        )
        .await?;

        debug!(
            "Fetched {} isochrone(s) in {:.3}s",
            resolved.len(),
            start_time.elapsed().as_secs_f64()
        );

        let (locations, polygons): (Vec<Location>, Vec<IsochronePolygon>) =
            resolved.into_iter().unzip();

        let polygon = intersection::intersect(&polygons)?.into_geometry()?;

        info!(
            "Common {} area for {} location(s) computed in {:.3}s",
            mode,
            locations.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(IntersectionResult {
            polygon,
            markers: locations.iter().map(Location::to_marker).collect(),
        })
    }

    /// One location's chain: resolve must finish before fetch starts
    async fn resolve_and_fetch(
        &self,
        input: LocationInput,
        mode: TravelMode,
        range_seconds: u32,
    ) -> Result<(Location, IsochronePolygon)> {
        let label = input.label();
        let location = self
            .resolver
            .resolve_location(input)
            .await
            .map_err(|e| e.for_location(&label))?;
        let polygon = self.fetcher.fetch(&location, mode, range_seconds).await?;
        Ok((location, polygon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location_resolver::GeocodingResult;
    use crate::models::IsochroneRequest;
    use async_trait::async_trait;
    use geojson::{Feature, FeatureCollection, Geometry, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode(&self, address: &str) -> Result<Vec<GeocodingResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![GeocodingResult {
                name: format!("{address}, Austria"),
                lat: 0.5,
                lon: 0.5,
            }])
        }
    }

    /// Returns a 2x2 square centred on the requested coordinate
    #[derive(Default)]
    struct SquareProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IsochroneProvider for SquareProvider {
        async fn isoline(&self, request: &IsochroneRequest) -> Result<FeatureCollection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (x, y) = (request.longitude, request.latitude);
            let ring = vec![
                vec![x - 1.0, y - 1.0],
                vec![x + 1.0, y - 1.0],
                vec![x + 1.0, y + 1.0],
                vec![x - 1.0, y + 1.0],
                vec![x - 1.0, y - 1.0],
            ];
            Ok(FeatureCollection {
                bbox: None,
                features: vec![Feature::from(Geometry::new(Value::Polygon(vec![ring])))],
                foreign_members: None,
            })
        }
    }

    fn session() -> (IsochroneSession, Arc<CountingGeocoder>, Arc<SquareProvider>) {
        let geocoder = Arc::new(CountingGeocoder::default());
        let provider = Arc::new(SquareProvider::default());
        let session = IsochroneSession::from_clients(geocoder.clone(), provider.clone());
        (session, geocoder, provider)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_all_blank_fails_without_network() {
        let (session, geocoder, provider) = session();

        let err = session
            .run(&strings(&["", "  "]), TravelMode::Walk, 900)
            .await
            .unwrap_err();

        assert!(matches!(err, IsochroneError::InvalidInput { .. }));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_range_fails_without_network() {
        let (session, _geocoder, provider) = session();

        let err = session
            .run(&strings(&["0,0"]), TravelMode::Walk, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, IsochroneError::InvalidInput { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_markers_follow_input_order() {
        let (session, geocoder, provider) = session();

        let result = session
            .run(&strings(&["0,0", "", "Wien", "0.5,1"]), TravelMode::Drive, 1800)
            .await
            .unwrap();

        let labels: Vec<&str> = result.markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["0,0", "Wien, Austria", "0.5,1"]);
        assert_eq!(result.markers[1].coordinate, [0.5, 0.5]);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_far_apart_locations_have_no_common_area() {
        let (session, _, _) = session();

        let err = session
            .run(&strings(&["0,0", "10,10"]), TravelMode::Bicycle, 600)
            .await
            .unwrap_err();

        assert!(err.is_no_common_area());
    }

    #[tokio::test]
    async fn test_session_can_run_concurrently() {
        let (session, _, provider) = session();
        let first = strings(&["0,0", "1,1"]);
        let second = strings(&["0,0", "20,20"]);

        let (a, b) = tokio::join!(
            session.run(&first, TravelMode::Walk, 900),
            session.run(&second, TravelMode::Walk, 900)
        );

        assert!(a.is_ok());
        assert!(b.unwrap_err().is_no_common_area());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }

    /// Geocoding transport fails for one address
    struct OfflineFor(&'static str);

    #[async_trait]
    impl Geocoder for OfflineFor {
        async fn geocode(&self, address: &str) -> Result<Vec<GeocodingResult>> {
            if address == self.0 {
                return Err(IsochroneError::network("dns error: failed to lookup address"));
            }
            Ok(vec![GeocodingResult {
                name: address.to_string(),
                lat: 0.0,
                lon: 0.0,
            }])
        }
    }

    #[tokio::test]
    async fn test_network_failure_names_the_location() {
        let session = IsochroneSession::from_clients(
            Arc::new(OfflineFor("Karlsplatz")),
            Arc::new(SquareProvider::default()),
        );

        let err = session
            .run(&strings(&["Stephansplatz", "Karlsplatz"]), TravelMode::Walk, 900)
            .await
            .unwrap_err();

        match err {
            IsochroneError::Network { location, message } => {
                assert_eq!(location.as_deref(), Some("Karlsplatz"));
                assert!(message.starts_with("dns error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
