//! Isochrone retrieval for one resolved location

use async_trait::async_trait;
use geojson::FeatureCollection;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::{IsochronePolygon, IsochroneProperties, IsochroneRequest, Location, TravelMode};
use crate::{IsochroneError, Result};

const DEFAULT_FETCH_ERROR: &str = "Failed to fetch isochrone";

/// Isoline collaborator
#[async_trait]
pub trait IsochroneProvider: Send + Sync {
    /// Reachable-area feature collection for `request`. Non-success statuses
    /// are reported as [`IsochroneError::IsochroneFetchFailed`].
    async fn isoline(&self, request: &IsochroneRequest) -> Result<FeatureCollection>;
}

/// Turns a resolved coordinate into that location's isochrone polygon
#[derive(Clone)]
pub struct IsochroneFetcher {
    provider: Arc<dyn IsochroneProvider>,
}

impl IsochroneFetcher {
    pub fn new(provider: Arc<dyn IsochroneProvider>) -> Self {
        Self { provider }
    }

    /// Fetch the isochrone for `location`. Single attempt, no retries.
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn fetch(
        &self,
        location: &Location,
        mode: TravelMode,
        range_seconds: u32,
    ) -> Result<IsochronePolygon> {
        let request = IsochroneRequest::new(location, mode, range_seconds);

        let collection = self
            .provider
            .isoline(&request)
            .await
            .map_err(|e| e.for_location(&location.name))?;

        debug!(
            "Received {} isochrone feature(s) for {}",
            collection.features.len(),
            location.name
        );

        Self::to_polygon(collection, &request).map_err(|e| e.for_location(&location.name))
    }

    /// First feature of the collection is the location's polygon
    fn to_polygon(
        collection: FeatureCollection,
        request: &IsochroneRequest,
    ) -> Result<IsochronePolygon> {
        let feature = collection.features.into_iter().next().ok_or_else(|| {
            IsochroneError::isochrone_fetch(
                request.coordinate_label(),
                format!("{DEFAULT_FETCH_ERROR}: response contained no features"),
            )
        })?;

        let id = feature
            .property("id")
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string();

        let geometry = feature.geometry.ok_or_else(|| {
            IsochroneError::isochrone_fetch(
                request.coordinate_label(),
                format!("{DEFAULT_FETCH_ERROR}: feature has no geometry"),
            )
        })?;

        let properties = IsochroneProperties {
            lat: request.latitude,
            lon: request.longitude,
            mode: request.mode,
            kind: "time".to_string(),
            range: request.range_seconds,
            id,
        };

        IsochronePolygon::new(geometry, properties)
    }
}

/// Message to surface for a failed isoline call
pub(crate) fn fetch_error_message(upstream: Option<String>) -> String {
    upstream
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FETCH_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Feature, Geometry, Value};
    use std::sync::Mutex;

    struct StaticProvider {
        response: Mutex<Option<Result<FeatureCollection>>>,
        requests: Mutex<Vec<IsochroneRequest>>,
    }

    impl StaticProvider {
        fn new(response: Result<FeatureCollection>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl IsochroneProvider for StaticProvider {
        async fn isoline(&self, request: &IsochroneRequest) -> Result<FeatureCollection> {
            self.requests.lock().unwrap().push(request.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("provider called more than once")
        }
    }

    fn square_feature() -> Feature {
        let mut feature = Feature::from(Geometry::new(Value::Polygon(vec![vec![
            vec![16.0, 48.0],
            vec![16.1, 48.0],
            vec![16.1, 48.1],
            vec![16.0, 48.1],
            vec![16.0, 48.0],
        ]])));
        feature.set_property("id", "iso-1");
        feature
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_builds_request_and_polygon() {
        let provider = StaticProvider::new(Ok(collection(vec![square_feature()])));
        let fetcher = IsochroneFetcher::new(provider.clone());
        let location = Location::from_coordinates(48.05, 16.05);

        let polygon = fetcher.fetch(&location, TravelMode::Walk, 900).await.unwrap();

        let requests = provider.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].mode, TravelMode::Walk);
        assert_eq!(requests[0].range_seconds, 900);
        assert_eq!(requests[0].latitude, 48.05);

        assert_eq!(polygon.properties().kind, "time");
        assert_eq!(polygon.properties().id, "iso-1");
        assert_eq!(polygon.properties().range, 900);
        assert_eq!(polygon.geometry(), square_feature().geometry.as_ref().unwrap());
    }

    #[tokio::test]
    async fn test_empty_collection_fails() {
        let provider = StaticProvider::new(Ok(collection(vec![])));
        let fetcher = IsochroneFetcher::new(provider);
        let location = Location::new(48.2, 16.3, "Wien".into());

        let err = fetcher.fetch(&location, TravelMode::Drive, 1800).await.unwrap_err();

        match err {
            IsochroneError::IsochroneFetchFailed { location, message } => {
                assert_eq!(location, "Wien");
                assert!(message.starts_with("Failed to fetch isochrone"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_is_labelled_with_location_name() {
        let provider = StaticProvider::new(Err(IsochroneError::isochrone_fetch(
            "48.2,16.3",
            "Invalid mode",
        )));
        let fetcher = IsochroneFetcher::new(provider);
        let location = Location::new(48.2, 16.3, "Wien".into());

        let err = fetcher.fetch(&location, TravelMode::Drive, 1800).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch isochrone for Wien: Invalid mode");
    }

    #[test]
    fn test_fetch_error_message_fallback() {
        assert_eq!(fetch_error_message(None), "Failed to fetch isochrone");
        assert_eq!(fetch_error_message(Some("  ".into())), "Failed to fetch isochrone");
        assert_eq!(fetch_error_message(Some("Quota".into())), "Quota");
    }
}
