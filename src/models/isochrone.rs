//! Isochrone models: upstream request, per-location polygon and combined result

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use super::{Location, Marker, TravelMode};
use crate::{IsochroneError, Result};

/// Request for one location's reachable area. `type` is always `time`.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub mode: TravelMode,
    /// Travel-time budget in seconds, > 0
    pub range_seconds: u32,
}

impl IsochroneRequest {
    #[must_use]
    pub fn new(location: &Location, mode: TravelMode, range_seconds: u32) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            mode,
            range_seconds,
        }
    }

    /// Coordinate label used until a friendlier name is known
    #[must_use]
    pub fn coordinate_label(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Properties the isoline service tags each polygon with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsochroneProperties {
    pub lat: f64,
    pub lon: f64,
    pub mode: TravelMode,
    #[serde(rename = "type")]
    pub kind: String,
    pub range: u32,
    #[serde(default)]
    pub id: String,
}

/// Reachable area for one resolved location. Immutable once built.
#[derive(Debug, Clone)]
pub struct IsochronePolygon {
    geometry: geojson::Geometry,
    shape: MultiPolygon<f64>,
    properties: IsochroneProperties,
}

impl IsochronePolygon {
    /// Build from an upstream geometry, which must be a `Polygon` or `MultiPolygon`
    pub fn new(geometry: geojson::Geometry, properties: IsochroneProperties) -> Result<Self> {
        let shape = match geo::Geometry::<f64>::try_from(geometry.clone()) {
            Ok(geo::Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon]),
            Ok(geo::Geometry::MultiPolygon(multi)) => multi,
            Ok(_) => {
                return Err(IsochroneError::isochrone_fetch(
                    format!("{},{}", properties.lat, properties.lon),
                    "Isochrone geometry is not a polygon",
                ));
            }
            Err(e) => {
                return Err(IsochroneError::isochrone_fetch(
                    format!("{},{}", properties.lat, properties.lon),
                    format!("Invalid isochrone geometry: {e}"),
                ));
            }
        };

        Ok(Self {
            geometry,
            shape,
            properties,
        })
    }

    /// GeoJSON geometry exactly as the upstream service returned it
    #[must_use]
    pub fn geometry(&self) -> &geojson::Geometry {
        &self.geometry
    }

    /// Planar view used for clipping (x = lon, y = lat)
    #[must_use]
    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    #[must_use]
    pub fn properties(&self) -> &IsochroneProperties {
        &self.properties
    }
}

/// Area reachable from every input location, plus one marker per location
#[derive(Debug, Clone, Serialize)]
pub struct IntersectionResult {
    pub polygon: geojson::Geometry,
    pub markers: Vec<Marker>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value;

    fn properties() -> IsochroneProperties {
        IsochroneProperties {
            lat: 48.2082,
            lon: 16.3738,
            mode: TravelMode::Walk,
            kind: "time".into(),
            range: 900,
            id: "abc".into(),
        }
    }

    fn square() -> Vec<Vec<Vec<f64>>> {
        vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]]
    }

    #[test]
    fn test_polygon_geometry_is_kept_verbatim() {
        let geometry = geojson::Geometry::new(Value::Polygon(square()));
        let polygon = IsochronePolygon::new(geometry.clone(), properties()).unwrap();
        assert_eq!(polygon.geometry(), &geometry);
        assert_eq!(polygon.shape().0.len(), 1);
    }

    #[test]
    fn test_multipolygon_accepted() {
        let geometry = geojson::Geometry::new(Value::MultiPolygon(vec![square(), square()]));
        let polygon = IsochronePolygon::new(geometry, properties()).unwrap();
        assert_eq!(polygon.shape().0.len(), 2);
    }

    #[test]
    fn test_point_rejected() {
        let geometry = geojson::Geometry::new(Value::Point(vec![16.37, 48.2]));
        let err = IsochronePolygon::new(geometry, properties()).unwrap_err();
        assert!(matches!(err, IsochroneError::IsochroneFetchFailed { .. }));
    }

    #[test]
    fn test_properties_deserialize_type_field() {
        let json = r#"{"lat":48.2,"lon":16.3,"mode":"drive","type":"time","range":1800,"id":"x1"}"#;
        let props: IsochroneProperties = serde_json::from_str(json).unwrap();
        assert_eq!(props.kind, "time");
        assert_eq!(props.mode, TravelMode::Drive);
        assert_eq!(props.range, 1800);
    }

    #[test]
    fn test_request_from_location() {
        let location = Location::from_coordinates(48.2082, 16.3738);
        let request = IsochroneRequest::new(&location, TravelMode::Walk, 900);
        assert_eq!(request.coordinate_label(), "48.2082,16.3738");
        assert_eq!(request.range_seconds, 900);
    }
}
