//! Intersection Engine
//!
//! Folds per-location isochrones left to right into the area reachable from
//! all of them. The fold stops at the first step whose clip is empty.

use geo::{Area, BooleanOps, MultiPolygon};
use tracing::debug;

use crate::models::IsochronePolygon;
use crate::{IsochroneError, Result};

/// Outcome of intersecting a set of isochrones
#[derive(Debug, Clone, PartialEq)]
pub enum Intersection {
    /// Area common to every input
    Common(geojson::Geometry),
    /// The inputs share no area
    Empty,
}

impl Intersection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Intersection::Empty)
    }

    /// Convert to the session result, mapping `Empty` to `NoCommonArea`
    pub fn into_geometry(self) -> Result<geojson::Geometry> {
        match self {
            Intersection::Common(geometry) => Ok(geometry),
            Intersection::Empty => Err(IsochroneError::NoCommonArea),
        }
    }
}

/// Intersect `polygons` in input order.
///
/// A single polygon is returned as-is, without clipping. Errors only when
/// `polygons` is empty.
pub fn intersect(polygons: &[IsochronePolygon]) -> Result<Intersection> {
    let (first, rest) = polygons
        .split_first()
        .ok_or_else(|| IsochroneError::invalid_input("at least one isochrone is required"))?;

    if rest.is_empty() {
        return Ok(Intersection::Common(first.geometry().clone()));
    }

    let mut current: MultiPolygon<f64> = first.shape().clone();

    for (step, next) in rest.iter().enumerate() {
        current = current.intersection(next.shape());

        if is_empty_area(&current) {
            debug!("Intersection became empty at step {}", step + 1);
            return Ok(Intersection::Empty);
        }

        debug!(
            "Step {}: {} polygon(s) remain",
            step + 1,
            current.0.len()
        );
    }

    Ok(Intersection::Common(to_geometry(&current)))
}

/// Edge or point contact does not count as a shared area
fn is_empty_area(shape: &MultiPolygon<f64>) -> bool {
    shape.0.is_empty() || shape.unsigned_area() == 0.0
}

/// Single polygons are emitted as `Polygon`, everything else as `MultiPolygon`
fn to_geometry(shape: &MultiPolygon<f64>) -> geojson::Geometry {
    match shape.0.as_slice() {
        [polygon] => geojson::Geometry::new(geojson::Value::from(polygon)),
        _ => geojson::Geometry::new(geojson::Value::from(shape)),
    }
}
