//! Narrow-phase aggregators
//!
//! Each aggregator owns the index for one geometry kind. For a buffer it
//! queries the index by the buffer's bounding box, then measures the
//! exact overlap of every candidate:
//! - points: count of points inside or on the buffer boundary
//! - lines: length of the part of each line clipped to the buffer
//! - polygons: area of the intersection of each polygon with the buffer
//!
//! Candidates are visited in input order. Any failure inside an exact
//! operation aborts the aggregation; skipping the feature would bias the
//! sum.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use geo::coordinate_position::CoordPos;
use geo::{
    BooleanOps, BoundingRect, CoordinatePosition, MultiLineString, MultiPolygon, Point, Polygon,
};
use lurcov_core::{Error, Feature, GeometryKind, Result};

use super::index::{line_index, point_index, polygon_index, FeatureIndex};
use super::measurements::{multi_line_length, multi_polygon_area};

/// Per-kind aggregator over a prebuilt index.
pub enum Aggregator {
    Points(FeatureIndex<Point<f64>>),
    Lines(FeatureIndex<MultiLineString<f64>>),
    Polygons(FeatureIndex<MultiPolygon<f64>>),
}

impl Aggregator {
    /// Build the aggregator for `kind`, indexing only features of that kind.
    ///
    /// Returns `None` for `Collection`, which is never aggregated.
    pub fn build(kind: GeometryKind, features: &[Feature]) -> Result<Option<Self>> {
        let aggregator = match kind {
            GeometryKind::Point => Aggregator::Points(point_index(features)?),
            GeometryKind::Line => Aggregator::Lines(line_index(features)?),
            GeometryKind::Polygon => Aggregator::Polygons(polygon_index(features)?),
            GeometryKind::Collection => return Ok(None),
        };
        Ok(Some(aggregator))
    }

    /// Number of indexed geometries
    pub fn len(&self) -> usize {
        match self {
            Aggregator::Points(index) => index.len(),
            Aggregator::Lines(index) => index.len(),
            Aggregator::Polygons(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate the indexed features against one buffer polygon.
    pub fn aggregate(&self, buffer: &Polygon<f64>) -> Result<f64> {
        let Some(bounds) = buffer.bounding_rect() else {
            return Ok(0.0);
        };
        match self {
            Aggregator::Points(index) => Ok(count_points(index, buffer, &bounds)),
            Aggregator::Lines(index) => clipped_length(index, buffer, &bounds),
            Aggregator::Polygons(index) => intersected_area(index, buffer, &bounds),
        }
    }
}

fn count_points(
    index: &FeatureIndex<Point<f64>>,
    buffer: &Polygon<f64>,
    bounds: &geo::Rect<f64>,
) -> f64 {
    let mut count = 0.0;
    for candidate in index.query(bounds) {
        match buffer.coordinate_position(&candidate.geometry.0) {
            CoordPos::Inside | CoordPos::OnBoundary => count += 1.0,
            CoordPos::Outside => {}
        }
    }
    count
}

fn clipped_length(
    index: &FeatureIndex<MultiLineString<f64>>,
    buffer: &Polygon<f64>,
    bounds: &geo::Rect<f64>,
) -> Result<f64> {
    let region = MultiPolygon::new(vec![buffer.clone()]);
    let mut total = 0.0;
    for candidate in index.query(bounds) {
        let clipped = exact_op("clip", candidate.feature, || {
            region.clip(&candidate.geometry, false)
        })?;
        if clipped.0.is_empty() {
            continue;
        }
        total += finite_measure("clip", candidate.feature, multi_line_length(&clipped))?;
    }
    Ok(total)
}

fn intersected_area(
    index: &FeatureIndex<MultiPolygon<f64>>,
    buffer: &Polygon<f64>,
    bounds: &geo::Rect<f64>,
) -> Result<f64> {
    let region = MultiPolygon::new(vec![buffer.clone()]);
    let mut total = 0.0;
    for candidate in index.query(bounds) {
        let overlap = exact_op("intersection", candidate.feature, || {
            region.intersection(&candidate.geometry)
        })?;
        if overlap.0.is_empty() {
            continue;
        }
        total += finite_measure("intersection", candidate.feature, multi_polygon_area(&overlap))?;
    }
    Ok(total)
}

/// Run a boolean-ops kernel, turning a panic on degenerate input into
/// `GeometryOperationFailed`.
///
/// The process panic hook still runs before the panic is caught, so the
/// kernel's message is also printed to stderr. Non-finite coordinates are
/// rejected when the index is built and never get here.
fn exact_op<T>(operation: &'static str, feature: usize, op: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(op)).map_err(|payload| Error::GeometryOperationFailed {
        operation,
        index: feature,
        reason: panic_message(payload.as_ref()),
    })
}

fn finite_measure(operation: &'static str, feature: usize, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::GeometryOperationFailed {
            operation,
            index: feature,
            reason: format!("non-finite result {value}"),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "boolean operation panicked".to_string()
    }
}
