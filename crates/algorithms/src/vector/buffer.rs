//! Buffer construction
//!
//! Circular buffers around query points, approximated as regular
//! polygons. The same polygon serves both phases of aggregation: its
//! bounding box drives the index query and the polygon itself is the
//! exact clip/containment region.

use geo::{LineString, Point, Polygon};
use lurcov_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default number of boundary segments for a buffer polygon
pub const DEFAULT_SEGMENTS: usize = 20;

/// Parameters for buffer aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferParams {
    /// Buffer radius, in the units of the input coordinates
    pub radius: f64,
    /// Number of segments approximating the circle (default: 20)
    pub segments: usize,
    /// Z-score the aggregated values before returning
    pub normalize: bool,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: DEFAULT_SEGMENTS,
            normalize: false,
        }
    }
}

impl BufferParams {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Reject radii and segment counts that cannot form a buffer.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "radius",
                value: self.radius.to_string(),
                reason: "must be finite and positive".to_string(),
            });
        }
        if self.segments < 3 {
            return Err(Error::InvalidParameter {
                name: "segments",
                value: self.segments.to_string(),
                reason: "a buffer needs at least 3 segments".to_string(),
            });
        }
        Ok(())
    }
}

/// Create a circular buffer around a point.
///
/// Vertex `i` sits at angle `2πi / segments`, so the first vertex is
/// exactly `(cx + r, cy)`. Fewer than 3 segments are raised to 3.
///
/// # Arguments
/// * `point` - Center point
/// * `radius` - Circle radius
/// * `segments` - Number of polygon edges
///
/// # Returns
/// A closed polygon with `segments + 1` exterior coordinates
pub fn buffer_point(point: &Point<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(3);
    let cx = point.x();
    let cy = point.y();

    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
    }
    // Close the ring
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}
