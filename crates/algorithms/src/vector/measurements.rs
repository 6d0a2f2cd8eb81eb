//! Geometric measurements: area and length
//!
//! Multi-part geometries are summed part by part in storage order.

use geo::{Area as GeoArea, Euclidean, Geometry, Length, MultiLineString, MultiPolygon};

/// Calculate the area of a geometry.
///
/// Returns unsigned area in CRS units squared. Non-polygonal geometries
/// have zero area.
pub fn area(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => multi_polygon_area(mp),
        Geometry::Rect(r) => r.unsigned_area(),
        Geometry::Triangle(t) => t.unsigned_area(),
        _ => 0.0,
    }
}

/// Calculate the length of a linear geometry.
///
/// Returns Euclidean length in CRS units. Non-linear geometries have zero
/// length.
pub fn length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::LineString(ls) => ls.length::<Euclidean>(),
        Geometry::MultiLineString(mls) => multi_line_length(mls),
        Geometry::Line(l) => {
            let dx = l.end.x - l.start.x;
            let dy = l.end.y - l.start.y;
            (dx * dx + dy * dy).sqrt()
        }
        _ => 0.0,
    }
}

pub(crate) fn multi_line_length(mls: &MultiLineString<f64>) -> f64 {
    mls.0.iter().map(|ls| ls.length::<Euclidean>()).sum()
}

pub(crate) fn multi_polygon_area(mp: &MultiPolygon<f64>) -> f64 {
    mp.0.iter().map(|p| p.unsigned_area()).sum()
}
