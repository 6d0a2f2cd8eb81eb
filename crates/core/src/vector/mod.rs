//! Vector feature model
//!
//! A `Feature` pairs a geometry with the key/value tags it was extracted
//! with. Aggregation only ever looks at the geometry's kind; tags travel
//! along for the caller.

use crate::error::{Error, Result};
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

/// Geometry kinds that drive aggregation.
///
/// Every geometry belongs to exactly one kind:
/// - `Point`: points and multi-points
/// - `Line`: segments, line strings and multi-line strings
/// - `Polygon`: polygons, multi-polygons, rectangles and triangles
/// - `Collection`: heterogeneous geometry collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Collection,
}

impl GeometryKind {
    /// Kind of a geometry.
    pub fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryKind::Point,
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                GeometryKind::Line
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => GeometryKind::Polygon,
            Geometry::GeometryCollection(_) => GeometryKind::Collection,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Line => "line",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Collection => "collection",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geographic feature with geometry and tags
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature tags
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: Some(geometry.into()),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Builder-style tag setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set_property(key, value.into());
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Geometry kind of this feature.
    ///
    /// `index` is the feature's position in its collection and is only
    /// used to label the error. A feature without geometry has no kind.
    pub fn kind(&self, index: usize) -> Result<GeometryKind> {
        match &self.geometry {
            Some(g) => Ok(GeometryKind::of(g)),
            None => Err(Error::UnsupportedGeometry {
                index,
                reason: "feature has no geometry".to_string(),
            }),
        }
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn as_slice(&self) -> &[Feature] {
        &self.features
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{
        line_string, point, polygon, Coord, GeometryCollection, Line, MultiPoint, Rect,
    };

    #[test]
    fn test_kind_of_each_variant() {
        let p = point!(x: 1.0, y: 2.0);
        assert_eq!(GeometryKind::of(&Geometry::Point(p)), GeometryKind::Point);
        assert_eq!(
            GeometryKind::of(&Geometry::MultiPoint(MultiPoint::new(vec![p]))),
            GeometryKind::Point
        );

        let ls = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(GeometryKind::of(&Geometry::LineString(ls)), GeometryKind::Line);
        let seg = Line::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 });
        assert_eq!(GeometryKind::of(&Geometry::Line(seg)), GeometryKind::Line);

        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(GeometryKind::of(&Geometry::Polygon(poly)), GeometryKind::Polygon);
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        assert_eq!(GeometryKind::of(&Geometry::Rect(rect)), GeometryKind::Polygon);

        let gc = GeometryCollection::new_from(vec![Geometry::Point(p)]);
        assert_eq!(
            GeometryKind::of(&Geometry::GeometryCollection(gc)),
            GeometryKind::Collection
        );
    }

    #[test]
    fn test_feature_without_geometry_is_unsupported() {
        let err = Feature::empty().kind(7).unwrap_err();
        match err {
            Error::UnsupportedGeometry { index, .. } => assert_eq!(index, 7),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_feature_tags() {
        let f = Feature::new(point!(x: 0.0, y: 0.0)).with_property("highway", "primary");
        assert_eq!(
            f.get_property("highway"),
            Some(&AttributeValue::String("primary".to_string()))
        );
        assert!(f.get_property("building").is_none());
    }

    #[test]
    fn test_collection_from_iter() {
        let fc: FeatureCollection = (0..3)
            .map(|i| Feature::new(point!(x: i as f64, y: 0.0)))
            .collect();
        assert_eq!(fc.len(), 3);
        assert!(!fc.is_empty());
    }
}
