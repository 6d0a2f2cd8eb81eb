//! Dominant geometry kind
//!
//! A feature set is aggregated as a single kind. The kind is chosen by
//! threshold comparisons in a fixed priority order (Point, Line, Polygon,
//! Collection) rather than by a plain maximum, so ties go to the earlier
//! kind and an empty set comes out as `Point`.

use lurcov_core::{Feature, GeometryKind, Result};

/// Per-kind feature counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub points: usize,
    pub lines: usize,
    pub polygons: usize,
    pub collections: usize,
}

impl KindCounts {
    /// Count features per kind.
    ///
    /// Fails with `UnsupportedGeometry` on the first feature that has no
    /// recognizable geometry.
    pub fn count(features: &[Feature]) -> Result<Self> {
        let mut counts = Self::default();
        for (i, f) in features.iter().enumerate() {
            match f.kind(i)? {
                GeometryKind::Point => counts.points += 1,
                GeometryKind::Line => counts.lines += 1,
                GeometryKind::Polygon => counts.polygons += 1,
                GeometryKind::Collection => counts.collections += 1,
            }
        }
        Ok(counts)
    }

    /// Select the dominant kind from these counts.
    pub fn dominant(&self) -> GeometryKind {
        let Self {
            points,
            lines,
            polygons,
            collections,
        } = *self;

        if points >= lines && points >= polygons && points >= collections {
            GeometryKind::Point
        } else if lines > points && lines >= polygons && lines >= collections {
            GeometryKind::Line
        } else if polygons > points && polygons > lines && polygons >= collections {
            GeometryKind::Polygon
        } else {
            GeometryKind::Collection
        }
    }

    pub fn total(&self) -> usize {
        self.points + self.lines + self.polygons + self.collections
    }
}

/// Classify a feature set by its dominant geometry kind.
pub fn classify(features: &[Feature]) -> Result<GeometryKind> {
    Ok(KindCounts::count(features)?.dominant())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon, Geometry, GeometryCollection};
    use lurcov_core::Error;

    fn pt() -> Feature {
        Feature::new(point!(x: 0.0, y: 0.0))
    }

    fn ln() -> Feature {
        Feature::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)])
    }

    fn pg() -> Feature {
        Feature::new(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)])
    }

    fn gc() -> Feature {
        Feature::new(Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            Geometry::Point(point!(x: 0.0, y: 0.0)),
        ])))
    }

    fn counts(p: usize, l: usize, a: usize, c: usize) -> KindCounts {
        KindCounts {
            points: p,
            lines: l,
            polygons: a,
            collections: c,
        }
    }

    #[test]
    fn test_empty_set_is_point() {
        assert_eq!(classify(&[]).unwrap(), GeometryKind::Point);
        assert_eq!(counts(0, 0, 0, 0).dominant(), GeometryKind::Point);
    }

    #[test]
    fn test_strict_majority_wins() {
        assert_eq!(counts(3, 1, 1, 1).dominant(), GeometryKind::Point);
        assert_eq!(counts(1, 3, 1, 1).dominant(), GeometryKind::Line);
        assert_eq!(counts(1, 1, 3, 1).dominant(), GeometryKind::Polygon);
        assert_eq!(counts(1, 1, 1, 3).dominant(), GeometryKind::Collection);
    }

    #[test]
    fn test_ties_with_point_go_to_point() {
        assert_eq!(counts(2, 2, 0, 0).dominant(), GeometryKind::Point);
        assert_eq!(counts(2, 0, 2, 0).dominant(), GeometryKind::Point);
        assert_eq!(counts(2, 0, 0, 2).dominant(), GeometryKind::Point);
        assert_eq!(counts(2, 2, 2, 2).dominant(), GeometryKind::Point);
    }

    #[test]
    fn test_line_polygon_tie_goes_to_line() {
        assert_eq!(counts(1, 3, 3, 0).dominant(), GeometryKind::Line);
        assert_eq!(counts(0, 2, 2, 2).dominant(), GeometryKind::Line);
    }

    #[test]
    fn test_polygon_collection_tie_goes_to_polygon() {
        assert_eq!(counts(0, 1, 3, 3).dominant(), GeometryKind::Polygon);
    }

    #[test]
    fn test_classify_mixed_features() {
        let features = vec![ln(), ln(), pg(), pt(), gc()];
        assert_eq!(classify(&features).unwrap(), GeometryKind::Line);

        let c = KindCounts::count(&features).unwrap();
        assert_eq!(c, counts(1, 2, 1, 1));
        assert_eq!(c.total(), 5);
    }

    #[test]
    fn test_classify_missing_geometry_fails() {
        let features = vec![pt(), Feature::empty()];
        match classify(&features) {
            Err(Error::UnsupportedGeometry { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected UnsupportedGeometry, got {other:?}"),
        }
    }
}
