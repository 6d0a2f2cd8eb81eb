//! Feature R-tree
//!
//! Bulk-loaded, read-only bounding-box index over the features of one
//! geometry kind. Built once per aggregation call and dropped with it.
//!
//! Queries return every entry whose envelope intersects the query box.
//! Box hits that miss the actual geometry are left for the caller's
//! exact test.

use geo::{BoundingRect, CoordsIter, Geometry, LineString, MultiLineString, MultiPolygon, Point, Rect};
use lurcov_core::{Error, Feature, Result};
use rstar::{RStarInsertionStrategy, RTree, RTreeObject, RTreeParams, AABB};

/// Fixed node fan-out for feature trees
pub struct FeatureTreeParams;

impl RTreeParams for FeatureTreeParams {
    const MIN_SIZE: usize = 25;
    const MAX_SIZE: usize = 50;
    const REINSERTION_COUNT: usize = 2;
    type DefaultInsertionStrategy = RStarInsertionStrategy;
}

/// A single indexed geometry with its position in the input.
#[derive(Debug, Clone)]
pub struct IndexedGeometry<G> {
    /// Index of the source feature
    pub feature: usize,
    /// Part number within the source feature (multi-points only)
    pub part: usize,
    pub geometry: G,
    envelope: AABB<[f64; 2]>,
}

impl<G> IndexedGeometry<G> {
    fn new(feature: usize, part: usize, geometry: G, rect: Rect<f64>) -> Self {
        Self {
            feature,
            part,
            geometry,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        }
    }

    fn order_key(&self) -> (usize, usize) {
        (self.feature, self.part)
    }
}

impl<G> RTreeObject for IndexedGeometry<G> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Bulk-loaded R-tree of geometries of a single kind.
pub struct FeatureIndex<G> {
    tree: RTree<IndexedGeometry<G>, FeatureTreeParams>,
}

impl<G> FeatureIndex<G> {
    fn bulk_load(entries: Vec<IndexedGeometry<G>>) -> Self {
        Self {
            tree: RTree::bulk_load_with_params(entries),
        }
    }

    /// Candidates whose bounding box intersects `bounds`.
    ///
    /// Results are ordered by source feature index (then part), so
    /// accumulating over them follows input order.
    pub fn query(&self, bounds: &Rect<f64>) -> Vec<&IndexedGeometry<G>> {
        let envelope = AABB::from_corners(
            [bounds.min().x, bounds.min().y],
            [bounds.max().x, bounds.max().y],
        );
        let mut hits: Vec<_> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        hits.sort_unstable_by_key(|e| e.order_key());
        hits
    }

    /// Number of indexed geometries
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Index the members of point-like features.
///
/// Each member of a multi-point becomes its own entry. Features of any
/// other kind are skipped.
pub fn point_index(features: &[Feature]) -> Result<FeatureIndex<Point<f64>>> {
    let mut entries = Vec::new();
    for (i, f) in features.iter().enumerate() {
        let members: Vec<Point<f64>> = match &f.geometry {
            Some(Geometry::Point(p)) => vec![*p],
            Some(Geometry::MultiPoint(mp)) => mp.0.clone(),
            _ => continue,
        };
        for (part, p) in members.into_iter().enumerate() {
            let rect = finite_rect(i, &p, Some(p.bounding_rect()))?;
            entries.extend(rect.map(|r| IndexedGeometry::new(i, part, p, r)));
        }
    }
    Ok(FeatureIndex::bulk_load(entries))
}

/// Index linear features as multi-line strings.
pub fn line_index(features: &[Feature]) -> Result<FeatureIndex<MultiLineString<f64>>> {
    let mut entries = Vec::new();
    for (i, f) in features.iter().enumerate() {
        let Some(mls) = f.geometry.as_ref().and_then(as_multi_line) else {
            continue;
        };
        if let Some(rect) = finite_rect(i, &mls, mls.bounding_rect())? {
            entries.push(IndexedGeometry::new(i, 0, mls, rect));
        }
    }
    Ok(FeatureIndex::bulk_load(entries))
}

/// Index polygonal features as multi-polygons.
pub fn polygon_index(features: &[Feature]) -> Result<FeatureIndex<MultiPolygon<f64>>> {
    let mut entries = Vec::new();
    for (i, f) in features.iter().enumerate() {
        let Some(mp) = f.geometry.as_ref().and_then(as_multi_polygon) else {
            continue;
        };
        if let Some(rect) = finite_rect(i, &mp, mp.bounding_rect())? {
            entries.push(IndexedGeometry::new(i, 0, mp, rect));
        }
    }
    Ok(FeatureIndex::bulk_load(entries))
}

/// Empty geometries have no box and are left out. Every coordinate must
/// be finite: a NaN vertex can hide inside a finite box and would reach
/// the boolean-ops kernel.
fn finite_rect<G>(feature: usize, geometry: &G, rect: Option<Rect<f64>>) -> Result<Option<Rect<f64>>>
where
    G: CoordsIter<Scalar = f64>,
{
    match geometry
        .coords_iter()
        .find(|c| !(c.x.is_finite() && c.y.is_finite()))
    {
        Some(c) => Err(Error::GeometryOperationFailed {
            operation: "index",
            index: feature,
            reason: format!("non-finite coordinate ({}, {})", c.x, c.y),
        }),
        None => Ok(rect),
    }
}

/// Linear geometry as a multi-line string, `None` for other kinds.
pub(crate) fn as_multi_line(geometry: &Geometry<f64>) -> Option<MultiLineString<f64>> {
    match geometry {
        Geometry::Line(l) => Some(MultiLineString::new(vec![LineString::new(vec![
            l.start, l.end,
        ])])),
        Geometry::LineString(ls) => Some(MultiLineString::new(vec![ls.clone()])),
        Geometry::MultiLineString(mls) => Some(mls.clone()),
        _ => None,
    }
}

/// Polygonal geometry as a multi-polygon, `None` for other kinds.
pub(crate) fn as_multi_polygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon, Coord, MultiPoint};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    #[test]
    fn test_point_index_expands_multipoints() {
        let features = vec![
            Feature::new(point!(x: 0.0, y: 0.0)),
            Feature::new(MultiPoint::new(vec![
                point!(x: 1.0, y: 1.0),
                point!(x: 2.0, y: 2.0),
            ])),
            Feature::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
        ];
        let index = point_index(&features).unwrap();
        assert_eq!(index.len(), 3);

        let hits = index.query(&rect(0.5, 0.5, 3.0, 3.0));
        let keys: Vec<_> = hits.iter().map(|e| (e.feature, e.part)).collect();
        assert_eq!(keys, vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn test_only_matching_kind_is_indexed() {
        let features = vec![
            Feature::new(point!(x: 0.0, y: 0.0)),
            Feature::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Feature::new(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Feature::empty(),
        ];
        assert_eq!(point_index(&features).unwrap().len(), 1);
        assert_eq!(line_index(&features).unwrap().len(), 1);
        assert_eq!(polygon_index(&features).unwrap().len(), 1);
    }

    #[test]
    fn test_query_has_no_false_negatives() {
        // Unit diagonals starting at x = 0..200; boxes of 10..=20 touch the query
        let features: Vec<Feature> = (0..200)
            .map(|i| {
                let x = i as f64;
                Feature::new(line_string![(x: x, y: 0.0), (x: x + 1.0, y: 1.0)])
            })
            .collect();
        let index = line_index(&features).unwrap();
        assert_eq!(index.len(), 200);

        let hits = index.query(&rect(10.5, 0.0, 20.5, 1.0));
        let ids: Vec<usize> = hits.iter().map(|e| e.feature).collect();
        assert_eq!(ids, (10..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_query_results_in_input_order() {
        let features: Vec<Feature> = (0..500)
            .rev()
            .map(|i| Feature::new(point!(x: (i % 25) as f64, y: (i / 25) as f64)))
            .collect();
        let index = point_index(&features).unwrap();
        let hits = index.query(&rect(-1.0, -1.0, 100.0, 100.0));
        assert_eq!(hits.len(), 500);
        assert!(hits.windows(2).all(|w| w[0].feature < w[1].feature));
    }

    #[test]
    fn test_empty_index() {
        let index = polygon_index(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.query(&rect(0.0, 0.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_non_finite_coordinates_fail() {
        let features = vec![
            Feature::new(point!(x: 0.0, y: 0.0)),
            Feature::new(point!(x: f64::NAN, y: 0.0)),
        ];
        match point_index(&features) {
            Err(Error::GeometryOperationFailed { index, .. }) => assert_eq!(index, 1),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_non_finite_interior_vertex_fails() {
        // Box stays finite; only the middle vertex is NaN
        let lines = vec![
            Feature::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Feature::new(line_string![(x: -1.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 0.0)]),
        ];
        assert!(matches!(
            line_index(&lines),
            Err(Error::GeometryOperationFailed { operation: "index", index: 1, .. })
        ));

        let polygons = vec![Feature::new(polygon![
            (x: -1.0, y: -1.0), (x: 1.0, y: -1.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0), (x: -1.0, y: 1.0),
        ])];
        assert!(matches!(
            polygon_index(&polygons),
            Err(Error::GeometryOperationFailed { operation: "index", index: 0, .. })
        ));
    }
}
