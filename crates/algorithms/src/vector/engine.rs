//! Buffer covariate engine
//!
//! Aggregates a feature set around each query point:
//! 1. classify the feature set by dominant kind
//! 2. stop with no result for `Collection`
//! 3. index the dominant-kind features once
//! 4. for every query point, buffer it and aggregate the overlap
//! 5. optionally z-score the values
//!
//! Query points are independent once the index is built, so with the
//! `parallel` feature they are processed on the rayon pool. Each point
//! still sums its own candidates in input order, so the output does not
//! depend on scheduling.

use crate::maybe_rayon::*;
use crate::statistics::normalize;
use geo::Point;
use lurcov_core::{Algorithm, Error, Feature, Result};
use tracing::debug;

use super::aggregate::Aggregator;
use super::buffer::{buffer_point, BufferParams};
use super::classify::KindCounts;

/// Features and the locations they are aggregated around.
#[derive(Debug, Clone, Default)]
pub struct CovariateInput {
    pub features: Vec<Feature>,
    pub points: Vec<Point<f64>>,
}

impl CovariateInput {
    pub fn new(features: Vec<Feature>, points: Vec<Point<f64>>) -> Self {
        Self { features, points }
    }
}

/// Buffer aggregation algorithm
///
/// Output is `None` when the feature set is dominated by geometry
/// collections, otherwise one value per query point in input order.
#[derive(Debug, Clone, Default)]
pub struct BufferCovariate;

impl Algorithm for BufferCovariate {
    type Input = CovariateInput;
    type Output = Option<Vec<f64>>;
    type Params = BufferParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Buffer"
    }

    fn description(&self) -> &'static str {
        "Sum feature count, length or area within a fixed radius of each query point"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        buffer_aggregate(&input.features, &input.points, &params)
    }
}

/// Aggregate `features` within `params.radius` of each point.
///
/// The value for a point is the number of points (point kind), the
/// clipped line length (line kind) or the intersected polygon area
/// (polygon kind) of the dominant-kind features inside its buffer.
///
/// # Arguments
/// * `features` - Tagged features; only the dominant kind is aggregated
/// * `points` - Query points, same units as the features; must be finite
/// * `params` - Radius, buffer resolution and normalization switch
///
/// # Returns
/// `None` for a collection-dominated feature set, otherwise a vector with
/// one value per query point. Errors void the whole call.
pub fn buffer_aggregate(
    features: &[Feature],
    points: &[Point<f64>],
    params: &BufferParams,
) -> Result<Option<Vec<f64>>> {
    params.validate()?;
    check_points(points)?;

    let counts = KindCounts::count(features)?;
    let kind = counts.dominant();
    debug!(
        ?kind,
        points = counts.points,
        lines = counts.lines,
        polygons = counts.polygons,
        collections = counts.collections,
        "classified feature set"
    );

    let Some(aggregator) = Aggregator::build(kind, features)? else {
        debug!("collection-dominated feature set, nothing to aggregate");
        return Ok(None);
    };
    debug!(
        indexed = aggregator.len(),
        queries = points.len(),
        radius = params.radius,
        segments = params.segments,
        "aggregating buffers"
    );

    let mut values = points
        .into_par_iter()
        .map(|p| {
            let buffer = buffer_point(p, params.radius, params.segments);
            aggregator.aggregate(&buffer)
        })
        .collect::<Result<Vec<f64>>>()?;

    if params.normalize {
        normalize(&mut values);
    }
    Ok(Some(values))
}

/// A non-finite query point has a non-finite buffer box that matches
/// nothing, which would read as a silent zero.
fn check_points(points: &[Point<f64>]) -> Result<()> {
    match points
        .iter()
        .position(|p| !(p.x().is_finite() && p.y().is_finite()))
    {
        Some(i) => Err(Error::InvalidParameter {
            name: "points",
            value: format!("{:?}", points[i]),
            reason: format!("query point {i} has a non-finite coordinate"),
        }),
        None => Ok(()),
    }
}
