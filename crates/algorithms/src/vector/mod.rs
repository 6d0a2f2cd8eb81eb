//! Vector buffer aggregation
//!
//! Turns tagged vector features into one covariate value per query point:
//! - Classify: pick the dominant geometry kind of a feature set
//! - Index: bulk-loaded R-tree over the features of that kind
//! - Buffer: regular-polygon approximation of a circle around each point
//! - Aggregate: exact point count, clipped length or intersected area
//! - Engine: runs the above over all query points
//! - Area / Length: geometric measurements

mod aggregate;
mod buffer;
mod classify;
mod engine;
pub mod index;
mod measurements;

pub use aggregate::Aggregator;
pub use buffer::{buffer_point, BufferParams, DEFAULT_SEGMENTS};
pub use classify::{classify, KindCounts};
pub use engine::{buffer_aggregate, BufferCovariate, CovariateInput};
pub use index::{FeatureIndex, IndexedGeometry};
pub use measurements::{area, length};
