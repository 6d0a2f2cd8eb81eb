//! Statistical post-processing for covariates
//!
//! - **normalize**: z-score a covariate column in place

pub mod normalize;

pub use normalize::{mean, normalize, sample_std_dev};
