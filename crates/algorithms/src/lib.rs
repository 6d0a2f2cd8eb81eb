//! # lurcov Algorithms
//!
//! Spatial and temporal covariate extraction for land-use regression.
//!
//! ## Available Algorithm Categories
//!
//! - **vector**: Dominant-kind classification, buffer aggregation of counts, lengths and areas
//! - **emission**: Feature emission records and dispersion-model covariates
//! - **statistics**: Z-score normalization
//! - **temporal**: One-hot hour, month, weekend and year encoders

mod maybe_rayon;

pub mod emission;
pub mod statistics;
pub mod temporal;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::emission::{
        dispersion_aggregate, to_emissions, ConcentrationField, DispersionCovariate,
        DispersionModel, EmissionParams, EmissionRecord, Pollutant,
    };
    pub use crate::statistics::normalize;
    pub use crate::temporal::{hour, month, weekend, year};
    pub use crate::vector::{
        buffer_aggregate, buffer_point, classify, BufferCovariate, BufferParams, CovariateInput,
        KindCounts,
    };
    pub use lurcov_core::prelude::*;
}
