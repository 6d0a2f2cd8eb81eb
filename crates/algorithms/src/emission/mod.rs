//! Emission mapping for dispersion-model covariates
//!
//! - **records**: features to per-pollutant emission records
//! - **dispersion**: model seam and summed total PM2.5 field

pub mod dispersion;
pub mod records;

pub use dispersion::{
    dispersion_aggregate, sum_total_pm25, ConcentrationField, DispersionCovariate,
    DispersionModel, ModelError,
};
pub use records::{to_emissions, to_emissions_named, EmissionParams, EmissionRecord, Pollutant};
