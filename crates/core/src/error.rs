//! Error types for lurcov

use thiserror::Error;

/// Main error type for lurcov operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported geometry in feature {index}: {reason}")]
    UnsupportedGeometry { index: usize, reason: String },

    #[error("Geometry operation failed: {operation} on feature {index} ({reason})")]
    GeometryOperationFailed {
        operation: &'static str,
        index: usize,
        reason: String,
    },

    #[error("Unsupported pollutant: {0}")]
    UnsupportedPollutant(String),

    #[error("Dispersion model failure: {0}")]
    DispersionModel(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Year {year} out of range {start}..={end}")]
    YearOutOfRange { year: i32, start: i32, end: i32 },
}

/// Result type alias for lurcov operations
pub type Result<T> = std::result::Result<T, Error>;
