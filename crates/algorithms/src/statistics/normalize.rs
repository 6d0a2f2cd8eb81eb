//! Z-score normalization
//!
//! Shifts a covariate column to zero mean and scales it to unit sample
//! standard deviation (n - 1 denominator).
//!
//! A constant column has zero standard deviation and a single value has
//! an undefined one; in both cases every output is NaN. Callers that can
//! see such columns must check for non-finite output.

/// Arithmetic mean, NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}

/// Normalize `values` in place to zero mean and unit standard deviation.
///
/// Empty input is left untouched.
pub fn normalize(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    let m = mean(values);
    let sd = sample_std_dev(values);
    let scale = 1.0 / sd;
    for v in values.iter_mut() {
        *v = (*v - m) * scale;
    }
}
