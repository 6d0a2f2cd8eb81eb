//! One-hot time covariates
//!
//! Encoders for the time of an observation. Matrix encoders return one
//! row per category and one column per timestamp, with a 1 where the
//! timestamp falls in the category and 0 elsewhere.

use chrono::{Datelike, Timelike, Weekday};
use lurcov_core::{Error, Result};
use ndarray::Array2;

/// Hour of day, shape (24, n)
pub fn hour<T: Timelike>(times: &[T]) -> Array2<f64> {
    let mut out = Array2::zeros((24, times.len()));
    for (j, t) in times.iter().enumerate() {
        out[[t.hour() as usize, j]] = 1.0;
    }
    out
}

/// Month of year, shape (12, n). January is row 0.
pub fn month<T: Datelike>(times: &[T]) -> Array2<f64> {
    let mut out = Array2::zeros((12, times.len()));
    for (j, t) in times.iter().enumerate() {
        out[[t.month0() as usize, j]] = 1.0;
    }
    out
}

/// 1 for Saturdays and Sundays, 0 otherwise
pub fn weekend<T: Datelike>(times: &[T]) -> Vec<f64> {
    times
        .iter()
        .map(|t| match t.weekday() {
            Weekday::Sat | Weekday::Sun => 1.0,
            _ => 0.0,
        })
        .collect()
}

/// Calendar year, shape (end - start + 1, n). Row 0 is `start`.
///
/// Fails if any timestamp falls outside `start..=end`.
pub fn year<T: Datelike>(times: &[T], start: i32, end: i32) -> Result<Array2<f64>> {
    if end < start {
        return Err(Error::InvalidParameter {
            name: "end",
            value: end.to_string(),
            reason: format!("must not precede start year {start}"),
        });
    }
    let rows = (i64::from(end) - i64::from(start) + 1) as usize;
    let mut out = Array2::zeros((rows, times.len()));
    for (j, t) in times.iter().enumerate() {
        let y = t.year();
        if !(start..=end).contains(&y) {
            return Err(Error::YearOutOfRange { year: y, start, end });
        }
        out[[(i64::from(y) - i64::from(start)) as usize, j]] = 1.0;
    }
    Ok(out)
}
