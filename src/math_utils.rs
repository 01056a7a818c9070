//! Mathematical utilities shared by the differencing, testing and indicator modules.
//!
//! Missing observations are represented as `NaN` throughout the crate; the helpers
//! here either skip them explicitly or document that they propagate.

use crate::errors::{validate_data_length, FracDiffResult};

/// Total ordering for f64 values, NaN sorted last.
#[inline]
pub fn float_total_cmp(a: &f64, b: &f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal),
    }
}

/// Copy of `values` with missing observations removed, order preserved.
pub fn drop_missing(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Compensated summation for long accumulations.
pub fn kahan_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for &value in values {
        let y = value - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Arithmetic mean. NaN for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    kahan_sum(values) / values.len() as f64
}

/// Sample standard deviation with one degree of freedom removed.
///
/// Errors with [`FracDiffError::InsufficientData`](crate::errors::FracDiffError::InsufficientData) for fewer than two values.
pub fn sample_std(values: &[f64]) -> FracDiffResult<f64> {
    validate_data_length(values, 2)?;
    let n = values.len();
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    Ok((ss / (n - 1) as f64).sqrt())
}

/// Running maximum; NaN entries are skipped and reported as NaN.
pub fn cumulative_max(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                peak = peak.max(v);
                peak
            }
        })
        .collect()
}

/// Safe floating-point comparisons.
pub mod float_ops {
    /// Default epsilon for approximate comparisons
    pub const DEFAULT_EPSILON: f64 = 1e-10;

    /// Approximate equality with the default epsilon
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        approx_eq_eps(a, b, DEFAULT_EPSILON)
    }

    /// Approximate equality with a relative epsilon
    #[inline]
    pub fn approx_eq_eps(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() <= epsilon * a.abs().max(b.abs()).max(1.0)
    }

    /// Bitwise-aware equality treating two NaNs as equal
    #[inline]
    pub fn same_value(a: f64, b: f64) -> bool {
        (a.is_nan() && b.is_nan()) || a == b
    }
}
