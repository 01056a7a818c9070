//! Fixed-window fractional differencing operator.
//!
//! `(1 - B)^d` expanded as a binomial series and truncated to `window_size`
//! weights:
//!
//! ```text
//! w_0 = 1,   w_k = -w_{k-1} (d - k + 1) / k
//! y_t = Σ_{k=0}^{window_size-1} w_k x_{t-k}
//! ```
//!
//! The output is aligned with the input. Positions without a full window are
//! missing (`NaN`), as is any position whose window contains a missing value.

use crate::errors::{FracDiffError, FracDiffResult};
use crate::series::{OrderedSeries, SeriesKind};

fn validate_order(order: f64) -> FracDiffResult<()> {
    if order.is_finite() && order >= 0.0 {
        Ok(())
    } else {
        Err(FracDiffError::InvalidConfiguration {
            parameter: "order".to_string(),
            value: order,
            constraint: "must be finite and >= 0".to_string(),
        })
    }
}

fn validate_window(window_size: usize) -> FracDiffResult<()> {
    if window_size == 0 {
        return Err(FracDiffError::InvalidConfiguration {
            parameter: "window_size".to_string(),
            value: 0.0,
            constraint: "must be >= 1".to_string(),
        });
    }
    Ok(())
}

/// First `window_size` weights of the binomial expansion of `(1 - B)^order`.
///
/// Integer orders produce an exact zero tail after `order + 1` terms.
pub fn fractional_weights(order: f64, window_size: usize) -> FracDiffResult<Vec<f64>> {
    validate_order(order)?;
    validate_window(window_size)?;

    let mut weights = Vec::with_capacity(window_size);
    weights.push(1.0);
    for k in 1..window_size {
        let k = k as f64;
        let w = -weights[weights.len() - 1] * (order - k + 1.0) / k;
        weights.push(w);
    }
    Ok(weights)
}

/// Fractionally difference `values` with order `order`.
///
/// * `order == 0` returns the input unchanged.
/// * `order == 1` is the ordinary first difference; only position 0 is missing.
/// * Any other order applies the truncated kernel; the first
///   `window_size - 1` positions are missing.
///
/// # Example
/// ```rust
/// use fracdiff_finance::fracdiff::diff;
///
/// let out = diff(&[1.0, 3.0, 6.0, 10.0], 1.0, 10).unwrap();
/// assert!(out[0].is_nan());
/// assert_eq!(&out[1..], &[2.0, 3.0, 4.0]);
/// ```
pub fn diff(values: &[f64], order: f64, window_size: usize) -> FracDiffResult<Vec<f64>> {
    validate_order(order)?;
    validate_window(window_size)?;

    if order == 0.0 {
        return Ok(values.to_vec());
    }

    let n = values.len();
    let mut out = vec![f64::NAN; n];

    if order == 1.0 {
        for t in 1..n {
            out[t] = values[t] - values[t - 1];
        }
        return Ok(out);
    }

    let weights = fractional_weights(order, window_size)?;
    for t in window_size.saturating_sub(1)..n {
        let window = &values[t + 1 - window_size..=t];
        // NaN in the window propagates through the sum
        out[t] = weights
            .iter()
            .zip(window.iter().rev())
            .map(|(w, x)| w * x)
            .sum();
    }
    Ok(out)
}

/// Fractionally difference a labelled series, keeping its name and index.
pub fn diff_series(
    series: &OrderedSeries,
    order: f64,
    window_size: usize,
) -> FracDiffResult<OrderedSeries> {
    let values = diff(series.values(), order, window_size)?;
    Ok(series.derive(
        series.name().to_string(),
        SeriesKind::FractionallyDifferenced,
        values,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_weights_recursion() {
        let w = fractional_weights(0.5, 4).unwrap();
        assert_eq!(w[0], 1.0);
        assert_approx_eq!(w[1], -0.5);
        assert_approx_eq!(w[2], -0.125);
        assert_approx_eq!(w[3], -0.0625);
    }

    #[test]
    fn test_integer_order_weights_terminate() {
        let w = fractional_weights(2.0, 6).unwrap();
        assert_eq!(w[..3], [1.0, -2.0, 1.0]);
        assert!(w[3..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_first_difference() {
        let out = diff(&[1.0, 3.0, 6.0, 10.0], 1.0, 10).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_zero_order_is_identity() {
        let values = vec![f64::NAN, 1.0, 2.5, -3.0];
        let out = diff(&values, 0.0, 3).unwrap();
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &values[1..]);
    }

    #[test]
    fn test_window_alignment_and_warmup() {
        let values: Vec<f64> = (1..=6).map(|v| v as f64).collect();
        let out = diff(&values, 0.5, 3).unwrap();
        assert_eq!(out.len(), 6);
        assert!(out[..2].iter().all(|v| v.is_nan()));
        // 3 - 0.5*2 - 0.125*1
        assert_approx_eq!(out[2], 1.875);
        assert_approx_eq!(out[5], 6.0 - 0.5 * 5.0 - 0.125 * 4.0);
    }

    #[test]
    fn test_missing_value_poisons_its_windows() {
        let values = vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 7.0];
        let out = diff(&values, 0.3, 3).unwrap();
        assert!(out[2..5].iter().all(|v| v.is_nan()));
        assert!(out[5].is_finite());
        assert!(out[6].is_finite());
    }

    #[test]
    fn test_short_input_is_all_missing() {
        let out = diff(&[1.0, 2.0], 0.4, 10).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_nan()));
        assert!(diff(&[], 0.4, 10).unwrap().is_empty());
    }

    #[test]
    fn test_window_of_one_scales_by_unit_weight() {
        let values = vec![2.0, -1.0, 4.0];
        assert_eq!(diff(&values, 0.7, 1).unwrap(), values);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            diff(&[1.0, 2.0], -0.5, 10),
            Err(FracDiffError::InvalidConfiguration { .. })
        ));
        assert!(diff(&[1.0, 2.0], f64::NAN, 10).is_err());
        assert!(diff(&[1.0, 2.0], 0.5, 0).is_err());
    }

    #[test]
    fn test_series_wrapper_keeps_label() {
        let series = OrderedSeries::new("close", vec![1.0, 2.0, 4.0, 7.0]);
        let out = diff_series(&series, 1.0, 10).unwrap();
        assert_eq!(out.name(), "close");
        assert_eq!(out.kind(), SeriesKind::FractionallyDifferenced);
        assert_eq!(out.index(), series.index());
        assert_eq!(&out.values()[1..], &[1.0, 2.0, 3.0]);
    }
}
