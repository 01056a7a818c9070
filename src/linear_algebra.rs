//! Linear algebra operations for regression-based unit-root testing
//!
//! Householder QR least squares with coefficient standard errors. The factor `R`
//! is reused to obtain `diag((X'X)^{-1})` without forming the normal equations.

use crate::errors::{FracDiffError, FracDiffResult};

/// Validates that a vector contains no NaN or Inf values
fn ensure_finite_vector(v: &[f64], operation: &str) -> FracDiffResult<()> {
    for (i, &val) in v.iter().enumerate() {
        if !val.is_finite() {
            return Err(FracDiffError::NumericalError {
                reason: format!("Non-finite value ({}) at position [{}]", val, i),
                operation: Some(operation.to_string()),
            });
        }
    }
    Ok(())
}

/// Least-squares fit with classical (homoskedastic) standard errors.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per predictor
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
}

impl OlsFit {
    /// Number of estimated coefficients
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t-statistic of coefficient `i`
    pub fn t_value(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood evaluated at the estimate
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_params() as f64
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + (self.nobs as f64).ln() * self.num_params() as f64
    }
}

/// Ordinary least squares via Householder QR.
///
/// # Arguments
/// * `x` - Predictors as k vectors, each of length n (predictor-by-observation format)
///         x[predictor_idx][observation_idx]
/// * `y` - Response vector of length n
///
/// Returns a [`FracDiffError::NumericalError`] when the design is rank deficient
/// or has no residual degrees of freedom.
pub fn ols_fit(x: &[Vec<f64>], y: &[f64]) -> FracDiffResult<OlsFit> {
    let n = y.len();
    let k = x.len();

    if k == 0 {
        return Err(FracDiffError::NumericalError {
            reason: "Regression without predictors".to_string(),
            operation: Some("ols_fit".to_string()),
        });
    }
    if n <= k {
        return Err(FracDiffError::InsufficientData {
            required: k + 1,
            actual: n,
        });
    }

    ensure_finite_vector(y, "ols_fit")?;
    for (i, col) in x.iter().enumerate() {
        if col.len() != n {
            return Err(FracDiffError::NumericalError {
                reason: format!("Predictor column {} has length {} but expected {}", i, col.len(), n),
                operation: Some("ols_fit".to_string()),
            });
        }
        ensure_finite_vector(col, "ols_fit")?;
    }

    // Create X matrix (n x k)
    let mut r = vec![vec![0.0; k]; n];
    for i in 0..n {
        for j in 0..k {
            r[i][j] = x[j][i];
        }
    }
    let mut qty = y.to_vec();

    let mut matrix_norm = 0.0;
    for row in &r {
        for &val in row {
            matrix_norm += val * val;
        }
    }
    matrix_norm = matrix_norm.sqrt();
    let rank_tol = 100.0 * f64::EPSILON * (n.max(k) as f64) * matrix_norm;

    for col in 0..k {
        let mut v = vec![0.0; n - col];
        for i in col..n {
            v[i - col] = r[i][col];
        }

        let norm_v = v.iter().map(|vi| vi * vi).sum::<f64>().sqrt();
        if norm_v <= rank_tol {
            return Err(FracDiffError::NumericalError {
                reason: format!("Design matrix is rank deficient at column {}", col),
                operation: Some("ols_fit".to_string()),
            });
        }

        let sign = if v[0] >= 0.0 { 1.0 } else { -1.0 };
        v[0] += sign * norm_v;
        let norm_h = v.iter().map(|vi| vi * vi).sum::<f64>().sqrt();
        for vi in &mut v {
            *vi /= norm_h;
        }

        // Apply Householder transformation to R
        for j in col..k {
            let mut dot = 0.0;
            for i in col..n {
                dot += v[i - col] * r[i][j];
            }
            for i in col..n {
                r[i][j] -= 2.0 * v[i - col] * dot;
            }
        }

        // Apply same transformation to y (Q'y)
        let mut dot_y = 0.0;
        for i in col..n {
            dot_y += v[i - col] * qty[i];
        }
        for i in col..n {
            qty[i] -= 2.0 * v[i - col] * dot_y;
        }
    }

    for i in 0..k {
        if r[i][i].abs() <= rank_tol {
            return Err(FracDiffError::NumericalError {
                reason: format!("Design matrix is numerically singular (|R[{0}][{0}]| = {1:e})", i, r[i][i].abs()),
                operation: Some("ols_fit".to_string()),
            });
        }
    }

    // Back-substitution to solve R b = Q'y
    let mut coefficients = vec![0.0; k];
    for i in (0..k).rev() {
        let mut sum = qty[i];
        for j in i + 1..k {
            sum -= r[i][j] * coefficients[j];
        }
        coefficients[i] = sum / r[i][i];
    }

    // Residual sum of squares is the squared tail of Q'y
    let ssr: f64 = qty[k..].iter().map(|v| v * v).sum();
    let sigma2 = ssr / (n - k) as f64;

    // diag((X'X)^{-1})_i = ||R^{-T} e_i||^2, solved by forward substitution
    let mut std_errors = Vec::with_capacity(k);
    for target in 0..k {
        let mut u = vec![0.0; k];
        for i in 0..k {
            let mut sum = if i == target { 1.0 } else { 0.0 };
            for j in 0..i {
                sum -= r[j][i] * u[j];
            }
            u[i] = sum / r[i][i];
        }
        let u_norm_sq: f64 = u.iter().map(|v| v * v).sum();
        std_errors.push((sigma2 * u_norm_sq).sqrt());
    }

    Ok(OlsFit {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Compute residuals from regression
///
/// # Arguments
/// * `x` - Predictors in predictor-by-observation format
/// * `y` - Response vector (n observations)
/// * `coeffs` - Regression coefficients (k values)
pub fn compute_residuals(x: &[Vec<f64>], y: &[f64], coeffs: &[f64]) -> Vec<f64> {
    debug_assert_eq!(coeffs.len(), x.len(), "coefficients length must match number of predictors");

    (0..y.len())
        .map(|t| {
            let fitted: f64 = coeffs.iter().enumerate().map(|(i, c)| c * x[i][t]).sum();
            y[t] - fitted
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_exact_linear_fit() {
        // y = 2 + 3x, no noise
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = xs.iter().map(|x| 2.0 + 3.0 * x).collect();
        let design = vec![vec![1.0; 10], xs];

        let fit = ols_fit(&design, &y).unwrap();
        assert_approx_eq!(fit.coefficients[0], 2.0, 1e-10);
        assert_approx_eq!(fit.coefficients[1], 3.0, 1e-10);
        assert!(fit.ssr < 1e-18);
    }

    #[test]
    fn test_standard_errors_match_closed_form() {
        // Simple regression: se(b1) = sqrt(sigma2 / Sxx)
        let xs = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![1.1, 1.9, 3.2, 3.8, 5.1, 6.2];
        let design = vec![vec![1.0; 6], xs.clone()];
        let fit = ols_fit(&design, &y).unwrap();

        let residuals = compute_residuals(&design, &y, &fit.coefficients);
        let ssr: f64 = residuals.iter().map(|r| r * r).sum();
        assert_approx_eq!(fit.ssr, ssr, 1e-12);

        let x_mean = xs.iter().sum::<f64>() / 6.0;
        let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
        let sigma2 = ssr / 4.0;
        assert_approx_eq!(fit.std_errors[1], (sigma2 / sxx).sqrt(), 1e-12);
        assert_approx_eq!(fit.t_value(1), fit.coefficients[1] / (sigma2 / sxx).sqrt(), 1e-9);
    }

    #[test]
    fn test_information_criteria() {
        let xs = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = vec![0.9, 2.1, 2.9, 4.2, 4.8, 6.1, 7.2, 7.9];
        let fit = ols_fit(&[vec![1.0; 8], xs], &y).unwrap();
        let n = 8.0f64;
        let llf = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (fit.ssr / n).ln() + 1.0);
        assert_approx_eq!(fit.aic(), -2.0 * llf + 4.0, 1e-10);
        assert_approx_eq!(fit.bic(), -2.0 * llf + 2.0 * n.ln(), 1e-10);
    }

    #[test]
    fn test_rank_deficient_design_rejected() {
        let design = vec![vec![1.0; 5], vec![2.0; 5]];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(matches!(
            ols_fit(&design, &y),
            Err(FracDiffError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_no_degrees_of_freedom_rejected() {
        let design = vec![vec![1.0, 1.0], vec![0.0, 1.0]];
        assert!(matches!(
            ols_fit(&design, &[1.0, 2.0]),
            Err(FracDiffError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let design = vec![vec![1.0; 4], vec![1.0, 2.0, f64::NAN, 4.0]];
        assert!(ols_fit(&design, &[1.0, 2.0, 3.0, 4.0]).is_err());
    }
}
