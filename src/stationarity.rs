//! Stationarity testing for differenced series.
//!
//! The Augmented Dickey-Fuller (ADF) unit-root test with a constant term, lag
//! length chosen by information criterion, and MacKinnon approximate p-values.
//! [`StationarityOracle`] abstracts the yes/no decision so that the order search
//! can be driven by any test.

use crate::errors::{validate_parameter, FracDiffError, FracDiffResult};
use crate::linear_algebra::{ols_fit, OlsFit};
use crate::math_utils::drop_missing;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

const ADF_TEST_NAME: &str = "Augmented Dickey-Fuller";

// MacKinnon (1994) approximate p-value surface, one series, constant only.
const TAU_MAX_C: f64 = 2.74;
const TAU_MIN_C: f64 = -18.83;
const TAU_STAR_C: f64 = -1.61;
const TAU_SMALLP_C: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGEP_C: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) critical value response surface in 1/nobs, constant only.
const TAU_C_2010: [(f64, [f64; 4]); 3] = [
    (0.01, [-3.43035, -6.5393, -16.786, -79.433]),
    (0.05, [-2.86154, -2.8903, -4.234, -40.040]),
    (0.10, [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Lag selection criterion for the ADF regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LagCriterion {
    /// Akaike information criterion
    #[default]
    Aic,
    /// Bayesian information criterion
    Bic,
    /// Use the maximum lag as given, no selection
    Fixed,
}

/// ADF test configuration
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdfConfig {
    /// Maximum number of lagged differences; `None` uses `ceil(12 (n/100)^{1/4})`
    pub max_lag: Option<usize>,
    /// Lag selection criterion
    pub lag_criterion: LagCriterion,
}

/// ADF test outcome
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdfTestResult {
    /// t-statistic of the lagged level coefficient
    pub test_statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    /// `(significance_level, critical_value)` at 1%, 5% and 10%
    pub critical_values: Vec<(f64, f64)>,
    /// Best information criterion value, when a lag search ran
    pub information_criterion: Option<f64>,
}

fn oracle_error(reason: impl Into<String>) -> FracDiffError {
    FracDiffError::OracleEvaluation {
        test_name: ADF_TEST_NAME.to_string(),
        reason: reason.into(),
    }
}

/// Standard normal CDF
fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Evaluate `c[0] + c[1] x + c[2] x^2 + ...`
fn polyval_ascending(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// MacKinnon (1994) approximate p-value of an ADF statistic with constant.
pub fn mackinnon_p_value(test_statistic: f64) -> f64 {
    if test_statistic.is_nan() {
        return f64::NAN;
    }
    if test_statistic > TAU_MAX_C {
        return 1.0;
    }
    if test_statistic < TAU_MIN_C {
        return 0.0;
    }
    let z = if test_statistic <= TAU_STAR_C {
        polyval_ascending(&TAU_SMALLP_C, test_statistic)
    } else {
        polyval_ascending(&TAU_LARGEP_C, test_statistic)
    };
    standard_normal_cdf(z)
}

/// MacKinnon (2010) critical values at 1%, 5% and 10% for `nobs` observations.
pub fn mackinnon_critical_values(nobs: usize) -> Vec<(f64, f64)> {
    let inv = 1.0 / nobs as f64;
    TAU_C_2010
        .iter()
        .map(|(level, coefficients)| (*level, polyval_ascending(coefficients, inv)))
        .collect()
}

/// Design of `Δx_t` on the lagged level and `lags` lagged differences,
/// restricted to the last `rows` usable observations.
///
/// Returns `(predictors, response)` with predictors ordered
/// `[x_{t-1}, Δx_{t-1}, ..., Δx_{t-lags}, 1]`.
fn adf_design(x: &[f64], diffs: &[f64], lags: usize, rows: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    // Row r covers difference index t = start + r
    let start = diffs.len() - rows;
    debug_assert!(start >= lags);

    let mut predictors = Vec::with_capacity(lags + 2);
    predictors.push((start..diffs.len()).map(|t| x[t]).collect());
    for j in 1..=lags {
        predictors.push((start..diffs.len()).map(|t| diffs[t - j]).collect());
    }
    predictors.push(vec![1.0; rows]);

    (predictors, diffs[start..].to_vec())
}

fn fit(x: &[f64], diffs: &[f64], lags: usize, rows: usize) -> FracDiffResult<OlsFit> {
    let (predictors, response) = adf_design(x, diffs, lags, rows);
    ols_fit(&predictors, &response).map_err(|e| oracle_error(format!("regression with {} lags failed: {}", lags, e)))
}

/// Augmented Dickey-Fuller test with the default configuration.
pub fn augmented_dickey_fuller(data: &[f64]) -> FracDiffResult<AdfTestResult> {
    augmented_dickey_fuller_with_config(data, &AdfConfig::default())
}

/// Augmented Dickey-Fuller test with constant.
///
/// Missing values are dropped first. Empty, constant or too-short input is an
/// [`FracDiffError::OracleEvaluation`] error.
pub fn augmented_dickey_fuller_with_config(
    data: &[f64],
    config: &AdfConfig,
) -> FracDiffResult<AdfTestResult> {
    let x = drop_missing(data);
    if x.is_empty() {
        return Err(oracle_error("series is empty after removing missing values"));
    }
    if let Some(bad) = x.iter().find(|v| v.is_infinite()) {
        return Err(oracle_error(format!("series contains non-finite value {}", bad)));
    }
    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        return Err(oracle_error("series is constant"));
    }

    let nobs = x.len();
    // Largest lag leaving room for the constant and the lagged level
    let lag_cap = (nobs / 2) as i64 - 2;
    let max_lag = match config.max_lag {
        Some(requested) => {
            if requested as i64 > lag_cap {
                return Err(oracle_error(format!(
                    "max_lag {} exceeds nobs/2 - 2 = {} for {} observations",
                    requested, lag_cap, nobs
                )));
            }
            requested
        }
        None => {
            let schwert = (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as i64;
            let capped = schwert.min(lag_cap);
            if capped < 0 {
                return Err(oracle_error(format!(
                    "sample of {} observations is too short for the regression",
                    nobs
                )));
            }
            capped as usize
        }
    };

    let diffs: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let (used_lag, information_criterion) = match config.lag_criterion {
        LagCriterion::Fixed => (max_lag, None),
        criterion => {
            // Common sample for every candidate lag
            let rows = diffs.len() - max_lag;
            let mut best: Option<(f64, usize)> = None;
            for lags in 0..=max_lag {
                let candidate = fit(&x, &diffs, lags, rows)?;
                let ic = match criterion {
                    LagCriterion::Bic => candidate.bic(),
                    _ => candidate.aic(),
                };
                if best.map_or(true, |(best_ic, _)| ic < best_ic) {
                    best = Some((ic, lags));
                }
            }
            let (ic, lags) = best.ok_or_else(|| oracle_error("no lag candidate could be fitted"))?;
            (lags, Some(ic))
        }
    };

    // Refit on the largest sample available for the chosen lag
    let rows = diffs.len() - used_lag;
    let regression = fit(&x, &diffs, used_lag, rows)?;
    let test_statistic = regression.t_value(0);
    if !test_statistic.is_finite() {
        return Err(oracle_error("test statistic is not finite"));
    }

    log::trace!(
        "ADF: stat={:.4} lag={} nobs={}",
        test_statistic,
        used_lag,
        regression.nobs
    );

    Ok(AdfTestResult {
        test_statistic,
        p_value: mackinnon_p_value(test_statistic),
        used_lag,
        nobs: regression.nobs,
        critical_values: mackinnon_critical_values(regression.nobs),
        information_criterion,
    })
}

/// Decides whether a sequence is stationary.
///
/// Implementations receive the raw values, leading `NaN`s included, and must
/// report a test that cannot be computed as an error rather than `false`.
pub trait StationarityOracle: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// True when the series is stationary at the oracle's significance level
    fn is_stationary(&self, values: &[f64]) -> FracDiffResult<bool>;
}

/// ADF-backed stationarity oracle: stationary iff `p_value <= tolerance`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdfOracle {
    tolerance: f64,
    config: AdfConfig,
}

impl AdfOracle {
    /// Oracle at the given significance level with the default ADF configuration
    pub fn new(tolerance: f64) -> FracDiffResult<Self> {
        Self::with_config(tolerance, AdfConfig::default())
    }

    /// Oracle with an explicit ADF configuration
    pub fn with_config(tolerance: f64, config: AdfConfig) -> FracDiffResult<Self> {
        validate_parameter(tolerance, 0.0, 1.0, "tolerance")?;
        Ok(Self { tolerance, config })
    }

    /// Significance level
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Full test outcome for `values`
    pub fn test(&self, values: &[f64]) -> FracDiffResult<AdfTestResult> {
        augmented_dickey_fuller_with_config(values, &self.config)
    }
}

impl Default for AdfOracle {
    fn default() -> Self {
        Self {
            tolerance: crate::config::DEFAULT_TOLERANCE,
            config: AdfConfig::default(),
        }
    }
}

impl StationarityOracle for AdfOracle {
    fn name(&self) -> &str {
        "adf"
    }

    fn is_stationary(&self, values: &[f64]) -> FracDiffResult<bool> {
        Ok(self.test(values)?.p_value <= self.tolerance)
    }
}

/// ADF stationarity decision at `tolerance` with the default configuration.
pub fn is_stationary(values: &[f64], tolerance: f64) -> FracDiffResult<bool> {
    AdfOracle::new(tolerance)?.is_stationary(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifferencingConfig;
    use crate::generators::{generate_benchmark_series, BenchmarkSeriesType, GeneratorConfig};
    use assert_approx_eq::assert_approx_eq;

    fn white_noise(length: usize, seed: u64) -> Vec<f64> {
        let config = GeneratorConfig {
            length,
            seed: Some(seed),
        };
        generate_benchmark_series(BenchmarkSeriesType::WhiteNoise, &config).unwrap()
    }

    #[test]
    fn test_p_value_matches_critical_levels() {
        // Asymptotic 5% and 1% critical values for the constant-only case
        assert_approx_eq!(mackinnon_p_value(-2.86), 0.05, 0.003);
        assert_approx_eq!(mackinnon_p_value(-3.43), 0.01, 0.002);
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-25.0), 0.0);
    }

    #[test]
    fn test_p_value_is_monotone_and_continuous() {
        let mut previous = 0.0;
        let mut stat = -18.0;
        while stat < 2.7 {
            let p = mackinnon_p_value(stat);
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= previous, "p-value decreased at {}", stat);
            previous = p;
            stat += 0.01;
        }
        let below = mackinnon_p_value(TAU_STAR_C);
        let above = mackinnon_p_value(TAU_STAR_C + 1e-9);
        assert_approx_eq!(below, above, 2e-3);
    }

    #[test]
    fn test_critical_values_response_surface() {
        let cv = mackinnon_critical_values(100);
        assert_eq!(cv.len(), 3);
        assert_eq!(cv[1].0, 0.05);
        let expected = -2.86154 - 2.8903 / 100.0 - 4.234 / 1e4 - 40.040 / 1e6;
        assert_approx_eq!(cv[1].1, expected, 1e-12);
        assert!(cv[0].1 < cv[1].1 && cv[1].1 < cv[2].1);
    }

    #[test]
    fn test_white_noise_is_stationary() {
        let noise = white_noise(200, 42);
        let result = augmented_dickey_fuller(&noise).unwrap();
        assert!(result.test_statistic < -3.5, "stat {}", result.test_statistic);
        assert!(result.p_value < 0.01);
        assert!(result.information_criterion.is_some());
        assert_eq!(result.nobs, 199 - result.used_lag);
        assert!(is_stationary(&noise, 0.05).unwrap());
    }

    #[test]
    fn test_explosive_series_is_not_stationary() {
        let series: Vec<f64> = (0..150)
            .map(|t| 1.03f64.powi(t) + 0.01 * ((t * 7 % 11) as f64 - 5.0))
            .collect();
        let result = augmented_dickey_fuller(&series).unwrap();
        assert!(result.p_value > 0.5, "p {}", result.p_value);
        assert!(!AdfOracle::default().is_stationary(&series).unwrap());
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let mut noise = white_noise(120, 7);
        let reference = augmented_dickey_fuller(&noise).unwrap();
        let mut padded = vec![f64::NAN; 9];
        padded.append(&mut noise);
        let result = augmented_dickey_fuller(&padded).unwrap();
        assert_eq!(result.test_statistic, reference.test_statistic);
        assert_eq!(result.used_lag, reference.used_lag);
    }

    #[test]
    fn test_degenerate_inputs_are_errors() {
        let constant = vec![3.0; 50];
        assert!(matches!(
            augmented_dickey_fuller(&constant),
            Err(FracDiffError::OracleEvaluation { .. })
        ));

        let all_missing = vec![f64::NAN; 20];
        assert!(matches!(
            is_stationary(&all_missing, 0.05),
            Err(FracDiffError::OracleEvaluation { .. })
        ));

        assert!(matches!(
            augmented_dickey_fuller(&[1.0, 2.0, 1.5]),
            Err(FracDiffError::OracleEvaluation { .. })
        ));
    }

    #[test]
    fn test_fixed_lag_and_bic() {
        let noise = white_noise(150, 11);
        let fixed = augmented_dickey_fuller_with_config(
            &noise,
            &AdfConfig {
                max_lag: Some(3),
                lag_criterion: LagCriterion::Fixed,
            },
        )
        .unwrap();
        assert_eq!(fixed.used_lag, 3);
        assert_eq!(fixed.nobs, 149 - 3);
        assert!(fixed.information_criterion.is_none());

        let bic = augmented_dickey_fuller_with_config(
            &noise,
            &AdfConfig {
                max_lag: None,
                lag_criterion: LagCriterion::Bic,
            },
        )
        .unwrap();
        assert!(bic.p_value < 0.05);

        let too_many = augmented_dickey_fuller_with_config(
            &noise,
            &AdfConfig {
                max_lag: Some(100),
                lag_criterion: LagCriterion::Aic,
            },
        );
        assert!(matches!(too_many, Err(FracDiffError::OracleEvaluation { .. })));
    }

    #[test]
    fn test_oracle_rejects_bad_tolerance() {
        for tolerance in [0.0, 1.0, 1.5, f64::NAN] {
            let err = AdfOracle::new(tolerance).unwrap_err();
            assert!(err.is_configuration_error(), "{} accepted", tolerance);
            // Same rule as the differencer configuration
            assert!(DifferencingConfig::default()
                .with_tolerance(tolerance)
                .validate()
                .is_err());
        }
        assert_eq!(AdfOracle::new(0.1).unwrap().tolerance(), 0.1);
    }
}
