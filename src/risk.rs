//! Performance and risk indicators for timestamp-indexed series.
//!
//! Every indicator first resamples the series to one observation per UTC
//! calendar day (the last non-missing value of the day) and then restricts it
//! to the optional inclusive window of [`RiskParams`]. Annualisation assumes
//! 252 trading days.

use crate::errors::{validate_data_length, FracDiffError, FracDiffResult};
use crate::math_utils::{cumulative_max, mean, sample_std};
use crate::series::{OrderedSeries, SeriesIndex, SeriesKind, SECONDS_PER_DAY};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trading days per year
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Window and risk-free rate shared by all indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RiskParams {
    /// First day included, UNIX seconds
    pub start: Option<i64>,
    /// Last day included, UNIX seconds
    pub end: Option<i64>,
    /// Annual risk-free rate subtracted from the annualised mean
    pub risk_free: f64,
}

impl RiskParams {
    /// Restrict to the inclusive `[start, end]` range
    pub fn with_window(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the risk-free rate
    pub fn with_risk_free(mut self, risk_free: f64) -> Self {
        self.risk_free = risk_free;
        self
    }
}

/// The four summary indicators of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RiskIndicators {
    /// Annualised Sharpe ratio
    pub sharpe: f64,
    /// Annualised Sortino ratio
    pub sortino: f64,
    /// Calmar ratio
    pub calmar: f64,
    /// Maximum drawdown, a non-positive fraction
    pub max_drawdown: f64,
}

impl RiskIndicators {
    /// Named values in reporting order
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("sharpe", self.sharpe),
            ("sortino", self.sortino),
            ("calmar", self.calmar),
            ("max_drawdown", self.max_drawdown),
        ]
    }
}

/// Last non-missing value per UTC day within the window, keyed by day start.
fn daily_last(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<(Vec<i64>, Vec<f64>)> {
    let timestamps = match series.index() {
        SeriesIndex::Timestamps(ts) => ts,
        SeriesIndex::Positional(_) => {
            return Err(FracDiffError::UnsupportedInputShape {
                reason: format!("series '{}' has no timestamp index", series.name()),
            })
        }
    };

    let mut days: Vec<i64> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    for (&ts, &value) in timestamps.iter().zip(series.values()) {
        if value.is_nan() {
            continue;
        }
        let day = ts.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
        if params.start.map_or(false, |s| day < s) || params.end.map_or(false, |e| day > e) {
            continue;
        }
        match days.last() {
            Some(&last) if last == day => {
                if let Some(v) = values.last_mut() {
                    *v = value;
                }
            }
            _ => {
                days.push(day);
                values.push(value);
            }
        }
    }
    Ok((days, values))
}

fn daily_values(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<Vec<f64>> {
    let (_, values) = daily_last(series, params)?;
    validate_data_length(&values, 2)?;
    Ok(values)
}

fn annualised_excess(values: &[f64], risk_free: f64) -> f64 {
    mean(values) * TRADING_DAYS_PER_YEAR - risk_free
}

/// Annualised Sharpe ratio of the daily values.
pub fn sharpe(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<f64> {
    let daily = daily_values(series, params)?;
    let std = sample_std(&daily)? * TRADING_DAYS_PER_YEAR.sqrt();
    Ok(annualised_excess(&daily, params.risk_free) / std)
}

/// Annualised Sortino ratio; the deviation uses negative days only.
///
/// With fewer than two negative days the deviation is undefined and the ratio
/// is NaN.
pub fn sortino(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<f64> {
    let daily = daily_values(series, params)?;
    let negative: Vec<f64> = daily.iter().copied().filter(|v| *v < 0.0).collect();
    if negative.len() < 2 {
        return Ok(f64::NAN);
    }
    let std_neg = sample_std(&negative)? * TRADING_DAYS_PER_YEAR.sqrt();
    Ok(annualised_excess(&daily, params.risk_free) / std_neg)
}

/// Relative distance of each daily value below its running maximum.
///
/// The result is indexed by day start and tagged [`SeriesKind::Indicator`].
pub fn drawdown(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<OrderedSeries> {
    let (days, values) = daily_last(series, params)?;
    validate_data_length(&values, 1)?;
    let peaks = cumulative_max(&values);
    let dd = values
        .iter()
        .zip(&peaks)
        .map(|(v, peak)| (v - peak) / peak)
        .collect();
    Ok(
        OrderedSeries::with_index(format!("{}_drawdown", series.name()), SeriesIndex::timestamps(days)?, dd)?
            .with_kind(SeriesKind::Indicator),
    )
}

/// Smallest drawdown, i.e. the deepest fall from a peak.
pub fn max_drawdown(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<f64> {
    let dd = drawdown(series, params)?;
    Ok(dd.values().iter().copied().fold(f64::INFINITY, f64::min))
}

/// Annualised excess mean over the absolute maximum drawdown.
///
/// A series without any drawdown yields an infinite ratio.
pub fn calmar(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<f64> {
    let daily = daily_values(series, params)?;
    let mdd = max_drawdown(series, params)?;
    Ok(annualised_excess(&daily, params.risk_free) / mdd.abs())
}

/// Sharpe, Sortino, Calmar and maximum drawdown in one call.
pub fn indicators(series: &OrderedSeries, params: &RiskParams) -> FracDiffResult<RiskIndicators> {
    Ok(RiskIndicators {
        sharpe: sharpe(series, params)?,
        sortino: sortino(series, params)?,
        calmar: calmar(series, params)?,
        max_drawdown: max_drawdown(series, params)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const DAY: i64 = SECONDS_PER_DAY;

    fn daily_series(values: Vec<f64>) -> OrderedSeries {
        let n = values.len();
        OrderedSeries::with_index("pnl", SeriesIndex::daily(0, n), values).unwrap()
    }

    #[test]
    fn test_resampling_keeps_last_value_of_day() {
        let ts = vec![0, 3600, 2 * DAY + 10, 2 * DAY + 20, 3 * DAY];
        let values = vec![1.0, 2.0, 5.0, f64::NAN, 4.0];
        let series = OrderedSeries::with_index("x", SeriesIndex::timestamps(ts).unwrap(), values).unwrap();

        let (days, daily) = daily_last(&series, &RiskParams::default()).unwrap();
        assert_eq!(days, vec![0, 2 * DAY, 3 * DAY]);
        assert_eq!(daily, vec![2.0, 5.0, 4.0]);

        let windowed = RiskParams::default().with_window(Some(DAY), Some(2 * DAY));
        let (days, daily) = daily_last(&series, &windowed).unwrap();
        assert_eq!(days, vec![2 * DAY]);
        assert_eq!(daily, vec![5.0]);
    }

    #[test]
    fn test_sharpe_and_sortino() {
        let values = vec![0.01, -0.02, 0.03, -0.01, 0.02];
        let series = daily_series(values.clone());
        let m = values.iter().sum::<f64>() / 5.0;
        let sd = (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / 4.0).sqrt();
        let expected = (m * 252.0 - 0.01) / (sd * 252f64.sqrt());

        let params = RiskParams::default().with_risk_free(0.01);
        assert_approx_eq!(sharpe(&series, &params).unwrap(), expected, 1e-12);

        // Negative days: -0.02, -0.01
        let neg_sd = (2.0 * 0.005f64.powi(2)).sqrt();
        let expected = (m * 252.0 - 0.01) / (neg_sd * 252f64.sqrt());
        assert_approx_eq!(sortino(&series, &params).unwrap(), expected, 1e-10);
    }

    #[test]
    fn test_drawdown_and_calmar() {
        let series = daily_series(vec![100.0, 120.0, 90.0, 110.0, 130.0, 117.0]);
        let dd = drawdown(&series, &RiskParams::default()).unwrap();
        assert_eq!(dd.kind(), SeriesKind::Indicator);
        assert_approx_eq!(dd.values()[2], -0.25);
        assert_approx_eq!(dd.values()[5], -0.1);
        assert_eq!(dd.values()[4], 0.0);

        let mdd = max_drawdown(&series, &RiskParams::default()).unwrap();
        assert_approx_eq!(mdd, -0.25);

        let m = (100.0 + 120.0 + 90.0 + 110.0 + 130.0 + 117.0) / 6.0;
        assert_approx_eq!(calmar(&series, &RiskParams::default()).unwrap(), m * 252.0 / 0.25, 1e-9);
    }

    #[test]
    fn test_indicator_summary_order() {
        let series = daily_series(vec![0.5, -0.2, 0.1, -0.4, 0.3, 0.2]);
        let summary = indicators(&series, &RiskParams::default()).unwrap();
        let names: Vec<&str> = summary.named().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["sharpe", "sortino", "calmar", "max_drawdown"]);
        assert_eq!(summary.named()[0].1, summary.sharpe);
    }

    #[test]
    fn test_positional_series_rejected() {
        let series = OrderedSeries::new("x", vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            sharpe(&series, &RiskParams::default()),
            Err(FracDiffError::UnsupportedInputShape { .. })
        ));
    }

    #[test]
    fn test_single_day_is_insufficient() {
        let ts = vec![10, 20, 30];
        let series =
            OrderedSeries::with_index("x", SeriesIndex::timestamps(ts).unwrap(), vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            sharpe(&series, &RiskParams::default()),
            Err(FracDiffError::InsufficientData { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_single_negative_day_keeps_other_indicators() {
        let series = daily_series(vec![0.01, 0.02, -0.01, 0.03, 0.01]);
        let params = RiskParams::default();

        assert!(sortino(&series, &params).unwrap().is_nan());
        let summary = indicators(&series, &params).unwrap();
        assert!(summary.sortino.is_nan());
        assert_approx_eq!(summary.sharpe, sharpe(&series, &params).unwrap());
        assert!(summary.sharpe.is_finite());
        assert_approx_eq!(summary.max_drawdown, -1.5);
        assert!(summary.calmar.is_finite());
    }
}
