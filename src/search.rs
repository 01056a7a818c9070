//! Adaptive search for the smallest stationary differencing order.
//!
//! Bisection over `[0, upper_bound)`: every midpoint that makes the series
//! stationary becomes the new upper end, every other midpoint the new lower
//! end. The search stops once the bracket is narrower than `precision`, or
//! cannot be split any further in floating point, and returns the last
//! stationary candidate. The stationarity oracle is assumed
//! monotone in the order; no other property is required of it.

use crate::diagnostics::{DifferencingEvent, DifferencingObserver};
use crate::errors::{validate_positive, FracDiffError, FracDiffResult};
use crate::fracdiff::diff;
use crate::stationarity::StationarityOracle;

/// Differenced values together with the order that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Differenced series, aligned with the input
    pub values: Vec<f64>,
    /// Differencing order, 0 when the input was already stationary
    pub order: f64,
}

/// Bisection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    /// Bracket width at which the search stops
    pub precision: f64,
    /// Upper end of the initial bracket
    pub upper_bound: f64,
    /// Kernel length passed to the differencing operator
    pub window_size: usize,
}

impl SearchBounds {
    fn validate(&self) -> FracDiffResult<()> {
        validate_positive(self.precision, "precision")?;
        validate_positive(self.upper_bound, "upper_bound")?;
        if self.window_size == 0 {
            return Err(FracDiffError::InvalidConfiguration {
                parameter: "window_size".to_string(),
                value: 0.0,
                constraint: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Find the smallest order, to within `bounds.precision`, at which `oracle`
/// accepts the differenced series.
///
/// An already stationary input is returned unchanged with order 0 and the
/// operator is never invoked. Oracle errors abort the search.
pub fn auto_search(
    values: &[f64],
    bounds: SearchBounds,
    oracle: &dyn StationarityOracle,
    observer: &dyn DifferencingObserver,
    column: &str,
) -> FracDiffResult<SearchOutcome> {
    bounds.validate()?;

    if oracle.is_stationary(values)? {
        observer.on_event(&DifferencingEvent::AlreadyStationary {
            column: column.to_string(),
        });
        return Ok(SearchOutcome {
            values: values.to_vec(),
            order: 0.0,
        });
    }

    let mut lower = 0.0;
    let mut upper = bounds.upper_bound;
    let mut best: Option<SearchOutcome> = None;

    while upper - lower >= bounds.precision {
        let mid = (lower + upper) / 2.0;
        // Bracket is one ulp wide; it cannot narrow any further
        if mid <= lower || mid >= upper {
            break;
        }
        let candidate = diff(values, mid, bounds.window_size)?;
        let stationary = oracle.is_stationary(&candidate)?;

        observer.on_event(&DifferencingEvent::BisectionStep {
            column: column.to_string(),
            lower,
            upper,
            order: mid,
            stationary,
        });

        if stationary {
            best = Some(SearchOutcome {
                values: candidate,
                order: mid,
            });
            upper = mid;
        } else {
            lower = mid;
        }
    }

    best.ok_or(FracDiffError::NoStationaryOrderFound {
        upper_bound: bounds.upper_bound,
        precision: bounds.precision,
    })
}
