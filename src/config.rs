//! # Differencing Configuration
//!
//! Options recognised by the [`FractionalDifferencer`](crate::FractionalDifferencer):
//! bisection precision, differencing method, fixed order override, output
//! shaping flags and the tunable search policy constants.

use crate::errors::{validate_parameter, validate_positive, FracDiffError, FracDiffResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default bisection resolution on the differencing order.
pub const DEFAULT_PRECISION: f64 = 0.1;
/// Default number of binomial weights in the convolution kernel.
pub const DEFAULT_WINDOW_SIZE: usize = 10;
/// Default upper end of the order search bracket.
pub const DEFAULT_UPPER_BOUND: f64 = 4.0;
/// Default significance level of the stationarity test.
pub const DEFAULT_TOLERANCE: f64 = 0.05;
/// Suffix appended to renamed output columns.
pub const STATIONARIZED_SUFFIX: &str = "_stationarized";

/// Differencing method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DifferencingMethod {
    /// Truncated binomial kernel of fixed length applied over a rolling window
    #[default]
    FixedWindow,
}

impl DifferencingMethod {
    /// Canonical name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            DifferencingMethod::FixedWindow => "fixed-window",
        }
    }
}

impl fmt::Display for DifferencingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifferencingMethod {
    type Err = FracDiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed-window" => Ok(DifferencingMethod::FixedWindow),
            other => Err(FracDiffError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

/// Configuration for a differencing call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DifferencingConfig {
    /// Bisection resolution used by the adaptive search
    pub precision: f64,
    /// Differencing method
    pub method: DifferencingMethod,
    /// Fixed order applied to every column; `None` triggers adaptive search
    pub order: Option<f64>,
    /// Report the used or discovered order of every column
    pub return_order: bool,
    /// Suffix frame column names with [`STATIONARIZED_SUFFIX`]
    pub rename: bool,
    /// Number of binomial weights in the kernel
    pub window_size: usize,
    /// Upper end of the order search bracket
    pub upper_bound: f64,
    /// Significance level of the stationarity test
    pub tolerance: f64,
}

impl Default for DifferencingConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            method: DifferencingMethod::FixedWindow,
            order: None,
            return_order: false,
            rename: true,
            window_size: DEFAULT_WINDOW_SIZE,
            upper_bound: DEFAULT_UPPER_BOUND,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl DifferencingConfig {
    /// Set the bisection precision
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Set the method from its textual name, rejecting unknown names.
    pub fn with_method_name(mut self, method: &str) -> FracDiffResult<Self> {
        self.method = method.parse()?;
        Ok(self)
    }

    /// Apply a fixed order to every column
    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    /// Include orders in the output
    pub fn with_return_order(mut self, return_order: bool) -> Self {
        self.return_order = return_order;
        self
    }

    /// Toggle column renaming
    pub fn with_rename(mut self, rename: bool) -> Self {
        self.rename = rename;
        self
    }

    /// Set the kernel length
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the search bracket upper bound
    pub fn with_upper_bound(mut self, upper_bound: f64) -> Self {
        self.upper_bound = upper_bound;
        self
    }

    /// Set the stationarity test significance level
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check every option before any computation starts.
    ///
    /// A fixed order must be strictly positive; `precision` and `upper_bound`
    /// must be finite and positive; `tolerance` lies in `(0, 1)`.
    pub fn validate(&self) -> FracDiffResult<()> {
        if let Some(order) = self.order {
            validate_positive(order, "order")?;
        }
        validate_positive(self.precision, "precision")?;
        validate_positive(self.upper_bound, "upper_bound")?;
        validate_parameter(self.tolerance, 0.0, 1.0, "tolerance")?;
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
