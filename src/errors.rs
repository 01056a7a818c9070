//! Error types and validation functions for fractional differencing.
//!
//! Every fallible operation in the crate returns [`FracDiffResult`]. Configuration
//! problems are reported before any computation starts; numerical and statistical
//! failures are propagated to the caller unchanged.

use thiserror::Error;

/// Error taxonomy for differencing, stationarity testing and indicator computation.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum FracDiffError {
    /// A configuration value is outside its admissible range.
    #[error("Invalid configuration: {parameter} = {value}, expected {constraint}")]
    InvalidConfiguration {
        /// Parameter name
        parameter: String,
        /// Rejected value
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// The requested differencing method is not recognised.
    #[error("Unsupported differencing method '{method}', expected one of: fixed-window")]
    UnsupportedMethod {
        /// Method name supplied by the caller
        method: String,
    },

    /// Input is neither a single ordered series nor a rectangular frame.
    #[error("Unsupported input shape: {reason}")]
    UnsupportedInputShape {
        /// Why the input was rejected
        reason: String,
    },

    /// The adaptive search never observed a stationary candidate.
    #[error("No stationary differencing order found in [0, {upper_bound}) at precision {precision}")]
    NoStationaryOrderFound {
        /// Upper bound of the searched bracket
        upper_bound: f64,
        /// Bisection resolution
        precision: f64,
    },

    /// The stationarity test could not be computed on the supplied series.
    #[error("Stationarity test {test_name} could not be evaluated: {reason}")]
    OracleEvaluation {
        /// Name of the failing test
        test_name: String,
        /// Why the test failed
        reason: String,
    },

    /// Insufficient data for the requested computation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Numerical computation error due to instability or a singular system.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },

    /// A column of a multi-column input failed; the whole call is aborted.
    #[error("Column '{column}' failed: {source}")]
    ColumnFailed {
        /// Label of the failing column
        column: String,
        /// Underlying failure
        #[source]
        source: Box<FracDiffError>,
    },
}

impl FracDiffError {
    /// Returns the innermost error, unwrapping any [`FracDiffError::ColumnFailed`] layers.
    pub fn root_cause(&self) -> &FracDiffError {
        match self {
            FracDiffError::ColumnFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True for errors raised by configuration validation.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.root_cause(),
            FracDiffError::InvalidConfiguration { .. } | FracDiffError::UnsupportedMethod { .. }
        )
    }
}

/// Result type for fractional differencing operations.
pub type FracDiffResult<T> = Result<T, FracDiffError>;

/// Validates that data has sufficient length.
///
/// # Example
/// ```rust
/// use fracdiff_finance::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length(data: &[f64], min_required: usize) -> FracDiffResult<()> {
    if data.len() < min_required {
        Err(FracDiffError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter lies strictly inside the open interval `(min, max)`.
///
/// # Example
/// ```rust
/// use fracdiff_finance::errors::validate_parameter;
///
/// assert!(validate_parameter(0.05, 0.0, 1.0, "tolerance").is_ok());
/// assert!(validate_parameter(1.0, 0.0, 1.0, "tolerance").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> FracDiffResult<()> {
    if min.is_nan() || max.is_nan() || min >= max {
        return Err(FracDiffError::NumericalError {
            reason: format!("Invalid bounds for parameter {}: min={}, max={}", name, min, max),
            operation: None,
        });
    }

    if value > min && value < max {
        Ok(())
    } else {
        Err(FracDiffError::InvalidConfiguration {
            parameter: name.to_string(),
            value,
            constraint: format!("({}, {})", min, max),
        })
    }
}

/// Validates that a parameter is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> FracDiffResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FracDiffError::InvalidConfiguration {
            parameter: name.to_string(),
            value,
            constraint: "must be finite and > 0".to_string(),
        })
    }
}
