//! Fractional differencing of single series and multi-column frames.
//!
//! [`FractionalDifferencer`] ties together the configuration, the
//! stationarity oracle and the diagnostics observer. Each column is processed
//! independently: either with the configured fixed order, or with its own
//! adaptive order search. Columns run in parallel when the `parallel` feature
//! is enabled; the outcome does not depend on scheduling.

use crate::config::{DifferencingConfig, STATIONARIZED_SUFFIX};
use crate::diagnostics::{DifferencingEvent, DifferencingObserver, LogObserver};
use crate::errors::{FracDiffError, FracDiffResult};
use crate::fracdiff::diff;
use crate::search::{auto_search, SearchBounds};
use crate::series::{FrameColumn, OrderedSeries, SeriesFrame, SeriesKind};
use crate::stationarity::{AdfOracle, StationarityOracle};
use std::fmt;
use std::sync::Arc;

/// Data accepted by [`FractionalDifferencer::difference`].
#[derive(Debug, Clone, PartialEq)]
pub enum DifferencingInput {
    /// One labelled series
    Series(OrderedSeries),
    /// Columns sharing one index
    Frame(SeriesFrame),
}

impl From<OrderedSeries> for DifferencingInput {
    fn from(series: OrderedSeries) -> Self {
        DifferencingInput::Series(series)
    }
}

impl From<SeriesFrame> for DifferencingInput {
    fn from(frame: SeriesFrame) -> Self {
        DifferencingInput::Frame(frame)
    }
}

/// Differenced data, same shape as the input.
#[derive(Debug, Clone, PartialEq)]
pub enum DifferencedData {
    /// Differenced single series, name unchanged
    Series(OrderedSeries),
    /// Differenced frame, columns possibly renamed
    Frame(SeriesFrame),
}

impl DifferencedData {
    /// The series, if the input was a series
    pub fn as_series(&self) -> Option<&OrderedSeries> {
        match self {
            DifferencedData::Series(s) => Some(s),
            DifferencedData::Frame(_) => None,
        }
    }

    /// The frame, if the input was a frame
    pub fn as_frame(&self) -> Option<&SeriesFrame> {
        match self {
            DifferencedData::Frame(f) => Some(f),
            DifferencedData::Series(_) => None,
        }
    }

    /// Consume into the series, if the input was a series
    pub fn into_series(self) -> Option<OrderedSeries> {
        match self {
            DifferencedData::Series(s) => Some(s),
            DifferencedData::Frame(_) => None,
        }
    }

    /// Consume into the frame, if the input was a frame
    pub fn into_frame(self) -> Option<SeriesFrame> {
        match self {
            DifferencedData::Frame(f) => Some(f),
            DifferencedData::Series(_) => None,
        }
    }
}

/// Result of a differencing call.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencingOutput {
    /// Differenced data
    pub data: DifferencedData,
    /// One order per column in column order, present iff `return_order` was set
    pub orders: Option<Vec<f64>>,
}

/// Fractional differencing engine.
///
/// # Example
/// ```rust
/// use fracdiff_finance::{DifferencingConfig, FractionalDifferencer, OrderedSeries};
///
/// let series = OrderedSeries::new("x", vec![1.0, 3.0, 6.0, 10.0, 15.0]);
/// let differencer = FractionalDifferencer::with_config(
///     DifferencingConfig::default().with_order(1.0).with_return_order(true),
/// )
/// .unwrap();
///
/// let output = differencer.difference(series).unwrap();
/// assert_eq!(output.orders, Some(vec![1.0]));
/// assert_eq!(&output.data.as_series().unwrap().values()[1..], &[2.0, 3.0, 4.0, 5.0]);
/// ```
#[derive(Clone)]
pub struct FractionalDifferencer {
    config: DifferencingConfig,
    oracle: Arc<dyn StationarityOracle>,
    observer: Arc<dyn DifferencingObserver>,
}

impl fmt::Debug for FractionalDifferencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FractionalDifferencer")
            .field("config", &self.config)
            .field("oracle", &self.oracle.name())
            .finish()
    }
}

impl Default for FractionalDifferencer {
    fn default() -> Self {
        Self::new()
    }
}

impl FractionalDifferencer {
    /// Default configuration, ADF oracle at 5%, events forwarded to `log`
    pub fn new() -> Self {
        Self {
            config: DifferencingConfig::default(),
            oracle: Arc::new(AdfOracle::default()),
            observer: Arc::new(LogObserver),
        }
    }

    /// Validated configuration; the ADF oracle uses `config.tolerance`.
    pub fn with_config(config: DifferencingConfig) -> FracDiffResult<Self> {
        config.validate()?;
        let oracle = AdfOracle::new(config.tolerance)?;
        Ok(Self {
            config,
            oracle: Arc::new(oracle),
            observer: Arc::new(LogObserver),
        })
    }

    /// Replace the stationarity oracle. `config.tolerance` no longer applies.
    pub fn with_oracle(mut self, oracle: Arc<dyn StationarityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replace the diagnostics observer
    pub fn with_observer(mut self, observer: Arc<dyn DifferencingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &DifferencingConfig {
        &self.config
    }

    /// Difference a series or every column of a frame.
    ///
    /// Configuration errors are reported before any column is touched. For a
    /// frame, every column is evaluated and the first failure in column order
    /// is returned as [`FracDiffError::ColumnFailed`]; no partial result is
    /// produced.
    pub fn difference(&self, input: impl Into<DifferencingInput>) -> FracDiffResult<DifferencingOutput> {
        self.config.validate()?;

        match input.into() {
            DifferencingInput::Series(series) => {
                let (values, order) = self.difference_column(series.name(), series.values())?;
                let data = series.derive(
                    series.name().to_string(),
                    SeriesKind::FractionallyDifferenced,
                    values,
                );
                Ok(DifferencingOutput {
                    data: DifferencedData::Series(data),
                    orders: self.config.return_order.then(|| vec![order]),
                })
            }
            DifferencingInput::Frame(frame) => {
                let (frame, orders) = self.difference_frame(&frame)?;
                Ok(DifferencingOutput {
                    data: DifferencedData::Frame(frame),
                    orders: self.config.return_order.then_some(orders),
                })
            }
        }
    }

    fn difference_frame(&self, frame: &SeriesFrame) -> FracDiffResult<(SeriesFrame, Vec<f64>)> {
        log::debug!(
            "Differencing {} columns x {} rows ({})",
            frame.ncols(),
            frame.nrows(),
            match self.config.order {
                Some(order) => format!("fixed order {}", order),
                None => format!("search with {}", self.oracle.name()),
            }
        );

        #[cfg(feature = "parallel")]
        let results: Vec<FracDiffResult<(Vec<f64>, f64)>> = {
            use rayon::prelude::*;
            frame
                .columns()
                .par_iter()
                .map(|column| self.difference_column(&column.name, &column.values))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: Vec<FracDiffResult<(Vec<f64>, f64)>> = frame
            .columns()
            .iter()
            .map(|column| self.difference_column(&column.name, &column.values))
            .collect();

        let mut columns = Vec::with_capacity(frame.ncols());
        let mut orders = Vec::with_capacity(frame.ncols());
        for (column, result) in frame.columns().iter().zip(results) {
            let (values, order) = result.map_err(|e| FracDiffError::ColumnFailed {
                column: column.name.clone(),
                source: Box::new(e),
            })?;
            let name = if self.config.rename {
                format!("{}{}", column.name, STATIONARIZED_SUFFIX)
            } else {
                column.name.clone()
            };
            columns.push(FrameColumn::new(name, values).with_kind(SeriesKind::FractionallyDifferenced));
            orders.push(order);
        }

        Ok((SeriesFrame::new(frame.index().clone(), columns)?, orders))
    }

    fn difference_column(&self, column: &str, values: &[f64]) -> FracDiffResult<(Vec<f64>, f64)> {
        let result = match self.config.order {
            Some(order) => diff(values, order, self.config.window_size).map(|v| (v, order)),
            None => {
                let bounds = SearchBounds {
                    precision: self.config.precision,
                    upper_bound: self.config.upper_bound,
                    window_size: self.config.window_size,
                };
                auto_search(values, bounds, self.oracle.as_ref(), self.observer.as_ref(), column)
                    .map(|outcome| (outcome.values, outcome.order))
            }
        };

        match &result {
            Ok((_, order)) => self.observer.on_event(&DifferencingEvent::OrderSelected {
                column: column.to_string(),
                order: *order,
            }),
            Err(e) => self.observer.on_event(&DifferencingEvent::ColumnFailed {
                column: column.to_string(),
                reason: e.to_string(),
            }),
        }
        result
    }
}

impl SeriesFrame {
    /// Difference every column with `config`, keeping the column names.
    pub fn stationarize(&self, config: &DifferencingConfig) -> FracDiffResult<SeriesFrame> {
        let differencer = FractionalDifferencer::with_config(config.clone().with_rename(false))?;
        let (frame, _) = differencer.difference_frame(self)?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingObserver;
    use crate::series::SeriesIndex;

    struct LastValueOracle;

    /// Stationary iff the last value is non-positive; errors on empty input.
    impl StationarityOracle for LastValueOracle {
        fn name(&self) -> &str {
            "last-value"
        }

        fn is_stationary(&self, values: &[f64]) -> FracDiffResult<bool> {
            match values.last() {
                Some(v) => Ok(*v <= 0.0),
                None => Err(FracDiffError::OracleEvaluation {
                    test_name: "last-value".to_string(),
                    reason: "empty".to_string(),
                }),
            }
        }
    }

    fn frame() -> SeriesFrame {
        SeriesFrame::from_columns(vec![
            FrameColumn::new("a", vec![1.0, 3.0, 6.0, 10.0]),
            FrameColumn::new("b", vec![2.0, 2.5, 2.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fixed_order_frame_is_renamed() {
        let differencer = FractionalDifferencer::with_config(
            DifferencingConfig::default().with_order(1.0).with_return_order(true),
        )
        .unwrap();
        let output = differencer.difference(frame()).unwrap();
        assert_eq!(output.orders, Some(vec![1.0, 1.0]));

        let out = output.data.into_frame().unwrap();
        assert_eq!(out.column_names(), vec!["a_stationarized", "b_stationarized"]);
        assert_eq!(out.shape(), (4, 2));
        assert_eq!(out.columns()[1].kind, SeriesKind::FractionallyDifferenced);
        assert_eq!(&out.columns()[0].values[1..], &[2.0, 3.0, 4.0]);
        assert_eq!(&out.columns()[1].values[1..], &[0.5, -0.5, -1.0]);
    }

    #[test]
    fn test_orders_omitted_unless_requested() {
        let differencer =
            FractionalDifferencer::with_config(DifferencingConfig::default().with_order(0.5)).unwrap();
        let output = differencer.difference(frame()).unwrap();
        assert!(output.orders.is_none());
    }

    #[test]
    fn test_series_keeps_its_name() {
        let series = OrderedSeries::with_index(
            "close",
            SeriesIndex::daily(0, 3),
            vec![1.0, 2.0, 4.0],
        )
        .unwrap();
        let differencer =
            FractionalDifferencer::with_config(DifferencingConfig::default().with_order(1.0)).unwrap();
        let out = differencer.difference(series.clone()).unwrap().data.into_series().unwrap();
        assert_eq!(out.name(), "close");
        assert_eq!(out.index(), series.index());
    }

    #[test]
    fn test_search_runs_per_column() {
        let observer = Arc::new(RecordingObserver::new());
        let differencer = FractionalDifferencer::with_config(
            DifferencingConfig::default()
                .with_return_order(true)
                .with_upper_bound(2.0),
        )
        .unwrap()
        .with_oracle(Arc::new(LastValueOracle))
        .with_observer(observer.clone());

        // "b" is only accepted at order 1, "c" is accepted as is
        let input = SeriesFrame::from_columns(vec![
            FrameColumn::new("b", vec![1.0, 2.0, 3.0, 4.0, 3.0]),
            FrameColumn::new("c", vec![1.0, -1.0, 1.0, -1.0, -1.0]),
        ])
        .unwrap();
        let output = differencer.difference(input).unwrap();
        let orders = output.orders.unwrap();
        assert_eq!(orders, vec![1.0, 0.0]);

        assert!(observer
            .events_for("c")
            .contains(&DifferencingEvent::AlreadyStationary {
                column: "c".to_string()
            }));
        assert!(observer
            .events_for("b")
            .iter()
            .any(|e| matches!(e, DifferencingEvent::BisectionStep { .. })));
    }

    #[test]
    fn test_first_failing_column_is_reported() {
        let differencer = FractionalDifferencer::new().with_oracle(Arc::new(LastValueOracle));
        let input = SeriesFrame::from_columns(vec![
            FrameColumn::new("ok", vec![1.0, -1.0]),
            FrameColumn::new("bad_1", vec![1.0, 2.0]),
            FrameColumn::new("bad_2", vec![1.0, 3.0]),
        ])
        .unwrap();
        // window_size 10 leaves only missing values, which never end <= 0
        let err = differencer.difference(input).unwrap_err();
        match err {
            FracDiffError::ColumnFailed { ref column, ref source } => {
                assert_eq!(column, "bad_1");
                assert!(matches!(**source, FracDiffError::NoStationaryOrderFound { .. }));
            }
            other => panic!("expected ColumnFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_configuration_checked_first() {
        let mut differencer = FractionalDifferencer::new().with_oracle(Arc::new(LastValueOracle));
        differencer.config.precision = 0.0;
        let err = differencer.difference(frame()).unwrap_err();
        assert!(matches!(err, FracDiffError::InvalidConfiguration { .. }));

        assert!(FractionalDifferencer::with_config(DifferencingConfig::default().with_order(-1.0)).is_err());
    }

    #[test]
    fn test_stationarize_never_renames() {
        let out = frame()
            .stationarize(&DifferencingConfig::default().with_order(1.0))
            .unwrap();
        assert_eq!(out.column_names(), vec!["a", "b"]);
    }
}
