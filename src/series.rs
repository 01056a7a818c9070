//! Ordered series and rectangular frames.
//!
//! [`OrderedSeries`] is a named, tagged sequence of observations on a strictly
//! increasing key. [`SeriesFrame`] is a set of equally long columns sharing one
//! index. Missing observations are `NaN`. Transforms never reorder or drop keys;
//! they only turn leading positions into missing values.

use crate::errors::{FracDiffError, FracDiffResult};
use crate::math_utils::{drop_missing, mean, sample_std};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Seconds in one UTC day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Key of an ordered series
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeriesIndex {
    /// Positions `0..len`
    Positional(usize),
    /// Strictly increasing UNIX timestamps in seconds
    Timestamps(Vec<i64>),
}

impl SeriesIndex {
    /// Positional index of the given length
    pub fn positional(len: usize) -> Self {
        SeriesIndex::Positional(len)
    }

    /// Timestamp index; keys must be strictly increasing.
    pub fn timestamps(keys: Vec<i64>) -> FracDiffResult<Self> {
        if let Some(pos) = keys.windows(2).position(|w| w[1] <= w[0]) {
            return Err(FracDiffError::UnsupportedInputShape {
                reason: format!(
                    "timestamp index is not strictly increasing at position {} ({} -> {})",
                    pos + 1,
                    keys[pos],
                    keys[pos + 1]
                ),
            });
        }
        Ok(SeriesIndex::Timestamps(keys))
    }

    /// Daily timestamps starting at `start` (seconds)
    pub fn daily(start: i64, len: usize) -> Self {
        SeriesIndex::Timestamps((0..len as i64).map(|i| start + i * SECONDS_PER_DAY).collect())
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        match self {
            SeriesIndex::Positional(len) => *len,
            SeriesIndex::Timestamps(keys) => keys.len(),
        }
    }

    /// True when the index holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for timestamp indices
    pub fn is_temporal(&self) -> bool {
        matches!(self, SeriesIndex::Timestamps(_))
    }

    /// Key at position `i`
    pub fn key(&self, i: usize) -> Option<i64> {
        match self {
            SeriesIndex::Positional(len) => (i < *len).then_some(i as i64),
            SeriesIndex::Timestamps(keys) => keys.get(i).copied(),
        }
    }

    /// Timestamps, or `None` for a positional index
    pub fn as_timestamps(&self) -> Option<&[i64]> {
        match self {
            SeriesIndex::Positional(_) => None,
            SeriesIndex::Timestamps(keys) => Some(keys),
        }
    }
}

/// Semantic tag of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeriesKind {
    /// Price levels
    Price,
    /// Simple returns `p_t / p_{t-1} - 1`
    Return,
    /// Log returns `ln(p_t / p_{t-1})`
    LogReturn,
    /// Derived indicator values
    Indicator,
    /// Output of the fractional differencing operator
    FractionallyDifferenced,
    /// Volatility estimates
    Volatility,
    /// No declared semantics
    #[default]
    Unspecified,
}

/// A named, tagged sequence of observations on an ordered key
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderedSeries {
    name: String,
    kind: SeriesKind,
    index: SeriesIndex,
    values: Vec<f64>,
}

impl OrderedSeries {
    /// Series on a positional index
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind: SeriesKind::Unspecified,
            index: SeriesIndex::positional(values.len()),
            values,
        }
    }

    /// Series on an explicit index; lengths must agree.
    pub fn with_index(
        name: impl Into<String>,
        index: SeriesIndex,
        values: Vec<f64>,
    ) -> FracDiffResult<Self> {
        if index.len() != values.len() {
            return Err(FracDiffError::UnsupportedInputShape {
                reason: format!(
                    "index has {} keys but series has {} values",
                    index.len(),
                    values.len()
                ),
            });
        }
        Ok(Self {
            name: name.into(),
            kind: SeriesKind::Unspecified,
            index,
            values,
        })
    }

    /// Tag the series
    pub fn with_kind(mut self, kind: SeriesKind) -> Self {
        self.kind = kind;
        self
    }

    /// Series name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semantic tag
    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    /// Key index
    pub fn index(&self) -> &SeriesIndex {
        &self.index
    }

    /// Observations, `NaN` for missing
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the series holds no positions
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the series, returning its values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// New series on the same index with replaced values.
    pub(crate) fn derive(&self, name: String, kind: SeriesKind, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.index.len());
        Self {
            name,
            kind,
            index: self.index.clone(),
            values,
        }
    }
}

/// One column of a [`SeriesFrame`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameColumn {
    /// Column label
    pub name: String,
    /// Semantic tag
    pub kind: SeriesKind,
    /// Observations, `NaN` for missing
    pub values: Vec<f64>,
}

impl FrameColumn {
    /// Untagged column
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind: SeriesKind::Unspecified,
            values,
        }
    }

    /// Tag the column
    pub fn with_kind(mut self, kind: SeriesKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Rectangular collection of named columns on a shared index
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesFrame {
    index: SeriesIndex,
    columns: Vec<FrameColumn>,
}

impl SeriesFrame {
    /// Build a frame, rejecting empty, ragged or duplicate-labelled input.
    pub fn new(index: SeriesIndex, columns: Vec<FrameColumn>) -> FracDiffResult<Self> {
        if columns.is_empty() {
            return Err(FracDiffError::UnsupportedInputShape {
                reason: "frame has no columns".to_string(),
            });
        }

        let nrows = index.len();
        if let Some(col) = columns.iter().find(|c| c.values.len() != nrows) {
            return Err(FracDiffError::UnsupportedInputShape {
                reason: format!(
                    "column '{}' has {} values but the index has {} keys",
                    col.name,
                    col.values.len(),
                    nrows
                ),
            });
        }

        {
            let mut seen = HashSet::with_capacity(columns.len());
            if let Some(col) = columns.iter().find(|c| !seen.insert(c.name.as_str())) {
                return Err(FracDiffError::UnsupportedInputShape {
                    reason: format!("duplicate column label '{}'", col.name),
                });
            }
        }

        Ok(Self { index, columns })
    }

    /// Frame on a positional index
    pub fn from_columns(columns: Vec<FrameColumn>) -> FracDiffResult<Self> {
        let nrows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        Self::new(SeriesIndex::positional(nrows), columns)
    }

    /// Frame from series sharing one index
    pub fn from_series(series: Vec<OrderedSeries>) -> FracDiffResult<Self> {
        let index = match series.first() {
            Some(first) => first.index.clone(),
            None => {
                return Err(FracDiffError::UnsupportedInputShape {
                    reason: "frame has no columns".to_string(),
                })
            }
        };
        if let Some(other) = series.iter().find(|s| s.index != index) {
            return Err(FracDiffError::UnsupportedInputShape {
                reason: format!("series '{}' does not share the frame index", other.name),
            });
        }
        let columns = series
            .into_iter()
            .map(|s| FrameColumn {
                name: s.name,
                kind: s.kind,
                values: s.values,
            })
            .collect();
        Self::new(index, columns)
    }

    /// Side-by-side concatenation of frames sharing an index
    pub fn concat(frames: &[SeriesFrame]) -> FracDiffResult<Self> {
        let index = match frames.first() {
            Some(first) => first.index.clone(),
            None => {
                return Err(FracDiffError::UnsupportedInputShape {
                    reason: "nothing to concatenate".to_string(),
                })
            }
        };
        if frames.iter().any(|f| f.index != index) {
            return Err(FracDiffError::UnsupportedInputShape {
                reason: "frames do not share an index".to_string(),
            });
        }
        let columns = frames.iter().flat_map(|f| f.columns.iter().cloned()).collect();
        Self::new(index, columns)
    }

    /// Shared index
    pub fn index(&self) -> &SeriesIndex {
        &self.index
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    /// Column labels in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Raw columns in order
    pub fn columns(&self) -> &[FrameColumn] {
        &self.columns
    }

    /// Column `i` as an ordered series
    pub fn column(&self, i: usize) -> Option<OrderedSeries> {
        self.columns.get(i).map(|c| OrderedSeries {
            name: c.name.clone(),
            kind: c.kind,
            index: self.index.clone(),
            values: c.values.clone(),
        })
    }

    /// Column with the given label as an ordered series
    pub fn column_by_name(&self, name: &str) -> Option<OrderedSeries> {
        let i = self.columns.iter().position(|c| c.name == name)?;
        self.column(i)
    }

    /// Z-score every column with its mean and sample standard deviation.
    ///
    /// Missing values are ignored by the moments and stay missing.
    pub fn normalize(&self) -> FracDiffResult<SeriesFrame> {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let present = drop_missing(&c.values);
                let m = mean(&present);
                let sd = sample_std(&present)?;
                if sd == 0.0 {
                    return Err(FracDiffError::NumericalError {
                        reason: format!("column '{}' has zero variance", c.name),
                        operation: Some("normalize".to_string()),
                    });
                }
                Ok(FrameColumn {
                    name: c.name.clone(),
                    kind: c.kind,
                    values: c.values.iter().map(|v| (v - m) / sd).collect(),
                })
            })
            .collect::<FracDiffResult<Vec<_>>>()?;
        Self::new(self.index.clone(), columns)
    }
}
