//! Principal component projection of a frame.
//!
//! Columns are standardised, their sample covariance is decomposed with
//! `nalgebra::SymmetricEigen`, and the standardised data is projected onto the
//! leading eigenvectors. Components are named `PC1`, `PC2`, ... in decreasing
//! order of explained variance and keep the frame's index.

use crate::errors::{FracDiffError, FracDiffResult};
use crate::math_utils::float_total_cmp;
use crate::series::{FrameColumn, SeriesFrame};
use nalgebra::{DMatrix, SymmetricEigen};

/// Principal component analysis with a fixed number of retained components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pca {
    order: usize,
}

/// Projection result
#[derive(Debug, Clone, PartialEq)]
pub struct PcaResult {
    /// Projected data, columns `PC1..PCk`
    pub components: SeriesFrame,
    /// Covariance eigenvalue of each retained component
    pub explained_variance: Vec<f64>,
    /// Share of total variance of each retained component
    pub explained_variance_ratio: Vec<f64>,
}

impl Default for Pca {
    fn default() -> Self {
        Self { order: 10 }
    }
}

impl Pca {
    /// Keep at most `order` components
    pub fn new(order: usize) -> FracDiffResult<Self> {
        if order == 0 {
            return Err(FracDiffError::InvalidConfiguration {
                parameter: "order".to_string(),
                value: 0.0,
                constraint: "must be >= 1".to_string(),
            });
        }
        Ok(Self { order })
    }

    /// Requested number of components
    pub fn order(&self) -> usize {
        self.order
    }

    /// Project `frame` onto its `min(order, ncols)` leading components.
    ///
    /// The covariance uses rows without missing values; rows with a missing
    /// value project to missing.
    pub fn fit_transform(&self, frame: &SeriesFrame) -> FracDiffResult<PcaResult> {
        let standardised = frame.normalize()?;
        let (nrows, ncols) = standardised.shape();
        let k = self.order.min(ncols);

        let complete: Vec<usize> = (0..nrows)
            .filter(|&r| standardised.columns().iter().all(|c| !c.values[r].is_nan()))
            .collect();
        if complete.len() < 2 {
            return Err(FracDiffError::InsufficientData {
                required: 2,
                actual: complete.len(),
            });
        }

        let covariance = covariance_matrix(&standardised, &complete);
        let eigen = SymmetricEigen::new(covariance);

        let mut ranking: Vec<usize> = (0..ncols).collect();
        ranking.sort_by(|&a, &b| float_total_cmp(&eigen.eigenvalues[b], &eigen.eigenvalues[a]));

        let total: f64 = eigen.eigenvalues.iter().sum();
        let mut columns = Vec::with_capacity(k);
        let mut explained_variance = Vec::with_capacity(k);
        for (rank, &idx) in ranking.iter().take(k).enumerate() {
            let mut loading: Vec<f64> = eigen.eigenvectors.column(idx).iter().copied().collect();
            // Eigenvector sign is arbitrary; fix it so the largest loading is positive
            let pivot = loading
                .iter()
                .copied()
                .max_by(|a, b| float_total_cmp(&a.abs(), &b.abs()))
                .unwrap_or(1.0);
            if pivot < 0.0 {
                loading.iter_mut().for_each(|w| *w = -*w);
            }

            let projected = (0..nrows)
                .map(|r| {
                    standardised
                        .columns()
                        .iter()
                        .zip(&loading)
                        .map(|(c, w)| c.values[r] * w)
                        .sum()
                })
                .collect();
            columns.push(FrameColumn::new(format!("PC{}", rank + 1), projected));
            explained_variance.push(eigen.eigenvalues[idx]);
        }

        log::debug!(
            "PCA kept {} of {} components ({:.1}% of variance)",
            k,
            ncols,
            100.0 * explained_variance.iter().sum::<f64>() / total
        );

        Ok(PcaResult {
            components: SeriesFrame::new(frame.index().clone(), columns)?,
            explained_variance_ratio: explained_variance.iter().map(|v| v / total).collect(),
            explained_variance,
        })
    }
}

fn covariance_matrix(frame: &SeriesFrame, rows: &[usize]) -> DMatrix<f64> {
    let ncols = frame.ncols();
    let n = rows.len() as f64;
    let means: Vec<f64> = frame
        .columns()
        .iter()
        .map(|c| rows.iter().map(|&r| c.values[r]).sum::<f64>() / n)
        .collect();

    DMatrix::from_fn(ncols, ncols, |i, j| {
        let ci = &frame.columns()[i].values;
        let cj = &frame.columns()[j].values;
        rows.iter()
            .map(|&r| (ci[r] - means[i]) * (cj[r] - means[j]))
            .sum::<f64>()
            / (n - 1.0)
    })
}
