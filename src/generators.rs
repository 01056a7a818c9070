//! Synthetic series for examples, tests and benchmarks.
//!
//! - **Benchmark series**: Gaussian white noise and its cumulative random walk
//! - **Geometric Brownian prices**: `s0 · exp(cumsum(N(μ·dt, σ·√dt)))` per asset
//!   on a daily timestamp index starting 2020-01-01
//! - **Brownian returns**: simple returns of such a price path
//!
//! Every generator draws from its own `ChaCha20Rng`. A seeded configuration
//! reproduces the same data on every platform; an unseeded one is drawn from
//! OS entropy.

use crate::errors::{validate_positive, FracDiffError, FracDiffResult};
use crate::series::{FrameColumn, SeriesFrame, SeriesIndex, SeriesKind};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2020-01-01T00:00:00Z
pub const SAMPLE_START_TIMESTAMP: i64 = 1_577_836_800;

/// Length and reproducibility controls common to all generators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Number of generated observations
    pub length: usize,
    /// Random seed for reproducible generation
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 1000,
            seed: None,
        }
    }
}

/// Parameters of the geometric Brownian motion price model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrownianConfig {
    /// Number of independent assets (columns)
    pub n_assets: usize,
    /// Mean log increment per unit time
    pub drift: f64,
    /// Standard deviation of the log increment per unit time
    pub volatility: f64,
    /// Price before the first increment
    pub initial_price: f64,
    /// Time step
    pub dt: f64,
}

impl Default for BrownianConfig {
    fn default() -> Self {
        Self {
            n_assets: 1,
            drift: 0.0,
            volatility: 1.0,
            initial_price: 1.0,
            dt: 1.0,
        }
    }
}

/// Types of benchmark series available for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BenchmarkSeriesType {
    /// Independent standard normal draws
    WhiteNoise,
    /// Cumulative sum of white noise
    RandomWalk,
}

fn rng_for(config: &GeneratorConfig) -> ChaCha20Rng {
    match config.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

fn normal(mean: f64, std_dev: f64) -> FracDiffResult<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| FracDiffError::InvalidConfiguration {
        parameter: "volatility".to_string(),
        value: std_dev,
        constraint: format!("valid normal scale ({})", e),
    })
}

/// Generate a benchmark series of `config.length` points.
pub fn generate_benchmark_series(
    series_type: BenchmarkSeriesType,
    config: &GeneratorConfig,
) -> FracDiffResult<Vec<f64>> {
    let mut rng = rng_for(config);
    let dist = normal(0.0, 1.0)?;
    let noise = (0..config.length).map(|_| dist.sample(&mut rng));

    Ok(match series_type {
        BenchmarkSeriesType::WhiteNoise => noise.collect(),
        BenchmarkSeriesType::RandomWalk => noise
            .scan(0.0, |position, step| {
                *position += step;
                Some(*position)
            })
            .collect(),
    })
}

/// Cumulated log increments, `[period][asset]`.
fn log_paths(config: &GeneratorConfig, brownian: &BrownianConfig) -> FracDiffResult<Vec<Vec<f64>>> {
    if brownian.n_assets == 0 {
        return Err(FracDiffError::InvalidConfiguration {
            parameter: "n_assets".to_string(),
            value: 0.0,
            constraint: "must be >= 1".to_string(),
        });
    }
    validate_positive(brownian.dt, "dt")?;
    if !brownian.drift.is_finite() {
        return Err(FracDiffError::InvalidConfiguration {
            parameter: "drift".to_string(),
            value: brownian.drift,
            constraint: "must be finite".to_string(),
        });
    }
    let dist = normal(brownian.drift * brownian.dt, brownian.volatility * brownian.dt.sqrt())?;
    let mut rng = rng_for(config);

    // Row-major draws: all assets of period t before period t + 1
    let mut level = vec![0.0; brownian.n_assets];
    let mut paths = Vec::with_capacity(config.length);
    for _ in 0..config.length {
        for l in level.iter_mut() {
            *l += dist.sample(&mut rng);
        }
        paths.push(level.clone());
    }
    Ok(paths)
}

/// Geometric Brownian price paths, one column `asset_i` per asset.
pub fn generate_brownian_prices(
    config: &GeneratorConfig,
    brownian: &BrownianConfig,
) -> FracDiffResult<SeriesFrame> {
    validate_positive(brownian.initial_price, "initial_price")?;
    if config.length == 0 {
        return Err(FracDiffError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    let paths = log_paths(config, brownian)?;

    let columns = (0..brownian.n_assets)
        .map(|asset| {
            let prices = paths
                .iter()
                .map(|row| brownian.initial_price * row[asset].exp())
                .collect();
            FrameColumn::new(format!("asset_{}", asset), prices).with_kind(SeriesKind::Price)
        })
        .collect();

    SeriesFrame::new(SeriesIndex::daily(SAMPLE_START_TIMESTAMP, config.length), columns)
}

/// Simple returns `p_t / p_{t-1} - 1` of Brownian price paths, one column
/// `returns_asset_i` per asset and `config.length - 1` rows.
pub fn generate_brownian_returns(
    config: &GeneratorConfig,
    brownian: &BrownianConfig,
) -> FracDiffResult<SeriesFrame> {
    if config.length < 2 {
        return Err(FracDiffError::InsufficientData {
            required: 2,
            actual: config.length,
        });
    }
    let paths = log_paths(config, brownian)?;

    let columns = (0..brownian.n_assets)
        .map(|asset| {
            let returns = paths
                .windows(2)
                .map(|w| (w[1][asset] - w[0][asset]).exp() - 1.0)
                .collect();
            FrameColumn::new(format!("returns_asset_{}", asset), returns).with_kind(SeriesKind::Return)
        })
        .collect();

    SeriesFrame::new(SeriesIndex::daily(SAMPLE_START_TIMESTAMP, config.length - 1), columns)
}
