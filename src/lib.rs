//! # Fractional Differencing for Financial Time Series
//!
//! Makes non-stationary series stationary while keeping as much memory as
//! possible, by applying the smallest fractional differencing order that passes
//! a unit-root test.
//!
//! ## Key Features
//!
//! - **Fixed-window operator**: truncated binomial expansion of `(1 - B)^d`
//! - **Adaptive order search**: bisection on `d` driven by a stationarity oracle
//! - **ADF oracle**: Augmented Dickey-Fuller test with automatic lag selection
//!   and MacKinnon p-values
//! - **Multi-column frames**: independent per-column orders, processed in
//!   parallel with the `parallel` feature
//! - **Diagnostics hook**: every bisection step is reported to a
//!   [`DifferencingObserver`](diagnostics::DifferencingObserver)
//! - **Risk indicators**: Sharpe, Sortino, Calmar, drawdown
//! - **PCA** and seeded **sample-data generators**
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fracdiff_finance::{
//!     generate_brownian_prices, BrownianConfig, DifferencingConfig, FractionalDifferencer,
//!     GeneratorConfig,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prices = generate_brownian_prices(
//!         &GeneratorConfig { length: 500, seed: Some(7) },
//!         &BrownianConfig { n_assets: 3, drift: 1e-3, volatility: 1e-2, ..Default::default() },
//!     )?;
//!
//!     let differencer = FractionalDifferencer::with_config(
//!         DifferencingConfig::default().with_precision(0.01).with_return_order(true),
//!     )?;
//!     let output = differencer.difference(prices)?;
//!
//!     for order in output.orders.unwrap_or_default() {
//!         println!("d = {:.3}", order);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! [`FractionalDifferencer`] orchestrates the per-column work. The pieces it
//! combines are usable on their own: [`fracdiff::diff`] applies a given order,
//! [`search::auto_search`] finds one, and any
//! [`StationarityOracle`](stationarity::StationarityOracle) can replace the ADF
//! test.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod linear_algebra;
pub mod math_utils;
pub mod series;

// Differencing
pub mod differencer;
pub mod diagnostics;
pub mod fracdiff;
pub mod search;
pub mod stationarity;

// Analysis helpers
pub mod generators;
pub mod pca;
pub mod risk;

pub use config::{DifferencingConfig, DifferencingMethod};
pub use errors::{FracDiffError, FracDiffResult};
pub use series::{FrameColumn, OrderedSeries, SeriesFrame, SeriesIndex, SeriesKind};

pub use differencer::{DifferencedData, DifferencingInput, DifferencingOutput, FractionalDifferencer};
pub use diagnostics::{DifferencingEvent, DifferencingObserver, LogObserver, NullObserver, RecordingObserver};
pub use fracdiff::{diff, diff_series, fractional_weights};
pub use search::{auto_search, SearchBounds, SearchOutcome};
pub use stationarity::{
    augmented_dickey_fuller, augmented_dickey_fuller_with_config, is_stationary,
    mackinnon_critical_values, mackinnon_p_value, AdfConfig, AdfOracle, AdfTestResult,
    LagCriterion, StationarityOracle,
};

pub use generators::{
    generate_benchmark_series, generate_brownian_prices, generate_brownian_returns,
    BenchmarkSeriesType, BrownianConfig, GeneratorConfig,
};
pub use pca::{Pca, PcaResult};
pub use risk::{RiskIndicators, RiskParams};
