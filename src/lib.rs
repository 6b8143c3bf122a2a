//! # Multifractal Detrended Fluctuation Analysis
//!
//! MF-DFA estimator for one-dimensional time series, with generalized Hurst
//! exponents, mass exponents and the singularity spectrum.
//!
//! The crate quantifies long-range correlation and multifractal structure in
//! empirical signals. The estimator builds the profile of a series, cuts it
//! into segments for each window length (lag), removes a local trend from
//! every segment and aggregates the residual variances into a q-weighted
//! fluctuation function F_q(s). The log-log slopes of F_q(s) give h(q), from
//! which τ(q) and the (α, f(α)) spectrum follow.
//!
//! ## Key Features
//!
//! - **Detrending**: local polynomials of any order, no detrending (order 0),
//!   or removal of externally supplied intrinsic components from the profile
//! - **Tilings**: forward and backward non-overlapping segments, or
//!   overlapping windows with a configurable stride
//! - **Diagnostics**: per-lag standard deviation of the q-powers and the
//!   extrema spread of segment variances
//! - **Spectrum**: h(q), τ(q), α(q), f(α), spectrum width and asymmetry
//!
//! ## Quick Start
//!
//! ```rust
//! use mfdfa::{mfdfa, FitWindow, MfdfaConfig, MultifractalSpectrum};
//! use mfdfa::math_utils::log_spaced_lags;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Deterministic irregular test signal: folded ramp plus a sine, so no
//!     // stretch of the profile is an exact polynomial
//!     let series: Vec<f64> = (0..4096)
//!         .map(|i| ((i * 7919) % 1009) as f64 / 1009.0 - 0.5 + 0.3 * (i as f64 * 0.37).sin())
//!         .collect();
//!
//!     let lags = log_spaced_lags(series.len(), 20)?;
//!     let q = [-3.0, -2.0, -1.0, 1.0, 2.0, 3.0];
//!
//!     let analysis = mfdfa(&series, &lags, &q, &MfdfaConfig::polynomial(2))?;
//!     let spectrum = MultifractalSpectrum::from_analysis(&analysis, FitWindow::default())?;
//!
//!     for (q, h) in spectrum.q.iter().zip(&spectrum.hurst) {
//!         println!("h({}) = {:.3}", q, h);
//!     }
//!     println!("spectrum width = {:.3}", spectrum.spectrum_width());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! [`MfdfaAnalyzer`] orchestrates the pipeline and owns the optional
//! [`ModeDecomposer`]; [`mfdfa`] is the shorthand without one. The stages are
//! public on their own: [`profile`], [`segmentation`], [`detrending`],
//! [`moments`] and [`spectrum`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod math_utils;
pub mod series;

// Estimator stages
pub mod decomposition;
pub mod detrending;
pub mod fluctuation;
pub mod moments;
pub mod profile;
pub mod segmentation;
pub mod spectrum;

// Re-exports for convenience - main public API
pub use config::{DetrendMode, MfdfaConfig};
pub use errors::{MfdfaError, MfdfaResult};
pub use fluctuation::{mfdfa, FluctuationAnalysis, MfdfaAnalyzer};

// Estimator stage exports
pub use decomposition::{ModeDecomposer, PrecomputedModes};
pub use detrending::LocalDetrender;
pub use moments::TilingCombination;
pub use profile::build_profile;
pub use segmentation::{segment, SegmentBatch, Tiling};

// Spectrum exports
pub use spectrum::{
    hurst_exponents, scaling_exponents, singularity_spectrum, FitWindow, MultifractalSpectrum,
    SingularitySpectrum,
};

// Mathematical utilities exports
pub use math_utils::{
    float_ops::{approx_zero, safe_div},
    gradient, linear_fit, log_spaced_lags,
};
