//! Scaling exponents and singularity spectrum from a fluctuation matrix.
//!
//! - h(q): slope of `ln F_q(s)` against `ln s` over a window of lags
//! - τ(q) = q·h(q) − 1
//! - α(q) = dτ/dq (central differences, one-sided at the ends)
//! - f(α) = q·α − τ
//!
//! A monofractal signal has constant h(q), linear τ(q) and a spectrum that
//! collapses to a single point; the width of α measures multifractality.

use crate::errors::{MfdfaError, MfdfaResult};
use crate::fluctuation::{prepare_q, FluctuationAnalysis};
use crate::math_utils::{gradient, linear_fit};
use log::debug;
use nalgebra::DMatrix;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Rows of the fluctuation matrix used in the log-log fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FitWindow {
    /// `[n_lags / 8, floor(n_lags / 1.5))`: skips the noisy short lags and
    /// the poorly sampled long ones
    #[default]
    MiddleBand,
    /// Every lag
    Full,
    /// Explicit half-open row range `[lower, upper)`
    Rows {
        /// First row included
        lower: usize,
        /// First row excluded
        upper: usize,
    },
}

impl FitWindow {
    /// Explicit half-open row range; needs at least two rows.
    pub fn new(lower: usize, upper: usize) -> MfdfaResult<Self> {
        if upper < lower + 2 {
            return Err(MfdfaError::InvalidParameter {
                parameter: "fit window".to_string(),
                value: upper as f64,
                constraint: format!("upper >= lower + 2 (lower = {})", lower),
            });
        }
        Ok(FitWindow::Rows { lower, upper })
    }

    /// Row range for a matrix with `n_lags` rows.
    pub fn resolve(&self, n_lags: usize) -> MfdfaResult<Range<usize>> {
        let (lower, upper) = match *self {
            FitWindow::MiddleBand => (n_lags / 8, (n_lags as f64 / 1.5).floor() as usize),
            FitWindow::Full => (0, n_lags),
            FitWindow::Rows { lower, upper } => (lower, upper),
        };

        if upper > n_lags {
            return Err(MfdfaError::InvalidParameter {
                parameter: "fit window upper bound".to_string(),
                value: upper as f64,
                constraint: format!("<= number of lags ({})", n_lags),
            });
        }
        if upper < lower + 2 {
            return Err(MfdfaError::InvalidParameter {
                parameter: "fit window".to_string(),
                value: upper.saturating_sub(lower) as f64,
                constraint: format!("at least 2 lags in [{}, {})", lower, upper),
            });
        }
        Ok(lower..upper)
    }
}

/// Generalized Hurst exponents h(q), one per filtered q.
///
/// `fluctuations` must have one row per lag and one column per q remaining
/// after the near-zero exclusion; anything else is a
/// [`MfdfaError::DimensionMismatch`].
pub fn hurst_exponents(
    lags: &[usize],
    fluctuations: &DMatrix<f64>,
    q: &[f64],
    window: FitWindow,
) -> MfdfaResult<Vec<f64>> {
    fit_hurst(lags, fluctuations, &prepare_q(q)?, window)
}

/// h(q) for an already filtered q-set.
fn fit_hurst(
    lags: &[usize],
    fluctuations: &DMatrix<f64>,
    q: &[f64],
    window: FitWindow,
) -> MfdfaResult<Vec<f64>> {
    check_shape(lags, fluctuations, q.len())?;
    let rows = window.resolve(lags.len())?;

    let log_lags: Vec<f64> = lags[rows.clone()].iter().map(|&l| (l as f64).ln()).collect();

    let slopes = (0..q.len())
        .map(|j| {
            let log_f = rows
                .clone()
                .map(|i| {
                    let value = fluctuations[(i, j)];
                    if value > 0.0 && value.is_finite() {
                        Ok(value.ln())
                    } else {
                        Err(MfdfaError::NumericalError {
                            reason: format!(
                                "Fluctuation {} at lag {} (q = {}) has no logarithm",
                                value, lags[i], q[j]
                            ),
                            operation: Some("hurst_exponents".to_string()),
                        })
                    }
                })
                .collect::<MfdfaResult<Vec<f64>>>()?;
            linear_fit(&log_lags, &log_f).map(|(slope, _)| slope)
        })
        .collect::<MfdfaResult<Vec<f64>>>()?;

    debug!(
        "Fitted h(q) for {} q values over lags {}..={}",
        slopes.len(),
        lags[rows.start],
        lags[rows.end - 1]
    );
    Ok(slopes)
}

/// Mass exponents τ(q) = q·h(q) − 1.
pub fn scaling_exponents(
    lags: &[usize],
    fluctuations: &DMatrix<f64>,
    q: &[f64],
    window: FitWindow,
) -> MfdfaResult<Vec<f64>> {
    let q = prepare_q(q)?;
    let h = fit_hurst(lags, fluctuations, &q, window)?;
    Ok(tau_from_hurst(&q, &h))
}

/// Singularity strength α and spectrum f(α), aligned with the filtered q.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SingularitySpectrum {
    /// α(q) = dτ/dq
    pub alpha: Vec<f64>,
    /// f(α) = q·α − τ
    pub f: Vec<f64>,
}

/// Singularity spectrum (α, f(α)); needs at least two filtered q values.
pub fn singularity_spectrum(
    lags: &[usize],
    fluctuations: &DMatrix<f64>,
    q: &[f64],
    window: FitWindow,
) -> MfdfaResult<SingularitySpectrum> {
    let q = prepare_q(q)?;
    let h = fit_hurst(lags, fluctuations, &q, window)?;
    let tau = tau_from_hurst(&q, &h);
    legendre(&q, &tau)
}

/// All scaling quantities of one analysis, aligned with the filtered q.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultifractalSpectrum {
    /// q-exponents
    pub q: Vec<f64>,
    /// Generalized Hurst exponents h(q)
    pub hurst: Vec<f64>,
    /// Mass exponents τ(q)
    pub tau: Vec<f64>,
    /// Singularity strengths α(q)
    pub alpha: Vec<f64>,
    /// Singularity spectrum f(α)
    pub f: Vec<f64>,
}

impl MultifractalSpectrum {
    /// Fits h(q) over `window` and derives τ, α and f(α).
    ///
    /// # Example
    /// ```rust
    /// use mfdfa::{mfdfa, FitWindow, MfdfaConfig, MultifractalSpectrum};
    ///
    /// let series: Vec<f64> = (0..2048).map(|i| ((i * 7919) % 1013) as f64 / 1013.0 - 0.5).collect();
    /// let lags = [8.0, 16.0, 32.0, 64.0, 128.0];
    /// let analysis = mfdfa(&series, &lags, &[-2.0, -1.0, 1.0, 2.0], &MfdfaConfig::default()).unwrap();
    ///
    /// let spectrum = MultifractalSpectrum::from_analysis(&analysis, FitWindow::Full).unwrap();
    /// assert_eq!(spectrum.alpha.len(), 4);
    /// assert!(spectrum.spectrum_width() >= 0.0);
    /// ```
    pub fn from_analysis(analysis: &FluctuationAnalysis, window: FitWindow) -> MfdfaResult<Self> {
        let q = prepare_q(&analysis.q)?;
        let hurst = fit_hurst(&analysis.lags, &analysis.fluctuations, &q, window)?;
        let tau = tau_from_hurst(&q, &hurst);
        let SingularitySpectrum { alpha, f } = legendre(&q, &tau)?;

        Ok(Self {
            q,
            hurst,
            tau,
            alpha,
            f,
        })
    }

    /// Δα = max α − min α; near zero for a monofractal signal
    pub fn spectrum_width(&self) -> f64 {
        spread(&self.alpha)
    }

    /// max h(q) − min h(q)
    pub fn hurst_range(&self) -> f64 {
        spread(&self.hurst)
    }

    /// Skew of the spectrum around the α where f(α) peaks.
    ///
    /// `(right − left) / (right + left)` with `left = α* − min α` and
    /// `right = max α − α*`. Positive values mean a long right tail (small
    /// fluctuations dominate the heterogeneity). `None` with fewer than three
    /// points or zero width.
    pub fn asymmetry(&self) -> Option<f64> {
        if self.alpha.len() < 3 {
            return None;
        }

        let peak = self
            .f
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &f)| match best {
                Some((_, best_f)) if best_f >= f => best,
                _ => Some((i, f)),
            })?
            .0;
        let alpha_peak = self.alpha[peak];

        let (lo, hi) = bounds(&self.alpha);
        let width = hi - lo;
        if width <= 0.0 {
            return None;
        }
        let left = alpha_peak - lo;
        let right = hi - alpha_peak;
        Some((right - left) / width)
    }
}

fn check_shape(lags: &[usize], fluctuations: &DMatrix<f64>, n_q: usize) -> MfdfaResult<()> {
    if fluctuations.ncols() != n_q {
        return Err(MfdfaError::DimensionMismatch {
            context: "fluctuation columns vs filtered q values".to_string(),
            expected: n_q,
            actual: fluctuations.ncols(),
        });
    }
    if fluctuations.nrows() != lags.len() {
        return Err(MfdfaError::DimensionMismatch {
            context: "fluctuation rows vs lags".to_string(),
            expected: lags.len(),
            actual: fluctuations.nrows(),
        });
    }
    Ok(())
}

fn tau_from_hurst(q: &[f64], h: &[f64]) -> Vec<f64> {
    q.iter().zip(h).map(|(q, h)| q * h - 1.0).collect()
}

fn legendre(q: &[f64], tau: &[f64]) -> MfdfaResult<SingularitySpectrum> {
    let alpha = gradient(tau, q)?;
    let f = q
        .iter()
        .zip(&alpha)
        .zip(tau)
        .map(|((q, a), t)| q * a - t)
        .collect();
    Ok(SingularitySpectrum { alpha, f })
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn spread(values: &[f64]) -> f64 {
    let (lo, hi) = bounds(values);
    if lo > hi {
        0.0
    } else {
        hi - lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// F_q(s) = c_q · s^h(q) exactly
    fn power_law(lags: &[usize], q: &[f64], h: impl Fn(f64) -> f64) -> DMatrix<f64> {
        DMatrix::from_fn(lags.len(), q.len(), |i, j| {
            (1.0 + j as f64) * (lags[i] as f64).powf(h(q[j]))
        })
    }

    #[test]
    fn test_fit_window_resolution() {
        assert_eq!(FitWindow::MiddleBand.resolve(16).unwrap(), 2..10);
        assert_eq!(FitWindow::MiddleBand.resolve(5).unwrap(), 0..3);
        assert_eq!(FitWindow::Full.resolve(5).unwrap(), 0..5);
        assert_eq!(FitWindow::new(1, 4).unwrap().resolve(6).unwrap(), 1..4);

        assert!(FitWindow::MiddleBand.resolve(2).is_err());
        assert!(FitWindow::new(3, 4).is_err());
        assert!(matches!(
            FitWindow::new(0, 8).unwrap().resolve(6),
            Err(MfdfaError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_hurst_exponents_recover_power_law() {
        let lags: Vec<usize> = (0..10).map(|k| 8 << k).collect();
        let q = [-3.0, -1.0, 2.0, 4.0];
        let fluctuations = power_law(&lags, &q, |q| 0.8 - 0.05 * q);

        let h = hurst_exponents(&lags, &fluctuations, &q, FitWindow::Full).unwrap();
        for (h, q) in h.iter().zip(&q) {
            assert_approx_eq!(*h, 0.8 - 0.05 * q, 1e-10);
        }
    }

    #[test]
    fn test_middle_band_ignores_outer_rows() {
        let lags: Vec<usize> = (1..=16).map(|k| 4 * k).collect();
        let q = [2.0];
        let mut fluctuations = power_law(&lags, &q, |_| 0.6);
        // Corrupt rows outside [2, 10)
        for i in [0, 1, 10, 12, 15] {
            fluctuations[(i, 0)] *= 3.0 + i as f64;
        }

        let h = hurst_exponents(&lags, &fluctuations, &q, FitWindow::MiddleBand).unwrap();
        assert_approx_eq!(h[0], 0.6, 1e-10);

        let h_full = hurst_exponents(&lags, &fluctuations, &q, FitWindow::Full).unwrap();
        assert!((h_full[0] - 0.6).abs() > 0.01);
    }

    #[test]
    fn test_monofractal_spectrum_is_a_point() {
        let lags: Vec<usize> = vec![10, 20, 40, 80, 160];
        let q = [-4.0, -2.0, 2.0, 4.0, 6.0];
        let fluctuations = power_law(&lags, &q, |_| 0.7);

        let tau = scaling_exponents(&lags, &fluctuations, &q, FitWindow::Full).unwrap();
        for (t, q) in tau.iter().zip(&q) {
            assert_approx_eq!(*t, 0.7 * q - 1.0, 1e-9);
        }

        let spectrum = singularity_spectrum(&lags, &fluctuations, &q, FitWindow::Full).unwrap();
        for (a, f) in spectrum.alpha.iter().zip(&spectrum.f) {
            assert_approx_eq!(*a, 0.7, 1e-9);
            assert_approx_eq!(*f, 1.0, 1e-8);
        }
    }

    #[test]
    fn test_multifractal_legendre_transform() {
        // h(q) = 1 + 0.1 q gives tau = q + 0.1 q^2 - 1 and alpha = 1 + 0.2 q
        let lags: Vec<usize> = vec![16, 32, 64, 128, 256, 512];
        let q = [-2.0, -1.0, 1.0, 2.0, 3.0];
        let fluctuations = power_law(&lags, &q, |q| 1.0 + 0.1 * q);

        let spectrum = singularity_spectrum(&lags, &fluctuations, &q, FitWindow::Full).unwrap();
        let tau: Vec<f64> = q.iter().map(|q| q + 0.1 * q * q - 1.0).collect();

        // Interior points on an uneven grid: central difference of a quadratic
        // gives the derivative at the interval midpoint
        assert_approx_eq!(spectrum.alpha[1], 1.0 + 0.1 * (q[0] + q[2]), 1e-9);
        assert_approx_eq!(spectrum.alpha[3], 1.0 + 0.2 * q[3], 1e-9);
        // One-sided ends
        assert_approx_eq!(spectrum.alpha[0], (tau[1] - tau[0]) / (q[1] - q[0]), 1e-9);
        assert_approx_eq!(spectrum.alpha[4], (tau[4] - tau[3]) / (q[4] - q[3]), 1e-9);

        for i in 0..q.len() {
            assert_approx_eq!(spectrum.f[i], q[i] * spectrum.alpha[i] - tau[i], 1e-9);
        }
    }

    #[test]
    fn test_near_zero_q_filtered_before_shape_check() {
        let lags: Vec<usize> = vec![10, 20, 40, 80];
        let fluctuations = power_law(&lags, &[1.0, 2.0], |_| 0.5);

        // 0.0 is excluded, leaving two q for two columns
        let h = hurst_exponents(&lags, &fluctuations, &[1.0, 0.0, 2.0], FitWindow::Full).unwrap();
        assert_eq!(h.len(), 2);

        match hurst_exponents(&lags, &fluctuations, &[1.0, 2.0, 3.0], FitWindow::Full) {
            Err(MfdfaError::DimensionMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected DimensionMismatch, got {:?}", other),
        }

        assert!(matches!(
            hurst_exponents(&lags[..3], &fluctuations, &[1.0, 2.0], FitWindow::Full),
            Err(MfdfaError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_exponents_align_with_filtered_q() {
        let lags: Vec<usize> = vec![10, 20, 40, 80];
        let fluctuations = power_law(&lags, &[-1.0, 2.0], |q| 0.9 - 0.1 * q);
        let q = [-1.0, 0.05, 0.0, 2.0];

        let tau = scaling_exponents(&lags, &fluctuations, &q, FitWindow::Full).unwrap();
        assert_eq!(tau.len(), 2);
        assert_approx_eq!(tau[0], -1.0 * 1.0 - 1.0, 1e-9);
        assert_approx_eq!(tau[1], 2.0 * 0.7 - 1.0, 1e-9);

        let spectrum = singularity_spectrum(&lags, &fluctuations, &q, FitWindow::Full).unwrap();
        let slope = (tau[1] - tau[0]) / 3.0;
        assert_approx_eq!(spectrum.alpha[0], slope, 1e-9);
        assert_approx_eq!(spectrum.alpha[1], slope, 1e-9);
        assert_approx_eq!(spectrum.f[1], 2.0 * slope - tau[1], 1e-9);
    }

    #[test]
    fn test_non_positive_fluctuation_has_no_logarithm() {
        let lags: Vec<usize> = vec![10, 20, 40];
        let mut fluctuations = power_law(&lags, &[2.0], |_| 0.5);
        fluctuations[(1, 0)] = 0.0;
        assert!(matches!(
            hurst_exponents(&lags, &fluctuations, &[2.0], FitWindow::Full),
            Err(MfdfaError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_single_q_has_no_spectrum() {
        let lags: Vec<usize> = vec![10, 20, 40];
        let fluctuations = power_law(&lags, &[2.0], |_| 0.5);
        assert!(hurst_exponents(&lags, &fluctuations, &[2.0], FitWindow::Full).is_ok());
        assert!(matches!(
            singularity_spectrum(&lags, &fluctuations, &[2.0], FitWindow::Full),
            Err(MfdfaError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_width_range_and_asymmetry() {
        let spectrum = MultifractalSpectrum {
            q: vec![-2.0, -1.0, 1.0, 2.0, 3.0],
            hurst: vec![0.9, 0.8, 0.6, 0.55, 0.5],
            tau: vec![0.0; 5],
            alpha: vec![1.2, 1.0, 0.7, 0.5, 0.4],
            f: vec![0.3, 0.8, 1.0, 0.7, 0.2],
        };

        assert_approx_eq!(spectrum.spectrum_width(), 0.8, 1e-12);
        assert_approx_eq!(spectrum.hurst_range(), 0.4, 1e-12);
        // Peak at alpha = 0.7: left = 0.3, right = 0.5
        assert_approx_eq!(spectrum.asymmetry().unwrap(), 0.25, 1e-12);

        let flat = MultifractalSpectrum {
            alpha: vec![0.7; 5],
            ..spectrum.clone()
        };
        assert_eq!(flat.spectrum_width(), 0.0);
        assert!(flat.asymmetry().is_none());

        let short = MultifractalSpectrum {
            q: vec![1.0, 2.0],
            hurst: vec![0.5, 0.5],
            tau: vec![-0.5, 0.0],
            alpha: vec![0.5, 0.6],
            f: vec![1.0, 1.0],
        };
        assert!(short.asymmetry().is_none());
    }

    #[test]
    fn test_from_analysis_bundles_everything() {
        let lags: Vec<usize> = vec![8, 16, 32, 64, 128, 256];
        let q = vec![-2.0, 2.0, 4.0];
        let analysis = FluctuationAnalysis {
            lags: lags.clone(),
            q: q.clone(),
            fluctuations: power_law(&lags, &q, |q| 1.1 - 0.02 * q),
            std_devs: None,
            extrema_spread: None,
        };

        let spectrum = MultifractalSpectrum::from_analysis(&analysis, FitWindow::Full).unwrap();
        assert_eq!(spectrum.q, q);
        for i in 0..q.len() {
            assert_approx_eq!(spectrum.hurst[i], 1.1 - 0.02 * q[i], 1e-10);
            assert_approx_eq!(spectrum.tau[i], q[i] * spectrum.hurst[i] - 1.0, 1e-12);
        }
        assert_eq!(spectrum.alpha.len(), 3);
        assert_eq!(spectrum.f.len(), 3);
    }
}
