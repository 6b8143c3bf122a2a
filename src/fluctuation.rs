//! Multifractal Detrended Fluctuation Analysis (MF-DFA) driver.
//!
//! The analysis follows Kantelhardt et al. (2002):
//!
//! 1. Build the profile (mean-centred cumulative sum, optionally twice).
//! 2. Optionally remove chosen intrinsic components from the whole profile.
//! 3. For every lag, cut the profile into segments (forward and backward
//!    tilings, or overlapping windows) and measure each segment's residual
//!    variance after local polynomial detrending.
//! 4. Aggregate the variances of each lag into F_q(s) for every q.
//!
//! All validation happens before step 1; a bad lag or q-set aborts the call
//! without producing any rows.

use crate::config::{DetrendMode, MfdfaConfig};
use crate::decomposition::ModeDecomposer;
use crate::detrending::LocalDetrender;
use crate::errors::{MfdfaError, MfdfaResult};
use crate::math_utils::constants::{Q_EXCLUSION_BAND, Q_MAGNITUDE_LIMIT};
use crate::moments::{aggregate, extrema_spread, LagMoments};
use crate::profile::build_profile;
use crate::segmentation::{segment, segment_count, Tiling};
use crate::series::{squeeze, validate_series};
use log::{debug, warn};
use nalgebra::DMatrix;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Output of one MF-DFA call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FluctuationAnalysis {
    /// Lags actually used: rounded, above order + 1, unique, ascending
    pub lags: Vec<usize>,
    /// q-exponents actually used, in input order, near-zero values removed
    pub q: Vec<f64>,
    /// F_q(s), one row per lag and one column per q
    pub fluctuations: DMatrix<f64>,
    /// Standard deviation counterpart of `fluctuations`, if requested
    pub std_devs: Option<DMatrix<f64>>,
    /// Max minus min segment variance per lag, if requested
    pub extrema_spread: Option<Vec<f64>>,
}

impl FluctuationAnalysis {
    /// Number of lags (rows)
    pub fn n_lags(&self) -> usize {
        self.lags.len()
    }

    /// Number of q-exponents (columns)
    pub fn n_q(&self) -> usize {
        self.q.len()
    }

    /// F_q(s) across all lags for the q at `q_index`
    pub fn column(&self, q_index: usize) -> Option<Vec<f64>> {
        (q_index < self.n_q()).then(|| self.fluctuations.column(q_index).iter().copied().collect())
    }

    /// F_q(s) for every q at the lag at `lag_index`
    pub fn row(&self, lag_index: usize) -> Option<Vec<f64>> {
        (lag_index < self.n_lags()).then(|| self.fluctuations.row(lag_index).iter().copied().collect())
    }
}

/// Rounds, filters, deduplicates and sorts the requested lags.
///
/// Lags that round to `order + 1` or less, zero and negative values
/// included, are dropped (with a warning). Non-finite values, lags longer
/// than the series, and an empty result are rejected with
/// [`MfdfaError::InvalidLag`].
pub fn prepare_lags(lags: &[f64], order: usize, series_len: usize) -> MfdfaResult<Vec<usize>> {
    if let Some(&bad) = lags.iter().find(|l| !l.is_finite()) {
        return Err(MfdfaError::InvalidLag {
            lag: bad,
            reason: "lag must be finite".to_string(),
        });
    }

    let min_exclusive = (order + 1) as f64;
    let (mut kept, dropped): (Vec<f64>, Vec<f64>) =
        lags.iter().map(|l| l.round()).partition(|&l| l > min_exclusive);
    if !dropped.is_empty() {
        warn!(
            "Dropping {} lag(s) not exceeding order + 1 = {}: {:?}",
            dropped.len(),
            order + 1,
            dropped
        );
    }

    kept.sort_by(f64::total_cmp);
    let before = kept.len();
    kept.dedup();
    if kept.len() < before {
        warn!("Collapsed {} duplicate lag(s) after rounding", before - kept.len());
    }

    let Some(&largest) = kept.last() else {
        return Err(MfdfaError::InvalidLag {
            lag: lags.iter().copied().fold(f64::NAN, f64::max),
            reason: format!("no lag exceeds order + 1 = {}", order + 1),
        });
    };
    if largest > series_len as f64 {
        return Err(MfdfaError::InvalidLag {
            lag: largest,
            reason: format!("exceeds series length {}", series_len),
        });
    }

    Ok(kept.into_iter().map(|l| l as usize).collect())
}

/// Removes q-exponents in the non-convergent band |q| <= 0.1.
///
/// Order is preserved. Non-finite q, or nothing left after the exclusion,
/// is an [`MfdfaError::InvalidQSet`].
pub fn prepare_q(q: &[f64]) -> MfdfaResult<Vec<f64>> {
    if let Some(bad) = q.iter().find(|v| !v.is_finite()) {
        return Err(MfdfaError::InvalidQSet {
            reason: format!("q contains non-finite value {}", bad),
        });
    }

    let kept: Vec<f64> = q
        .iter()
        .copied()
        .filter(|v| v.abs() > Q_EXCLUSION_BAND)
        .collect();

    if kept.len() < q.len() {
        warn!(
            "Excluded {} q value(s) with |q| <= {}",
            q.len() - kept.len(),
            Q_EXCLUSION_BAND
        );
    }
    if kept.iter().any(|v| v.abs() > Q_MAGNITUDE_LIMIT) {
        warn!(
            "q values beyond +/-{} may overflow or underflow the moment aggregation",
            Q_MAGNITUDE_LIMIT
        );
    }
    if kept.is_empty() {
        return Err(MfdfaError::InvalidQSet {
            reason: format!("no q value with |q| > {}", Q_EXCLUSION_BAND),
        });
    }

    Ok(kept)
}

/// Fluctuation analyzer with an optional mode-decomposition capability.
///
/// The decomposer is fixed at construction. Requesting
/// [`DetrendMode::ModeDecomposition`] from an analyzer built without one fails
/// with [`MfdfaError::CapabilityUnavailable`] before any computation.
#[derive(Debug, Clone, Default)]
pub struct MfdfaAnalyzer {
    decomposer: Option<Arc<dyn ModeDecomposer>>,
}

struct LagRow {
    moments: LagMoments,
    spread: Option<f64>,
}

impl MfdfaAnalyzer {
    /// Analyzer without mode decomposition
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer that removes intrinsic components through `decomposer`.
    ///
    /// The decomposer receives the profile, not the raw series.
    pub fn with_decomposer(decomposer: Arc<dyn ModeDecomposer>) -> Self {
        Self {
            decomposer: Some(decomposer),
        }
    }

    /// Whether a mode decomposer is available
    pub fn has_decomposer(&self) -> bool {
        self.decomposer.is_some()
    }

    /// Runs MF-DFA on a 1-D series.
    ///
    /// # Example
    /// ```rust
    /// use mfdfa::{MfdfaAnalyzer, MfdfaConfig};
    ///
    /// let series: Vec<f64> = (0..512).map(|i| ((i * 37) % 101) as f64 - 50.0).collect();
    /// let analysis = MfdfaAnalyzer::new()
    ///     .analyze(&series, &[8.0, 16.0, 32.0, 64.0], &[-2.0, 2.0], &MfdfaConfig::default())
    ///     .unwrap();
    ///
    /// assert_eq!(analysis.fluctuations.shape(), (4, 2));
    /// assert!(analysis.fluctuations.iter().all(|&f| f >= 0.0));
    /// ```
    pub fn analyze(
        &self,
        series: &[f64],
        lags: &[f64],
        q: &[f64],
        config: &MfdfaConfig,
    ) -> MfdfaResult<FluctuationAnalysis> {
        validate_series(series)?;
        let order = config.detrend.effective_order();
        let lags = prepare_lags(lags, order, series.len())?;
        let q = prepare_q(q)?;

        let decomposition = match &config.detrend {
            DetrendMode::ModeDecomposition { components } => {
                let decomposer =
                    self.decomposer
                        .as_ref()
                        .ok_or_else(|| MfdfaError::CapabilityUnavailable {
                            capability: "mode decomposition".to_string(),
                        })?;
                Some((decomposer, components))
            }
            _ => None,
        };

        let mut profile = build_profile(series, config.modified)?;
        if let Some((decomposer, components)) = decomposition {
            profile = decomposer.remove_components(&profile, components)?;
            if profile.len() != series.len() {
                return Err(MfdfaError::DimensionMismatch {
                    context: "detrended profile length vs series length".to_string(),
                    expected: series.len(),
                    actual: profile.len(),
                });
            }
        }

        let tilings = match config.moving_window {
            Some(stride) => vec![Tiling::MovingWindow { stride }],
            None => vec![Tiling::Forward, Tiling::Backward],
        };

        debug!(
            "MF-DFA on {} samples: {} lags ({}..={}), {} q values, order {}, tilings {:?}",
            series.len(),
            lags.len(),
            lags[0],
            lags[lags.len() - 1],
            q.len(),
            order,
            tilings
        );

        let analyze_lag = |lag: usize| -> MfdfaResult<LagRow> {
            let detrender = LocalDetrender::new(lag, order)?;
            let segment_sets = tilings
                .iter()
                .map(|&tiling| {
                    let batch = segment(&profile, lag, tiling)?;
                    detrender.variances(&batch)
                })
                .collect::<MfdfaResult<Vec<_>>>()?;

            let moments = aggregate(
                &segment_sets,
                &q,
                lag,
                config.combination,
                config.compute_stats,
            )?;
            let spread = if config.compute_extrema_spread {
                Some(extrema_spread(&segment_sets)?)
            } else {
                None
            };
            Ok(LagRow { moments, spread })
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<LagRow> = {
            use rayon::prelude::*;
            lags.par_iter()
                .map(|&lag| analyze_lag(lag))
                .collect::<MfdfaResult<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<LagRow> = lags
            .iter()
            .map(|&lag| analyze_lag(lag))
            .collect::<MfdfaResult<Vec<_>>>()?;

        if log::log_enabled!(log::Level::Debug) {
            let segments: usize = lags
                .iter()
                .flat_map(|&lag| tilings.iter().map(move |&t| segment_count(series.len(), lag, t)))
                .sum();
            debug!("MF-DFA aggregated {} segments in total", segments);
        }

        let fluctuations =
            DMatrix::from_fn(lags.len(), q.len(), |i, j| rows[i].moments.fluctuation[j]);

        let std_devs = if config.compute_stats {
            let per_lag = rows
                .iter()
                .map(|row| row.moments.std_dev.as_deref())
                .collect::<Option<Vec<&[f64]>>>();
            per_lag.map(|per_lag| DMatrix::from_fn(lags.len(), q.len(), |i, j| per_lag[i][j]))
        } else {
            None
        };

        let extrema_spread = if config.compute_extrema_spread {
            rows.iter().map(|row| row.spread).collect::<Option<Vec<f64>>>()
        } else {
            None
        };

        Ok(FluctuationAnalysis {
            lags,
            q,
            fluctuations,
            std_devs,
            extrema_spread,
        })
    }

    /// Runs MF-DFA on a series stored as an `N x 1` or `1 x N` matrix.
    pub fn analyze_matrix(
        &self,
        series: &DMatrix<f64>,
        lags: &[f64],
        q: &[f64],
        config: &MfdfaConfig,
    ) -> MfdfaResult<FluctuationAnalysis> {
        let series = squeeze(series)?;
        self.analyze(&series, lags, q, config)
    }
}

/// Runs MF-DFA without a mode decomposer.
///
/// Shorthand for `MfdfaAnalyzer::new().analyze(...)`.
pub fn mfdfa(
    series: &[f64],
    lags: &[f64],
    q: &[f64],
    config: &MfdfaConfig,
) -> MfdfaResult<FluctuationAnalysis> {
    MfdfaAnalyzer::new().analyze(series, lags, q, config)
}
