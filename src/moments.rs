//! q-order aggregation of segment variances into fluctuation values.
//!
//! For one lag and one q the generalized fluctuation is
//!
//! ```text
//! F_q(s) = [ mean_v( F²(v, s)^(q/2) ) ]^(1/q)
//! ```
//!
//! where `F²(v, s)` is the residual variance of segment `v`. When a lag is
//! tiled twice (from the front and from the back) the classic estimator
//! aggregates each tiling on its own, with the mean halved, and adds the two
//! results. That behaviour is the default; [`TilingCombination::Pooled`]
//! switches to a single mean over all segments.

use crate::errors::{MfdfaError, MfdfaResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// How the segment sets of one lag are combined into a single F_q(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TilingCombination {
    /// Each set gives `(mean / 2)^(1/q)`; the per-set values are added.
    #[default]
    Summed,
    /// All segments are pooled into one mean before the `1/q` root.
    Pooled,
}

/// Aggregated values for one lag, one entry per q.
#[derive(Debug, Clone, PartialEq)]
pub struct LagMoments {
    /// F_q(s) for each q
    pub fluctuation: Vec<f64>,
    /// Spread of the q-powers, combined like `fluctuation`, if requested
    pub std_dev: Option<Vec<f64>>,
}

/// Raises every variance to `q / 2`.
///
/// Fails with [`MfdfaError::SingularMoment`] for a negative or non-finite
/// variance, and for a zero variance when `q` is negative.
pub fn moment_powers(variances: &[f64], q: f64, lag: usize) -> MfdfaResult<Vec<f64>> {
    variances
        .iter()
        .map(|&variance| {
            let singular = !variance.is_finite() || variance < 0.0 || (variance == 0.0 && q < 0.0);
            if singular {
                Err(MfdfaError::SingularMoment { q, lag, variance })
            } else {
                Ok(variance.powf(q / 2.0))
            }
        })
        .collect()
}

/// Textbook F_q(s) of a single segment set, without halving.
///
/// # Example
/// ```rust
/// use mfdfa::moments::generalized_fluctuation;
///
/// // q = 2 is the root mean of the variances
/// let f = generalized_fluctuation(&[1.0, 4.0, 4.0, 1.0], 2.0, 8).unwrap();
/// assert!((f - 2.5f64.sqrt()).abs() < 1e-12);
/// ```
pub fn generalized_fluctuation(variances: &[f64], q: f64, lag: usize) -> MfdfaResult<f64> {
    if variances.is_empty() {
        return Err(MfdfaError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    let mean = moment_powers(variances, q, lag)?.iter().mean();
    checked_root(mean, q, lag)
}

/// Aggregates the segment variances of one lag for every q.
///
/// `segment_sets` holds one variance vector per tiling (forward and backward,
/// or the single moving-window set). Every set must be non-empty.
pub fn aggregate(
    segment_sets: &[Vec<f64>],
    q_set: &[f64],
    lag: usize,
    combination: TilingCombination,
    with_std: bool,
) -> MfdfaResult<LagMoments> {
    if segment_sets.is_empty() || segment_sets.iter().any(|set| set.is_empty()) {
        return Err(MfdfaError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let mut fluctuation = Vec::with_capacity(q_set.len());
    let mut std_dev = with_std.then(|| Vec::with_capacity(q_set.len()));

    for &q in q_set {
        let (f_q, s_q) = match combination {
            TilingCombination::Summed => {
                let mut f_sum = 0.0;
                let mut s_sum = 0.0;
                for set in segment_sets {
                    let powers = moment_powers(set, q, lag)?;
                    f_sum += checked_root(powers.iter().mean() / 2.0, q, lag)?;
                    if with_std {
                        s_sum += (powers.iter().population_std_dev() / 2.0).powf(1.0 / q);
                    }
                }
                (f_sum, s_sum)
            }
            TilingCombination::Pooled => {
                let mut powers = Vec::with_capacity(segment_sets.iter().map(Vec::len).sum());
                for set in segment_sets {
                    powers.extend(moment_powers(set, q, lag)?);
                }
                let f_q = checked_root(powers.iter().mean(), q, lag)?;
                let s_q = if with_std {
                    powers.iter().population_std_dev().powf(1.0 / q)
                } else {
                    0.0
                };
                (f_q, s_q)
            }
        };

        fluctuation.push(f_q);
        if let Some(std_dev) = std_dev.as_mut() {
            std_dev.push(s_q);
        }
    }

    Ok(LagMoments {
        fluctuation,
        std_dev,
    })
}

/// Largest minus smallest segment variance across all sets of one lag.
///
/// A large spread relative to the fluctuation itself flags nonstationarity.
pub fn extrema_spread(segment_sets: &[Vec<f64>]) -> MfdfaResult<f64> {
    let (lo, hi) = segment_sets
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        return Err(MfdfaError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(hi - lo)
}

fn checked_root(mean_power: f64, q: f64, lag: usize) -> MfdfaResult<f64> {
    let value = mean_power.powf(1.0 / q);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MfdfaError::NumericalError {
            reason: format!(
                "Fluctuation for q = {} at lag {} is not finite (mean moment {})",
                q, lag, mean_power
            ),
            operation: Some("moment aggregation".to_string()),
        })
    }
}
