//! Numerical helpers shared by the estimator and the spectrum module.

use crate::errors::{MfdfaError, MfdfaResult};

/// Numerical safety constants
pub mod constants {
    /// Default epsilon for floating point comparisons
    pub const DEFAULT_EPSILON: f64 = 1e-12;

    /// Half-width of the excluded q band around zero; |q| must exceed this
    pub const Q_EXCLUSION_BAND: f64 = 0.1;

    /// Largest |q| for which the moment aggregation is considered well behaved
    pub const Q_MAGNITUDE_LIMIT: f64 = 10.0;

    /// Minimum variance of the abscissa accepted by [`super::linear_fit`]
    pub const MIN_VARIANCE: f64 = 1e-15;
}

/// Guarded floating point helpers
pub mod float_ops {
    use super::constants::DEFAULT_EPSILON;

    /// Check if a floating point number is approximately zero
    #[inline]
    pub fn approx_zero(x: f64) -> bool {
        x.abs() < DEFAULT_EPSILON
    }

    /// Safe division that checks for near-zero denominators and infinite/NaN inputs
    pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
        if approx_zero(denominator) || !numerator.is_finite() || !denominator.is_finite() {
            None
        } else {
            Some(numerator / denominator)
        }
    }
}

/// Least-squares straight line through `(x, y)`.
///
/// Returns `(slope, intercept)`. The data are centered before the sums are
/// formed so that large abscissae (e.g. log-lags) do not cancel catastrophically.
///
/// # Example
/// ```rust
/// use mfdfa::math_utils::linear_fit;
///
/// let x = vec![1.0, 2.0, 3.0, 4.0];
/// let y = vec![3.0, 5.0, 7.0, 9.0];
/// let (slope, intercept) = linear_fit(&x, &y).unwrap();
/// assert!((slope - 2.0).abs() < 1e-12);
/// assert!((intercept - 1.0).abs() < 1e-12);
/// ```
pub fn linear_fit(x: &[f64], y: &[f64]) -> MfdfaResult<(f64, f64)> {
    if x.len() != y.len() {
        return Err(MfdfaError::DimensionMismatch {
            context: "linear fit abscissa vs ordinate".to_string(),
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(MfdfaError::InsufficientData {
            required: 2,
            actual: x.len(),
        });
    }
    if !x.iter().chain(y).all(|v| v.is_finite()) {
        return Err(MfdfaError::NumericalError {
            reason: "Non-finite values in regression data".to_string(),
            operation: Some("linear_fit".to_string()),
        });
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (sxy, sxx) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxy, sxx), (&xi, &yi)| {
            let dx = xi - mean_x;
            (sxy + dx * (yi - mean_y), sxx + dx * dx)
        });

    if sxx < constants::MIN_VARIANCE {
        return Err(MfdfaError::NumericalError {
            reason: "Predictor variable has zero variance (constant values)".to_string(),
            operation: Some("linear_fit".to_string()),
        });
    }

    let slope = sxy / sxx;
    Ok((slope, mean_y - slope * mean_x))
}

/// Derivative of `y` with respect to `x` by finite differences.
///
/// Interior points use central differences `(y[i+1] - y[i-1]) / (x[i+1] - x[i-1])`,
/// the two end points use one-sided differences. The abscissa need not be
/// evenly spaced but must be strictly distinct at every stencil.
pub fn gradient(y: &[f64], x: &[f64]) -> MfdfaResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(MfdfaError::DimensionMismatch {
            context: "gradient abscissa vs ordinate".to_string(),
            expected: x.len(),
            actual: y.len(),
        });
    }
    let n = y.len();
    if n < 2 {
        return Err(MfdfaError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    (0..n)
        .map(|i| {
            let (lo, hi) = match i {
                0 => (0, 1),
                _ if i == n - 1 => (n - 2, n - 1),
                _ => (i - 1, i + 1),
            };
            float_ops::safe_div(y[hi] - y[lo], x[hi] - x[lo]).ok_or_else(|| {
                MfdfaError::NumericalError {
                    reason: format!(
                        "Degenerate spacing between x[{}] = {} and x[{}] = {}",
                        lo, x[lo], hi, x[hi]
                    ),
                    operation: Some("gradient".to_string()),
                }
            })
        })
        .collect()
}

/// Logarithmically spaced window lengths for a series of length `n`.
///
/// Produces `count` points spread evenly in log space over `[1, n / 4]`,
/// truncated to integers, shifted by one and deduplicated, so the smallest
/// lag is 2 and the largest is `n / 4 + 1`.
///
/// # Example
/// ```rust
/// use mfdfa::math_utils::log_spaced_lags;
///
/// let lags = log_spaced_lags(1000, 25).unwrap();
/// assert_eq!(lags.first().copied(), Some(2.0));
/// assert_eq!(lags.last().copied(), Some(251.0));
/// assert!(lags.windows(2).all(|w| w[0] < w[1]));
/// ```
pub fn log_spaced_lags(n: usize, count: usize) -> MfdfaResult<Vec<f64>> {
    if n < 4 {
        return Err(MfdfaError::InsufficientData {
            required: 4,
            actual: n,
        });
    }
    if count < 2 {
        return Err(MfdfaError::InvalidParameter {
            parameter: "count".to_string(),
            value: count as f64,
            constraint: ">= 2".to_string(),
        });
    }

    let log_max = ((n / 4) as f64).log10();
    let step = log_max / (count - 1) as f64;

    let top = (n / 4 + 1) as f64;

    let mut lags: Vec<f64> = (0..count)
        .map(|k| {
            // Pin the final point; powf may land just below n / 4
            if k == count - 1 {
                top
            } else {
                (10f64.powf(k as f64 * step).floor() + 1.0).min(top)
            }
        })
        .collect();
    lags.dedup();

    Ok(lags)
}
