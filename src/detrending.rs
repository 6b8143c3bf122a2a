//! Local polynomial detrending of profile segments.
//!
//! All segments of one lag share the same abscissa `1..=lag`, so the least
//! squares problem is factored once per lag: the design matrix and its
//! pseudo-inverse are built in [`LocalDetrender::new`] and every segment is
//! then fitted with two small matrix-vector products.

use crate::errors::{MfdfaError, MfdfaResult};
use crate::segmentation::SegmentBatch;
use nalgebra::{DMatrix, DVector};
use statrs::statistics::Statistics;

/// Singular values below this are treated as zero when inverting the design.
const PSEUDO_INVERSE_EPSILON: f64 = 1e-12;

/// Per-lag detrender producing one residual variance per segment.
#[derive(Debug, Clone)]
pub struct LocalDetrender {
    lag: usize,
    order: usize,
    basis: Option<PolynomialBasis>,
}

#[derive(Debug, Clone)]
struct PolynomialBasis {
    /// `lag x (order + 1)` Vandermonde matrix
    design: DMatrix<f64>,
    /// `(order + 1) x lag` least-squares solver
    solver: DMatrix<f64>,
}

impl PolynomialBasis {
    fn new(lag: usize, order: usize) -> MfdfaResult<Self> {
        // The abscissa 1..=lag is mapped affinely onto [-1, 1]. Polynomials of
        // degree `order` span the same space in either variable, so residuals
        // are unchanged while the Vandermonde columns stay well scaled.
        let half_span = (lag - 1) as f64 / 2.0;
        let centre = (lag + 1) as f64 / 2.0;

        let design = DMatrix::from_fn(lag, order + 1, |i, k| {
            let t = ((i + 1) as f64 - centre) / half_span;
            t.powi(k as i32)
        });

        let solver = design
            .clone()
            .pseudo_inverse(PSEUDO_INVERSE_EPSILON)
            .map_err(|reason| MfdfaError::NumericalError {
                reason: format!(
                    "Polynomial design of order {} for lag {} could not be inverted: {}",
                    order, lag, reason
                ),
                operation: Some("detrending".to_string()),
            })?;

        Ok(Self { design, solver })
    }

    fn residual_variance(&self, segment: &[f64]) -> f64 {
        let y = DVector::from_column_slice(segment);
        let coefficients = &self.solver * &y;
        let fitted = &self.design * coefficients;

        y.iter()
            .zip(fitted.iter())
            .map(|(observed, trend)| observed - trend)
            .population_variance()
    }
}

impl LocalDetrender {
    /// Prepares detrending of `lag`-length segments with a polynomial of degree `order`.
    ///
    /// `order == 0` performs no fit: the segment variance is the raw variance.
    /// For `order >= 1` the lag must exceed `order + 1`, otherwise the fit
    /// would be (nearly) exact and the residuals meaningless.
    pub fn new(lag: usize, order: usize) -> MfdfaResult<Self> {
        if lag == 0 {
            return Err(MfdfaError::InvalidLag {
                lag: 0.0,
                reason: "window length must be positive".to_string(),
            });
        }
        if order == 0 {
            return Ok(Self {
                lag,
                order,
                basis: None,
            });
        }
        if lag <= order + 1 {
            return Err(MfdfaError::InvalidLag {
                lag: lag as f64,
                reason: format!("must exceed order + 1 = {}", order + 1),
            });
        }

        Ok(Self {
            lag,
            order,
            basis: Some(PolynomialBasis::new(lag, order)?),
        })
    }

    /// Segment length this detrender was built for
    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Polynomial order (0 means no detrending)
    pub fn order(&self) -> usize {
        self.order
    }

    /// Residual variance of a single segment (population variance, ddof = 0).
    pub fn segment_variance(&self, segment: &[f64]) -> MfdfaResult<f64> {
        if segment.len() != self.lag {
            return Err(MfdfaError::DimensionMismatch {
                context: "segment length vs detrender lag".to_string(),
                expected: self.lag,
                actual: segment.len(),
            });
        }

        Ok(match &self.basis {
            Some(basis) => basis.residual_variance(segment),
            None => segment.iter().population_variance(),
        })
    }

    /// Residual variances of every segment in `batch`, in row order.
    pub fn variances(&self, batch: &SegmentBatch<'_>) -> MfdfaResult<Vec<f64>> {
        batch
            .rows()
            .iter()
            .map(|segment| self.segment_variance(segment))
            .collect()
    }
}
