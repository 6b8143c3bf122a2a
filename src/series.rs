//! Input series validation and dimensionality reduction.
//!
//! The estimator works on a one-dimensional, fully materialized series.
//! Column or row vectors stored as 2-D matrices are squeezed; anything with
//! a second axis longer than one is rejected.

use crate::errors::{validate_all_finite, validate_data_length, MfdfaError, MfdfaResult};
use nalgebra::DMatrix;

/// Validates a 1-D series: non-empty and free of NaN/Inf.
pub fn validate_series(data: &[f64]) -> MfdfaResult<()> {
    validate_data_length(data, 1)?;
    validate_all_finite(data, "series")
}

/// Reduces an `N x 1` or `1 x N` matrix to a plain series.
///
/// # Example
/// ```rust
/// use mfdfa::series::squeeze;
/// use nalgebra::DMatrix;
///
/// let column = DMatrix::from_column_slice(3, 1, &[1.0, 2.0, 3.0]);
/// assert_eq!(squeeze(&column).unwrap(), vec![1.0, 2.0, 3.0]);
///
/// let wide = DMatrix::<f64>::zeros(3, 2);
/// assert!(squeeze(&wide).is_err());
/// ```
pub fn squeeze(data: &DMatrix<f64>) -> MfdfaResult<Vec<f64>> {
    let (rows, cols) = data.shape();
    if rows != 1 && cols != 1 {
        return Err(MfdfaError::InvalidShape { rows, cols });
    }
    // Column-major storage makes both orientations a straight copy
    Ok(data.as_slice().to_vec())
}
