//! Error types and validation functions for fluctuation analysis.
//!
//! Every public operation in this crate validates its inputs up front and
//! reports failures synchronously through [`MfdfaError`]. No operation
//! produces a partial fluctuation matrix.

use thiserror::Error;

/// Error types for MFDFA and scaling-exponent operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MfdfaError {
    /// The series cannot be reduced to a single dimension.
    #[error("Invalid shape: expected a 1-D series or a single row/column, got {rows}x{cols}")]
    InvalidShape {
        /// Number of rows of the offending input
        rows: usize,
        /// Number of columns of the offending input
        cols: usize,
    },

    /// Not enough data for the requested operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// A window length (or the moving-window stride) is unusable.
    #[error("Invalid lag: {lag} ({reason})")]
    InvalidLag {
        /// Offending lag or stride value as supplied
        lag: f64,
        /// Why the value was rejected
        reason: String,
    },

    /// The q-set is unusable, typically empty after the near-zero exclusion.
    #[error("Invalid q-set: {reason}")]
    InvalidQSet {
        /// Why the q-set was rejected
        reason: String,
    },

    /// Two inputs that must agree in size do not.
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being compared
        context: String,
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// A moment cannot be formed because a segment variance is zero or negative.
    #[error("Singular moment for q = {q} at lag {lag}: segment variance {variance} is not strictly positive")]
    SingularMoment {
        /// q-exponent being aggregated
        q: f64,
        /// Window length of the segment batch
        lag: usize,
        /// Offending segment variance
        variance: f64,
    },

    /// Invalid parameter value.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical computation failed.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for the failure
        reason: String,
        /// Operation that failed, if known
        operation: Option<String>,
    },

    /// An optional collaborator required by the configuration was not supplied.
    #[error("Capability unavailable: {capability} is required but no implementation was provided")]
    CapabilityUnavailable {
        /// Name of the missing capability
        capability: String,
    },
}

/// Result type for fluctuation analysis operations.
pub type MfdfaResult<T> = Result<T, MfdfaError>;

/// Validates that data has sufficient length for analysis.
///
/// # Example
/// ```rust
/// use mfdfa::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length(data: &[f64], min_required: usize) -> MfdfaResult<()> {
    if data.len() < min_required {
        Err(MfdfaError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first NaN or infinite value, reporting its index.
///
/// # Example
/// ```rust
/// use mfdfa::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0], "series").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN], "series").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> MfdfaResult<()> {
    if let Some((i, value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(MfdfaError::NumericalError {
            reason: format!("{} contains non-finite value at index {}: {}", name, i, value),
            operation: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_data_length() {
        let data = vec![1.0, 2.0];
        assert!(validate_data_length(&data, 2).is_ok());

        match validate_data_length(&data, 5) {
            Err(MfdfaError::InsufficientData { required, actual }) => {
                assert_eq!(required, 5);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected InsufficientData error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_data_length_empty() {
        assert!(matches!(
            validate_data_length(&[], 1),
            Err(MfdfaError::InsufficientData {
                required: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_validate_all_finite_reports_index() {
        let data = vec![1.0, 2.0, f64::INFINITY, 4.0];
        match validate_all_finite(&data, "series") {
            Err(MfdfaError::NumericalError { reason, .. }) => {
                assert!(reason.contains("index 2"), "unexpected reason: {}", reason);
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }
        assert!(validate_all_finite(&[], "series").is_ok());
    }

    #[test]
    fn test_error_display_formatting() {
        let err = MfdfaError::InvalidLag {
            lag: 0.0,
            reason: "stride must be a positive integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid lag: 0 (stride must be a positive integer)"
        );

        let err = MfdfaError::DimensionMismatch {
            context: "fluctuation columns vs q".to_string(),
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("expected 3, got 2"));

        let err = MfdfaError::CapabilityUnavailable {
            capability: "mode decomposition".to_string(),
        };
        assert!(err.to_string().starts_with("Capability unavailable"));
    }
}
