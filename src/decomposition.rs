//! Boundary to an external adaptive mode decomposition (e.g. EMD).
//!
//! The estimator does not extract intrinsic mode functions itself. A caller
//! that wants mode-decomposition detrending supplies a [`ModeDecomposer`]
//! when building the analyzer; the analyzer removes the chosen components
//! from the profile once, before the lag loop.

use crate::errors::{MfdfaError, MfdfaResult};
use std::fmt::Debug;

/// Additive decomposition of a series into ordered components.
///
/// `decompose` returns every intrinsic component followed by the residual
/// trend as the last entry; each component has the length of the input and
/// the components sum back to the input.
pub trait ModeDecomposer: Debug + Send + Sync {
    /// Splits `series` into its ordered components, residual last.
    fn decompose(&self, series: &[f64]) -> MfdfaResult<Vec<Vec<f64>>>;

    /// Returns `series` with the components at `indices` subtracted.
    ///
    /// An empty index list returns the series unchanged without decomposing.
    fn remove_components(&self, series: &[f64], indices: &[usize]) -> MfdfaResult<Vec<f64>> {
        if indices.is_empty() {
            return Ok(series.to_vec());
        }

        let components = self.decompose(series)?;
        let mut detrended = series.to_vec();
        for &index in indices {
            let component = components.get(index).ok_or_else(|| MfdfaError::InvalidParameter {
                parameter: "component index".to_string(),
                value: index as f64,
                constraint: format!("< {} (number of components)", components.len()),
            })?;
            if component.len() != series.len() {
                return Err(MfdfaError::DimensionMismatch {
                    context: format!("component {} length vs series length", index),
                    expected: series.len(),
                    actual: component.len(),
                });
            }
            for (value, c) in detrended.iter_mut().zip(component) {
                *value -= c;
            }
        }
        Ok(detrended)
    }
}

/// Serves components computed ahead of time by an external tool.
///
/// `decompose` ignores the sample values and only checks that the requested
/// length matches the stored components.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedModes {
    components: Vec<Vec<f64>>,
}

impl PrecomputedModes {
    /// Wraps the components (residual last). All must share one length.
    pub fn new(components: Vec<Vec<f64>>) -> MfdfaResult<Self> {
        let Some(first) = components.first() else {
            return Err(MfdfaError::InsufficientData {
                required: 1,
                actual: 0,
            });
        };
        let len = first.len();
        if let Some((i, bad)) = components.iter().enumerate().find(|(_, c)| c.len() != len) {
            return Err(MfdfaError::DimensionMismatch {
                context: format!("component {} length vs component 0 length", i),
                expected: len,
                actual: bad.len(),
            });
        }
        Ok(Self { components })
    }

    /// Number of stored components, residual included
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false; construction rejects an empty set
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl ModeDecomposer for PrecomputedModes {
    fn decompose(&self, series: &[f64]) -> MfdfaResult<Vec<Vec<f64>>> {
        let len = self.components[0].len();
        if series.len() != len {
            return Err(MfdfaError::DimensionMismatch {
                context: "series length vs precomputed components".to_string(),
                expected: len,
                actual: series.len(),
            });
        }
        Ok(self.components.clone())
    }
}
