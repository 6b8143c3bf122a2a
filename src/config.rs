//! # Analysis Configuration
//!
//! Typed configuration for a fluctuation analysis call: how the profile is
//! detrended, whether windows overlap, and which diagnostics are produced.

use crate::errors::{MfdfaError, MfdfaResult};
use crate::moments::TilingCombination;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Detrending strategy applied before the variances are measured
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DetrendMode {
    /// No detrending: plain fluctuation analysis on the profile
    None,
    /// Least-squares polynomial of the given degree removed from every segment
    Polynomial {
        /// Polynomial degree (1 is DFA1)
        order: usize,
    },
    /// Chosen intrinsic components removed from the whole profile once
    ModeDecomposition {
        /// Indices of the components to subtract
        components: Vec<usize>,
    },
}

impl DetrendMode {
    /// Polynomial order used in the per-segment fit; zero when none is fitted
    pub fn effective_order(&self) -> usize {
        match self {
            DetrendMode::Polynomial { order } => *order,
            DetrendMode::None | DetrendMode::ModeDecomposition { .. } => 0,
        }
    }
}

impl Default for DetrendMode {
    fn default() -> Self {
        DetrendMode::Polynomial { order: 1 }
    }
}

/// Configuration for one MFDFA call
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MfdfaConfig {
    /// Detrending strategy
    pub detrend: DetrendMode,
    /// Integrate the profile a second time (for strongly anti-correlated data)
    pub modified: bool,
    /// Overlapping windows advanced by this stride instead of forward/backward tiling
    pub moving_window: Option<NonZeroUsize>,
    /// Produce the per-lag standard deviation matrix
    pub compute_stats: bool,
    /// Produce the per-lag extrema spread (max minus min segment variance)
    pub compute_extrema_spread: bool,
    /// How the forward and backward tilings are combined
    pub combination: TilingCombination,
}

impl MfdfaConfig {
    /// DFA with a polynomial of degree `order`
    pub fn polynomial(order: usize) -> Self {
        Self {
            detrend: DetrendMode::Polynomial { order },
            ..Self::default()
        }
    }

    /// Fluctuation analysis without any detrending
    pub fn no_detrending() -> Self {
        Self {
            detrend: DetrendMode::None,
            ..Self::default()
        }
    }

    /// Detrending by removing the given intrinsic components from the profile
    pub fn mode_decomposition(components: Vec<usize>) -> Self {
        Self {
            detrend: DetrendMode::ModeDecomposition { components },
            ..Self::default()
        }
    }

    /// Toggle the double-integrated profile
    pub fn with_modified(mut self, modified: bool) -> Self {
        self.modified = modified;
        self
    }

    /// Use overlapping windows advanced by `stride` samples.
    ///
    /// A zero stride is rejected with [`MfdfaError::InvalidLag`].
    pub fn with_moving_window(mut self, stride: usize) -> MfdfaResult<Self> {
        let stride = NonZeroUsize::new(stride).ok_or_else(|| MfdfaError::InvalidLag {
            lag: 0.0,
            reason: "moving-window stride must be a positive integer".to_string(),
        })?;
        self.moving_window = Some(stride);
        Ok(self)
    }

    /// Request the standard deviation matrix
    pub fn with_stats(mut self, compute_stats: bool) -> Self {
        self.compute_stats = compute_stats;
        self
    }

    /// Request the extrema spread
    pub fn with_extrema_spread(mut self, compute: bool) -> Self {
        self.compute_extrema_spread = compute;
        self
    }

    /// Choose how forward and backward tilings are combined
    pub fn with_combination(mut self, combination: TilingCombination) -> Self {
        self.combination = combination;
        self
    }
}
