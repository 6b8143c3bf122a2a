//! Partitioning of a profile into fixed-length segments.
//!
//! Segments borrow from the profile; no tiling copies sample data. Any
//! remainder that does not fill a whole segment is dropped, so every row of a
//! [`SegmentBatch`] has exactly `lag` samples.

use crate::errors::{MfdfaError, MfdfaResult};
use std::num::NonZeroUsize;

/// How a profile is cut into windows of one lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tiling {
    /// Non-overlapping windows from the start; the last `N mod lag` samples are dropped.
    Forward,
    /// Non-overlapping windows aligned to the end; the first `N mod lag` samples are dropped.
    Backward,
    /// One forward tiling per offset `0, stride, 2*stride, ...` below `lag - 1`.
    MovingWindow {
        /// Step between successive window offsets
        stride: NonZeroUsize,
    },
}

/// Equal-length segments of a profile for a single lag.
#[derive(Debug, Clone)]
pub struct SegmentBatch<'a> {
    lag: usize,
    rows: Vec<&'a [f64]>,
}

impl<'a> SegmentBatch<'a> {
    /// Window length shared by every row
    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the batch holds no segments
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The segments, in tiling order
    pub fn rows(&self) -> &[&'a [f64]] {
        &self.rows
    }
}

/// Cuts `profile` into segments of length `lag` according to `tiling`.
///
/// # Example
/// ```rust
/// use mfdfa::segmentation::{segment, Tiling};
///
/// let profile = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let forward = segment(&profile, 2, Tiling::Forward).unwrap();
/// assert_eq!(forward.rows(), &[&[1.0, 2.0][..], &[3.0, 4.0][..]]);
///
/// let backward = segment(&profile, 2, Tiling::Backward).unwrap();
/// assert_eq!(backward.rows(), &[&[2.0, 3.0][..], &[4.0, 5.0][..]]);
/// ```
pub fn segment(profile: &[f64], lag: usize, tiling: Tiling) -> MfdfaResult<SegmentBatch<'_>> {
    let n = profile.len();
    if lag == 0 {
        return Err(MfdfaError::InvalidLag {
            lag: 0.0,
            reason: "window length must be positive".to_string(),
        });
    }
    if lag > n {
        return Err(MfdfaError::InvalidLag {
            lag: lag as f64,
            reason: format!("exceeds profile length {}", n),
        });
    }

    let remainder = n % lag;
    let rows: Vec<&[f64]> = match tiling {
        Tiling::Forward => profile[..n - remainder].chunks_exact(lag).collect(),
        Tiling::Backward => profile[remainder..].chunks_exact(lag).collect(),
        Tiling::MovingWindow { stride } => window_offsets(lag, stride)
            .flat_map(move |offset| {
                let rest = &profile[offset..];
                rest[..rest.len() - rest.len() % lag].chunks_exact(lag)
            })
            .collect(),
    };

    Ok(SegmentBatch { lag, rows })
}

/// Number of segments a tiling yields for a profile of length `n`.
pub fn segment_count(n: usize, lag: usize, tiling: Tiling) -> usize {
    if lag == 0 || lag > n {
        return 0;
    }
    match tiling {
        Tiling::Forward | Tiling::Backward => n / lag,
        Tiling::MovingWindow { stride } => window_offsets(lag, stride)
            .map(|offset| (n - offset) / lag)
            .sum(),
    }
}

fn window_offsets(lag: usize, stride: NonZeroUsize) -> impl Iterator<Item = usize> {
    // Offsets stop short of lag - 1; a lag of one still gets the zero offset
    (0..(lag - 1).max(1)).step_by(stride.get())
}
