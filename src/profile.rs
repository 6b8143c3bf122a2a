//! Profile construction (mean-centred cumulative sum).

use crate::errors::MfdfaResult;
use crate::series::validate_series;

/// Builds the profile of a series.
///
/// The series is mean-centred and cumulatively summed. With `modified` set the
/// result is centred and summed a second time, which lifts strongly
/// anti-persistent input (h ≈ 0) into a range the detrending can resolve.
///
/// # Example
/// ```rust
/// use mfdfa::profile::build_profile;
///
/// let profile = build_profile(&[1.0, 3.0, 2.0], false).unwrap();
/// assert_eq!(profile, vec![-1.0, 0.0, 0.0]);
/// ```
pub fn build_profile(series: &[f64], modified: bool) -> MfdfaResult<Vec<f64>> {
    validate_series(series)?;

    let profile = centred_cumsum(series);
    if modified {
        Ok(centred_cumsum(&profile))
    } else {
        Ok(profile)
    }
}

fn centred_cumsum(data: &[f64]) -> Vec<f64> {
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    data.iter()
        .scan(0.0, |acc, &x| {
            *acc += x - mean;
            Some(*acc)
        })
        .collect()
}
