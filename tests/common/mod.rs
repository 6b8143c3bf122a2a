//! Seeded signal generators shared by the integration tests.

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::StandardNormal;
use rustfft::{num_complex::Complex, FftPlanner};

/// Gaussian white noise with zero mean and unit variance.
pub fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect()
}

/// Running sum of `data`.
pub fn cumulative_sum(data: &[f64]) -> Vec<f64> {
    data.iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Brownian random walk of `n` steps.
pub fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    cumulative_sum(&white_noise(n, seed))
}

/// Fractional Gaussian noise by the Davies-Harte circulant embedding.
///
/// `hurst` must lie in (0, 1); 0.5 gives white noise.
pub fn fractional_gaussian_noise(n: usize, hurst: f64, seed: u64) -> Vec<f64> {
    assert!(n >= 2, "need at least two samples");
    assert!(hurst > 0.0 && hurst < 1.0, "Hurst index must be in (0, 1)");

    let two_h = 2.0 * hurst;
    let autocovariance: Vec<f64> = (0..n)
        .map(|k| {
            let k = k as f64;
            0.5 * ((k - 1.0).abs().powf(two_h) - 2.0 * k.powf(two_h) + (k + 1.0).powf(two_h))
        })
        .collect();

    // First row of the 2n circulant: gamma(0..n), 0, gamma(n-1..1)
    let mut circulant: Vec<Complex<f64>> = autocovariance
        .iter()
        .copied()
        .chain(std::iter::once(0.0))
        .chain(autocovariance[1..].iter().rev().copied())
        .map(|c| Complex::new(c, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(2 * n);
    fft.process(&mut circulant);
    let eigen: Vec<f64> = circulant.iter().map(|c| c.re.max(0.0).sqrt()).collect();

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let gn: Vec<f64> = (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
    let gn2: Vec<f64> = (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();

    let edge = (2.0 * n as f64).sqrt();
    let inner = (4.0 * n as f64).sqrt();

    let mut w = Vec::with_capacity(2 * n);
    w.push(Complex::new(eigen[0] / edge * gn[0], 0.0));
    for k in 1..n {
        w.push(Complex::new(gn[k], gn2[k]) * (eigen[k] / inner));
    }
    w.push(Complex::new(eigen[n] / edge * gn2[0], 0.0));
    for i in 0..n - 1 {
        let k = n - 1 - i;
        w.push(Complex::new(gn[k], -gn2[k]) * (eigen[n + 1 + i] / inner));
    }

    fft.process(&mut w);
    let scale = (1.0 / n as f64).powf(hurst);
    w[..n].iter().map(|c| c.re * scale).collect()
}

/// Log-spaced lags between `min` and `n / 10`.
pub fn test_lags(n: usize, min: f64) -> Vec<f64> {
    mfdfa::log_spaced_lags(n, 40)
        .expect("valid lag grid")
        .into_iter()
        .filter(|&lag| lag >= min && lag <= n as f64 / 10.0)
        .collect()
}
