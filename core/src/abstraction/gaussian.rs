//! Gaussian kernel helpers
//!
//! `erfc` uses the Abramowitz & Stegun 7.1.26 rational approximation
//! (absolute error below 1.5e-7), evaluated on the tail side so small
//! probabilities keep their relative precision.

use std::f64::consts::{PI, SQRT_2};

/// Complementary error function
pub fn erfc(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let z = x.abs();
    let t = 1.0 / (1.0 + P * z);
    let tail = (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-z * z).exp();

    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

/// Error function
pub fn erf(x: f64) -> f64 {
    1.0 - erfc(x)
}

/// Standard normal CDF
pub fn standard_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Standard normal density
pub fn standard_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// `P(low <= X < high)` for `X ~ N(mean, sigma^2)`
///
/// With `sigma == 0` the distribution is a point mass at `mean`.
pub fn interval_mass(low: f64, high: f64, mean: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return if low <= mean && mean < high { 1.0 } else { 0.0 };
    }

    let zl = (low - mean) / sigma;
    let zh = (high - mean) / sigma;

    let mass = if zl > 0.0 {
        // Both bounds in the upper tail: mirror to avoid 1 - 1 cancellation
        standard_cdf(-zl) - standard_cdf(-zh)
    } else {
        standard_cdf(zh) - standard_cdf(zl)
    };

    mass.clamp(0.0, 1.0)
}

/// Mean of `N(mean, sigma^2)` conditioned on `[low, high)`
pub fn truncated_mean(low: f64, high: f64, mean: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return mean.clamp(low, high);
    }

    let mass = interval_mass(low, high, mean, sigma);
    if mass < 1e-300 {
        return mean.clamp(low, high);
    }

    let alpha = (low - mean) / sigma;
    let beta = (high - mean) / sigma;
    let shifted = mean + sigma * (standard_pdf(alpha) - standard_pdf(beta)) / mass;

    shifted.clamp(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_reference_values() {
        assert!((standard_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((standard_cdf(1.959964) - 0.975).abs() < 1e-6);
        assert!((standard_cdf(-1.0) - 0.158655254).abs() < 1e-6);
        assert!((erf(0.5) - 0.520499878).abs() < 1e-6);
    }

    #[test]
    fn test_cdf_symmetry() {
        for z in [0.1, 0.7, 1.3, 2.9, 4.0] {
            assert!((standard_cdf(z) + standard_cdf(-z) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_interval_mass() {
        let one_sigma = interval_mass(-1.0, 1.0, 0.0, 1.0);
        assert!((one_sigma - 0.682689).abs() < 1e-5);

        // Shifting the interval and the mean together changes nothing
        let shifted = interval_mass(9.0, 11.0, 10.0, 1.0);
        assert!((shifted - one_sigma).abs() < 1e-9);

        // Upper tail keeps relative precision
        let tail = interval_mass(6.0, 7.0, 0.0, 1.0);
        assert!(tail > 0.0 && tail < 1e-8);
    }

    #[test]
    fn test_interval_mass_degenerate_sigma() {
        assert_eq!(interval_mass(0.0, 1.0, 0.5, 0.0), 1.0);
        assert_eq!(interval_mass(0.0, 1.0, 1.0, 0.0), 0.0);
        assert_eq!(interval_mass(0.0, 1.0, 0.0, 0.0), 1.0);
        assert_eq!(interval_mass(0.0, 1.0, -0.1, 0.0), 0.0);
    }

    #[test]
    fn test_truncated_mean() {
        // Symmetric window keeps the mean
        assert!((truncated_mean(-1.0, 1.0, 0.0, 1.0)).abs() < 1e-9);

        // Half-normal mean is sqrt(2/pi)
        let half = truncated_mean(0.0, 50.0, 0.0, 1.0);
        assert!((half - (2.0 / PI).sqrt()).abs() < 1e-6);

        // Always inside the window
        let far = truncated_mean(10.0, 11.0, 0.0, 1.0);
        assert!((10.0..=11.0).contains(&far));

        assert_eq!(truncated_mean(0.0, 1.0, 3.0, 0.0), 1.0);
    }
}
