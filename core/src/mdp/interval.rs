//! Probability intervals

use crate::error::{AbstractionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed probability interval `[lower, upper]` with `0 <= lower <= upper <= 1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// Checked constructor
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite()) || lower < 0.0 || upper > 1.0 || lower > upper
        {
            return Err(AbstractionError::config(format!(
                "Invalid probability interval [{}, {}]: need 0 <= p_min <= p_max <= 1",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Widen a nominal probability by `margin` on both sides, clamped to [0, 1]
    pub fn around(mass: f64, margin: f64) -> Self {
        let lower = (mass - margin).clamp(0.0, 1.0);
        let upper = (mass + margin).clamp(0.0, 1.0);
        Self { lower, upper }
    }

    /// Degenerate interval `[p, p]`
    pub fn point(p: f64) -> Result<Self> {
        Self::new(p, p)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn contains(&self, p: f64) -> bool {
        self.lower <= p && p <= self.upper
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_intervals() {
        assert!(Interval::new(0.0, 1.0).is_ok());
        assert!(Interval::new(0.3, 0.3).is_ok());
        assert!(Interval::point(1.0).is_ok());
    }

    #[test]
    fn test_invalid_intervals() {
        assert!(Interval::new(-0.1, 0.5).is_err());
        assert!(Interval::new(0.2, 1.1).is_err());
        assert!(Interval::new(0.6, 0.5).is_err());
        assert!(Interval::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_around_clamps() {
        let i = Interval::around(0.95, 0.1);
        assert!((i.lower - 0.85).abs() < 1e-12);
        assert_eq!(i.upper, 1.0);
        assert!(i.contains(0.95));

        let j = Interval::around(0.02, 0.1);
        assert_eq!(j.lower, 0.0);
    }

    #[test]
    fn test_display_is_exact() {
        let i = Interval::new(0.1, 0.25).unwrap();
        assert_eq!(i.to_string(), "[0.1,0.25]");
        assert_eq!(Interval::point(1.0).unwrap().to_string(), "[1,1]");
    }
}
