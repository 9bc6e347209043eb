//! Named grid resolutions and default state-space bounds

use crate::error::AbstractionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed `[min, max]` range covered along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Default bounds: gap/position, velocity, acceleration
pub const DEFAULT_BOUNDS: [AxisBounds; 3] = [
    AxisBounds::new(0.0, 100.0),
    AxisBounds::new(0.0, 30.0),
    AxisBounds::new(-10.0, 5.0),
];

/// Granularity presets, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridPreset {
    /// Very coarse, minimal states; physics will be rough
    Debug,
    /// Low resolution, good for connectivity checks
    Coarse,
    /// Balanced accuracy against state-space size
    Medium,
    /// High fidelity, tens of thousands of states
    Fine,
}

impl GridPreset {
    /// All presets, coarsest first
    pub const ALL: [GridPreset; 4] = [
        GridPreset::Debug,
        GridPreset::Coarse,
        GridPreset::Medium,
        GridPreset::Fine,
    ];

    /// Cell widths along (position, velocity, acceleration)
    pub fn resolution(self) -> [f64; 3] {
        match self {
            GridPreset::Debug => [5.0, 2.0, 1.0],
            GridPreset::Coarse => [2.0, 1.0, 0.5],
            GridPreset::Medium => [1.0, 0.5, 0.25],
            GridPreset::Fine => [0.5, 0.1, 0.1],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GridPreset::Debug => "debug",
            GridPreset::Coarse => "coarse",
            GridPreset::Medium => "medium",
            GridPreset::Fine => "fine",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GridPreset::Debug => "Super fast generation, physics will be very rough",
            GridPreset::Coarse => "Good for initial connectivity checks",
            GridPreset::Medium => "Balanced trade-off between accuracy and state space size",
            GridPreset::Fine => "High precision, captures subtle physics",
        }
    }
}

impl Default for GridPreset {
    fn default() -> Self {
        GridPreset::Medium
    }
}

impl fmt::Display for GridPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GridPreset {
    type Err = AbstractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GridPreset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = GridPreset::ALL.iter().map(|p| p.name()).collect();
                AbstractionError::config(format!(
                    "Unknown grid preset '{}'. Available: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        for preset in GridPreset::ALL {
            assert_eq!(preset.name().parse::<GridPreset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_unknown_preset_is_configuration_error() {
        let err = "ultra".parse::<GridPreset>().unwrap_err();
        assert!(matches!(err, AbstractionError::Configuration(_)));
        assert!(err.to_string().contains("ultra"));
    }

    #[test]
    fn test_presets_get_finer() {
        let widths: Vec<f64> = GridPreset::ALL
            .iter()
            .map(|p| p.resolution().iter().cloned().fold(0.0, f64::max))
            .collect();
        assert!(widths.windows(2).all(|w| w[0] >= w[1]));
    }
}
