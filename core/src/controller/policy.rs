//! Two-regime braking policy
//!
//! Below the low-speed cutoff the policy compares the gap against fixed
//! distances; at or above it, against time-to-collision thresholds. This is
//! the only place the thresholds are evaluated.

use crate::error::{AbstractionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action class chosen by the policy, named after the IMDP action it permits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyClass {
    BrakeFull,
    BrakeWarn,
    Coast,
}

impl PolicyClass {
    /// Emission order, highest risk first
    pub const ALL: [PolicyClass; 3] =
        [PolicyClass::BrakeFull, PolicyClass::BrakeWarn, PolicyClass::Coast];

    /// Name of the IMDP action this class permits
    pub fn action_name(self) -> &'static str {
        match self {
            PolicyClass::BrakeFull => "brake_full",
            PolicyClass::BrakeWarn => "brake_warn",
            PolicyClass::Coast => "coast",
        }
    }
}

impl fmt::Display for PolicyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_name())
    }
}

/// Named threshold sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPreset {
    /// Conservative, early braking
    #[default]
    Safe,
    /// Aggressive, late braking
    Industry,
}

impl ThresholdPreset {
    pub const ALL: [ThresholdPreset; 2] = [ThresholdPreset::Safe, ThresholdPreset::Industry];

    pub fn name(self) -> &'static str {
        match self {
            ThresholdPreset::Safe => "safe",
            ThresholdPreset::Industry => "industry",
        }
    }

    pub fn thresholds(self) -> PolicyThresholds {
        match self {
            ThresholdPreset::Safe => PolicyThresholds {
                ttc_warn: 6.0,
                ttc_brake: 5.0,
                ttc_emergency: 4.0,
                dist_warn: 15.0,
                dist_brake: 10.0,
                dist_emergency: 5.0,
                ..PolicyThresholds::SPEED_LIMITS
            },
            ThresholdPreset::Industry => PolicyThresholds {
                ttc_warn: 2.6,
                ttc_brake: 1.6,
                ttc_emergency: 1.0,
                dist_warn: 10.0,
                dist_brake: 6.0,
                dist_emergency: 2.0,
                ..PolicyThresholds::SPEED_LIMITS
            },
        }
    }
}

impl fmt::Display for ThresholdPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThresholdPreset {
    type Err = AbstractionError;

    fn from_str(s: &str) -> Result<Self> {
        ThresholdPreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                AbstractionError::config(format!(
                    "Unknown controller preset '{}' (expected one of: safe, industry)",
                    s
                ))
            })
    }
}

/// Resolved thresholds of one preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyThresholds {
    /// Time-to-collision bands in seconds (high-speed regime)
    pub ttc_warn: f64,
    pub ttc_brake: f64,
    pub ttc_emergency: f64,

    /// Gap bands in metres (low-speed regime)
    pub dist_warn: f64,
    pub dist_brake: f64,
    pub dist_emergency: f64,

    /// Speeds at or above this use TTC
    pub low_speed_cutoff: f64,

    /// Speeds below this count as stopped
    pub stopped_speed: f64,
}

impl PolicyThresholds {
    const SPEED_LIMITS: PolicyThresholds = PolicyThresholds {
        ttc_warn: 0.0,
        ttc_brake: 0.0,
        ttc_emergency: 0.0,
        dist_warn: 0.0,
        dist_brake: 0.0,
        dist_emergency: 0.0,
        low_speed_cutoff: 5.0,
        stopped_speed: 0.1,
    };
}

/// Which branch of the policy produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Stopped,
    LowSpeed,
    HighSpeed { ttc: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub class: PolicyClass,
    pub regime: Regime,

    /// Inside the warning band; the class is still `Coast`
    pub warning: bool,
}

/// Classify a detected obstacle at `gap` metres closing at `closing_speed` m/s
pub fn decide(thresholds: &PolicyThresholds, gap: f64, closing_speed: f64) -> Decision {
    let t = thresholds;

    if closing_speed < t.stopped_speed {
        return Decision {
            class: PolicyClass::Coast,
            regime: Regime::Stopped,
            warning: false,
        };
    }

    if closing_speed < t.low_speed_cutoff {
        let class = if gap < t.dist_emergency {
            PolicyClass::BrakeFull
        } else if gap < t.dist_brake {
            PolicyClass::BrakeWarn
        } else {
            PolicyClass::Coast
        };
        return Decision {
            class,
            regime: Regime::LowSpeed,
            warning: class == PolicyClass::Coast && gap < t.dist_warn,
        };
    }

    let ttc = gap / closing_speed;
    let class = if ttc < t.ttc_emergency {
        PolicyClass::BrakeFull
    } else if ttc < t.ttc_brake {
        PolicyClass::BrakeWarn
    } else {
        PolicyClass::Coast
    };
    Decision {
        class,
        regime: Regime::HighSpeed { ttc },
        warning: class == PolicyClass::Coast && ttc < t.ttc_warn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_preset_bands() {
        let t = ThresholdPreset::Safe.thresholds();

        // TTC 0.3 s
        assert_eq!(decide(&t, 3.0, 10.0).class, PolicyClass::BrakeFull);
        // TTC 10 s, right at the cutoff so the TTC rule applies
        let d = decide(&t, 50.0, 5.0);
        assert_eq!(d.class, PolicyClass::Coast);
        assert!(matches!(d.regime, Regime::HighSpeed { ttc } if (ttc - 10.0).abs() < 1e-12));
        // TTC 4.5 s
        assert_eq!(decide(&t, 45.0, 10.0).class, PolicyClass::BrakeWarn);
        // TTC 5.5 s: coast, but warned
        let d = decide(&t, 55.0, 10.0);
        assert_eq!(d.class, PolicyClass::Coast);
        assert!(d.warning);
    }

    #[test]
    fn test_low_speed_uses_distance() {
        let t = ThresholdPreset::Safe.thresholds();

        assert_eq!(decide(&t, 4.0, 2.0).class, PolicyClass::BrakeFull);
        assert_eq!(decide(&t, 8.0, 2.0).class, PolicyClass::BrakeWarn);

        let d = decide(&t, 12.0, 2.0);
        assert_eq!(d.class, PolicyClass::Coast);
        assert_eq!(d.regime, Regime::LowSpeed);
        assert!(d.warning);

        assert!(!decide(&t, 20.0, 2.0).warning);
    }

    #[test]
    fn test_stopped_is_coast() {
        for preset in ThresholdPreset::ALL {
            let d = decide(&preset.thresholds(), 0.5, 0.05);
            assert_eq!(d.class, PolicyClass::Coast);
            assert_eq!(d.regime, Regime::Stopped);
        }
    }

    #[test]
    fn test_industry_brakes_later() {
        let safe = ThresholdPreset::Safe.thresholds();
        let industry = ThresholdPreset::Industry.thresholds();

        // TTC 3 s
        assert_eq!(decide(&safe, 60.0, 20.0).class, PolicyClass::BrakeFull);
        assert_eq!(decide(&industry, 60.0, 20.0).class, PolicyClass::Coast);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("safe".parse::<ThresholdPreset>().unwrap(), ThresholdPreset::Safe);
        assert_eq!("INDUSTRY".parse::<ThresholdPreset>().unwrap(), ThresholdPreset::Industry);
        assert!(matches!(
            "reckless".parse::<ThresholdPreset>(),
            Err(AbstractionError::Configuration(_))
        ));
    }

    #[test]
    fn test_class_order_and_names() {
        let names: Vec<_> = PolicyClass::ALL.iter().map(|c| c.action_name()).collect();
        assert_eq!(names, vec!["brake_full", "brake_warn", "coast"]);
    }
}
