//! Per-tick controller
//!
//! Runs the same [`decide`] rule as the compiler and commands the acceleration
//! of the same-named action, so the live command is the one the IMDP models.

use super::policy::{decide, PolicyClass, PolicyThresholds, Regime, ThresholdPreset};
use crate::actions::ActionSet;
use crate::error::{AbstractionError, Result};
use serde::Serialize;
use std::fmt;

/// Acceleration commanded when nothing is detected
pub const DEFAULT_DRIVE_ACCELERATION: f64 = 1.0;

/// Controller state reported alongside the command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlLabel {
    Drive,
    Stopped,
    Coast,
    Brake,
    EmergencyBrake,
}

impl ControlLabel {
    pub fn name(self) -> &'static str {
        match self {
            ControlLabel::Drive => "drive",
            ControlLabel::Stopped => "stopped",
            ControlLabel::Coast => "coast",
            ControlLabel::Brake => "brake",
            ControlLabel::EmergencyBrake => "emergency_brake",
        }
    }
}

impl fmt::Display for ControlLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlOutput {
    pub acceleration: f64,
    pub label: ControlLabel,

    /// Class chosen by the policy; `None` while driving
    pub class: Option<PolicyClass>,
}

#[derive(Debug, Clone)]
pub struct LiveController {
    preset: ThresholdPreset,
    thresholds: PolicyThresholds,
    drive_acceleration: f64,

    /// Indexed like `PolicyClass::ALL`
    class_accelerations: [f64; 3],
}

impl LiveController {
    /// Bind a preset to an action set
    ///
    /// Fails when some policy class has no same-named action.
    pub fn new(preset: ThresholdPreset, actions: &ActionSet) -> Result<Self> {
        let mut class_accelerations = [0.0; 3];
        for (slot, class) in class_accelerations.iter_mut().zip(PolicyClass::ALL) {
            let action = actions.get(class.action_name()).ok_or_else(|| {
                AbstractionError::config(format!(
                    "Controller preset '{}' needs an action named '{}'",
                    preset,
                    class.action_name()
                ))
            })?;
            *slot = action.acceleration;
        }

        Ok(Self {
            preset,
            thresholds: preset.thresholds(),
            drive_acceleration: DEFAULT_DRIVE_ACCELERATION,
            class_accelerations,
        })
    }

    pub fn with_drive_acceleration(mut self, acceleration: f64) -> Self {
        self.drive_acceleration = acceleration;
        self
    }

    pub fn preset(&self) -> ThresholdPreset {
        self.preset
    }

    fn acceleration_for(&self, class: PolicyClass) -> f64 {
        let i = match class {
            PolicyClass::BrakeFull => 0,
            PolicyClass::BrakeWarn => 1,
            PolicyClass::Coast => 2,
        };
        self.class_accelerations[i]
    }

    /// One control tick
    pub fn step(&self, detected: bool, gap: f64, closing_speed: f64) -> ControlOutput {
        if closing_speed < self.thresholds.stopped_speed {
            return ControlOutput {
                acceleration: self.acceleration_for(PolicyClass::Coast),
                label: ControlLabel::Stopped,
                class: Some(PolicyClass::Coast),
            };
        }

        if !detected {
            return ControlOutput {
                acceleration: self.drive_acceleration,
                label: ControlLabel::Drive,
                class: None,
            };
        }

        let decision = decide(&self.thresholds, gap, closing_speed);
        let label = match (decision.regime, decision.class) {
            (Regime::Stopped, _) => ControlLabel::Stopped,
            (_, PolicyClass::BrakeFull) => ControlLabel::EmergencyBrake,
            (_, PolicyClass::BrakeWarn) => ControlLabel::Brake,
            (_, PolicyClass::Coast) => ControlLabel::Coast,
        };

        ControlOutput {
            acceleration: self.acceleration_for(decision.class),
            label,
            class: Some(decision.class),
        }
    }
}
