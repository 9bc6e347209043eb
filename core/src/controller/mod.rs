//! Braking policy, its static compilation and the per-tick controller
//!
//! - **policy**: threshold presets and the shared [`decide`] rule
//! - **compiler**: [`ControllerLogicCompiler`], cell classification and PRISM formulas
//! - **live**: [`LiveController`], one command per tick

mod compiler;
mod live;
mod policy;

pub use compiler::{ClassPartition, ControllerLogicCompiler};
pub use live::{ControlLabel, ControlOutput, LiveController, DEFAULT_DRIVE_ACCELERATION};
pub use policy::{decide, Decision, PolicyClass, PolicyThresholds, Regime, ThresholdPreset};
