//! Longitudinal IMDP Core
//!
//! Interval MDP abstraction of a stochastic vehicle-following model, with a
//! compiled braking controller, exported to the PRISM language

pub mod error;
pub mod grid;        // State space partition (cells, ids, presets)
pub mod dynamics;    // Plant model and the DynamicsModel seam
pub mod actions;     // Named commanded accelerations
pub mod abstraction; // Interval transitions per (cell, action)
pub mod mdp;         // Interval MDP and PRISM export
pub mod controller;  // Braking policy, compiler and live controller
pub mod pipeline;    // Full enumeration and preset comparison
pub mod config;      // JSON run configuration

pub use error::{AbstractionError, Result};
pub use grid::{
    Axis, AxisBounds, CellId, CellIndex, ContinuousState, GridPartition, GridPreset, DEFAULT_BOUNDS,
};
pub use dynamics::{DynamicsModel, Frame, PlantConfig, VehiclePlant};
pub use actions::{Action, ActionSet};
pub use abstraction::{
    AbstractionEngine, BoundaryMode, EngineConfig, TransitionProbe, TransitionSet,
};
pub use mdp::{Interval, IntervalMdp, MdpStats};
pub use controller::{decide, ControllerLogicCompiler, LiveController, PolicyClass, ThresholdPreset};
pub use pipeline::{
    compare_presets, AbstractionPipeline, ComparisonStatus, PipelineOptions, PresetComparison,
};
pub use config::{load_config, AbstractionConfig, ConfigError};
