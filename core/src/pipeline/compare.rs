//! Resolution sanity check across grid presets
//!
//! Probes the cell holding a reference state under one acceleration and
//! checks whether the grid is fine enough for the velocity change to show up
//! in the cell-center estimate.

use crate::abstraction::{AbstractionEngine, EngineConfig};
use crate::dynamics::DynamicsModel;
use crate::error::Result;
use crate::grid::{AxisBounds, ContinuousState, GridPartition, GridPreset, DIMS};
use serde::Serialize;
use std::fmt;

/// Velocity changes smaller than this count as not captured
const DELTA_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    /// Velocity change has the sign of the commanded acceleration
    Captured,
    /// Velocity change lost in the discretization
    TooCoarse,
    /// Velocity moved against a braking command
    Accelerated,
    OutOfBounds,
    NoTransitions,
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComparisonStatus::Captured => "captured",
            ComparisonStatus::TooCoarse => "too coarse",
            ComparisonStatus::Accelerated => "accelerated",
            ComparisonStatus::OutOfBounds => "out of bounds",
            ComparisonStatus::NoTransitions => "no transitions",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetComparison {
    pub preset: GridPreset,
    pub resolution: [f64; DIMS],
    pub states: usize,
    pub error_margin: f64,
    pub targets: usize,

    /// Mean velocity change over target cell centers
    pub center_delta_v: Option<f64>,

    /// Mean velocity change of the next-state distribution restricted to the grid
    pub distribution_delta_v: Option<f64>,

    pub status: ComparisonStatus,
}

/// Probe `reference` under `acceleration` on every preset
pub fn compare_presets(
    dynamics: &dyn DynamicsModel,
    bounds: [AxisBounds; DIMS],
    presets: &[GridPreset],
    engine_config: EngineConfig,
    reference: ContinuousState,
    acceleration: f64,
) -> Result<Vec<PresetComparison>> {
    presets
        .iter()
        .map(|&preset| {
            let grid = GridPartition::from_preset(preset, bounds)?;
            let engine = AbstractionEngine::new(dynamics, &grid, engine_config)?;

            let mut row = PresetComparison {
                preset,
                resolution: *grid.resolution(),
                states: grid.total_cells(),
                error_margin: engine.error_margin(),
                targets: 0,
                center_delta_v: None,
                distribution_delta_v: None,
                status: ComparisonStatus::OutOfBounds,
            };

            let Some(index) = grid.state_to_index(&reference) else {
                return Ok(row);
            };

            let probe = engine.probe(&index, acceleration);
            row.targets = probe.transitions.len();

            let Some(center) = probe.mean_target_center else {
                row.status = ComparisonStatus::NoTransitions;
                return Ok(row);
            };

            let delta = center.velocity - reference.velocity;
            row.center_delta_v = Some(delta);
            row.distribution_delta_v =
                probe.mean_next_state.map(|s| s.velocity - reference.velocity);
            row.status = classify_delta(delta, acceleration);
            Ok(row)
        })
        .collect()
}

fn classify_delta(delta: f64, acceleration: f64) -> ComparisonStatus {
    let expected = if acceleration < 0.0 { -1.0 } else { 1.0 };
    let signed = delta * expected;

    if signed > DELTA_TOLERANCE {
        ComparisonStatus::Captured
    } else if signed < -DELTA_TOLERANCE {
        ComparisonStatus::Accelerated
    } else {
        ComparisonStatus::TooCoarse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::{PlantConfig, VehiclePlant};
    use crate::grid::DEFAULT_BOUNDS;

    #[test]
    fn test_braking_from_twenty() {
        let plant = VehiclePlant::new(PlantConfig::default()).unwrap();
        let rows = compare_presets(
            &plant,
            DEFAULT_BOUNDS,
            &[GridPreset::Debug, GridPreset::Medium],
            EngineConfig::default(),
            ContinuousState::new(50.0, 20.0, 0.0),
            -4.0,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(row.targets > 0);
            assert!(row.distribution_delta_v.unwrap() < 0.0);
        }

        // A 2 m/s velocity bucket cannot see a 0.2 m/s change
        assert_eq!(rows[0].status, ComparisonStatus::TooCoarse);
        assert!(rows[0].error_margin > rows[1].error_margin);
    }

    #[test]
    fn test_out_of_bounds_reference() {
        let plant = VehiclePlant::new(PlantConfig::default()).unwrap();
        let rows = compare_presets(
            &plant,
            DEFAULT_BOUNDS,
            &GridPreset::ALL,
            EngineConfig::default(),
            ContinuousState::new(500.0, 20.0, 0.0),
            -4.0,
        )
        .unwrap();

        assert!(rows.iter().all(|r| r.status == ComparisonStatus::OutOfBounds));
        assert!(rows.iter().all(|r| r.center_delta_v.is_none()));
    }

    #[test]
    fn test_delta_classification() {
        assert_eq!(classify_delta(-0.2, -4.0), ComparisonStatus::Captured);
        assert_eq!(classify_delta(0.2, -4.0), ComparisonStatus::Accelerated);
        assert_eq!(classify_delta(0.001, -4.0), ComparisonStatus::TooCoarse);
        assert_eq!(classify_delta(0.2, 1.0), ComparisonStatus::Captured);
    }
}
