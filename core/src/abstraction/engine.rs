//! Per-cell, per-action transition intervals
//!
//! For a source cell the noiseless image of its center is computed, the
//! Gaussian noise kernel is integrated over every target cell inside a
//! `k * sigma` window around that image, and each nominal mass is widened by
//! a Lipschitz error margin covering the rest of the source cell.

use super::gaussian::{interval_mass, truncated_mean};
use crate::dynamics::DynamicsModel;
use crate::error::{AbstractionError, Result};
use crate::grid::{Axis, CellId, CellIndex, ContinuousState, GridPartition, DIMS};
use crate::mdp::Interval;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Target cell id -> probability interval, ordered by id
pub type TransitionSet = BTreeMap<CellId, Interval>;

/// What to do with probability mass that leaves the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Drop it: transitions near the border are partial, and empty when the
    /// whole window lies outside the grid
    #[default]
    Truncate,
    /// Route it to one absorbing escape state with id `total_cells`
    Sink,
}

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Half-width of the search window in standard deviations
    pub window_sigmas: f64,

    /// Scale applied to `L * max_cell_width`
    pub conservatism: f64,

    /// Nominal masses below this are dropped
    pub negligible_mass: f64,

    pub boundary: BoundaryMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_sigmas: 4.0,
            conservatism: 0.1,
            negligible_mass: 1e-6,
            boundary: BoundaryMode::Truncate,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.window_sigmas.is_finite() && self.window_sigmas > 0.0) {
            return Err(AbstractionError::config(format!(
                "window_sigmas must be positive, got {}",
                self.window_sigmas
            )));
        }
        if !(self.conservatism.is_finite() && self.conservatism >= 0.0) {
            return Err(AbstractionError::config(format!(
                "conservatism must be non-negative, got {}",
                self.conservatism
            )));
        }
        if !(self.negligible_mass >= 0.0 && self.negligible_mass < 1.0) {
            return Err(AbstractionError::config(format!(
                "negligible_mass must lie in [0, 1), got {}",
                self.negligible_mass
            )));
        }
        Ok(())
    }
}

/// Diagnostics for a single (cell, action) pair
#[derive(Debug, Clone)]
pub struct TransitionProbe {
    /// Center of the source cell
    pub source_center: ContinuousState,

    /// Noiseless successor of the source center
    pub image: ContinuousState,

    pub transitions: TransitionSet,

    /// Grid target with the largest lower bound (lowest id on ties)
    pub dominant: Option<CellId>,

    /// Target cell centers weighted by interval midpoints
    pub mean_target_center: Option<ContinuousState>,

    /// Next-state distribution mean, per target restricted to the cell,
    /// weighted by interval midpoints
    pub mean_next_state: Option<ContinuousState>,
}

/// Computes interval transition sets for one grid and one dynamics model
pub struct AbstractionEngine<'a> {
    dynamics: &'a dyn DynamicsModel,
    grid: &'a GridPartition,
    config: EngineConfig,
}

impl<'a> AbstractionEngine<'a> {
    pub fn new(
        dynamics: &'a dyn DynamicsModel,
        grid: &'a GridPartition,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dynamics,
            grid,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridPartition {
        self.grid
    }

    /// Number of IMDP states this engine can target
    pub fn num_states(&self) -> usize {
        match self.config.boundary {
            BoundaryMode::Truncate => self.grid.total_cells(),
            BoundaryMode::Sink => self.grid.total_cells() + 1,
        }
    }

    /// Id of the escape state, if enabled
    pub fn sink_id(&self) -> Option<CellId> {
        match self.config.boundary {
            BoundaryMode::Truncate => None,
            BoundaryMode::Sink => Some(CellId(self.grid.total_cells())),
        }
    }

    /// Error margin `L * max_cell_width * conservatism`
    pub fn error_margin(&self) -> f64 {
        self.dynamics.lipschitz_constant() * self.grid.max_cell_width() * self.config.conservatism
    }

    /// Interval transitions from `source` under commanded `acceleration`
    pub fn compute_transitions(&self, source: &CellIndex, acceleration: f64) -> TransitionSet {
        let center = self.grid.index_to_center(source);
        let image = self.dynamics.step(&center, acceleration);
        self.transitions_from_image(&image)
    }

    /// Interval transitions for a kernel centred on `image`
    pub fn transitions_from_image(&self, image: &ContinuousState) -> TransitionSet {
        let sigma = self.dynamics.noise_std();
        let eps = self.error_margin();
        let mut transitions = TransitionSet::new();

        if let Some(masses) = self.axis_masses(image, sigma) {
            let [xs, vs, as_] = &masses;
            for &(ix, mx) in xs {
                for &(iv, mv) in vs {
                    for &(ia, ma) in as_ {
                        let mass = mx * mv * ma;
                        if mass < self.config.negligible_mass {
                            continue;
                        }
                        let id = self.grid.flatten(&CellIndex([ix, iv, ia]));
                        transitions.insert(id, Interval::around(mass, eps));
                    }
                }
            }
        }

        if let Some(sink) = self.sink_id() {
            let escape = self.escape_mass(image, sigma);
            if escape >= self.config.negligible_mass && escape > 0.0 {
                transitions.insert(sink, Interval::around(escape, eps));
            }
        }

        transitions
    }

    /// Per-axis (bucket, mass) lists over the clamped search window
    ///
    /// `None` when the window misses the grid along some axis.
    fn axis_masses(
        &self,
        image: &ContinuousState,
        sigma: f64,
    ) -> Option<[Vec<(usize, f64)>; DIMS]> {
        let radius = self.config.window_sigmas * sigma;
        let mean = image.components();

        let mut spans: Vec<RangeInclusive<usize>> = Vec::with_capacity(DIMS);
        for axis in Axis::ALL {
            let c = mean[axis.dim()];
            spans.push(self.grid.axis_span(axis, c - radius, c + radius)?);
        }

        let mut out: [Vec<(usize, f64)>; DIMS] = Default::default();
        for (d, span) in spans.into_iter().enumerate() {
            let mut corner = [0usize; DIMS];
            for k in span {
                corner[d] = k;
                let (low, high) = self.grid.cell_bounds(&CellIndex(corner))[d];
                let mass = interval_mass(low, high, mean[d], sigma);
                if mass > 0.0 {
                    out[d].push((k, mass));
                }
            }
        }
        Some(out)
    }

    /// Probability that the successor leaves the gridded region
    fn escape_mass(&self, image: &ContinuousState, sigma: f64) -> f64 {
        let mean = image.components();
        if !image.is_finite() {
            return 1.0;
        }

        let inside: f64 = self
            .grid
            .covered_bounds()
            .iter()
            .enumerate()
            .map(|(d, (low, high))| interval_mass(*low, *high, mean[d], sigma))
            .product();

        (1.0 - inside).clamp(0.0, 1.0)
    }

    /// Transition set plus the statistics used for physics sanity checks
    pub fn probe(&self, source: &CellIndex, acceleration: f64) -> TransitionProbe {
        let source_center = self.grid.index_to_center(source);
        let image = self.dynamics.step(&source_center, acceleration);
        let transitions = self.transitions_from_image(&image);
        let sigma = self.dynamics.noise_std();
        let mean = image.components();

        let mut dominant: Option<(CellId, f64)> = None;
        let mut weight_sum = 0.0;
        let mut center_acc = [0.0; DIMS];
        let mut next_acc = [0.0; DIMS];

        for (&id, interval) in &transitions {
            let Some(index) = self.grid.unflatten(id) else {
                continue; // escape state has no geometry
            };

            if dominant.map_or(true, |(_, best)| interval.lower > best) {
                dominant = Some((id, interval.lower));
            }

            let w = interval.midpoint();
            let center = self.grid.index_to_center(&index).components();
            let bounds = self.grid.cell_bounds(&index);
            for d in 0..DIMS {
                center_acc[d] += w * center[d];
                next_acc[d] += w * truncated_mean(bounds[d].0, bounds[d].1, mean[d], sigma);
            }
            weight_sum += w;
        }

        let normalize = |acc: [f64; DIMS]| {
            (weight_sum > 0.0)
                .then(|| ContinuousState::from_components(acc.map(|v| v / weight_sum)))
        };

        TransitionProbe {
            source_center,
            image,
            dominant: dominant.map(|(id, _)| id),
            mean_target_center: normalize(center_acc),
            mean_next_state: normalize(next_acc),
            transitions,
        }
    }
}
