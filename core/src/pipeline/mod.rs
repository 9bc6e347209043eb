//! Abstraction pipeline
//!
//! Enumerates every (cell, action) pair, asks the engine for its interval
//! transitions and fills an [`IntervalMdp`]. Cells are processed in chunks;
//! with the `parallel` feature each chunk is computed on the rayon pool and
//! merged back in flat-id order, so the model is the same either way.

mod compare;

pub use compare::{compare_presets, ComparisonStatus, PresetComparison};

use crate::abstraction::{AbstractionEngine, EngineConfig, TransitionSet};
use crate::actions::ActionSet;
use crate::controller::{ControllerLogicCompiler, PolicyClass};
use crate::dynamics::DynamicsModel;
use crate::error::{AbstractionError, Result};
use crate::grid::{CellId, CellIndex, ContinuousState, GridPartition};
use crate::mdp::IntervalMdp;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Cells handed to the worker pool per merge step
const CHUNK_CELLS: usize = 4096;

/// Run-time knobs with no effect on the produced model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    /// Cells between progress lines; `None` picks `max(1000, total / 20)`
    pub progress_interval: Option<usize>,

    /// Use the rayon pool (needs the `parallel` feature)
    pub parallel: bool,

    /// Continuous state whose cell becomes the PRISM initial state
    pub initial_state: Option<ContinuousState>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            progress_interval: None,
            parallel: true,
            initial_state: None,
        }
    }
}

/// Transition sets of one source cell, indexed like the action set
type CellRow = (CellId, Vec<TransitionSet>);

pub struct AbstractionPipeline {
    actions: ActionSet,
    engine_config: EngineConfig,
    options: PipelineOptions,
}

impl AbstractionPipeline {
    pub fn new(actions: ActionSet, engine_config: EngineConfig, options: PipelineOptions) -> Self {
        Self {
            actions,
            engine_config,
            options,
        }
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Build the interval MDP for `grid` under `dynamics`
    ///
    /// When `compiler` is given its logic is attached after the physics; every
    /// policy class must then have a same-named action.
    pub fn execute(
        &self,
        dynamics: &dyn DynamicsModel,
        grid: &GridPartition,
        compiler: Option<&ControllerLogicCompiler>,
    ) -> Result<IntervalMdp> {
        if let Some(compiler) = compiler {
            self.check_compiler(compiler)?;
        }

        let engine = AbstractionEngine::new(dynamics, grid, self.engine_config)?;
        let mut mdp = IntervalMdp::new(engine.num_states());

        if let Some(state) = &self.options.initial_state {
            let index = grid.state_to_index(state).ok_or_else(|| {
                AbstractionError::config(format!("Initial state {} lies outside the grid", state))
            })?;
            mdp.set_initial_state(grid.flatten(&index))?;
        }
        if let Some(sink) = engine.sink_id() {
            mdp.set_escape_state(sink)?;
        }

        let total = grid.total_cells();
        let interval = self
            .options
            .progress_interval
            .unwrap_or_else(|| (total / 20).max(1000))
            .max(1);

        info!("Starting abstraction");
        info!("  Grid: {}", grid.description());
        info!(
            "  States: {} (resolution {:?}, shape {:?})",
            total,
            grid.resolution(),
            grid.shape()
        );
        info!(
            "  Actions: {} | noise std {} | error margin {:.6}",
            self.actions.names().join(", "),
            dynamics.noise_std(),
            engine.error_margin()
        );

        let start = Instant::now();
        let cells: Vec<(CellId, CellIndex)> = grid.cells().collect();
        let mut processed = 0usize;
        let mut next_report = interval;

        for chunk in cells.chunks(CHUNK_CELLS) {
            for (source, sets) in self.compute_chunk(&engine, chunk) {
                for (action, set) in self.actions.iter().zip(sets) {
                    for (target, p) in set {
                        mdp.add_transition(source, &action.name, target, p.lower, p.upper)?;
                    }
                }
            }

            processed += chunk.len();
            while processed >= next_report {
                info!(
                    "  Processed {}/{} states ({:.1}%)",
                    next_report.min(total),
                    total,
                    100.0 * next_report.min(total) as f64 / total as f64
                );
                next_report += interval;
            }
        }

        if let Some(sink) = engine.sink_id() {
            for action in &self.actions {
                mdp.add_transition(sink, &action.name, sink, 1.0, 1.0)?;
            }
        }

        info!("Abstraction complete in {:.2?}", start.elapsed());
        info!("  {}", mdp.stats());

        let warnings = mdp.validate();
        if !warnings.is_empty() {
            warn!(
                "{} state-action pairs have intervals that cannot sum to 1 \
                 (probability leaves the grid)",
                warnings.len()
            );
            for w in warnings.iter().take(5) {
                debug!("  {}", w);
            }
        }

        if let Some(compiler) = compiler {
            info!("Compiling controller logic for preset '{}'", compiler.preset());
            let logic = compiler.compile_with_escape(grid, engine.sink_id());
            mdp.attach_controller_logic(logic);
        }

        Ok(mdp)
    }

    fn check_compiler(&self, compiler: &ControllerLogicCompiler) -> Result<()> {
        let missing: Vec<&str> = PolicyClass::ALL
            .iter()
            .map(|c| c.action_name())
            .filter(|name| self.actions.get(name).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(AbstractionError::config(format!(
                "Controller preset '{}' permits actions missing from the action set: {}",
                compiler.preset(),
                missing.join(", ")
            )));
        }
        Ok(())
    }

    fn compute_chunk(
        &self,
        engine: &AbstractionEngine<'_>,
        chunk: &[(CellId, CellIndex)],
    ) -> Vec<CellRow> {
        let row = |&(id, index): &(CellId, CellIndex)| -> CellRow {
            let sets = self
                .actions
                .iter()
                .map(|a| engine.compute_transitions(&index, a.acceleration))
                .collect();
            (id, sets)
        };

        #[cfg(feature = "parallel")]
        if self.options.parallel {
            return chunk.par_iter().map(row).collect();
        }

        chunk.iter().map(row).collect()
    }
}
