//! Static compilation of the policy into PRISM formulas
//!
//! Every cell center is classified once with [`decide`]; the resulting
//! partition becomes one membership formula and one guarded command per
//! class. Cell centers are read as (gap, closing speed) with the obstacle
//! assumed detected.

use super::policy::{decide, Decision, PolicyClass, PolicyThresholds, ThresholdPreset};
use crate::grid::{CellId, ContinuousState, GridPartition};
use crate::mdp::STATE_VAR;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Cell ids per class, each list in flat-id order
pub type ClassPartition = BTreeMap<PolicyClass, Vec<CellId>>;

#[derive(Debug, Clone)]
pub struct ControllerLogicCompiler {
    preset: ThresholdPreset,
    thresholds: PolicyThresholds,
}

impl ControllerLogicCompiler {
    pub fn new(preset: ThresholdPreset) -> Self {
        Self {
            preset,
            thresholds: preset.thresholds(),
        }
    }

    pub fn preset(&self) -> ThresholdPreset {
        self.preset
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    /// Full decision for a cell center
    pub fn decision(&self, center: &ContinuousState) -> Decision {
        decide(&self.thresholds, center.position, center.velocity)
    }

    pub fn classify(&self, center: &ContinuousState) -> PolicyClass {
        self.decision(center).class
    }

    /// Classify every cell of `grid`
    ///
    /// Every class has an entry, possibly empty.
    pub fn partition(&self, grid: &GridPartition) -> ClassPartition {
        let mut partition: ClassPartition =
            PolicyClass::ALL.iter().map(|c| (*c, Vec::new())).collect();

        for (id, index) in grid.cells() {
            let class = self.classify(&grid.index_to_center(&index));
            partition.entry(class).or_default().push(id);
        }

        partition
    }

    /// Render the controller module
    pub fn compile(&self, grid: &GridPartition) -> String {
        self.compile_with_escape(grid, None)
    }

    /// Render the controller module for a model with an absorbing escape state
    ///
    /// The escape state joins `do_coast` so its self-loop still synchronises
    /// with the controller.
    pub fn compile_with_escape(&self, grid: &GridPartition, escape: Option<CellId>) -> String {
        let mut partition = self.partition(grid);
        if let Some(escape) = escape {
            partition.entry(PolicyClass::Coast).or_default().push(escape);
        }
        let mut out = String::new();

        let _ = writeln!(out, "// Controller logic: {}", self.preset.name());
        for class in PolicyClass::ALL {
            let members = partition.get(&class).map(Vec::as_slice).unwrap_or(&[]);
            let _ = writeln!(out, "// {}: {} cells", class.action_name(), members.len());
        }
        if let Some(escape) = escape {
            let _ = writeln!(out, "// escape state {} coasts", escape);
        }

        for class in PolicyClass::ALL {
            let members = partition.get(&class).map(Vec::as_slice).unwrap_or(&[]);
            let condition = if members.is_empty() {
                "false".to_string()
            } else {
                let terms: Vec<String> =
                    members.iter().map(|id| format!("{}={}", STATE_VAR, id)).collect();
                format!("({})", terms.join(" | "))
            };
            let _ = writeln!(out, "formula do_{} = {};", class.action_name(), condition);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "module Controller_{}", self.preset.name());
        for class in PolicyClass::ALL {
            let _ = writeln!(out, "    [{0}] do_{0} -> true;", class.action_name());
        }
        let _ = writeln!(out, "endmodule");

        out
    }
}
