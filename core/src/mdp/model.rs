//! Interval MDP transition table
//!
//! Populated once by the pipeline, then treated as read-only for statistics
//! and serialization.

use super::interval::Interval;
use crate::error::{AbstractionError, Result};
use crate::grid::CellId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One probabilistic branch of a (state, action) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub target: CellId,
    pub interval: Interval,
}

/// Key of the transition table
pub type StateAction = (CellId, String);

/// Interval Markov decision process over grid cells
#[derive(Debug, Clone, Default)]
pub struct IntervalMdp {
    /// Number of states (grid cells, plus the escape state if any)
    num_states: usize,

    /// State the model starts in
    initial_state: CellId,

    /// (source, action) -> branches
    transitions: FxHashMap<StateAction, Vec<TransitionEntry>>,

    /// Absorbing state collecting mass that leaves the grid
    escape_state: Option<CellId>,

    /// Compiled controller module, emitted verbatim after the physics
    controller_logic: Option<String>,
}

/// Population counts of an [`IntervalMdp`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdpStats {
    pub num_states: usize,

    /// States with at least one outgoing transition
    pub populated_states: usize,

    pub state_action_pairs: usize,

    pub transition_entries: usize,
}

impl fmt::Display for MdpStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "States: {}/{} populated | State-action pairs: {} | Transitions: {}",
            self.populated_states, self.num_states, self.state_action_pairs, self.transition_entries
        )
    }
}

/// A (state, action) pair whose intervals admit no probability distribution
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalWarning {
    pub source: CellId,
    pub action: String,
    pub lower_sum: f64,
    pub upper_sum: f64,
}

impl fmt::Display for IntervalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={} [{}]: sum(p_min)={:.6}, sum(p_max)={:.6}",
            self.source, self.action, self.lower_sum, self.upper_sum
        )
    }
}

impl IntervalMdp {
    /// Create an empty model with a fixed state count
    pub fn new(num_states: usize) -> Self {
        Self {
            num_states,
            ..Self::default()
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn initial_state(&self) -> CellId {
        self.initial_state
    }

    pub fn set_initial_state(&mut self, state: CellId) -> Result<()> {
        self.check_state(state, "initial state")?;
        self.initial_state = state;
        Ok(())
    }

    pub fn escape_state(&self) -> Option<CellId> {
        self.escape_state
    }

    pub fn set_escape_state(&mut self, state: CellId) -> Result<()> {
        self.check_state(state, "escape state")?;
        self.escape_state = Some(state);
        Ok(())
    }

    fn check_state(&self, state: CellId, what: &str) -> Result<()> {
        if state.0 >= self.num_states {
            return Err(AbstractionError::config(format!(
                "{} {} out of range (model has {} states)",
                what, state, self.num_states
            )));
        }
        Ok(())
    }

    /// Add one branch under (source, action)
    ///
    /// Rejects invalid intervals, out-of-range states and repeated targets.
    pub fn add_transition(
        &mut self,
        source: CellId,
        action: &str,
        target: CellId,
        p_min: f64,
        p_max: f64,
    ) -> Result<()> {
        let interval = Interval::new(p_min, p_max)?;
        self.check_state(source, "source state")?;
        self.check_state(target, "target state")?;

        let entries = self
            .transitions
            .entry((source, action.to_string()))
            .or_default();

        if entries.iter().any(|e| e.target == target) {
            return Err(AbstractionError::config(format!(
                "Duplicate transition s={} [{}] -> s={}",
                source, action, target
            )));
        }

        entries.push(TransitionEntry { target, interval });
        Ok(())
    }

    /// Branches of one (source, action) pair, in insertion order
    pub fn transitions(&self, source: CellId, action: &str) -> Option<&[TransitionEntry]> {
        self.transitions
            .get(&(source, action.to_string()))
            .map(|v| v.as_slice())
    }

    /// All (source, action) pairs sorted by source id then action name,
    /// each with its branches sorted by target id
    pub fn sorted(&self) -> Vec<(&StateAction, Vec<TransitionEntry>)> {
        let mut keys: Vec<&StateAction> = self.transitions.keys().collect();
        keys.sort();

        keys.into_iter()
            .map(|key| {
                let mut entries = self.transitions[key].clone();
                entries.sort_by_key(|e| e.target);
                (key, entries)
            })
            .collect()
    }

    pub fn attach_controller_logic(&mut self, logic: String) {
        self.controller_logic = Some(logic);
    }

    pub fn controller_logic(&self) -> Option<&str> {
        self.controller_logic.as_deref()
    }

    pub fn stats(&self) -> MdpStats {
        let mut sources: Vec<CellId> = self.transitions.keys().map(|(s, _)| *s).collect();
        sources.sort();
        sources.dedup();

        MdpStats {
            num_states: self.num_states,
            populated_states: sources.len(),
            state_action_pairs: self.transitions.len(),
            transition_entries: self.transitions.values().map(|v| v.len()).sum(),
        }
    }

    /// Pairs whose intervals cannot sum to one
    ///
    /// Typical cause: mass dropped at the grid border without an escape state.
    pub fn validate(&self) -> Vec<IntervalWarning> {
        const TOL: f64 = 1e-9;

        self.sorted()
            .into_iter()
            .filter_map(|((source, action), entries)| {
                let lower_sum: f64 = entries.iter().map(|e| e.interval.lower).sum();
                let upper_sum: f64 = entries.iter().map(|e| e.interval.upper).sum();
                (lower_sum > 1.0 + TOL || upper_sum < 1.0 - TOL).then(|| IntervalWarning {
                    source: *source,
                    action: action.clone(),
                    lower_sum,
                    upper_sum,
                })
            })
            .collect()
    }
}
