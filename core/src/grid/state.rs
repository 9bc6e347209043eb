//! Continuous state and cell identifiers
//!
//! Type-safe wrappers for the three state axes, grid multi-indices and flat
//! cell ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of state dimensions
pub const DIMS: usize = 3;

/// A state-space axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Distance (world frame) or gap to the obstacle (relative frame)
    Position,
    /// Velocity (world frame) or closing speed (relative frame)
    Velocity,
    /// Actual acceleration of the ego vehicle
    Acceleration,
}

impl Axis {
    /// All axes in storage order
    pub const ALL: [Axis; DIMS] = [Axis::Position, Axis::Velocity, Axis::Acceleration];

    /// Storage position of this axis
    pub fn dim(self) -> usize {
        match self {
            Axis::Position => 0,
            Axis::Velocity => 1,
            Axis::Acceleration => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Position => "position",
            Axis::Velocity => "velocity",
            Axis::Acceleration => "acceleration",
        }
    }
}

/// Point in the continuous state space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContinuousState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl ContinuousState {
    pub fn new(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Build from components in axis order
    pub fn from_components(c: [f64; DIMS]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// Components in axis order
    pub fn components(&self) -> [f64; DIMS] {
        [self.position, self.velocity, self.acceleration]
    }

    /// Value along one axis
    pub fn get(&self, axis: Axis) -> f64 {
        self.components()[axis.dim()]
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }
}

impl fmt::Display for ContinuousState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x={:.3}, v={:.3}, a={:.3})",
            self.position, self.velocity, self.acceleration
        )
    }
}

/// Multi-index of a grid cell (one bucket per axis)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(pub [usize; DIMS]);

impl CellIndex {
    pub fn new(ix: usize, iv: usize, ia: usize) -> Self {
        Self([ix, iv, ia])
    }

    /// Bucket along one axis
    pub fn get(&self, axis: Axis) -> usize {
        self.0[axis.dim()]
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

/// Flat (row-major) cell identifier, also the IMDP state id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
