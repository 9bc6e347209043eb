//! Plant dynamics consumed by the abstraction
//!
//! The engine only needs a noiseless one-step map, a Lipschitz bound on that
//! map and the process-noise scale.

mod plant;

pub use plant::{Frame, PlantConfig, VehiclePlant};

use crate::grid::ContinuousState;

/// Discrete-time stochastic dynamics `x' = f(x, u) + w`, `w ~ N(0, sigma^2 I)`
pub trait DynamicsModel: Send + Sync {
    /// Noiseless successor of `state` under commanded `acceleration`
    fn step(&self, state: &ContinuousState, acceleration: f64) -> ContinuousState;

    /// Bound on how much one step can stretch the distance between two states
    fn lipschitz_constant(&self) -> f64;

    /// Per-axis process-noise standard deviation
    fn noise_std(&self) -> f64;
}
