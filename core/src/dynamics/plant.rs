//! First-order-lag longitudinal vehicle plant
//!
//! The actuator follows the commanded acceleration with lag factor `alpha`;
//! velocity integrates the actual acceleration and never goes negative.

use super::DynamicsModel;
use crate::error::{AbstractionError, Result};
use crate::grid::ContinuousState;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Coordinate convention for the position axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    /// Position along the track, grows with velocity
    World,
    /// Gap to the obstacle, shrinks with closing speed
    #[default]
    Relative,
}

impl Frame {
    fn direction(self) -> f64 {
        match self {
            Frame::World => 1.0,
            Frame::Relative => -1.0,
        }
    }
}

/// Plant parameters as they appear in configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Actuator lag factor in (0, 1]
    pub lag: f64,

    /// Discrete time step in seconds
    pub dt: f64,

    /// Process-noise standard deviation (applied per axis)
    pub noise_std: f64,

    /// Position-axis convention
    pub frame: Frame,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            lag: 0.5,
            dt: 0.1,
            noise_std: 0.05,
            frame: Frame::Relative,
        }
    }
}

/// Deterministic longitudinal plant with additive Gaussian process noise
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePlant {
    config: PlantConfig,
    lipschitz: f64,
}

impl VehiclePlant {
    pub fn new(config: PlantConfig) -> Result<Self> {
        let PlantConfig {
            lag,
            dt,
            noise_std,
            ..
        } = config;

        if !(lag.is_finite() && lag > 0.0 && lag <= 1.0) {
            return Err(AbstractionError::config(format!(
                "Plant lag must lie in (0, 1], got {}",
                lag
            )));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(AbstractionError::config(format!(
                "Plant time step must be positive, got {}",
                dt
            )));
        }
        if !(noise_std.is_finite() && noise_std >= 0.0) {
            return Err(AbstractionError::config(format!(
                "Process noise std must be non-negative, got {}",
                noise_std
            )));
        }

        let lipschitz = spectral_norm(&Self::linear_update(&config));
        Ok(Self { config, lipschitz })
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    /// Linear part of the one-step update (unsaturated velocity)
    pub fn linear_update(config: &PlantConfig) -> Matrix3<f64> {
        let s = config.frame.direction();
        let dt = config.dt;
        let keep = 1.0 - config.lag;

        #[rustfmt::skip]
        let update = Matrix3::new(
            1.0, s * dt, s * keep * dt * dt,
            0.0, 1.0, keep * dt,
            0.0, 0.0, keep,
        );
        update
    }
}

impl DynamicsModel for VehiclePlant {
    fn step(&self, state: &ContinuousState, acceleration: f64) -> ContinuousState {
        let PlantConfig { lag, dt, frame, .. } = self.config;

        let mut a_next = state.acceleration + lag * (acceleration - state.acceleration);
        let mut v_next = state.velocity + a_next * dt;

        // No reversing: a stopped vehicle holds still
        if v_next < 0.0 {
            v_next = 0.0;
            a_next = 0.0;
        }

        let x_next = state.position + frame.direction() * v_next * dt;
        ContinuousState::new(x_next, v_next, a_next)
    }

    fn lipschitz_constant(&self) -> f64 {
        self.lipschitz
    }

    fn noise_std(&self) -> f64 {
        self.config.noise_std
    }
}

/// Largest singular value
fn spectral_norm(m: &Matrix3<f64>) -> f64 {
    m.svd(false, false)
        .singular_values
        .iter()
        .cloned()
        .fold(0.0, f64::max)
}
