//! Interval abstraction of the stochastic kernel
//!
//! - **gaussian**: CDF, interval masses and truncated means
//! - **engine**: [`AbstractionEngine`], the per-(cell, action) interval computation

pub mod gaussian;
mod engine;

pub use engine::{AbstractionEngine, BoundaryMode, EngineConfig, TransitionProbe, TransitionSet};
