//! Interval MDP and its PRISM export
//!
//! - **interval**: checked probability intervals
//! - **model**: [`IntervalMdp`], the transition table
//! - **prism**: deterministic serialization to the PRISM language

mod interval;
mod model;
mod prism;

pub use interval::Interval;
pub use model::{IntervalMdp, IntervalWarning, MdpStats, StateAction, TransitionEntry};
pub use prism::{PLANT_MODULE, STATE_VAR};
