//! State-space partition
//!
//! - **state**: continuous states, axes, multi-indices and flat cell ids
//! - **presets**: named resolutions and default bounds
//! - **partition**: the immutable [`GridPartition`] and its index arithmetic

mod partition;
mod presets;
mod state;

pub use partition::GridPartition;
pub use presets::{AxisBounds, GridPreset, DEFAULT_BOUNDS};
pub use state::{Axis, CellId, CellIndex, ContinuousState, DIMS};
