//! Uniform box partition of the bounded state space
//!
//! Buckets are offset by half a cell so that values on the `min + k * r`
//! lattice (e.g. v = 20.0 m/s) land at a cell center, never on a boundary.
//! Buckets are half-open: bucket `k` covers `[origin + k*r, origin + (k+1)*r)`.

use super::presets::{AxisBounds, GridPreset};
use super::state::{Axis, CellId, CellIndex, ContinuousState, DIMS};
use crate::error::{AbstractionError, Result};
use std::fmt;
use std::ops::RangeInclusive;

/// Largest bucket count accepted on a single axis
const MAX_AXIS_BUCKETS: f64 = (1u64 << 40) as f64;

/// Immutable discretization of the continuous state space
#[derive(Debug, Clone, PartialEq)]
pub struct GridPartition {
    /// Configured `[min, max]` per axis
    bounds: [AxisBounds; DIMS],

    /// Cell width per axis
    resolution: [f64; DIMS],

    /// Bucket count per axis
    shape: [usize; DIMS],

    /// Product of `shape`, checked at construction
    total_cells: usize,

    /// Human-readable origin of the resolution
    description: String,
}

impl GridPartition {
    /// Build a grid from explicit bounds and resolution
    pub fn new(bounds: [AxisBounds; DIMS], resolution: [f64; DIMS]) -> Result<Self> {
        Self::with_description(bounds, resolution, "Custom resolution".to_string())
    }

    /// Build a grid from a named resolution preset
    pub fn from_preset(preset: GridPreset, bounds: [AxisBounds; DIMS]) -> Result<Self> {
        Self::with_description(
            bounds,
            preset.resolution(),
            format!("{} ({})", preset.name(), preset.description()),
        )
    }

    fn with_description(
        bounds: [AxisBounds; DIMS],
        resolution: [f64; DIMS],
        description: String,
    ) -> Result<Self> {
        let mut shape = [0usize; DIMS];

        for axis in Axis::ALL {
            let d = axis.dim();
            let b = bounds[d];
            let r = resolution[d];

            if !(r.is_finite() && r > 0.0) {
                return Err(AbstractionError::config(format!(
                    "Resolution for {} must be a positive finite number, got {}",
                    axis.name(),
                    r
                )));
            }
            if !(b.min.is_finite() && b.max.is_finite()) || b.min >= b.max {
                return Err(AbstractionError::config(format!(
                    "Bounds for {} must satisfy min < max, got [{}, {}]",
                    axis.name(),
                    b.min,
                    b.max
                )));
            }

            // Smallest count whose last (half-open) upper edge lies beyond max
            let buckets = (b.width() / r + 0.5).floor();
            if !(buckets.is_finite() && buckets < MAX_AXIS_BUCKETS) {
                return Err(AbstractionError::config(format!(
                    "Resolution {} is too fine for {} bounds [{}, {}]",
                    r,
                    axis.name(),
                    b.min,
                    b.max
                )));
            }
            shape[d] = buckets as usize + 1;
        }

        // One id past the last cell is reserved for the escape state
        let total_cells = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .filter(|&total| total < usize::MAX)
            .ok_or_else(|| {
                AbstractionError::config(format!(
                    "Grid of shape {:?} has more cells than can be indexed",
                    shape
                ))
            })?;

        Ok(Self {
            bounds,
            resolution,
            shape,
            total_cells,
            description,
        })
    }

    pub fn bounds(&self) -> &[AxisBounds; DIMS] {
        &self.bounds
    }

    pub fn resolution(&self) -> &[f64; DIMS] {
        &self.resolution
    }

    /// Bucket count per axis
    pub fn shape(&self) -> [usize; DIMS] {
        self.shape
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Total number of cells (constant for the grid's lifetime)
    pub fn total_cells(&self) -> usize {
        self.total_cells
    }

    /// Widest cell side across all axes
    pub fn max_cell_width(&self) -> f64 {
        self.resolution.iter().cloned().fold(0.0, f64::max)
    }

    /// Lower edge of bucket 0 on an axis
    fn origin(&self, d: usize) -> f64 {
        self.bounds[d].min - self.resolution[d] / 2.0
    }

    fn edge(&self, d: usize, k: usize) -> f64 {
        self.origin(d) + k as f64 * self.resolution[d]
    }

    /// Outer edges of the gridded region per axis
    pub fn covered_bounds(&self) -> [(f64, f64); DIMS] {
        let mut out = [(0.0, 0.0); DIMS];
        for (d, slot) in out.iter_mut().enumerate() {
            *slot = (self.edge(d, 0), self.edge(d, self.shape[d]));
        }
        out
    }

    /// Fractional bucket coordinate of a value (floor gives the bucket)
    fn bucket_coordinate(&self, d: usize, value: f64) -> f64 {
        ((value - self.origin(d)) / self.resolution[d]).floor()
    }

    /// Map a continuous state to its cell
    ///
    /// Returns `None` if any component lies outside the gridded region.
    pub fn state_to_index(&self, state: &ContinuousState) -> Option<CellIndex> {
        let mut index = [0usize; DIMS];
        for (d, value) in state.components().into_iter().enumerate() {
            let k = self.bucket_coordinate(d, value);
            // NaN fails both comparisons
            if !(k >= 0.0 && k < self.shape[d] as f64) {
                return None;
            }
            index[d] = k as usize;
        }
        Some(CellIndex(index))
    }

    /// Buckets along `axis` that intersect `[low, high]`, clamped to the grid
    ///
    /// Returns `None` when the interval lies entirely outside the grid.
    pub fn axis_span(&self, axis: Axis, low: f64, high: f64) -> Option<RangeInclusive<usize>> {
        let d = axis.dim();
        if !(low.is_finite() && high.is_finite()) || low > high {
            return None;
        }

        let first = self.bucket_coordinate(d, low);
        let last = self.bucket_coordinate(d, high);
        let n = self.shape[d] as f64;

        if last < 0.0 || first >= n {
            return None;
        }

        let first = first.max(0.0) as usize;
        let last = last.min(n - 1.0) as usize;
        Some(first..=last)
    }

    /// Continuous midpoint of a cell
    pub fn index_to_center(&self, index: &CellIndex) -> ContinuousState {
        let mut center = [0.0; DIMS];
        for (d, slot) in center.iter_mut().enumerate() {
            *slot = self.bounds[d].min + index.0[d] as f64 * self.resolution[d];
        }
        ContinuousState::from_components(center)
    }

    /// Per-axis `(low, high)` of a cell
    pub fn cell_bounds(&self, index: &CellIndex) -> [(f64, f64); DIMS] {
        let mut out = [(0.0, 0.0); DIMS];
        for (d, slot) in out.iter_mut().enumerate() {
            let k = index.0[d];
            *slot = (self.edge(d, k), self.edge(d, k + 1));
        }
        out
    }

    /// Check that every bucket is within the grid shape
    pub fn contains_index(&self, index: &CellIndex) -> bool {
        index.0.iter().zip(self.shape.iter()).all(|(i, n)| i < n)
    }

    /// Row-major flat id of a multi-index (last axis fastest)
    pub fn flatten(&self, index: &CellIndex) -> CellId {
        debug_assert!(self.contains_index(index), "index {} outside grid", index);
        let [ix, iv, ia] = index.0;
        CellId((ix * self.shape[1] + iv) * self.shape[2] + ia)
    }

    /// Inverse of [`flatten`](Self::flatten)
    pub fn unflatten(&self, id: CellId) -> Option<CellIndex> {
        if id.0 >= self.total_cells() {
            return None;
        }
        let ia = id.0 % self.shape[2];
        let rest = id.0 / self.shape[2];
        let iv = rest % self.shape[1];
        let ix = rest / self.shape[1];
        Some(CellIndex([ix, iv, ia]))
    }

    /// All cells in flat-id order
    pub fn cells(&self) -> impl Iterator<Item = (CellId, CellIndex)> + '_ {
        (0..self.total_cells()).filter_map(move |i| {
            let id = CellId(i);
            self.unflatten(id).map(|idx| (id, idx))
        })
    }
}

impl fmt::Display for GridPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Grid: {} | Res: {:?} | Shape: {:?} | States: {}>",
            self.description,
            self.resolution,
            self.shape,
            self.total_cells()
        )
    }
}
