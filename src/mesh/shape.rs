//! Block shape, index ranges and surfaces.
//!
//! Positions are allocation coordinates: the owned (bulk) cells start at
//! `halo` along every active axis. Unused axes of a two-dimensional block
//! have extent one and no halo.

use serde::{Deserialize, Serialize};

use crate::error::{LbmError, Result};
use crate::types::NodeIndex;

/// Stencil reach of the in-scope kernels: second-order gradients read two
/// cells upwind.
pub const STENCIL_REACH: usize = 2;

// =============================================================================
// Surfaces
// =============================================================================

/// Block surface, named after the axis extremum it sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    /// x minimum.
    Left,
    /// x maximum.
    Right,
    /// y minimum.
    Bottom,
    /// y maximum.
    Top,
    /// z minimum.
    Back,
    /// z maximum.
    Front,
}

impl Surface {
    /// All six surfaces.
    pub const ALL: [Surface; 6] = [
        Self::Left,
        Self::Right,
        Self::Bottom,
        Self::Top,
        Self::Back,
        Self::Front,
    ];

    /// Normal axis.
    pub fn axis(self) -> usize {
        match self {
            Self::Left | Self::Right => 0,
            Self::Bottom | Self::Top => 1,
            Self::Back | Self::Front => 2,
        }
    }

    /// `-1` for the minimum side, `+1` for the maximum side.
    pub fn side(self) -> i32 {
        match self {
            Self::Left | Self::Bottom | Self::Back => -1,
            Self::Right | Self::Top | Self::Front => 1,
        }
    }
}

// =============================================================================
// Index range
// =============================================================================

/// Half-open box of positions `lo <= p < hi`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange {
    /// Inclusive lower corner.
    pub lo: [usize; 3],
    /// Exclusive upper corner.
    pub hi: [usize; 3],
}

impl IndexRange {
    /// Number of positions.
    pub fn len(&self) -> usize {
        (0..3).map(|a| self.hi[a].saturating_sub(self.lo[a])).product()
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `p` lies in the range.
    pub fn contains(&self, p: [usize; 3]) -> bool {
        (0..3).all(|a| p[a] >= self.lo[a] && p[a] < self.hi[a])
    }

    /// Positions, x fastest.
    pub fn iter(&self) -> impl Iterator<Item = [usize; 3]> {
        let IndexRange { lo, hi } = *self;
        (lo[2]..hi[2]).flat_map(move |k| {
            (lo[1]..hi[1]).flat_map(move |j| (lo[0]..hi[0]).map(move |i| [i, j, k]))
        })
    }
}

// =============================================================================
// Block shape
// =============================================================================

/// Extents of one block and the position/index mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockShape {
    dimension: usize,
    active: [usize; 3],
    halo: usize,
    allocated: [usize; 3],
}

impl BlockShape {
    /// Shape with `active` owned cells per axis and `halo` ghost layers.
    pub fn new(dimension: usize, active: [usize; 3], halo: usize) -> Result<Self> {
        if !(2..=3).contains(&dimension) {
            return Err(LbmError::invalid_config(format!(
                "dimension {dimension} is not supported"
            )));
        }
        if halo < STENCIL_REACH {
            return Err(LbmError::HaloTooShallow {
                halo,
                required: STENCIL_REACH,
            });
        }
        let mut allocated = [1; 3];
        for axis in 0..3 {
            if axis < dimension {
                if active[axis] == 0 {
                    return Err(LbmError::invalid_config("block has an empty axis"));
                }
                allocated[axis] = active[axis] + 2 * halo;
            } else if active[axis] != 1 {
                return Err(LbmError::DimensionMismatch {
                    context: "unused block axis extent",
                    expected: 1,
                    actual: active[axis],
                });
            }
        }
        Ok(Self {
            dimension,
            active,
            halo,
            allocated,
        })
    }

    /// Spatial dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Owned cells per axis.
    #[inline]
    pub fn active(&self) -> [usize; 3] {
        self.active
    }

    /// Ghost layers on each side of the active axes.
    #[inline]
    pub fn halo(&self) -> usize {
        self.halo
    }

    /// Allocated cells per axis.
    #[inline]
    pub fn allocated(&self) -> [usize; 3] {
        self.allocated
    }

    /// First owned position along `axis`.
    #[inline]
    pub fn lo(&self, axis: usize) -> usize {
        if axis < self.dimension {
            self.halo
        } else {
            0
        }
    }

    /// Total allocated nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.allocated.iter().product()
    }

    /// Linear index of a position.
    #[inline]
    pub fn node_index(&self, p: [usize; 3]) -> NodeIndex {
        let [nx, ny, _] = self.allocated;
        NodeIndex::new(p[0] + nx * (p[1] + ny * p[2]))
    }

    /// Position of a linear index.
    #[inline]
    pub fn position(&self, node: NodeIndex) -> [usize; 3] {
        let [nx, ny, _] = self.allocated;
        let n = node.get();
        [n % nx, (n / nx) % ny, n / (nx * ny)]
    }

    /// Position `p + offset` when it lies in the allocation.
    #[inline]
    pub fn neighbour(&self, p: [usize; 3], offset: [i32; 3]) -> Option<[usize; 3]> {
        let mut q = [0usize; 3];
        for axis in 0..3 {
            let v = p[axis] as i64 + offset[axis] as i64;
            if v < 0 || v >= self.allocated[axis] as i64 {
                return None;
            }
            q[axis] = v as usize;
        }
        Some(q)
    }

    /// Linear-index shift of a position offset.
    #[inline]
    pub fn linear_offset(&self, offset: [i32; 3]) -> isize {
        let [nx, ny, _] = self.allocated;
        offset[0] as isize + nx as isize * (offset[1] as isize + ny as isize * offset[2] as isize)
    }

    /// Owned cells.
    pub fn bulk(&self) -> IndexRange {
        let mut lo = [0; 3];
        let mut hi = [1; 3];
        for axis in 0..3 {
            lo[axis] = self.lo(axis);
            hi[axis] = lo[axis] + self.active[axis];
        }
        IndexRange { lo, hi }
    }

    /// Whole allocation, halo included.
    pub fn whole(&self) -> IndexRange {
        IndexRange {
            lo: [0; 3],
            hi: self.allocated,
        }
    }

    /// Owned cells on one surface, `None` for an axis the block does not have.
    pub fn surface(&self, surface: Surface) -> Option<IndexRange> {
        let axis = surface.axis();
        if axis >= self.dimension {
            return None;
        }
        let mut range = self.bulk();
        if surface.side() < 0 {
            range.hi[axis] = range.lo[axis] + 1;
        } else {
            range.lo[axis] = range.hi[axis] - 1;
        }
        Some(range)
    }

    /// Whether `p` is an owned cell.
    #[inline]
    pub fn in_bulk(&self, p: [usize; 3]) -> bool {
        (0..self.dimension).all(|a| p[a] >= self.halo && p[a] < self.halo + self.active[a])
    }

    /// Periodic image of `p + offset` inside the owned cells, wrapping only
    /// along the axes flagged in `axes`. `None` when the shifted position
    /// leaves the bulk along an axis that does not wrap.
    pub fn wrap(&self, p: [usize; 3], offset: [i32; 3], axes: [bool; 3]) -> Option<[usize; 3]> {
        let mut q = p;
        for axis in 0..self.dimension {
            let n = self.active[axis] as i64;
            let local = p[axis] as i64 - self.halo as i64 + offset[axis] as i64;
            let local = if (0..n).contains(&local) {
                local
            } else if axes[axis] {
                local.rem_euclid(n)
            } else {
                return None;
            };
            q[axis] = (local + self.halo as i64) as usize;
        }
        Some(q)
    }
}
