//! Ghost-layer exchange.

use crate::field::DistributionField;
use crate::mesh::{Block, Grid};
use crate::types::BlockIndex;

/// Distribution field a halo exchange fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSelector {
    /// Working field `f`.
    Distribution,
    /// Staging field (post-collision values).
    Staged,
}

impl FieldSelector {
    /// The selected field of a block.
    pub fn field_mut(self, block: &mut Block) -> &mut DistributionField {
        match self {
            Self::Distribution => &mut block.f,
            Self::Staged => &mut block.f_stage,
        }
    }
}

/// Fills the ghost layers of every block of a grid.
///
/// The stream-collision step exchanges the staged field between collision
/// and streaming; the finite-difference step exchanges the working field at
/// the end of the step.
pub trait HaloExchange: Send + Sync {
    /// Fill the halo of `field` on every block.
    fn exchange(&self, grid: &mut Grid, field: FieldSelector);

    /// Axes along which the halo of `block` holds real neighbours.
    ///
    /// Geometry classification treats neighbours across these axes as
    /// present; surfaces across them need no boundary condition.
    fn connected_axes(&self, _block: BlockIndex) -> [bool; 3] {
        [false; 3]
    }

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// No exchange: every block face is a physical boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHalo;

impl HaloExchange for NoHalo {
    fn exchange(&self, _grid: &mut Grid, _field: FieldSelector) {}

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Each block wraps onto itself along the flagged axes.
///
/// Axes are filled in order over the whole allocation of the other axes, so
/// edge and corner ghosts pick up already-filled images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicHalo {
    axes: [bool; 3],
}

impl PeriodicHalo {
    /// Periodic along the flagged axes.
    pub fn new(axes: [bool; 3]) -> Self {
        Self { axes }
    }

    /// Periodic along every axis.
    pub fn all() -> Self {
        Self::new([true; 3])
    }

    /// Flagged axes.
    pub fn axes(&self) -> [bool; 3] {
        self.axes
    }

    fn exchange_block(&self, block: &mut Block, field: FieldSelector) {
        let shape = block.shape;
        let target = field.field_mut(block);
        for axis in 0..shape.dimension() {
            if !self.axes[axis] {
                continue;
            }
            let lo = shape.lo(axis) as i64;
            let n = shape.active()[axis] as i64;
            for p in shape.whole().iter() {
                let local = p[axis] as i64 - lo;
                if (0..n).contains(&local) {
                    continue;
                }
                let mut src = p;
                src[axis] = (local.rem_euclid(n) + lo) as usize;
                target.copy_node(shape.node_index(src), shape.node_index(p));
            }
        }
    }
}

impl HaloExchange for PeriodicHalo {
    fn exchange(&self, grid: &mut Grid, field: FieldSelector) {
        for block in grid.blocks_mut() {
            self.exchange_block(block, field);
        }
    }

    fn connected_axes(&self, _block: BlockIndex) -> [bool; 3] {
        self.axes
    }

    fn name(&self) -> &'static str {
        "periodic"
    }
}
