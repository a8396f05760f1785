//! Structured multi-block mesh.
//!
//! - [`BlockShape`]: extents, halo and the position/index mapping
//! - [`IndexRange`]: whole / bulk / surface ranges
//! - [`Coordinates`]: tensor-product node coordinates
//! - [`Block`]: node properties and the field set of one block
//! - [`Grid`]: the aggregate of all blocks

mod block;
mod coordinates;
mod grid;
mod shape;

pub use block::{Block, NodeProperties};
pub use coordinates::Coordinates;
pub use grid::Grid;
pub use shape::{BlockShape, IndexRange, Surface, STENCIL_REACH};
