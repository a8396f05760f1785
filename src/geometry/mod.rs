//! Node classification and direction gating.
//!
//! Every node carries a [`VertexType`] (what update it receives) and a
//! [`GeometryTag`] (which half-stencils are cut off by solid or by the
//! domain edge). The tag is only meaningful for boundary nodes. The
//! [`GateTable`] turns a tag into per-direction masks shared by streaming,
//! gradient evaluation and time marching.

mod classifier;
mod gate;
mod tag;
mod vertex;

pub use classifier::classify_node;
pub use gate::{direction_valid, Comparison, GateTable, SchemePolicy};
pub use tag::{GeometryTag, OpenSides};
pub use vertex::{VertexSet, VertexType};
