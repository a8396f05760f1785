//! Strongly-typed index types for safer kernel APIs.
//!
//! Every field in the crate is addressed by `(NodeIndex, DirectionIndex)`,
//! `(NodeIndex, MacroVarIndex)` or `(NodeIndex, ComponentIndex)` instead of
//! hand-computed flat offsets.

mod indices;

pub use indices::{BlockIndex, ComponentIndex, DirectionIndex, MacroVarIndex, NodeIndex};
