//! Node-major field storage with typed accessors.
//!
//! A [`NodeField`] stores `width` scalars per node contiguously, so one
//! node's row is a slice. The second index type (`DirectionIndex`,
//! `MacroVarIndex`, `ComponentIndex`) is part of the field type, which keeps
//! distribution, macro-variable and relaxation-time fields from being
//! addressed with the wrong index.

use std::marker::PhantomData;

use crate::error::{LbmError, Result};
use crate::types::{ComponentIndex, DirectionIndex, MacroVarIndex, NodeIndex};

/// Per-node rows of `width` scalars.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeField<I> {
    data: Vec<f64>,
    width: usize,
    _index: PhantomData<I>,
}

/// One value per (node, lattice direction).
pub type DistributionField = NodeField<DirectionIndex>;
/// One value per (node, macroscopic variable).
pub type MacroVarField = NodeField<MacroVarIndex>;
/// One value per (node, component).
pub type ComponentField = NodeField<ComponentIndex>;

impl<I: Copy + Into<usize>> NodeField<I> {
    /// Zero-initialised field.
    pub fn zeros(n_nodes: usize, width: usize) -> Self {
        Self {
            data: vec![0.0; n_nodes * width],
            width,
            _index: PhantomData,
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.data.len() / self.width
        }
    }

    /// Values per node.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Value at `(node, i)`.
    #[inline]
    pub fn get(&self, node: NodeIndex, i: I) -> f64 {
        self.data[node.get() * self.width + i.into()]
    }

    /// Set the value at `(node, i)`.
    #[inline]
    pub fn set(&mut self, node: NodeIndex, i: I, value: f64) {
        self.data[node.get() * self.width + i.into()] = value;
    }

    /// Row of one node.
    #[inline]
    pub fn node(&self, node: NodeIndex) -> &[f64] {
        let start = node.get() * self.width;
        &self.data[start..start + self.width]
    }

    /// Mutable row of one node.
    #[inline]
    pub fn node_mut(&mut self, node: NodeIndex) -> &mut [f64] {
        let start = node.get() * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Raw node-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw node-major storage.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Overwrite with the contents of `other`.
    pub fn copy_from(&mut self, other: &Self) -> Result<()> {
        if self.data.len() != other.data.len() || self.width != other.width {
            return Err(LbmError::DimensionMismatch {
                context: "field copy",
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Copy one node's row from `src` into `dst`.
    #[inline]
    pub fn copy_node(&mut self, src: NodeIndex, dst: NodeIndex) {
        let w = self.width;
        self.data
            .copy_within(src.get() * w..(src.get() + 1) * w, dst.get() * w);
    }

    /// Set every value.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }
}
