//! Error types for case setup and evolution.

use thiserror::Error;

use crate::analysis::NumericalInstability;
use crate::geometry::VertexType;
use crate::types::BlockIndex;

/// Errors raised while assembling or evolving a lattice Boltzmann case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LbmError {
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Dimension mismatch between lattice, block or field.
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Block halo cannot hold the stencil.
    #[error("Halo depth {halo} is too shallow, the stencils need {required} layers")]
    HaloTooShallow { halo: usize, required: usize },

    /// Boundary node without a recognisable geometry pattern.
    #[error("Geometry inconsistency in block {block} at node {position:?}: {reason}")]
    GeometryInconsistency {
        block: BlockIndex,
        position: [usize; 3],
        reason: String,
    },

    /// Boundary kind not available for the selected scheme.
    #[error("Boundary kind {kind:?} is not supported by the {scheme} scheme")]
    UnsupportedBoundary {
        kind: VertexType,
        scheme: &'static str,
    },

    /// Block index out of range.
    #[error("Block {0} does not exist")]
    UnknownBlock(BlockIndex),

    /// Non-finite or non-positive distribution detected by the diagnostics.
    #[error(transparent)]
    NumericalInstability(#[from] NumericalInstability),
}

impl LbmError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a geometry inconsistency error.
    pub fn geometry(block: BlockIndex, position: [usize; 3], reason: impl Into<String>) -> Self {
        Self::GeometryInconsistency {
            block,
            position,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LbmError>;
