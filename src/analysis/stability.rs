//! Numerical stability diagnostics.
//!
//! When diagnostics are enabled, the collision and marching sweeps check
//! every value they produce. A non-finite or non-positive distribution is
//! fatal: the sweep stops with a [`NumericalInstability`] naming the block,
//! node, component and direction. With diagnostics disabled no check is
//! made and detecting blow-up is left to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BlockIndex, ComponentIndex, DirectionIndex, NodeIndex};

/// Runtime switch for the per-value checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostics {
    /// No checks.
    #[default]
    Disabled,
    /// Check every post-collision and post-march value.
    Enabled,
}

impl Diagnostics {
    /// Whether checks run.
    #[inline]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// Update that produced a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStage {
    /// BGK collision.
    Collision,
    /// Explicit or semi-implicit time marching.
    Marching,
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collision => write!(f, "collision"),
            Self::Marching => write!(f, "time marching"),
        }
    }
}

/// A distribution left the physical range.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "Numerical instability after {stage}: f = {value} in block {block}, node {node}, \
     component {component}, direction {direction}"
)]
pub struct NumericalInstability {
    /// Update that produced the value.
    pub stage: UpdateStage,
    /// Block of the node.
    pub block: BlockIndex,
    /// Node within the block allocation.
    pub node: NodeIndex,
    /// Component of the direction.
    pub component: ComponentIndex,
    /// Lattice direction.
    pub direction: DirectionIndex,
    /// Offending value.
    pub value: f64,
}

/// Whether a distribution value is finite and positive.
#[inline]
pub fn is_physical(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Location of a checked value, filled in by the sweep.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CheckSite {
    pub stage: UpdateStage,
    pub block: BlockIndex,
    pub node: NodeIndex,
    pub component: ComponentIndex,
}

impl CheckSite {
    /// `Err` when `value` is not physical.
    #[inline]
    pub fn check(&self, direction: usize, value: f64) -> Result<(), NumericalInstability> {
        if is_physical(value) {
            Ok(())
        } else {
            Err(NumericalInstability {
                stage: self.stage,
                block: self.block,
                node: self.node,
                component: self.component,
                direction: DirectionIndex::new(direction),
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_physical() {
        assert!(is_physical(1e-300));
        assert!(!is_physical(0.0));
        assert!(!is_physical(-1e-12));
        assert!(!is_physical(f64::NAN));
        assert!(!is_physical(f64::INFINITY));
    }

    #[test]
    fn test_check_site_reports_location() {
        let site = CheckSite {
            stage: UpdateStage::Collision,
            block: BlockIndex::new(1),
            node: NodeIndex::new(17),
            component: ComponentIndex::new(0),
        };
        assert!(site.check(3, 0.1).is_ok());
        let err = site.check(4, f64::NAN).unwrap_err();
        assert_eq!(err.direction, DirectionIndex::new(4));
        let msg = err.to_string();
        assert!(msg.contains("collision"));
        assert!(msg.contains("N17"));
        assert!(msg.contains("D4"));
    }
}
