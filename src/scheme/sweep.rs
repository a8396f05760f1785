//! Node sweeps over a field, serial or with rayon.
//!
//! Every kernel writes one output row per node and only reads other
//! fields, so rows can be processed in any order. The parallel sweep
//! produces bit-identical results to the serial one.

use crate::error::Result;
use crate::types::NodeIndex;

/// How node sweeps are dispatched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sweep {
    /// Single-threaded, node order.
    #[default]
    Serial,
    /// Rayon work-stealing over node rows.
    #[cfg(feature = "parallel")]
    Parallel,
}

impl Sweep {
    /// Parallel sweep when requested and compiled in.
    #[cfg(feature = "parallel")]
    pub fn from_flag(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Serial
        }
    }

    /// Parallel sweep when requested and compiled in.
    #[cfg(not(feature = "parallel"))]
    pub fn from_flag(_parallel: bool) -> Self {
        Self::Serial
    }
}

/// Apply `op` to every node row of `data`.
pub(crate) fn for_each_node<F>(data: &mut [f64], width: usize, sweep: Sweep, op: F)
where
    F: Fn(NodeIndex, &mut [f64]) + Sync + Send,
{
    match sweep {
        Sweep::Serial => data
            .chunks_mut(width)
            .enumerate()
            .for_each(|(i, row)| op(NodeIndex::new(i), row)),
        #[cfg(feature = "parallel")]
        Sweep::Parallel => {
            use rayon::prelude::*;
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(i, row)| op(NodeIndex::new(i), row));
        }
    }
}

/// Apply a fallible `op` to every node row of `data`, stopping at the first
/// error.
pub(crate) fn try_for_each_node<F>(data: &mut [f64], width: usize, sweep: Sweep, op: F) -> Result<()>
where
    F: Fn(NodeIndex, &mut [f64]) -> Result<()> + Sync + Send,
{
    match sweep {
        Sweep::Serial => data
            .chunks_mut(width)
            .enumerate()
            .try_for_each(|(i, row)| op(NodeIndex::new(i), row)),
        #[cfg(feature = "parallel")]
        Sweep::Parallel => {
            use rayon::prelude::*;
            data.par_chunks_mut(width)
                .enumerate()
                .try_for_each(|(i, row)| op(NodeIndex::new(i), row))
        }
    }
}

/// Apply `op` to matching node rows of two fields of equal width.
pub(crate) fn for_each_node_pair<F>(a: &mut [f64], b: &mut [f64], width: usize, sweep: Sweep, op: F)
where
    F: Fn(NodeIndex, &mut [f64], &mut [f64]) + Sync + Send,
{
    match sweep {
        Sweep::Serial => a
            .chunks_mut(width)
            .zip(b.chunks_mut(width))
            .enumerate()
            .for_each(|(i, (ra, rb))| op(NodeIndex::new(i), ra, rb)),
        #[cfg(feature = "parallel")]
        Sweep::Parallel => {
            use rayon::prelude::*;
            a.par_chunks_mut(width)
                .zip(b.par_chunks_mut(width))
                .enumerate()
                .for_each(|(i, (ra, rb))| op(NodeIndex::new(i), ra, rb));
        }
    }
}
