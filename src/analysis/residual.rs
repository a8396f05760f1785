//! Residual convergence monitor.
//!
//! For each macroscopic variable `v`, summed over the active nodes of every
//! block:
//!
//! ```text
//! absolute(v)  = sum (current(v) - previous(v))^2
//! reference(v) = sum current(v)^2
//! residual(v)  = absolute(v) / reference(v) / (check_period * dt)
//! ```
//!
//! after which `current` is copied into the snapshot for the next window.
//! Sums are formed over fixed node chunks and combined in chunk order, so
//! the result does not depend on the sweep mode.

use crate::error::{LbmError, Result};
use crate::mesh::{Block, Grid};
use crate::scheme::Sweep;
use crate::types::NodeIndex;

/// Nodes per partial sum.
const CHUNK_NODES: usize = 4096;

/// Absolute and reference sums of one macroscopic variable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResidualPair {
    /// Sum of squared change since the last check.
    pub absolute: f64,
    /// Sum of squared current value.
    pub reference: f64,
}

impl ResidualPair {
    /// Normalised residual over a window of `check_period` steps of `dt`.
    ///
    /// A variable that is zero everywhere has no reference magnitude: it
    /// reports zero if it did not change and the unnormalised change
    /// otherwise.
    pub fn residual(&self, check_period: usize, dt: f64) -> f64 {
        let window = check_period as f64 * dt;
        if self.reference > 0.0 {
            self.absolute / self.reference / window
        } else if self.absolute == 0.0 {
            0.0
        } else {
            self.absolute / window
        }
    }

    fn combine(self, other: Self) -> Self {
        Self {
            absolute: self.absolute + other.absolute,
            reference: self.reference + other.reference,
        }
    }
}

/// Residuals of one check.
#[derive(Clone, Debug, PartialEq)]
pub struct ResidualReport {
    /// Raw sums per macroscopic variable.
    pub pairs: Vec<ResidualPair>,
    /// Normalised residual per macroscopic variable.
    pub residuals: Vec<f64>,
}

impl ResidualReport {
    /// Largest residual (NaN if any residual is NaN).
    pub fn max(&self) -> f64 {
        self.residuals.iter().copied().fold(0.0, |acc, r| {
            if r.is_nan() || acc.is_nan() {
                f64::NAN
            } else {
                acc.max(r)
            }
        })
    }

    /// Whether every residual is below `criterion`.
    pub fn converged(&self, criterion: f64) -> bool {
        self.residuals.iter().all(|r| *r < criterion)
    }
}

/// Produces the residual series; the stop decision belongs to the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResidualMonitor {
    dt: f64,
}

impl ResidualMonitor {
    /// Monitor for a time step.
    pub fn new(dt: f64) -> Result<Self> {
        if !(dt > 0.0) {
            return Err(LbmError::invalid_config("time step must be positive"));
        }
        Ok(Self { dt })
    }

    /// Time step used in the normalisation.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Accumulate the residual sums over `grid`, normalise them by a window
    /// of `check_period` steps and snapshot the current macroscopic
    /// variables.
    pub fn check(
        &self,
        grid: &mut Grid,
        sweep: Sweep,
        check_period: usize,
    ) -> Result<ResidualReport> {
        if check_period == 0 {
            return Err(LbmError::invalid_config("check period must be positive"));
        }
        let n_vars = grid
            .blocks()
            .first()
            .map_or(0, |b| b.macro_vars.width());
        let mut pairs = vec![ResidualPair::default(); n_vars];
        for block in grid.blocks_mut() {
            for (total, part) in pairs.iter_mut().zip(block_pairs(block, sweep)) {
                *total = total.combine(part);
            }
            block.macro_snapshot.as_mut_slice().copy_from_slice(block.macro_vars.as_slice());
        }
        let residuals = pairs
            .iter()
            .map(|p| p.residual(check_period, self.dt))
            .collect();
        Ok(ResidualReport { pairs, residuals })
    }
}

fn block_pairs(block: &Block, sweep: Sweep) -> Vec<ResidualPair> {
    let width = block.macro_vars.width();
    let rows = CHUNK_NODES * width;
    let nodes = &block.nodes;

    let partial = |(chunk, (cur, prev)): (usize, (&[f64], &[f64]))| {
        let mut acc = vec![ResidualPair::default(); width];
        for (r, (c, p)) in cur.chunks(width).zip(prev.chunks(width)).enumerate() {
            if !nodes.is_active(NodeIndex::new(chunk * CHUNK_NODES + r)) {
                continue;
            }
            for (v, pair) in acc.iter_mut().enumerate() {
                let diff = c[v] - p[v];
                pair.absolute += diff * diff;
                pair.reference += c[v] * c[v];
            }
        }
        acc
    };

    let cur = block.macro_vars.as_slice();
    let prev = block.macro_snapshot.as_slice();
    let partials: Vec<Vec<ResidualPair>> = match sweep {
        Sweep::Serial => cur
            .chunks(rows)
            .zip(prev.chunks(rows))
            .enumerate()
            .map(partial)
            .collect(),
        #[cfg(feature = "parallel")]
        Sweep::Parallel => {
            use rayon::prelude::*;
            cur.par_chunks(rows)
                .zip(prev.par_chunks(rows))
                .enumerate()
                .map(partial)
                .collect()
        }
    };

    partials
        .into_iter()
        .fold(vec![ResidualPair::default(); width], |acc, part| {
            acc.into_iter()
                .zip(part)
                .map(|(a, b)| a.combine(b))
                .collect()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_residual_normalisation() {
        let pair = ResidualPair {
            absolute: 2.0,
            reference: 4.0,
        };
        assert_relative_eq!(pair.residual(10, 0.05), 1.0);
    }

    #[test]
    fn test_zero_reference() {
        let still = ResidualPair::default();
        assert_eq!(still.residual(100, 0.1), 0.0);
        let moved = ResidualPair {
            absolute: 1.0,
            reference: 0.0,
        };
        assert_relative_eq!(moved.residual(10, 0.1), 1.0);
    }

    #[test]
    fn test_report_convergence() {
        let report = ResidualReport {
            pairs: vec![ResidualPair::default(); 2],
            residuals: vec![1e-9, 5e-8],
        };
        assert!(report.converged(1e-7));
        assert!(!report.converged(1e-8));
        assert_eq!(report.max(), 5e-8);

        let broken = ResidualReport {
            pairs: vec![],
            residuals: vec![1e-9, f64::NAN],
        };
        assert!(!broken.converged(1.0));
        assert!(broken.max().is_nan());
    }

    #[test]
    fn test_monitor_rejects_bad_time_step() {
        assert!(ResidualMonitor::new(0.0).is_err());
        assert!(ResidualMonitor::new(f64::NAN).is_err());
        assert_eq!(ResidualMonitor::new(0.1).unwrap().dt(), 0.1);
    }
}
