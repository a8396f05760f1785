//! Node coordinates of a block.
//!
//! Blocks are tensor-product meshes: each axis carries its own, possibly
//! non-uniform, coordinate list. Halo coordinates continue the spacing of
//! the nearest owned interval.

use super::shape::BlockShape;
use crate::error::{LbmError, Result};

/// Per-axis coordinates over the allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinates {
    axes: [Vec<f64>; 3],
}

impl Coordinates {
    /// Uniform spacing `mesh_size` starting at `origin` on the first owned cell.
    pub fn uniform(shape: &BlockShape, origin: [f64; 3], mesh_size: f64) -> Self {
        let axes = std::array::from_fn(|axis| {
            let lo = shape.lo(axis) as f64;
            (0..shape.allocated()[axis])
                .map(|i| {
                    if axis < shape.dimension() {
                        origin[axis] + (i as f64 - lo) * mesh_size
                    } else {
                        origin[axis]
                    }
                })
                .collect()
        });
        Self { axes }
    }

    /// Replace the owned coordinates of `axis` and extrapolate the halo.
    pub fn set_axis(&mut self, shape: &BlockShape, axis: usize, owned: &[f64]) -> Result<()> {
        let n = shape.active()[axis];
        if axis >= shape.dimension() || owned.len() != n {
            return Err(LbmError::DimensionMismatch {
                context: "axis coordinates",
                expected: n,
                actual: owned.len(),
            });
        }
        if n < 2 {
            return Err(LbmError::invalid_config(
                "explicit coordinates need at least two owned cells",
            ));
        }
        if owned.windows(2).any(|w| w[1] <= w[0]) {
            return Err(LbmError::invalid_config(format!(
                "coordinates along axis {axis} must increase strictly"
            )));
        }

        let halo = shape.halo();
        let first = owned[1] - owned[0];
        let last = owned[n - 1] - owned[n - 2];
        let values = &mut self.axes[axis];
        for h in 0..halo {
            values[halo - 1 - h] = owned[0] - (h + 1) as f64 * first;
            values[halo + n + h] = owned[n - 1] + (h + 1) as f64 * last;
        }
        values[halo..halo + n].copy_from_slice(owned);
        Ok(())
    }

    /// Coordinate of allocation index `i` along `axis`.
    #[inline]
    pub fn at(&self, axis: usize, i: usize) -> f64 {
        self.axes[axis][i]
    }

    /// Spatial position of an allocation position.
    pub fn point(&self, p: [usize; 3]) -> [f64; 3] {
        [self.axes[0][p[0]], self.axes[1][p[1]], self.axes[2][p[2]]]
    }

    /// Smallest spacing along the active axes.
    pub fn min_spacing(&self, shape: &BlockShape) -> f64 {
        (0..shape.dimension())
            .flat_map(|axis| self.axes[axis].windows(2).map(|w| w[1] - w[0]))
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform() {
        let shape = BlockShape::new(2, [4, 3, 1], 2).unwrap();
        let coords = Coordinates::uniform(&shape, [1.0, 0.0, 0.0], 0.5);
        assert_relative_eq!(coords.at(0, 2), 1.0);
        assert_relative_eq!(coords.at(0, 0), 0.0);
        assert_relative_eq!(coords.at(1, 6), 2.0);
        assert_eq!(coords.at(2, 0), 0.0);
        assert_relative_eq!(coords.min_spacing(&shape), 0.5);
    }

    #[test]
    fn test_explicit_axis_extrapolates_halo() {
        let shape = BlockShape::new(2, [3, 3, 1], 2).unwrap();
        let mut coords = Coordinates::uniform(&shape, [0.0; 3], 1.0);
        coords.set_axis(&shape, 0, &[0.0, 0.1, 0.3]).unwrap();
        assert_relative_eq!(coords.at(0, 1), -0.1);
        assert_relative_eq!(coords.at(0, 0), -0.2);
        assert_relative_eq!(coords.at(0, 5), 0.5);
        assert_relative_eq!(coords.at(0, 6), 0.7);
        assert!(coords.set_axis(&shape, 0, &[0.0, 0.0, 1.0]).is_err());
        assert!(coords.set_axis(&shape, 2, &[0.0]).is_err());
    }
}
