//! Discrete velocity sets.
//!
//! Directions are ordered with the rest velocity first and opposite pairs
//! adjacent (`1 <-> 2`, `3 <-> 4`, ...).

use serde::{Deserialize, Serialize};

/// Discrete velocity quadrature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VelocitySet {
    /// Two-dimensional nine-velocity lattice.
    D2Q9,
    /// Three-dimensional fifteen-velocity lattice.
    D3Q15,
    /// Three-dimensional nineteen-velocity lattice.
    D3Q19,
}

// =============================================================================
// Velocity tables
// =============================================================================

const D2Q9_VELOCITIES: [[i32; 3]; 9] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [1, 1, 0],
    [-1, -1, 0],
    [-1, 1, 0],
    [1, -1, 0],
];

const D2Q9_WEIGHTS: [f64; 9] = [
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

const D3Q15_VELOCITIES: [[i32; 3]; 15] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    [1, 1, 1],
    [-1, -1, -1],
    [1, 1, -1],
    [-1, -1, 1],
    [1, -1, 1],
    [-1, 1, -1],
    [-1, 1, 1],
    [1, -1, -1],
];

const D3Q15_WEIGHTS: [f64; 15] = [
    2.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 72.0,
    1.0 / 72.0,
    1.0 / 72.0,
    1.0 / 72.0,
    1.0 / 72.0,
    1.0 / 72.0,
    1.0 / 72.0,
    1.0 / 72.0,
];

const D3Q19_VELOCITIES: [[i32; 3]; 19] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    [1, 1, 0],
    [-1, -1, 0],
    [1, -1, 0],
    [-1, 1, 0],
    [1, 0, 1],
    [-1, 0, -1],
    [1, 0, -1],
    [-1, 0, 1],
    [0, 1, 1],
    [0, -1, -1],
    [0, 1, -1],
    [0, -1, 1],
];

const D3Q19_WEIGHTS: [f64; 19] = [
    1.0 / 3.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

impl VelocitySet {
    /// Spatial dimension of the set.
    pub fn dimension(self) -> usize {
        match self {
            Self::D2Q9 => 2,
            Self::D3Q15 | Self::D3Q19 => 3,
        }
    }

    /// Number of discrete velocities.
    pub fn n_directions(self) -> usize {
        self.velocities().len()
    }

    /// Integer lattice velocities (unused axes are zero).
    pub fn velocities(self) -> &'static [[i32; 3]] {
        match self {
            Self::D2Q9 => &D2Q9_VELOCITIES,
            Self::D3Q15 => &D3Q15_VELOCITIES,
            Self::D3Q19 => &D3Q19_VELOCITIES,
        }
    }

    /// Quadrature weights, summing to one.
    pub fn weights(self) -> &'static [f64] {
        match self {
            Self::D2Q9 => &D2Q9_WEIGHTS,
            Self::D3Q15 => &D3Q15_WEIGHTS,
            Self::D3Q19 => &D3Q19_WEIGHTS,
        }
    }

    /// Largest velocity component magnitude (lattice cells per step).
    pub fn max_speed(self) -> usize {
        self.velocities()
            .iter()
            .flat_map(|c| c.iter())
            .map(|c| c.unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }

    /// Label used in logs, e.g. `"d3q19"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::D2Q9 => "d2q9",
            Self::D3Q15 => "d3q15",
            Self::D3Q19 => "d3q19",
        }
    }
}
