//! Isothermal equilibrium, body force and relaxation time models.
//!
//! All expressions use the sound-speed normalisation of [`super::CS`]:
//!
//! ```text
//! feq_i = w_i rho (1 + xi.u + ((xi.u)^2 - u.u) / 2)
//! F_i   = w_i rho (xi.g + (xi.g)(xi.u) - g.u)
//! ```

use serde::{Deserialize, Serialize};

use super::Lattice;
use crate::types::{ComponentIndex, DirectionIndex};

#[inline]
fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Unit-density equilibrium of one direction.
#[inline]
pub fn equilibrium_weight(weight: f64, xi: [f64; 3], u: [f64; 3]) -> f64 {
    let xu = dot(&xi, &u);
    weight * (1.0 + xu + 0.5 * (xu * xu - dot(&u, &u)))
}

impl Lattice {
    /// Fill one node's equilibrium distributions from its macro-variable row.
    pub fn equilibrium(&self, vars: &[f64], feq: &mut [f64]) {
        for c in 0..self.n_components() {
            let c = ComponentIndex::new(c);
            let (rho, u) = self.component_state(c, vars);
            for d in self.component_range(c) {
                let dir = DirectionIndex::new(d);
                feq[d] = rho * equilibrium_weight(self.weight(dir), self.xi(dir), u);
            }
        }
    }

    /// Unit-density equilibrium of every direction of component `c` at velocity `u`.
    pub fn unit_equilibrium(&self, c: ComponentIndex, u: [f64; 3], out: &mut [f64]) {
        for d in self.component_range(c) {
            let dir = DirectionIndex::new(d);
            out[d] = equilibrium_weight(self.weight(dir), self.xi(dir), u);
        }
    }
}

// =============================================================================
// Body force
// =============================================================================

/// External body force acting on every component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BodyForce {
    /// No body force.
    #[default]
    None,
    /// Uniform acceleration in sound-speed units.
    Constant([f64; 3]),
}

impl BodyForce {
    /// Fill one node's body-force term from its macro-variable row.
    pub fn evaluate(&self, lattice: &Lattice, vars: &[f64], out: &mut [f64]) {
        match self {
            Self::None => out.fill(0.0),
            Self::Constant(g) => {
                for c in 0..lattice.n_components() {
                    let c = ComponentIndex::new(c);
                    let (rho, u) = lattice.component_state(c, vars);
                    let gu = dot(g, &u);
                    for d in lattice.component_range(c) {
                        let dir = DirectionIndex::new(d);
                        let xi = lattice.xi(dir);
                        let xg = dot(&xi, g);
                        let xu = dot(&xi, &u);
                        out[d] = lattice.weight(dir) * rho * (xg + xg * xu - gu);
                    }
                }
            }
        }
    }
}

// =============================================================================
// Relaxation time
// =============================================================================

/// Relaxation-time model, applied per component to its reference value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TauModel {
    /// `tau = tau_ref`.
    #[default]
    Constant,
    /// `tau = tau_ref / rho` (constant dynamic viscosity).
    InverseDensity,
}

impl TauModel {
    /// Relaxation time from the reference value and the local density.
    #[inline]
    pub fn evaluate(self, tau_ref: f64, rho: f64) -> f64 {
        match self {
            Self::Constant => tau_ref,
            Self::InverseDensity => tau_ref / rho,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::VelocitySet;
    use approx::assert_relative_eq;

    fn vars(rho: f64, u: [f64; 3]) -> Vec<f64> {
        vec![rho, u[0], u[1], u[2]]
    }

    #[test]
    fn test_equilibrium_recovers_moments() {
        let lattice = Lattice::single(VelocitySet::D3Q19);
        let input = vars(1.3, [0.02, -0.01, 0.005]);
        let mut feq = vec![0.0; 19];
        lattice.equilibrium(&input, &mut feq);

        let mut out = vec![0.0; 4];
        lattice.moments(&feq, &mut out);
        for (a, b) in out.iter().zip(&input) {
            assert_relative_eq!(*a, *b, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_equilibrium_at_rest_is_weighted_density() {
        let lattice = Lattice::single(VelocitySet::D2Q9);
        let mut feq = vec![0.0; 9];
        lattice.equilibrium(&[0.5, 0.0, 0.0], &mut feq);
        for (f, w) in feq.iter().zip(VelocitySet::D2Q9.weights()) {
            assert_eq!(*f, 0.5 * w);
        }
    }

    #[test]
    fn test_body_force_moments() {
        // sum F = 0, sum xi F = rho g
        let lattice = Lattice::single(VelocitySet::D3Q19);
        let g = [1e-3, 0.0, -2e-3];
        let input = vars(1.1, [0.01, 0.02, 0.0]);
        let mut force = vec![0.0; 19];
        BodyForce::Constant(g).evaluate(&lattice, &input, &mut force);

        let mass: f64 = force.iter().sum();
        assert!(mass.abs() < 1e-16);
        for a in 0..3 {
            let mom: f64 = (0..19)
                .map(|d| lattice.xi(DirectionIndex::new(d))[a] * force[d])
                .sum();
            assert_relative_eq!(mom, 1.1 * g[a], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_no_body_force_is_zero() {
        let lattice = Lattice::single(VelocitySet::D2Q9);
        let mut force = vec![1.0; 9];
        BodyForce::None.evaluate(&lattice, &[1.0, 0.1, 0.0], &mut force);
        assert!(force.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tau_models() {
        assert_eq!(TauModel::Constant.evaluate(0.01, 2.0), 0.01);
        assert_relative_eq!(TauModel::InverseDensity.evaluate(0.01, 2.0), 0.005);
    }
}
