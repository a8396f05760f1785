//! Explicit and semi-implicit time marching of the finite-difference scheme.
//!
//! ```text
//! explicit:      f += dt * coeff * (F - grad + (feq - f) / tau)
//! semi-implicit: f = (feq dt + F dt tau - grad dt tau + f tau) / (dt + tau)
//! ```
//!
//! `grad` is the staged gradient. Boundary nodes march only the directions
//! open under the need-calc gate.

use serde::{Deserialize, Serialize};

use super::sweep::{try_for_each_node, Sweep};
use crate::analysis::{CheckSite, Diagnostics, UpdateStage};
use crate::error::Result;
use crate::geometry::GateTable;
use crate::lattice::Lattice;
use crate::mesh::Block;
use crate::types::ComponentIndex;

/// Time-marching rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TimeIntegrator {
    /// Forward Euler stage, scaled by `scheme_coeff` (Runge-Kutta stage weight).
    Explicit { scheme_coeff: f64 },
    /// Relaxation term treated implicitly.
    SemiImplicit,
}

impl Default for TimeIntegrator {
    fn default() -> Self {
        Self::Explicit { scheme_coeff: 1.0 }
    }
}

impl TimeIntegrator {
    /// Advance one distribution value.
    #[inline]
    pub fn advance(self, f: f64, feq: f64, force: f64, grad: f64, tau: f64, dt: f64) -> f64 {
        match self {
            Self::Explicit { scheme_coeff } => {
                f + dt * scheme_coeff * (force - grad + (feq - f) / tau)
            }
            Self::SemiImplicit => {
                (feq * dt + force * dt * tau - grad * dt * tau + f * tau) / (dt + tau)
            }
        }
    }
}

/// March `f` in place over the active nodes.
pub fn march(
    block: &mut Block,
    lattice: &Lattice,
    gates: &GateTable,
    integrator: TimeIntegrator,
    dt: f64,
    diagnostics: Diagnostics,
    sweep: Sweep,
) -> Result<()> {
    let Block {
        index,
        nodes,
        f_stage,
        feq,
        body_force,
        tau,
        f,
        ..
    } = block;
    let block_index = *index;
    let (nodes, grad, feq, body_force, tau) = (&*nodes, &*f_stage, &*feq, &*body_force, &*tau);
    let q = lattice.n_directions();

    try_for_each_node(f.as_mut_slice(), q, sweep, |node, row| {
        if !nodes.is_active(node) {
            return Ok(());
        }
        let vertex = nodes.vertex(node);
        let gate = vertex
            .is_boundary()
            .then(|| gates.need_calc_mask(nodes.tag(node)));
        let (grad_row, feq_row, force_row) = (grad.node(node), feq.node(node), body_force.node(node));

        for (c, comp) in lattice.components().iter().enumerate() {
            let component = ComponentIndex::new(c);
            let t = tau.get(node, component);
            let site = CheckSite {
                stage: UpdateStage::Marching,
                block: block_index,
                node,
                component,
            };
            for d in comp.directions() {
                if gate.is_some_and(|m| !m[d]) {
                    continue;
                }
                let value = integrator.advance(row[d], feq_row[d], force_row[d], grad_row[d], t, dt);
                row[d] = value;
                if diagnostics.is_enabled() {
                    site.check(d, value)?;
                }
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equilibrium_is_fixed_point() {
        for integrator in [TimeIntegrator::default(), TimeIntegrator::SemiImplicit] {
            let f = integrator.advance(0.2, 0.2, 0.0, 0.0, 0.01, 0.05);
            assert_relative_eq!(f, 0.2, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_explicit_stage_coefficient() {
        let full = TimeIntegrator::Explicit { scheme_coeff: 1.0 };
        let half = TimeIntegrator::Explicit { scheme_coeff: 0.5 };
        let (f, feq, force, grad, tau, dt) = (0.3, 0.25, 0.01, 0.02, 0.1, 0.01);
        let df_full = full.advance(f, feq, force, grad, tau, dt) - f;
        let df_half = half.advance(f, feq, force, grad, tau, dt) - f;
        assert_relative_eq!(df_half, 0.5 * df_full, epsilon = 1e-15);
        assert_relative_eq!(df_full, dt * (force - grad + (feq - f) / tau), epsilon = 1e-15);
    }

    #[test]
    fn test_semi_implicit_relaxes_toward_equilibrium() {
        let f = TimeIntegrator::SemiImplicit.advance(1.0, 0.0, 0.0, 0.0, 0.1, 0.1);
        assert_relative_eq!(f, 0.5, epsilon = 1e-15);
        // stiff limit dt >> tau lands on feq
        let f = TimeIntegrator::SemiImplicit.advance(1.0, 0.4, 0.0, 0.0, 1e-9, 1.0);
        assert_relative_eq!(f, 0.4, epsilon = 1e-8);
    }
}
