//! BGK collision with body force.
//!
//! ```text
//! fStage = f - k (f - feq) + tau k F,   k = dt / (tau + dt / 2)
//! ```
//!
//! Only nodes whose vertex type is in the collision-required set are
//! written. `f` is never touched.

use super::sweep::{try_for_each_node, Sweep};
use crate::analysis::{CheckSite, Diagnostics, UpdateStage};
use crate::error::Result;
use crate::geometry::SchemePolicy;
use crate::lattice::Lattice;
use crate::mesh::Block;
use crate::types::ComponentIndex;

/// Collision factor `dt / (tau + dt/2)`.
#[inline]
pub fn collision_factor(dt: f64, tau: f64) -> f64 {
    dt / (tau + 0.5 * dt)
}

/// Collide every node of the collision-required set into `fStage`.
pub fn collide(
    block: &mut Block,
    lattice: &Lattice,
    policy: &SchemePolicy,
    dt: f64,
    diagnostics: Diagnostics,
    sweep: Sweep,
) -> Result<()> {
    let Block {
        index,
        nodes,
        f,
        feq,
        body_force,
        tau,
        f_stage,
        ..
    } = block;
    let block_index = *index;
    let (nodes, f, feq, body_force, tau) = (&*nodes, &*f, &*feq, &*body_force, &*tau);
    let q = lattice.n_directions();

    try_for_each_node(f_stage.as_mut_slice(), q, sweep, |node, out| {
        if !nodes.in_bulk(node) || !policy.requires_collision(nodes.vertex(node)) {
            return Ok(());
        }
        let (f_row, feq_row, force_row) = (f.node(node), feq.node(node), body_force.node(node));
        for (c, comp) in lattice.components().iter().enumerate() {
            let component = ComponentIndex::new(c);
            let t = tau.get(node, component);
            let k = collision_factor(dt, t);
            let site = CheckSite {
                stage: UpdateStage::Collision,
                block: block_index,
                node,
                component,
            };
            for d in comp.directions() {
                let value = f_row[d] - k * (f_row[d] - feq_row[d]) + t * k * force_row[d];
                out[d] = value;
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
    fn test_collision_factor() {
        assert_relative_eq!(collision_factor(1.0, 0.5), 1.0);
        // tau -> 0 gives the over-relaxation limit k = 2
        assert_relative_eq!(collision_factor(0.1, 0.0), 2.0);
    }
}
