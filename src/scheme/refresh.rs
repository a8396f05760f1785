//! Per-step refresh of the macroscopic, equilibrium, body-force and
//! relaxation-time fields from the current distributions.

use super::sweep::{for_each_node, for_each_node_pair, Sweep};
use crate::lattice::{BodyForce, Lattice, TauModel};
use crate::mesh::Block;
use crate::types::ComponentIndex;

/// Recompute density and velocity of every active node from `f`.
pub fn update_macro_vars(block: &mut Block, lattice: &Lattice, sweep: Sweep) {
    let Block {
        nodes,
        f,
        macro_vars,
        ..
    } = block;
    let (nodes, f) = (&*nodes, &*f);
    let width = macro_vars.width();
    for_each_node(macro_vars.as_mut_slice(), width, sweep, |node, vars| {
        if nodes.is_active(node) {
            lattice.moments(f.node(node), vars);
        }
    });
}

/// Recompute `feq` and the body-force term of every active node from the
/// macroscopic variables.
pub fn update_equilibrium_and_body_force(
    block: &mut Block,
    lattice: &Lattice,
    force: &BodyForce,
    sweep: Sweep,
) {
    let Block {
        nodes,
        macro_vars,
        feq,
        body_force,
        ..
    } = block;
    let (nodes, macro_vars) = (&*nodes, &*macro_vars);
    let q = lattice.n_directions();
    for_each_node_pair(
        feq.as_mut_slice(),
        body_force.as_mut_slice(),
        q,
        sweep,
        |node, feq_row, force_row| {
            if nodes.is_active(node) {
                let vars = macro_vars.node(node);
                lattice.equilibrium(vars, feq_row);
                force.evaluate(lattice, vars, force_row);
            }
        },
    );
}

/// Recompute the per-component relaxation time of every active node.
pub fn update_relaxation_time(
    block: &mut Block,
    lattice: &Lattice,
    model: TauModel,
    tau_ref: &[f64],
    sweep: Sweep,
) {
    let Block {
        nodes,
        macro_vars,
        tau,
        ..
    } = block;
    let (nodes, macro_vars) = (&*nodes, &*macro_vars);
    let width = tau.width();
    for_each_node(tau.as_mut_slice(), width, sweep, |node, row| {
        if nodes.is_active(node) {
            let vars = macro_vars.node(node);
            for (c, t) in row.iter_mut().enumerate() {
                let rho = vars[lattice.density_var(ComponentIndex::new(c)).get()];
                *t = model.evaluate(tau_ref[c], rho);
            }
        }
    });
}
