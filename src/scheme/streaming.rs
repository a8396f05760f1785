//! Direction-gated streaming.
//!
//! `f[x][d] = fStage[x - c_d][d]` for every direction the node may read.
//! Fluid nodes read every direction. Boundary nodes consult the gate table
//! with their tag and whether their kind requires streaming; directions left
//! closed keep their value until a boundary kernel fills them.

use super::sweep::{for_each_node, Sweep};
use crate::geometry::{GateTable, SchemePolicy};
use crate::lattice::Lattice;
use crate::mesh::Block;

/// Stream `fStage` into `f` over the active nodes.
pub fn stream(
    block: &mut Block,
    lattice: &Lattice,
    gates: &GateTable,
    policy: &SchemePolicy,
    sweep: Sweep,
) {
    let Block {
        nodes,
        offsets,
        f_stage,
        f,
        ..
    } = block;
    let (nodes, offsets, src) = (&*nodes, &*offsets, f_stage.as_slice());
    let q = lattice.n_directions();

    for_each_node(f.as_mut_slice(), q, sweep, |node, out| {
        if !nodes.is_active(node) {
            return;
        }
        let n = node.get() as isize;
        let upwind = |d: usize| src[(n - offsets[d]) as usize * q + d];
        let vertex = nodes.vertex(node);
        if vertex.is_boundary() {
            let mask = gates.stream_mask(nodes.tag(node), policy.requires_stream(vertex));
            for (d, open) in mask.iter().enumerate() {
                if *open {
                    out[d] = upwind(d);
                }
            }
        } else {
            for (d, value) in out.iter_mut().enumerate() {
                *value = upwind(d);
            }
        }
    });
}
