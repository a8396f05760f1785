//! Boundary kernels.
//!
//! Kernels run node by node in surface definition order, then over the
//! embedded-solid boundary nodes of the bulk. They overwrite `f` at the
//! node only and read the staging and equilibrium fields.

use super::{BoundaryCondition, SurfaceBoundary};
use crate::field::DistributionField;
use crate::geometry::{GateTable, SchemePolicy, VertexType};
use crate::lattice::Lattice;
use crate::mesh::{Block, BlockShape, NodeProperties};
use crate::types::{ComponentIndex, DirectionIndex, NodeIndex};

/// Denominators below this fall back to the node density.
const DENOMINATOR_EPS: f64 = 1e-12;

/// Which directions count as supplied by the interior update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KnownDirections {
    /// Opened by the stream gate.
    Streamed,
    /// Opened by the need-calc gate.
    Marched,
}

struct Context<'a> {
    lattice: &'a Lattice,
    gates: &'a GateTable,
    policy: &'a SchemePolicy,
    known: KnownDirections,
    shape: &'a BlockShape,
    nodes: &'a NodeProperties,
    f_stage: &'a DistributionField,
    feq: &'a DistributionField,
}

/// Apply every surface boundary and the embedded-solid walls of a block.
pub(crate) fn apply_boundary_conditions(
    block: &mut Block,
    lattice: &Lattice,
    gates: &GateTable,
    policy: &SchemePolicy,
    known: KnownDirections,
) {
    let Block {
        shape,
        nodes,
        surfaces,
        f_stage,
        feq,
        f,
        ..
    } = block;
    let ctx = Context {
        lattice,
        gates,
        policy,
        known,
        shape: &*shape,
        nodes: &*nodes,
        f_stage: &*f_stage,
        feq: &*feq,
    };
    let mut scratch = vec![0.0; lattice.n_directions()];

    for (id, boundary) in surfaces.iter().enumerate() {
        ctx.apply_surface(id, boundary, f, &mut scratch);
    }
    for p in ctx.shape.bulk().iter() {
        let node = ctx.shape.node_index(p);
        if ctx.nodes.vertex(node) == VertexType::ImmersedBoundary {
            ctx.diffuse_reflection(node, [0.0; 3], f, &mut scratch);
        }
    }
}

impl Context<'_> {
    fn apply_surface(
        &self,
        id: usize,
        boundary: &SurfaceBoundary,
        f: &mut DistributionField,
        scratch: &mut [f64],
    ) {
        let Some(range) = self.shape.surface(boundary.surface) else {
            return;
        };
        for p in range.iter() {
            let node = self.shape.node_index(p);
            if self.nodes.owner(node) != Some(id) {
                continue;
            }
            match boundary.condition {
                BoundaryCondition::ZouHeVelocity { velocity } => {
                    self.prescribed_velocity(node, velocity, f, scratch)
                }
                BoundaryCondition::EqmDiffuseRefl { velocity } => {
                    self.diffuse_reflection(node, velocity, f, scratch)
                }
                BoundaryCondition::ExtrapolPressure1st { density } => {
                    self.extrapolate_pressure(p, node, density, false, f)
                }
                BoundaryCondition::ExtrapolPressure2nd { density } => {
                    self.extrapolate_pressure(p, node, density, true, f)
                }
                BoundaryCondition::FreeFlux => self.zero_flux(node, f),
                BoundaryCondition::Periodic => self.periodic(p, node, f),
            }
        }
    }

    fn known(&self, node: NodeIndex) -> &[bool] {
        let tag = self.nodes.tag(node);
        match self.known {
            KnownDirections::Streamed => self
                .gates
                .stream_mask(tag, self.policy.requires_stream(self.nodes.vertex(node))),
            KnownDirections::Marched => self.gates.need_calc_mask(tag),
        }
    }

    fn planar(&self, mut u: [f64; 3]) -> [f64; 3] {
        for value in u.iter_mut().skip(self.lattice.dimension()) {
            *value = 0.0;
        }
        u
    }

    /// Value reflected into unknown direction `dir`.
    ///
    /// Under streaming this is the node's own staged population travelling
    /// the opposite way, which streaming could not deliver past the wall.
    /// Under marching it is the marched opposite, or the equilibrium when
    /// the opposite was not marched either.
    fn reflected(
        &self,
        node: NodeIndex,
        dir: DirectionIndex,
        known: &[bool],
        f: &DistributionField,
    ) -> f64 {
        let o = self.lattice.opposite(dir);
        match self.known {
            KnownDirections::Streamed => self.f_stage.get(node, o),
            KnownDirections::Marched if known[o.get()] => f.get(node, o),
            KnownDirections::Marched => self.feq.get(node, dir),
        }
    }

    /// Equilibrium diffuse reflection.
    ///
    /// The wall absorbs the mass that reaches the node, the known
    /// populations plus the reflected ones, and re-emits it as
    /// `rho_w feq(1, u_w)` in every direction.
    fn diffuse_reflection(
        &self,
        node: NodeIndex,
        velocity: [f64; 3],
        f: &mut DistributionField,
        e: &mut [f64],
    ) {
        let u = self.planar(velocity);
        let known = self.known(node);
        for c in 0..self.lattice.n_components() {
            let comp = ComponentIndex::new(c);
            self.lattice.unit_equilibrium(comp, u, e);
            let rho_wall: f64 = self
                .lattice
                .component_range(comp)
                .map(|d| {
                    let dir = DirectionIndex::new(d);
                    if known[d] {
                        f.get(node, dir)
                    } else {
                        self.reflected(node, dir, known, f)
                    }
                })
                .sum();
            for d in self.lattice.component_range(comp) {
                f.set(node, DirectionIndex::new(d), rho_wall * e[d]);
            }
        }
    }

    /// Prescribed velocity by non-equilibrium bounce-back.
    ///
    /// Unknown `f_i = f_opp + rho (feq_i - feq_opp)` when the opposite is
    /// known, `rho feq_i` otherwise, with `rho` chosen so the node's
    /// populations sum to it.
    fn prescribed_velocity(
        &self,
        node: NodeIndex,
        velocity: [f64; 3],
        f: &mut DistributionField,
        e: &mut [f64],
    ) {
        let u = self.planar(velocity);
        let known = self.known(node);
        for c in 0..self.lattice.n_components() {
            let comp = ComponentIndex::new(c);
            self.lattice.unit_equilibrium(comp, u, e);
            let (mut numer, mut denom, mut current) = (0.0, 1.0, 0.0);
            for d in self.lattice.component_range(comp) {
                let dir = DirectionIndex::new(d);
                current += f.get(node, dir);
                if known[d] {
                    numer += f.get(node, dir);
                    continue;
                }
                let o = self.lattice.opposite(dir);
                if known[o.get()] {
                    numer += f.get(node, o);
                    denom -= e[d] - e[o.get()];
                } else {
                    denom -= e[d];
                }
            }
            let rho = if denom.abs() > DENOMINATOR_EPS {
                numer / denom
            } else {
                current
            };
            for d in self.lattice.component_range(comp) {
                if known[d] {
                    continue;
                }
                let dir = DirectionIndex::new(d);
                let o = self.lattice.opposite(dir);
                let value = if known[o.get()] {
                    f.get(node, o) + rho * (e[d] - e[o.get()])
                } else {
                    rho * e[d]
                };
                f.set(node, dir, value);
            }
        }
    }

    /// Prescribed density with extrapolated unknowns along the inward normal.
    fn extrapolate_pressure(
        &self,
        p: [usize; 3],
        node: NodeIndex,
        density: f64,
        second_order: bool,
        f: &mut DistributionField,
    ) {
        let n = self.nodes.tag(node).open_sides().normal();
        let known = self.known(node);
        if n != [0, 0, 0] {
            let first = self.shape.neighbour(p, n).map(|q| self.shape.node_index(q));
            let second = self
                .shape
                .neighbour(p, [2 * n[0], 2 * n[1], 2 * n[2]])
                .map(|q| self.shape.node_index(q));
            if let Some(n1) = first {
                for (d, is_known) in known.iter().enumerate() {
                    if *is_known {
                        continue;
                    }
                    let dir = DirectionIndex::new(d);
                    let f1 = f.get(n1, dir);
                    let value = match (second_order, second) {
                        (true, Some(n2)) => 2.0 * f1 - f.get(n2, dir),
                        _ => f1,
                    };
                    f.set(node, dir, value);
                }
            }
        }

        for c in 0..self.lattice.n_components() {
            let range = self.lattice.component_range(ComponentIndex::new(c));
            let row = f.node_mut(node);
            let sum: f64 = row[range.clone()].iter().sum();
            if sum > 0.0 {
                let scale = density / sum;
                row[range].iter_mut().for_each(|v| *v *= scale);
            }
        }
    }

    /// Zero normal flux: every unknown is bounced back from the wall.
    fn zero_flux(&self, node: NodeIndex, f: &mut DistributionField) {
        let known = self.known(node);
        for (d, is_known) in known.iter().enumerate() {
            if *is_known {
                continue;
            }
            let dir = DirectionIndex::new(d);
            let value = self.reflected(node, dir, known, f);
            f.set(node, dir, value);
        }
    }

    /// Unknowns read the staged value of the periodic image of their
    /// upwind node.
    fn periodic(&self, p: [usize; 3], node: NodeIndex, f: &mut DistributionField) {
        let known = self.known(node);
        for (d, is_known) in known.iter().enumerate() {
            if *is_known {
                continue;
            }
            let dir = DirectionIndex::new(d);
            let c = self.lattice.velocity(dir);
            if let Some(src) = self.shape.wrap(p, [-c[0], -c[1], -c[2]], [true; 3]) {
                f.set(node, dir, self.f_stage.get(self.shape.node_index(src), dir));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::VelocitySet;
    use crate::mesh::{Coordinates, Surface};
    use crate::types::BlockIndex;
    use approx::assert_relative_eq;

    fn channel(condition: BoundaryCondition) -> (Block, Lattice, GateTable) {
        let lattice = Lattice::single(VelocitySet::D2Q9);
        let shape = BlockShape::new(2, [4, 4, 1], 2).unwrap();
        let coords = Coordinates::uniform(&shape, [0.0; 3], 1.0);
        let mut block = Block::new(BlockIndex::ZERO, shape, coords, &lattice).unwrap();
        block
            .assign_surface(SurfaceBoundary::new(Surface::Bottom, condition))
            .unwrap();
        block.classify(&lattice, [true, false, false]).unwrap();
        let gates = GateTable::new(&lattice, &SchemePolicy::TWO_D);
        (block, lattice, gates)
    }

    fn fill_equilibrium(block: &mut Block, lattice: &Lattice, rho: f64, u: [f64; 3]) {
        let mut row = vec![0.0; lattice.n_directions()];
        lattice.equilibrium(&[rho, u[0], u[1]], &mut row);
        for node in 0..block.shape.n_nodes() {
            block.f.node_mut(NodeIndex::new(node)).copy_from_slice(&row);
            block.f_stage.node_mut(NodeIndex::new(node)).copy_from_slice(&row);
        }
    }

    fn unknown_directions(block: &Block, lattice: &Lattice, gates: &GateTable, node: NodeIndex) -> Vec<usize> {
        let vertex = block.nodes.vertex(node);
        let mask = gates.stream_mask(
            block.nodes.tag(node),
            SchemePolicy::TWO_D.requires_stream(vertex),
        );
        (0..lattice.n_directions()).filter(|d| !mask[*d]).collect()
    }

    #[test]
    fn test_zou_he_recovers_equilibrium() {
        let u = [0.02, 0.0, 0.0];
        let (mut block, lattice, gates) = channel(BoundaryCondition::ZouHeVelocity { velocity: u });
        fill_equilibrium(&mut block, &lattice, 1.05, u);
        let node = block.node_at([1, 0, 0]);
        let expected = block.f.node(node).to_vec();
        let unknown = unknown_directions(&block, &lattice, &gates, node);
        assert_eq!(unknown.len(), 3);
        for d in &unknown {
            block.f.set(node, DirectionIndex::new(*d), -1.0);
        }

        apply_boundary_conditions(&mut block, &lattice, &gates, &SchemePolicy::TWO_D, KnownDirections::Streamed);
        for (got, want) in block.f.node(node).iter().zip(&expected) {
            assert_relative_eq!(*got, *want, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_diffuse_wall_has_wall_velocity_and_no_normal_flux() {
        let (mut block, lattice, gates) = channel(BoundaryCondition::wall());
        fill_equilibrium(&mut block, &lattice, 1.0, [0.01, -0.005, 0.0]);
        let node = block.node_at([2, 0, 0]);
        apply_boundary_conditions(&mut block, &lattice, &gates, &SchemePolicy::TWO_D, KnownDirections::Streamed);

        let mut vars = vec![0.0; 3];
        lattice.moments(block.f.node(node), &mut vars);
        assert!(vars[0] > 0.0);
        assert!(vars[1].abs() < 1e-15);
        assert!(vars[2].abs() < 1e-15);
    }

    #[test]
    fn test_extrapolated_pressure_sets_density() {
        let (mut block, lattice, gates) =
            channel(BoundaryCondition::ExtrapolPressure2nd { density: 0.98 });
        fill_equilibrium(&mut block, &lattice, 1.0, [0.0, 0.01, 0.0]);
        apply_boundary_conditions(&mut block, &lattice, &gates, &SchemePolicy::TWO_D, KnownDirections::Streamed);
        let node = block.node_at([0, 0, 0]);
        let rho: f64 = block.f.node(node).iter().sum();
        assert_relative_eq!(rho, 0.98, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_flux_bounces_back() {
        let (mut block, lattice, gates) = channel(BoundaryCondition::FreeFlux);
        fill_equilibrium(&mut block, &lattice, 1.0, [0.0, -0.02, 0.0]);
        let node = block.node_at([3, 0, 0]);
        apply_boundary_conditions(&mut block, &lattice, &gates, &SchemePolicy::TWO_D, KnownDirections::Streamed);
        // vertical populations are mirrored, so no net normal momentum
        let mut vars = vec![0.0; 3];
        lattice.moments(block.f.node(node), &mut vars);
        assert!(vars[2].abs() < 1e-15);
    }

    #[test]
    fn test_zero_flux_reflects_staged_populations() {
        let (mut block, lattice, gates) = channel(BoundaryCondition::FreeFlux);
        fill_equilibrium(&mut block, &lattice, 1.0, [0.01, -0.02, 0.0]);
        let node = block.node_at([1, 0, 0]);
        for d in 0..lattice.n_directions() {
            block.f_stage.set(node, DirectionIndex::new(d), 0.1 + 0.01 * d as f64);
        }
        let unknown = unknown_directions(&block, &lattice, &gates, node);
        let staged = block.f_stage.node(node).to_vec();
        let streamed: f64 = (0..lattice.n_directions())
            .filter(|d| !unknown.contains(d))
            .map(|d| block.f.get(node, DirectionIndex::new(d)))
            .sum();

        apply_boundary_conditions(&mut block, &lattice, &gates, &SchemePolicy::TWO_D, KnownDirections::Streamed);
        for d in &unknown {
            let dir = DirectionIndex::new(*d);
            let o = lattice.opposite(dir);
            assert_eq!(block.f.get(node, dir), staged[o.get()]);
        }
        // the node holds what streamed in plus what the wall turned around
        let reflected: f64 = unknown
            .iter()
            .map(|d| staged[lattice.opposite(DirectionIndex::new(*d)).get()])
            .sum();
        let rho: f64 = block.f.node(node).iter().sum();
        assert_relative_eq!(rho, streamed + reflected, epsilon = 1e-14);
    }

    #[test]
    fn test_surface_condition_applies_to_every_component() {
        let lattice = Lattice::from_components(&[VelocitySet::D2Q9, VelocitySet::D2Q9]).unwrap();
        let shape = BlockShape::new(2, [4, 4, 1], 2).unwrap();
        let coords = Coordinates::uniform(&shape, [0.0; 3], 1.0);
        let mut block = Block::new(BlockIndex::ZERO, shape, coords, &lattice).unwrap();
        block
            .assign_surface(SurfaceBoundary::new(Surface::Bottom, BoundaryCondition::wall()))
            .unwrap();
        block.classify(&lattice, [true, false, false]).unwrap();
        let gates = GateTable::new(&lattice, &SchemePolicy::TWO_D);

        let mut row = vec![0.0; lattice.n_directions()];
        lattice.equilibrium(&[1.0, 0.01, -0.005, 0.8, -0.02, 0.01], &mut row);
        for node in 0..block.shape.n_nodes() {
            block.f.node_mut(NodeIndex::new(node)).copy_from_slice(&row);
            block.f_stage.node_mut(NodeIndex::new(node)).copy_from_slice(&row);
        }
        apply_boundary_conditions(&mut block, &lattice, &gates, &SchemePolicy::TWO_D, KnownDirections::Streamed);

        let node = block.node_at([2, 0, 0]);
        let mut vars = vec![0.0; lattice.n_macro_vars()];
        lattice.moments(block.f.node(node), &mut vars);
        for c in 0..2 {
            assert!(vars[3 * c] > 0.0);
            assert!(vars[3 * c + 1].abs() < 1e-15, "component {c}");
            assert!(vars[3 * c + 2].abs() < 1e-15, "component {c}");
        }
    }
}
