//! Cut-cell upwind gradient of the distributions.
//!
//! For direction `d` the convective term `xi_d . grad f_d` is assembled axis
//! by axis from one-sided differences on the upwind side. The default is
//! the three-point second-order stencil on the actual (non-uniform) node
//! coordinates. An axis drops to the two-point first-order stencil when its
//! second upwind point is unusable:
//!
//! - it lies outside the allocation,
//! - it is immersed solid,
//! - the first upwind node is a face or inner boundary whose solid side
//!   faces away from this node along that axis.
//!
//! Each axis decides independently. At boundary nodes, directions closed by
//! the need-calc gate get a zero gradient.

use super::sweep::{for_each_node, Sweep};
use crate::field::DistributionField;
use crate::geometry::{GateTable, GeometryTag};
use crate::lattice::{Lattice, CS};
use crate::mesh::{Block, BlockShape, Coordinates, NodeProperties};
use crate::types::DirectionIndex;

/// Stencil order along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StencilOrder {
    /// Two-point upwind difference.
    First,
    /// Three-point upwind difference.
    Second,
}

/// First-order one-sided derivative at `x0` from `(x0, f0)` and `(x1, f1)`.
#[inline]
pub fn two_point_derivative(x0: f64, x1: f64, f0: f64, f1: f64) -> f64 {
    (f0 - f1) / (x0 - x1)
}

/// Second-order one-sided derivative at `x0` on non-uniform points.
///
/// Derivative of the quadratic through the three points, evaluated at `x0`.
#[inline]
pub fn three_point_derivative(x: [f64; 3], f: [f64; 3]) -> f64 {
    let [x0, x1, x2] = x;
    f[0] * (1.0 / (x0 - x1) + 1.0 / (x0 - x2))
        + f[1] * (1.0 / (x1 - x0) - 1.0 / (x1 - x2))
        + f[2] * (1.0 / (x2 - x0) - 1.0 / (x2 - x1))
}

/// Stencil order usable at `p` along `axis` for upwind sign `s`
/// (the upwind points are `p - s e_axis` and `p - 2 s e_axis`).
pub fn stencil_order(
    shape: &BlockShape,
    nodes: &NodeProperties,
    p: [usize; 3],
    axis: usize,
    s: i32,
) -> StencilOrder {
    let mut e = [0i32; 3];
    e[axis] = -2 * s;
    let Some(far) = shape.neighbour(p, e) else {
        return StencilOrder::First;
    };
    if nodes.vertex(shape.node_index(far)).is_solid() {
        return StencilOrder::First;
    }

    e[axis] = -s;
    let Some(near) = shape.neighbour(p, e) else {
        return StencilOrder::First;
    };
    let near = shape.node_index(near);
    if nodes.vertex(near).is_boundary() {
        if let GeometryTag::Face(o) | GeometryTag::Inner(o) = nodes.tag(near) {
            if o.get(axis) as i32 == s {
                return StencilOrder::First;
            }
        }
    }
    StencilOrder::Second
}

fn axis_derivative(
    shape: &BlockShape,
    coords: &Coordinates,
    f: &DistributionField,
    p: [usize; 3],
    axis: usize,
    s: i32,
    d: DirectionIndex,
    order: StencilOrder,
) -> f64 {
    let shifted = |k: i32| {
        let mut q = p;
        q[axis] = (p[axis] as i64 - (k * s) as i64) as usize;
        q
    };
    let (p1, p2) = (shifted(1), shifted(2));
    let x0 = coords.at(axis, p[axis]);
    let x1 = coords.at(axis, p1[axis]);
    let f0 = f.get(shape.node_index(p), d);
    let f1 = f.get(shape.node_index(p1), d);
    match order {
        StencilOrder::First => two_point_derivative(x0, x1, f0, f1),
        StencilOrder::Second => {
            let x2 = coords.at(axis, p2[axis]);
            let f2 = f.get(shape.node_index(p2), d);
            three_point_derivative([x0, x1, x2], [f0, f1, f2])
        }
    }
}

/// Write `xi . grad f` of every direction of every active node into `fStage`.
pub fn compute_gradient(block: &mut Block, lattice: &Lattice, gates: &GateTable, sweep: Sweep) {
    let Block {
        shape,
        coordinates,
        nodes,
        f,
        f_stage,
        ..
    } = block;
    let (shape, coords, nodes, f) = (&*shape, &*coordinates, &*nodes, &*f);
    let q = lattice.n_directions();
    let dim = shape.dimension();

    for_each_node(f_stage.as_mut_slice(), q, sweep, |node, out| {
        if !nodes.is_active(node) {
            return;
        }
        let vertex = nodes.vertex(node);
        let gate = vertex
            .is_boundary()
            .then(|| gates.need_calc_mask(nodes.tag(node)));
        let p = shape.position(node);

        for (d, value) in out.iter_mut().enumerate() {
            if gate.is_some_and(|m| !m[d]) {
                *value = 0.0;
                continue;
            }
            let dir = DirectionIndex::new(d);
            let c = lattice.velocity(dir);
            let mut grad = 0.0;
            for axis in 0..dim {
                if c[axis] == 0 {
                    continue;
                }
                let s = c[axis].signum();
                let order = stencil_order(shape, nodes, p, axis, s);
                grad += CS
                    * c[axis] as f64
                    * axis_derivative(shape, coords, f, p, axis, s, dir, order);
            }
            *value = grad;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_three_point_uniform_reduces_to_textbook_stencil() {
        let h = 0.25;
        let (f0, f1, f2) = (1.3, 0.7, 0.4);
        let d = three_point_derivative([0.0, -h, -2.0 * h], [f0, f1, f2]);
        assert_relative_eq!(d, (3.0 * f0 - 4.0 * f1 + f2) / (2.0 * h), epsilon = 1e-12);
    }

    #[test]
    fn test_three_point_exact_for_quadratic_non_uniform() {
        let g = |x: f64| 2.0 * x * x - 3.0 * x + 0.5;
        let x = [1.0, 0.85, 0.6];
        let d = three_point_derivative(x, [g(x[0]), g(x[1]), g(x[2])]);
        assert_relative_eq!(d, 4.0 * x[0] - 3.0, epsilon = 1e-12);

        // points ahead of the node (negative velocity)
        let x = [1.0, 1.2, 1.5];
        let d = three_point_derivative(x, [g(x[0]), g(x[1]), g(x[2])]);
        assert_relative_eq!(d, 4.0 * x[0] - 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_point_exact_for_linear() {
        let d = two_point_derivative(0.3, 0.1, 0.9, 0.5);
        assert_relative_eq!(d, 2.0, epsilon = 1e-14);
    }
}
