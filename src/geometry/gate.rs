//! Direction validity per geometry tag.
//!
//! Streaming, gradient evaluation and time marching all ask the same
//! question: may direction `c` at a node with tag `t` read its upwind
//! neighbour? The answer depends only on the tag, the velocity and whether
//! the comparison is strict or inclusive, so it is tabulated once per
//! lattice into a [`GateTable`].
//!
//! For a constrained axis with fluid side `s` the per-axis test is
//! `s * c < 0` (strict) or `s * c <= 0` (inclusive). Face and inner tags
//! require every constrained axis to pass, outer tags at least one.

use super::tag::{GeometryTag, TAG_SLOTS};
use super::vertex::{VertexSet, VertexType};
use crate::lattice::Lattice;
use crate::types::DirectionIndex;

/// Per-axis comparison of a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// `s * c < 0`
    Strict,
    /// `s * c <= 0`
    Inclusive,
}

impl Comparison {
    #[inline]
    fn admits(self, sign: i8, c: i32) -> bool {
        let p = sign as i32 * c;
        match self {
            Self::Strict => p < 0,
            Self::Inclusive => p <= 0,
        }
    }
}

/// Whether velocity `c` may read upwind at a node tagged `tag`.
///
/// `feature` is the comparison for face and inner tags, `outer` the one for
/// outer tags.
pub fn direction_valid(
    tag: GeometryTag,
    c: [i32; 3],
    feature: Comparison,
    outer: Comparison,
) -> bool {
    match tag {
        GeometryTag::Interior => true,
        GeometryTag::Face(o) | GeometryTag::Inner(o) => {
            o.constrained().all(|(axis, s)| feature.admits(s, c[axis]))
        }
        GeometryTag::Outer(o) => o.constrained().any(|(axis, s)| outer.admits(s, c[axis])),
    }
}

// =============================================================================
// Scheme policy
// =============================================================================

/// Which boundary kinds collide and stream, per spatial dimension.
///
/// The two- and three-dimensional tables are kept separate: they do not
/// agree on which kinds need streaming.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemePolicy {
    collision: VertexSet,
    stream_required: VertexSet,
    outer_inclusive: bool,
}

impl SchemePolicy {
    /// Policy of the two-dimensional kernels.
    pub const TWO_D: Self = Self {
        collision: VertexSet::of(&[
            VertexType::Fluid,
            VertexType::ZouHeVelocity,
            VertexType::EqmDiffuseRefl,
            VertexType::ExtrapolPressure1st,
            VertexType::ExtrapolPressure2nd,
        ]),
        stream_required: VertexSet::of(&[
            VertexType::ZouHeVelocity,
            VertexType::EqmDiffuseRefl,
            VertexType::ExtrapolPressure1st,
            VertexType::ExtrapolPressure2nd,
        ]),
        outer_inclusive: false,
    };

    /// Policy of the three-dimensional kernels.
    pub const THREE_D: Self = Self {
        collision: VertexSet::of(&[
            VertexType::Fluid,
            VertexType::ZouHeVelocity,
            VertexType::EqmDiffuseRefl,
            VertexType::ExtrapolPressure1st,
            VertexType::Periodic,
        ]),
        stream_required: VertexSet::of(&[
            VertexType::EqmDiffuseRefl,
            VertexType::ExtrapolPressure1st,
            VertexType::Periodic,
        ]),
        outer_inclusive: true,
    };

    /// Policy for a spatial dimension.
    pub fn for_dimension(dimension: usize) -> Self {
        if dimension == 2 {
            Self::TWO_D
        } else {
            Self::THREE_D
        }
    }

    /// Whether nodes of this kind are collided.
    #[inline]
    pub fn requires_collision(&self, vertex: VertexType) -> bool {
        self.collision.contains(vertex)
    }

    /// Whether boundary nodes of this kind stream with inclusive gates.
    #[inline]
    pub fn requires_stream(&self, vertex: VertexType) -> bool {
        self.stream_required.contains(vertex)
    }

    /// Whether outer tags relax to inclusive gates when streaming is required.
    #[inline]
    pub fn outer_inclusive(&self) -> bool {
        self.outer_inclusive
    }

    /// The collision-required set.
    pub fn collision_set(&self) -> VertexSet {
        self.collision
    }

    /// The stream-required set.
    pub fn stream_required_set(&self) -> VertexSet {
        self.stream_required
    }
}

// =============================================================================
// Gate table
// =============================================================================

const STREAM_PLAIN: usize = 0;
const STREAM_REQUIRED: usize = 1;
const NEED_CALC: usize = 2;

/// Tabulated direction masks per geometry tag.
#[derive(Clone, Debug)]
pub struct GateTable {
    n_directions: usize,
    masks: Vec<bool>,
}

impl GateTable {
    /// Tabulate the gates of `lattice` under `policy`.
    pub fn new(lattice: &Lattice, policy: &SchemePolicy) -> Self {
        use Comparison::{Inclusive, Strict};

        let n = lattice.n_directions();
        let mut masks = vec![false; TAG_SLOTS * 3 * n];
        let required_outer = if policy.outer_inclusive() {
            Inclusive
        } else {
            Strict
        };

        for slot in 0..TAG_SLOTS {
            let tag = GeometryTag::from_slot(slot);
            for d in 0..n {
                let dir = DirectionIndex::new(d);
                let c = lattice.velocity(dir);
                let base = slot * 3 * n;
                masks[base + STREAM_PLAIN * n + d] = direction_valid(tag, c, Strict, Strict);
                // stream-required nodes always self-copy their rest populations
                masks[base + STREAM_REQUIRED * n + d] =
                    lattice.is_rest(dir) || direction_valid(tag, c, Inclusive, required_outer);
                masks[base + NEED_CALC * n + d] = direction_valid(tag, c, Inclusive, Strict);
            }
        }

        Self {
            n_directions: n,
            masks,
        }
    }

    #[inline]
    fn mask(&self, tag: GeometryTag, kind: usize) -> &[bool] {
        let start = (tag.slot() * 3 + kind) * self.n_directions;
        &self.masks[start..start + self.n_directions]
    }

    /// Directions streamed from upwind at a boundary node.
    #[inline]
    pub fn stream_mask(&self, tag: GeometryTag, stream_required: bool) -> &[bool] {
        self.mask(
            tag,
            if stream_required {
                STREAM_REQUIRED
            } else {
                STREAM_PLAIN
            },
        )
    }

    /// Directions whose gradient is evaluated and which are time-marched.
    #[inline]
    pub fn need_calc_mask(&self, tag: GeometryTag) -> &[bool] {
        self.mask(tag, NEED_CALC)
    }

    /// Number of lattice directions per mask.
    pub fn n_directions(&self) -> usize {
        self.n_directions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::OpenSides;
    use crate::lattice::VelocitySet;

    #[test]
    fn test_face_gate_comparisons() {
        // fluid toward +x: directions moving toward -x read from the fluid
        let face = GeometryTag::Face(OpenSides::new([1, 0, 0]));
        use Comparison::*;
        assert!(direction_valid(face, [-1, 0, 0], Strict, Strict));
        assert!(!direction_valid(face, [1, 0, 0], Inclusive, Inclusive));
        assert!(!direction_valid(face, [0, 1, 0], Strict, Strict));
        assert!(direction_valid(face, [0, 1, 0], Inclusive, Strict));
    }

    #[test]
    fn test_interior_always_valid() {
        let lattice = Lattice::single(VelocitySet::D2Q9);
        let gates = GateTable::new(&lattice, &SchemePolicy::TWO_D);
        assert!(gates.stream_mask(GeometryTag::Interior, false).iter().all(|v| *v));
        assert!(gates.need_calc_mask(GeometryTag::Interior).iter().all(|v| *v));
    }

    #[test]
    fn test_rest_direction_self_copy() {
        let lattice = Lattice::single(VelocitySet::D2Q9);
        let gates = GateTable::new(&lattice, &SchemePolicy::TWO_D);
        let outer = GeometryTag::Outer(OpenSides::new([1, 1, 0]));
        assert!(gates.stream_mask(outer, true)[0]);
        assert!(!gates.stream_mask(outer, false)[0]);
        let face = GeometryTag::Face(OpenSides::new([0, -1, 0]));
        assert!(gates.stream_mask(face, true)[0]);
        assert!(!gates.stream_mask(face, false)[0]);
    }

    #[test]
    fn test_policy_tables_differ_by_dimension() {
        let two = SchemePolicy::for_dimension(2);
        let three = SchemePolicy::for_dimension(3);
        assert!(two.requires_collision(VertexType::ExtrapolPressure2nd));
        assert!(!three.requires_collision(VertexType::ExtrapolPressure2nd));
        assert!(three.requires_collision(VertexType::Periodic));
        assert!(two.requires_stream(VertexType::ZouHeVelocity));
        assert!(!three.requires_stream(VertexType::ZouHeVelocity));
        assert!(!two.requires_stream(VertexType::FreeFlux));
        assert!(!three.requires_stream(VertexType::FreeFlux));
        assert!(!two.outer_inclusive());
        assert!(three.outer_inclusive());
    }

    #[test]
    fn test_outer_relaxation_in_three_dimensions() {
        let lattice = Lattice::single(VelocitySet::D3Q19);
        let gates = GateTable::new(&lattice, &SchemePolicy::THREE_D);
        let outer = GeometryTag::Outer(OpenSides::new([1, 1, 0]));
        let d = lattice
            .direction_of(crate::types::ComponentIndex::ZERO, [1, 0, 0])
            .unwrap();
        // s_y * c_y = 0 passes only when inclusive
        assert!(gates.stream_mask(outer, true)[d.get()]);
        assert!(!gates.stream_mask(outer, false)[d.get()]);
        assert!(!gates.need_calc_mask(outer)[d.get()]);
    }
}
