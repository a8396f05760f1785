//! Node vertex types.

use serde::{Deserialize, Serialize};

/// Role of a node in the update.
///
/// The variant order is significant: everything above [`VertexType::Fluid`]
/// is a boundary, so `vertex > Fluid` is the boundary test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VertexType {
    /// Inside an embedded solid; never updated.
    ImmersedSolid = 0,
    /// Plain fluid node with a full stencil.
    Fluid,
    /// Prescribed velocity (non-equilibrium bounce-back).
    ZouHeVelocity,
    /// Equilibrium diffuse-reflection wall.
    EqmDiffuseRefl,
    /// Prescribed pressure, first-order extrapolation.
    ExtrapolPressure1st,
    /// Prescribed pressure, second-order extrapolation.
    ExtrapolPressure2nd,
    /// Zero normal flux.
    FreeFlux,
    /// Periodic image of the opposite surface.
    Periodic,
    /// Fluid node adjacent to an embedded solid.
    ImmersedBoundary,
}

impl VertexType {
    /// All vertex types in order.
    pub const ALL: [VertexType; 9] = [
        Self::ImmersedSolid,
        Self::Fluid,
        Self::ZouHeVelocity,
        Self::EqmDiffuseRefl,
        Self::ExtrapolPressure1st,
        Self::ExtrapolPressure2nd,
        Self::FreeFlux,
        Self::Periodic,
        Self::ImmersedBoundary,
    ];

    /// Whether the node carries a boundary condition.
    #[inline]
    pub fn is_boundary(self) -> bool {
        self > Self::Fluid
    }

    /// Whether the node lies inside an embedded solid.
    #[inline]
    pub fn is_solid(self) -> bool {
        self == Self::ImmersedSolid
    }

    /// Bit used by [`VertexSet`].
    #[inline]
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Small bitset of vertex types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexSet(u16);

impl VertexSet {
    /// Empty set.
    pub const EMPTY: Self = Self(0);

    /// Set holding exactly `types`.
    pub const fn of(types: &[VertexType]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < types.len() {
            bits |= types[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Membership test.
    #[inline]
    pub fn contains(self, vertex: VertexType) -> bool {
        self.0 & vertex.bit() != 0
    }

    /// Members in vertex order.
    pub fn iter(self) -> impl Iterator<Item = VertexType> {
        VertexType::ALL.into_iter().filter(move |v| self.contains(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_boundary_test() {
        assert!(!VertexType::ImmersedSolid.is_boundary());
        assert!(!VertexType::Fluid.is_boundary());
        for v in &VertexType::ALL[2..] {
            assert!(v.is_boundary(), "{:?}", v);
        }
        assert!(VertexType::ImmersedSolid.is_solid());
    }

    #[test]
    fn test_vertex_set() {
        let set = VertexSet::of(&[VertexType::Fluid, VertexType::Periodic]);
        assert!(set.contains(VertexType::Fluid));
        assert!(set.contains(VertexType::Periodic));
        assert!(!set.contains(VertexType::FreeFlux));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![VertexType::Fluid, VertexType::Periodic]
        );
        assert!(!VertexSet::EMPTY.contains(VertexType::Fluid));
    }
}
