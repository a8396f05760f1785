//! Boundary conditions for lattice Boltzmann blocks.
//!
//! Boundary kernels run after streaming (or marching) and fill the
//! directions the gate left closed at each boundary node. They share the
//! gating vocabulary of the interior kernels: a direction is *known* when
//! streaming (stream-collision scheme) or marching (finite-difference
//! scheme) supplied it, and *unknown* otherwise.
//!
//! # Available Boundary Conditions
//!
//! - [`BoundaryCondition::ZouHeVelocity`]: prescribed velocity, non-equilibrium bounce-back
//! - [`BoundaryCondition::EqmDiffuseRefl`]: diffuse reflection with equilibrium re-emission
//! - [`BoundaryCondition::ExtrapolPressure1st`] / [`BoundaryCondition::ExtrapolPressure2nd`]:
//!   prescribed density, extrapolated unknowns
//! - [`BoundaryCondition::FreeFlux`]: zero normal flux
//! - [`BoundaryCondition::Periodic`]: unknowns from the periodic image
//!
//! Embedded-solid boundaries ([`VertexType::ImmersedBoundary`]) receive a
//! diffuse-reflection wall at rest.
//!
//! # Halo exchange
//!
//! [`HaloExchange`] is the seam to whatever fills ghost layers: nothing
//! ([`NoHalo`]), the block's own opposite side ([`PeriodicHalo`]), or an
//! external multi-block/distributed exchange.

mod halo;
mod kernels;

pub use halo::{FieldSelector, HaloExchange, NoHalo, PeriodicHalo};
pub(crate) use kernels::{apply_boundary_conditions, KnownDirections};

use serde::{Deserialize, Serialize};

use crate::geometry::VertexType;
use crate::mesh::Surface;

/// Boundary condition attached to a block surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Prescribed velocity (sound-speed units).
    ZouHeVelocity { velocity: [f64; 3] },
    /// Diffuse-reflection wall moving with `velocity`.
    EqmDiffuseRefl { velocity: [f64; 3] },
    /// Prescribed density, unknowns copied from the first inward node.
    ExtrapolPressure1st { density: f64 },
    /// Prescribed density, unknowns extrapolated linearly from two inward nodes.
    ExtrapolPressure2nd { density: f64 },
    /// Zero normal flux.
    FreeFlux,
    /// Periodic image of the opposite surface.
    Periodic,
}

impl BoundaryCondition {
    /// Vertex type of nodes carrying this condition.
    pub fn vertex_type(&self) -> VertexType {
        match self {
            Self::ZouHeVelocity { .. } => VertexType::ZouHeVelocity,
            Self::EqmDiffuseRefl { .. } => VertexType::EqmDiffuseRefl,
            Self::ExtrapolPressure1st { .. } => VertexType::ExtrapolPressure1st,
            Self::ExtrapolPressure2nd { .. } => VertexType::ExtrapolPressure2nd,
            Self::FreeFlux => VertexType::FreeFlux,
            Self::Periodic => VertexType::Periodic,
        }
    }

    /// No-slip wall at rest.
    pub fn wall() -> Self {
        Self::EqmDiffuseRefl {
            velocity: [0.0; 3],
        }
    }
}

/// A boundary condition on one surface of a block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBoundary {
    /// Surface carrying the condition.
    pub surface: Surface,
    /// Condition applied to the surface nodes it owns.
    pub condition: BoundaryCondition,
}

impl SurfaceBoundary {
    /// Create a surface boundary.
    pub fn new(surface: Surface, condition: BoundaryCondition) -> Self {
        Self { surface, condition }
    }
}
