//! # lbm-rs
//!
//! A cut-cell lattice-Boltzmann evolution core on structured blocks.
//!
//! This crate provides the building blocks of an isothermal LBM solver:
//! - Velocity sets (D2Q9, D3Q15, D3Q19) and multi-component lattices
//! - Geometry classification of boundary nodes (face / inner / outer tags)
//! - Direction gating shared by streaming, gradients and marching
//! - BGK collision and gated streaming
//! - Finite-difference scheme: cut-cell upwind gradients with explicit or
//!   semi-implicit time marching
//! - Boundary kernels (velocity, diffuse reflection, pressure, zero flux,
//!   periodic) and a halo-exchange seam
//! - Residual convergence monitoring and numerical-stability diagnostics

pub mod analysis;
pub mod boundary;
pub mod error;
pub mod field;
pub mod geometry;
pub mod lattice;
pub mod mesh;
pub mod scheme;
pub mod simulation;
pub mod types;

pub use analysis::{
    is_physical, Diagnostics, NumericalInstability, ResidualMonitor, ResidualPair, ResidualReport,
    UpdateStage,
};
pub use boundary::{
    BoundaryCondition, FieldSelector, HaloExchange, NoHalo, PeriodicHalo, SurfaceBoundary,
};
pub use error::{LbmError, Result};
pub use field::{ComponentField, DistributionField, MacroVarField, NodeField};
pub use geometry::{
    classify_node, direction_valid, Comparison, GateTable, GeometryTag, OpenSides, SchemePolicy,
    VertexSet, VertexType,
};
pub use lattice::{
    equilibrium_weight, BodyForce, Lattice, LatticeComponent, TauModel, VelocitySet, CS,
};
pub use mesh::{Block, BlockShape, Coordinates, Grid, IndexRange, NodeProperties, Surface};
pub use scheme::{Sweep, TimeIntegrator};
pub use simulation::{
    BlockSpec, CaseBuilder, ConvergenceStatus, IterationOutcome, ResidualRecord, Scheme,
    Simulation, SimulationConfig,
};
pub use types::{BlockIndex, ComponentIndex, DirectionIndex, MacroVarIndex, NodeIndex};
