//! Case setup: blocks, boundaries, geometry classification, initial state.
//!
//! ```ignore
//! use lbm_rs::{BoundaryCondition, CaseBuilder, BlockSpec, Lattice, Surface, VelocitySet};
//!
//! let lid = BoundaryCondition::EqmDiffuseRefl { velocity: [0.001, 0.0, 0.0] };
//! let mut block = BlockSpec::new([33, 33, 33], 1.0 / 32.0);
//! for s in [Surface::Left, Surface::Right, Surface::Bottom, Surface::Front, Surface::Back] {
//!     block = block.with_boundary(s, BoundaryCondition::wall());
//! }
//! let sim = CaseBuilder::new("cavity", Lattice::single(VelocitySet::D3Q19))
//!     .with_block(block.with_boundary(Surface::Top, lid))
//!     .build()?;
//! ```

use crate::boundary::{BoundaryCondition, HaloExchange, NoHalo, SurfaceBoundary};
use crate::error::{LbmError, Result};
use crate::geometry::VertexType;
use crate::lattice::{Lattice, CS};
use crate::mesh::{Block, BlockShape, Coordinates, Grid, Surface, STENCIL_REACH};
use crate::types::{BlockIndex, ComponentIndex};

use super::config::{Scheme, SimulationConfig};
use super::evolution::Simulation;

type SolidMask = Box<dyn Fn([usize; 3]) -> bool>;
type InitialState = Box<dyn Fn([f64; 3], &mut [f64])>;

/// Description of one structured block.
pub struct BlockSpec {
    size: [usize; 3],
    mesh_size: f64,
    origin: [f64; 3],
    halo: usize,
    axis_coordinates: Vec<(usize, Vec<f64>)>,
    boundaries: Vec<SurfaceBoundary>,
    solid: Option<SolidMask>,
}

impl BlockSpec {
    /// Block of `size` owned cells (1 on unused axes) with uniform spacing.
    pub fn new(size: [usize; 3], mesh_size: f64) -> Self {
        Self {
            size,
            mesh_size,
            origin: [0.0; 3],
            halo: STENCIL_REACH,
            axis_coordinates: Vec::new(),
            boundaries: Vec::new(),
            solid: None,
        }
    }

    /// Coordinates of the first owned cell.
    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Ghost layers per side.
    pub fn with_halo(mut self, halo: usize) -> Self {
        self.halo = halo;
        self
    }

    /// Explicit (non-uniform) coordinates of the owned cells along `axis`.
    pub fn with_axis_coordinates(mut self, axis: usize, coordinates: Vec<f64>) -> Self {
        self.axis_coordinates.push((axis, coordinates));
        self
    }

    /// Attach a boundary condition. Later surfaces own shared edges and corners.
    pub fn with_boundary(mut self, surface: Surface, condition: BoundaryCondition) -> Self {
        self.boundaries.push(SurfaceBoundary::new(surface, condition));
        self
    }

    /// Embedded solid, by owned-cell position.
    pub fn with_solid<F>(mut self, solid: F) -> Self
    where
        F: Fn([usize; 3]) -> bool + 'static,
    {
        self.solid = Some(Box::new(solid));
        self
    }

    fn build(
        mut self,
        index: BlockIndex,
        lattice: &Lattice,
        scheme: Scheme,
        connected: [bool; 3],
    ) -> Result<Block> {
        if !(self.mesh_size > 0.0) || !self.mesh_size.is_finite() {
            return Err(LbmError::invalid_config(format!(
                "block {index}: mesh size must be positive, got {}",
                self.mesh_size
            )));
        }
        let shape = BlockShape::new(lattice.dimension(), self.size, self.halo)?;
        let mut coordinates = Coordinates::uniform(&shape, self.origin, self.mesh_size);
        for (axis, values) in &self.axis_coordinates {
            coordinates.set_axis(&shape, *axis, values)?;
        }
        let mut block = Block::new(index, shape, coordinates, lattice)?;

        if let Some(solid) = self.solid.take() {
            block.mark_solid(solid);
        }
        for boundary in &self.boundaries {
            if matches!(scheme, Scheme::FiniteDifference(_))
                && boundary.condition == BoundaryCondition::Periodic
            {
                return Err(LbmError::UnsupportedBoundary {
                    kind: VertexType::Periodic,
                    scheme: scheme.name(),
                });
            }
            block.assign_surface(*boundary)?;
            tracing::debug!(
                "block {}: {:?} surface -> {:?}",
                index,
                boundary.surface,
                boundary.condition
            );
        }
        for surface in Surface::ALL {
            let axis = surface.axis();
            if axis >= lattice.dimension() || connected[axis] {
                continue;
            }
            if !self.boundaries.iter().any(|b| b.surface == surface) {
                return Err(LbmError::invalid_config(format!(
                    "block {index}: {surface:?} surface has no boundary condition and no halo exchange"
                )));
            }
        }

        block.mark_immersed_boundaries(lattice, connected);
        let n_tagged = block.classify(lattice, connected)?;
        block.mirror_halo_properties(connected);
        tracing::debug!("block {}: {} boundary nodes tagged", index, n_tagged);
        Ok(block)
    }
}

/// Assembles a [`Simulation`].
pub struct CaseBuilder {
    name: String,
    lattice: Lattice,
    config: SimulationConfig,
    blocks: Vec<BlockSpec>,
    halo: Box<dyn HaloExchange>,
    init: Option<InitialState>,
}

impl CaseBuilder {
    /// New case on a lattice, with the default configuration and no halo
    /// exchange.
    pub fn new(name: impl Into<String>, lattice: Lattice) -> Self {
        Self {
            name: name.into(),
            lattice,
            config: SimulationConfig::default(),
            blocks: Vec::new(),
            halo: Box::new(NoHalo),
            init: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a block; blocks are indexed in insertion order.
    pub fn with_block(mut self, block: BlockSpec) -> Self {
        self.blocks.push(block);
        self
    }

    /// Set the halo exchange.
    pub fn with_halo_exchange<H>(mut self, halo: H) -> Self
    where
        H: HaloExchange + 'static,
    {
        self.halo = Box::new(halo);
        self
    }

    /// Uniform initial state for every component.
    pub fn with_uniform_state(self, density: f64, velocity: [f64; 3]) -> Self {
        let n_components = self.lattice.n_components();
        let dim = self.lattice.dimension();
        self.with_initial_state(move |_, vars| {
            for c in 0..n_components {
                let base = c * (1 + dim);
                vars[base] = density;
                vars[base + 1..base + 1 + dim].copy_from_slice(&velocity[..dim]);
            }
        })
    }

    /// Initial macroscopic state `init(position, vars)`, with `vars` laid out
    /// as [`Lattice::macro_var_names`].
    pub fn with_initial_state<F>(mut self, init: F) -> Self
    where
        F: Fn([f64; 3], &mut [f64]) + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    /// Validate, build the grid, classify the geometry and initialise the
    /// fields at equilibrium.
    pub fn build(self) -> Result<Simulation> {
        let Self {
            name,
            lattice,
            config,
            blocks,
            halo,
            init,
        } = self;
        config.validate(&lattice)?;
        if blocks.is_empty() {
            return Err(LbmError::invalid_config("case has no blocks"));
        }
        let required = STENCIL_REACH * lattice.max_speed();

        let mut built = Vec::with_capacity(blocks.len());
        for (i, spec) in blocks.into_iter().enumerate() {
            if spec.halo < required {
                return Err(LbmError::HaloTooShallow {
                    halo: spec.halo,
                    required,
                });
            }
            let index = BlockIndex::new(i);
            let block = spec.build(index, &lattice, config.scheme, halo.connected_axes(index))?;
            built.push(block);
        }

        let dt = match config.dt {
            Some(dt) => dt,
            None => {
                built
                    .iter()
                    .map(|b| b.coordinates().min_spacing(b.shape()))
                    .fold(f64::INFINITY, f64::min)
                    / CS
            }
        };
        let grid = Grid::new(built)?;
        tracing::info!(
            "case '{}': {} block(s), {} directions, {} scheme, dt = {:.4e}, halo exchange: {}",
            name,
            grid.n_blocks(),
            lattice.n_directions(),
            config.scheme.name(),
            dt,
            halo.name()
        );

        let mut sim = Simulation::new(name, config, dt, lattice, grid, halo)?;
        match init {
            Some(init) => sim.initialise_with(init)?,
            None => {
                let lattice = sim.lattice().clone();
                sim.initialise_with(|_, vars| {
                    for c in 0..lattice.n_components() {
                        vars[lattice.density_var(ComponentIndex::new(c)).get()] = 1.0;
                    }
                })?
            }
        }
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PeriodicHalo;
    use crate::lattice::VelocitySet;
    use crate::scheme::TimeIntegrator;

    fn closed_square(n: usize) -> BlockSpec {
        let mut spec = BlockSpec::new([n, n, 1], 0.1);
        for s in [Surface::Left, Surface::Right, Surface::Bottom, Surface::Top] {
            spec = spec.with_boundary(s, BoundaryCondition::wall());
        }
        spec
    }

    #[test]
    fn test_builds_closed_square() {
        let sim = CaseBuilder::new("square", Lattice::single(VelocitySet::D2Q9))
            .with_block(closed_square(6))
            .build()
            .unwrap();
        approx::assert_relative_eq!(sim.dt(), 0.1 / CS, epsilon = 1e-15);
        approx::assert_relative_eq!(sim.grid().total_mass(), 36.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_surface_is_rejected() {
        let spec =
            BlockSpec::new([6, 6, 1], 0.1).with_boundary(Surface::Left, BoundaryCondition::wall());
        let err = CaseBuilder::new("open", Lattice::single(VelocitySet::D2Q9))
            .with_block(spec)
            .build()
            .unwrap_err();
        assert!(matches!(err, LbmError::InvalidConfig(_)));
    }

    #[test]
    fn test_periodic_halo_needs_no_surfaces() {
        let sim = CaseBuilder::new("torus", Lattice::single(VelocitySet::D2Q9))
            .with_block(BlockSpec::new([5, 4, 1], 1.0))
            .with_halo_exchange(PeriodicHalo::all())
            .with_uniform_state(1.2, [0.01, 0.0, 0.0])
            .build()
            .unwrap();
        approx::assert_relative_eq!(sim.grid().total_mass(), 1.2 * 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_periodic_surface_rejected_for_finite_difference() {
        let mut spec = BlockSpec::new([4, 4, 1], 1.0);
        for s in [Surface::Left, Surface::Right, Surface::Bottom, Surface::Top] {
            spec = spec.with_boundary(s, BoundaryCondition::Periodic);
        }
        let config = SimulationConfig::default()
            .with_scheme(Scheme::FiniteDifference(TimeIntegrator::SemiImplicit));
        let err = CaseBuilder::new("fd", Lattice::single(VelocitySet::D2Q9))
            .with_config(config)
            .with_block(spec)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            LbmError::UnsupportedBoundary {
                kind: VertexType::Periodic,
                ..
            }
        ));
    }

    #[test]
    fn test_non_positive_initial_density() {
        let err = CaseBuilder::new("void", Lattice::single(VelocitySet::D2Q9))
            .with_block(closed_square(4))
            .with_uniform_state(0.0, [0.0; 3])
            .build()
            .unwrap_err();
        assert!(matches!(err, LbmError::InvalidConfig(_)));
    }

    #[test]
    fn test_shallow_halo() {
        let lattice = Lattice::single(VelocitySet::D2Q9);
        let err = CaseBuilder::new("shallow", lattice)
            .with_block(closed_square(4).with_halo(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, LbmError::HaloTooShallow { .. }));
    }
}
