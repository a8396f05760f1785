//! Evolution orchestrator.
//!
//! [`Simulation`] owns the grid, the lattice and the gate table of one case
//! and exposes the per-step entry points as well as the two composed steps:
//!
//! ```text
//! stream-collision:  macro -> copy f -> feq/force -> tau -> collide
//!                    -> halo(fStage) -> stream -> boundaries
//! finite-difference: macro -> feq/force -> tau -> gradient -> march
//!                    -> boundaries -> halo(f)
//! ```
//!
//! Fields are physically consistent between completed steps only.

use crate::analysis::{ResidualMonitor, ResidualReport};
use crate::boundary::{apply_boundary_conditions, FieldSelector, HaloExchange, KnownDirections};
use crate::error::{LbmError, Result};
use crate::geometry::{GateTable, SchemePolicy};
use crate::lattice::Lattice;
use crate::mesh::{Grid, IndexRange};
use crate::scheme::{self, Sweep, TimeIntegrator};
use crate::types::{BlockIndex, ComponentIndex, MacroVarIndex, NodeIndex};

use super::config::{Scheme, SimulationConfig};

/// A ready-to-run case.
pub struct Simulation {
    name: String,
    config: SimulationConfig,
    dt: f64,
    lattice: Lattice,
    policy: SchemePolicy,
    gates: GateTable,
    grid: Grid,
    halo: Box<dyn HaloExchange>,
    monitor: ResidualMonitor,
    sweep: Sweep,
    iteration: usize,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("name", &self.name)
            .field("scheme", &self.config.scheme)
            .field("dt", &self.dt)
            .field("blocks", &self.grid.n_blocks())
            .field("halo", &self.halo.name())
            .field("iteration", &self.iteration)
            .finish()
    }
}

impl Simulation {
    pub(crate) fn new(
        name: String,
        config: SimulationConfig,
        dt: f64,
        lattice: Lattice,
        grid: Grid,
        halo: Box<dyn HaloExchange>,
    ) -> Result<Self> {
        let policy = SchemePolicy::for_dimension(lattice.dimension());
        let gates = GateTable::new(&lattice, &policy);
        let monitor = ResidualMonitor::new(dt)?;
        let sweep = Sweep::from_flag(config.parallel);
        Ok(Self {
            name,
            config,
            dt,
            lattice,
            policy,
            gates,
            grid,
            halo,
            monitor,
            sweep,
            iteration: 0,
        })
    }

    /// Set every active node to equilibrium at the macroscopic state
    /// returned by `init(position, vars)`.
    ///
    /// The body force starts at zero and the residual snapshot is primed
    /// with the initial state.
    pub fn initialise_with<F>(&mut self, init: F) -> Result<()>
    where
        F: Fn([f64; 3], &mut [f64]),
    {
        let lattice = &self.lattice;
        for block in self.grid.blocks_mut() {
            for p in block.shape.bulk().iter() {
                let node = block.shape.node_index(p);
                if !block.nodes.is_active(node) {
                    continue;
                }
                let point = block.coordinates.point(p);
                let vars = block.macro_vars.node_mut(node);
                vars.fill(0.0);
                init(point, vars);
                for c in 0..lattice.n_components() {
                    let rho = vars[lattice.density_var(ComponentIndex::new(c)).get()];
                    if !(rho > 0.0) || !rho.is_finite() {
                        return Err(LbmError::invalid_config(format!(
                            "initial density {rho} of component {c} at {point:?} is not positive"
                        )));
                    }
                }
                lattice.equilibrium(block.macro_vars.node(node), block.feq.node_mut(node));
            }
            block.body_force.fill(0.0);
            block.f.copy_from(&block.feq)?;
            block.f_stage.copy_from(&block.f)?;
            block.macro_snapshot.copy_from(&block.macro_vars)?;
        }
        self.update_relaxation_time();
        self.exchange_halo(FieldSelector::Distribution);
        self.exchange_halo(FieldSelector::Staged);
        self.iteration = 0;
        Ok(())
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Density and velocity from `f`.
    pub fn update_macro_vars(&mut self) {
        for block in self.grid.blocks_mut() {
            scheme::update_macro_vars(block, &self.lattice, self.sweep);
        }
    }

    /// Copy `f` into the staging field.
    pub fn copy_distribution(&mut self) -> Result<()> {
        for block in self.grid.blocks_mut() {
            block.f_stage.copy_from(&block.f)?;
        }
        Ok(())
    }

    /// Equilibrium and body-force terms from the macroscopic variables.
    pub fn update_equilibrium_and_body_force(&mut self) {
        for block in self.grid.blocks_mut() {
            scheme::update_equilibrium_and_body_force(
                block,
                &self.lattice,
                &self.config.body_force,
                self.sweep,
            );
        }
    }

    /// Relaxation times from the macroscopic variables.
    pub fn update_relaxation_time(&mut self) {
        for block in self.grid.blocks_mut() {
            scheme::update_relaxation_time(
                block,
                &self.lattice,
                self.config.tau_model,
                &self.config.tau_ref,
                self.sweep,
            );
        }
    }

    /// BGK collision into the staging field.
    pub fn collide(&mut self) -> Result<()> {
        for block in self.grid.blocks_mut() {
            scheme::collide(
                block,
                &self.lattice,
                &self.policy,
                self.dt,
                self.config.diagnostics,
                self.sweep,
            )?;
        }
        Ok(())
    }

    /// Gated streaming of the staging field into `f`.
    pub fn stream(&mut self) {
        for block in self.grid.blocks_mut() {
            scheme::stream(block, &self.lattice, &self.gates, &self.policy, self.sweep);
        }
    }

    /// Cut-cell upwind gradients into the staging field.
    pub fn compute_gradient(&mut self) {
        for block in self.grid.blocks_mut() {
            scheme::compute_gradient(block, &self.lattice, &self.gates, self.sweep);
        }
    }

    /// Advance `f` with the staged gradients.
    pub fn march(&mut self, integrator: TimeIntegrator) -> Result<()> {
        for block in self.grid.blocks_mut() {
            scheme::march(
                block,
                &self.lattice,
                &self.gates,
                integrator,
                self.dt,
                self.config.diagnostics,
                self.sweep,
            )?;
        }
        Ok(())
    }

    /// Surface boundary conditions and embedded-solid walls of every block.
    pub fn apply_boundary_conditions(&mut self) {
        let known = match self.config.scheme {
            Scheme::StreamCollision => KnownDirections::Streamed,
            Scheme::FiniteDifference(_) => KnownDirections::Marched,
        };
        for block in self.grid.blocks_mut() {
            apply_boundary_conditions(block, &self.lattice, &self.gates, &self.policy, known);
        }
    }

    /// Fill the ghost layers of one field.
    pub fn exchange_halo(&mut self, field: FieldSelector) {
        self.halo.exchange(&mut self.grid, field);
    }

    /// Residual of every macroscopic variable since the previous check,
    /// normalised by a window of `check_period` steps.
    ///
    /// Uses the macroscopic variables as last refreshed; call
    /// [`update_macro_vars`](Self::update_macro_vars) first to measure the
    /// current `f`.
    pub fn calc_residual(&mut self, check_period: usize) -> Result<ResidualReport> {
        self.monitor.check(&mut self.grid, self.sweep, check_period)
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// One stream-collision step.
    pub fn step_stream_collision(&mut self) -> Result<()> {
        self.update_macro_vars();
        self.copy_distribution()?;
        self.update_equilibrium_and_body_force();
        self.update_relaxation_time();
        self.collide()?;
        self.exchange_halo(FieldSelector::Staged);
        self.stream();
        self.apply_boundary_conditions();
        self.iteration += 1;
        Ok(())
    }

    /// One finite-difference time-marching step.
    pub fn step_time_marching(&mut self, integrator: TimeIntegrator) -> Result<()> {
        self.update_macro_vars();
        self.update_equilibrium_and_body_force();
        self.update_relaxation_time();
        self.compute_gradient();
        self.march(integrator)?;
        self.apply_boundary_conditions();
        self.exchange_halo(FieldSelector::Distribution);
        self.iteration += 1;
        Ok(())
    }

    /// One step of the configured scheme.
    pub fn step(&mut self) -> Result<()> {
        match self.config.scheme {
            Scheme::StreamCollision => self.step_stream_collision(),
            Scheme::FiniteDifference(integrator) => self.step_time_marching(integrator),
        }
    }

    // =========================================================================
    // Probes
    // =========================================================================

    /// Mean of macroscopic variable `var` over the active nodes of `range`
    /// (allocation positions) in one block.
    pub fn probe(&self, block: BlockIndex, range: &IndexRange, var: MacroVarIndex) -> Result<f64> {
        let block = self.grid.block(block)?;
        if var.get() >= block.macro_vars().width() {
            return Err(LbmError::invalid_config(format!(
                "macroscopic variable {var} does not exist"
            )));
        }
        Ok(block.mean_macro_var(range, var))
    }

    /// Macroscopic variables of one node.
    pub fn node_state(&self, block: BlockIndex, node: NodeIndex) -> Result<&[f64]> {
        let block = self.grid.block(block)?;
        if node.get() >= block.shape().n_nodes() {
            return Err(LbmError::DimensionMismatch {
                context: "node index",
                expected: block.shape().n_nodes(),
                actual: node.get(),
            });
        }
        Ok(block.macro_vars().node(node))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Case name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Completed steps since initialisation.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Per-dimension scheme tables.
    pub fn policy(&self) -> &SchemePolicy {
        &self.policy
    }

    /// Direction gates.
    pub fn gates(&self) -> &GateTable {
        &self.gates
    }

    /// Grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid, for external initialisation or checkpoint restore.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Names of the macroscopic variables.
    pub fn macro_var_names(&self) -> Vec<String> {
        self.lattice.macro_var_names()
    }
}
