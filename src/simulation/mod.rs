//! Case setup and evolution.
//!
//! - [`CaseBuilder`] / [`BlockSpec`]: blocks, boundaries, embedded solids,
//!   geometry classification and the initial equilibrium state
//! - [`Simulation`]: the per-step entry points and the two composed schemes
//! - [`Simulation::iterate`]: residual-checked run to convergence
//!
//! # Example
//! ```ignore
//! use lbm_rs::{BlockSpec, CaseBuilder, Lattice, PeriodicHalo, SimulationConfig, VelocitySet};
//!
//! let mut sim = CaseBuilder::new("shear wave", Lattice::single(VelocitySet::D2Q9))
//!     .with_config(SimulationConfig::default().with_tau_ref(vec![0.05]))
//!     .with_block(BlockSpec::new([64, 64, 1], 1.0 / 64.0))
//!     .with_halo_exchange(PeriodicHalo::all())
//!     .with_initial_state(|x, vars| {
//!         vars[0] = 1.0;
//!         vars[1] = 0.01 * (2.0 * std::f64::consts::PI * x[1]).sin();
//!     })
//!     .build()?;
//! let outcome = sim.iterate()?;
//! ```

mod builder;
mod config;
mod evolution;
mod runner;

pub use builder::{BlockSpec, CaseBuilder};
pub use config::{Scheme, SimulationConfig};
pub use evolution::Simulation;
pub use runner::{ConvergenceStatus, IterationOutcome, ResidualRecord};
