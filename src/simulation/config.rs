//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::analysis::Diagnostics;
use crate::error::{LbmError, Result};
use crate::lattice::{BodyForce, Lattice, TauModel};
use crate::scheme::TimeIntegrator;

/// Evolution scheme of a case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Scheme {
    /// Collide into the staging field, then stream.
    #[default]
    StreamCollision,
    /// Cut-cell upwind gradients with explicit or semi-implicit marching.
    FiniteDifference(TimeIntegrator),
}

impl Scheme {
    /// Name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StreamCollision => "stream-collision",
            Self::FiniteDifference(TimeIntegrator::Explicit { .. }) => "finite-difference (explicit)",
            Self::FiniteDifference(TimeIntegrator::SemiImplicit) => {
                "finite-difference (semi-implicit)"
            }
        }
    }
}

/// Configuration for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Time step. `None` derives it from the smallest node spacing,
    /// `min spacing / CS`.
    pub dt: Option<f64>,
    /// Reference relaxation time per lattice component.
    pub tau_ref: Vec<f64>,
    /// Relaxation-time model.
    pub tau_model: TauModel,
    /// External body force.
    pub body_force: BodyForce,
    /// Evolution scheme.
    pub scheme: Scheme,
    /// Per-value finiteness checks in collision and marching.
    pub diagnostics: Diagnostics,
    /// Steps between residual checks.
    pub check_period: usize,
    /// Residual below which every macroscopic variable counts as converged.
    pub convergence_criterion: f64,
    /// Iteration budget of one [`iterate`](super::Simulation::iterate) call.
    pub max_iterations: usize,
    /// Run node sweeps on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: None,
            tau_ref: vec![0.01],
            tau_model: TauModel::Constant,
            body_force: BodyForce::None,
            scheme: Scheme::StreamCollision,
            diagnostics: Diagnostics::Disabled,
            check_period: 1000,
            convergence_criterion: 1e-7,
            max_iterations: 1_000_000,
            parallel: false,
        }
    }
}

impl SimulationConfig {
    /// Set the time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set one reference relaxation time per component.
    pub fn with_tau_ref(mut self, tau_ref: Vec<f64>) -> Self {
        self.tau_ref = tau_ref;
        self
    }

    /// Set the relaxation-time model.
    pub fn with_tau_model(mut self, model: TauModel) -> Self {
        self.tau_model = model;
        self
    }

    /// Set the body force.
    pub fn with_body_force(mut self, force: BodyForce) -> Self {
        self.body_force = force;
        self
    }

    /// Set the evolution scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Enable numerical diagnostics.
    pub fn with_diagnostics(mut self) -> Self {
        self.diagnostics = Diagnostics::Enabled;
        self
    }

    /// Set the residual check period.
    pub fn with_check_period(mut self, check_period: usize) -> Self {
        self.check_period = check_period;
        self
    }

    /// Set the convergence criterion.
    pub fn with_convergence_criterion(mut self, criterion: f64) -> Self {
        self.convergence_criterion = criterion;
        self
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Request parallel node sweeps.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Check the configuration against a lattice.
    pub fn validate(&self, lattice: &Lattice) -> Result<()> {
        if self.tau_ref.len() != lattice.n_components() {
            return Err(LbmError::DimensionMismatch {
                context: "reference relaxation times",
                expected: lattice.n_components(),
                actual: self.tau_ref.len(),
            });
        }
        if let Some(tau) = self.tau_ref.iter().find(|t| !(**t > 0.0)) {
            return Err(LbmError::invalid_config(format!(
                "reference relaxation time must be positive, got {tau}"
            )));
        }
        if let Some(dt) = self.dt {
            if !(dt > 0.0) || !dt.is_finite() {
                return Err(LbmError::invalid_config(format!(
                    "time step must be positive, got {dt}"
                )));
            }
        }
        if self.check_period == 0 {
            return Err(LbmError::invalid_config("check period must be positive"));
        }
        if !(self.convergence_criterion > 0.0) {
            return Err(LbmError::invalid_config(
                "convergence criterion must be positive",
            ));
        }
        if let Scheme::FiniteDifference(TimeIntegrator::Explicit { scheme_coeff }) = self.scheme {
            if !(scheme_coeff > 0.0) {
                return Err(LbmError::invalid_config(format!(
                    "explicit scheme coefficient must be positive, got {scheme_coeff}"
                )));
            }
        }
        Ok(())
    }
}
