//! Lattice model: discrete velocities, components and macroscopic moments.
//!
//! A [`Lattice`] concatenates one velocity set per component. Each component
//! owns a contiguous range of the global direction index space, and the
//! ranges partition it.
//!
//! Particle velocities are expressed in units of the sound speed:
//! `xi = CS * c` with `CS = sqrt(3)`, so macroscopic velocities are Mach-like
//! numbers and `dt = dx / CS` advances a population one cell per step.

mod equilibrium;
mod velocity_set;

pub use equilibrium::{equilibrium_weight, BodyForce, TauModel};
pub use velocity_set::VelocitySet;

use std::ops::Range;

use crate::error::{LbmError, Result};
use crate::types::{ComponentIndex, DirectionIndex, MacroVarIndex};

/// Ratio between the lattice speed and the sound speed, `sqrt(3)`.
pub const CS: f64 = 1.732_050_807_568_877_2;

/// One component (population) of a lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeComponent {
    velocity_set: VelocitySet,
    directions: Range<usize>,
}

impl LatticeComponent {
    /// Velocity set of this component.
    pub fn velocity_set(&self) -> VelocitySet {
        self.velocity_set
    }

    /// Global direction range owned by this component.
    pub fn directions(&self) -> Range<usize> {
        self.directions.clone()
    }
}

/// Multi-component discrete velocity model.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    dimension: usize,
    components: Vec<LatticeComponent>,
    velocities: Vec<[i32; 3]>,
    weights: Vec<f64>,
    opposite: Vec<DirectionIndex>,
    component_of: Vec<ComponentIndex>,
}

impl Lattice {
    /// Single-component lattice.
    pub fn single(set: VelocitySet) -> Self {
        Self::build(&[set])
    }

    /// Lattice with one component per entry of `sets`.
    ///
    /// All sets must share the same spatial dimension.
    pub fn from_components(sets: &[VelocitySet]) -> Result<Self> {
        let first = sets
            .first()
            .ok_or_else(|| LbmError::invalid_config("lattice needs at least one component"))?;
        if let Some(other) = sets.iter().find(|s| s.dimension() != first.dimension()) {
            return Err(LbmError::DimensionMismatch {
                context: "lattice components",
                expected: first.dimension(),
                actual: other.dimension(),
            });
        }
        Ok(Self::build(sets))
    }

    fn build(sets: &[VelocitySet]) -> Self {
        let mut components = Vec::with_capacity(sets.len());
        let mut velocities = Vec::new();
        let mut weights = Vec::new();
        let mut opposite = Vec::new();
        let mut component_of = Vec::new();

        for (c, set) in sets.iter().enumerate() {
            let start = velocities.len();
            let local = set.velocities();
            for v in local {
                let opp = local
                    .iter()
                    .position(|w| w[0] == -v[0] && w[1] == -v[1] && w[2] == -v[2])
                    .unwrap_or(0);
                opposite.push(DirectionIndex::new(start + opp));
                component_of.push(ComponentIndex::new(c));
            }
            velocities.extend_from_slice(local);
            weights.extend_from_slice(set.weights());
            components.push(LatticeComponent {
                velocity_set: *set,
                directions: start..velocities.len(),
            });
        }

        Self {
            dimension: sets.first().map_or(0, |s| s.dimension()),
            components,
            velocities,
            weights,
            opposite,
            component_of,
        }
    }

    /// Spatial dimension (2 or 3).
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Total number of directions over all components.
    #[inline]
    pub fn n_directions(&self) -> usize {
        self.velocities.len()
    }

    /// Number of components.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Components in index order.
    pub fn components(&self) -> &[LatticeComponent] {
        &self.components
    }

    /// Direction range of component `c`.
    #[inline]
    pub fn component_range(&self, c: ComponentIndex) -> Range<usize> {
        self.components[c.get()].directions.clone()
    }

    /// Integer velocity of direction `d`.
    #[inline]
    pub fn velocity(&self, d: DirectionIndex) -> [i32; 3] {
        self.velocities[d]
    }

    /// All integer velocities.
    pub fn velocities(&self) -> &[[i32; 3]] {
        &self.velocities
    }

    /// Particle velocity `xi = CS * c` of direction `d`.
    #[inline]
    pub fn xi(&self, d: DirectionIndex) -> [f64; 3] {
        let c = self.velocities[d];
        [CS * c[0] as f64, CS * c[1] as f64, CS * c[2] as f64]
    }

    /// Quadrature weight of direction `d`.
    #[inline]
    pub fn weight(&self, d: DirectionIndex) -> f64 {
        self.weights[d]
    }

    /// Direction with the reversed velocity of `d`.
    #[inline]
    pub fn opposite(&self, d: DirectionIndex) -> DirectionIndex {
        self.opposite[d]
    }

    /// Component owning direction `d`.
    #[inline]
    pub fn component_of(&self, d: DirectionIndex) -> ComponentIndex {
        self.component_of[d]
    }

    /// Whether `d` is a rest (zero-velocity) direction.
    #[inline]
    pub fn is_rest(&self, d: DirectionIndex) -> bool {
        self.velocities[d] == [0, 0, 0]
    }

    /// Look up the direction of component `c` with velocity `v`.
    pub fn direction_of(&self, c: ComponentIndex, v: [i32; 3]) -> Option<DirectionIndex> {
        self.component_range(c)
            .find(|&d| self.velocities[d] == v)
            .map(DirectionIndex::new)
    }

    /// Largest velocity component over all directions.
    pub fn max_speed(&self) -> usize {
        self.components
            .iter()
            .map(|c| c.velocity_set.max_speed())
            .max()
            .unwrap_or(0)
    }

    // =========================================================================
    // Macroscopic variables
    // =========================================================================

    /// Macroscopic variables per component: density then one velocity per axis.
    #[inline]
    pub fn vars_per_component(&self) -> usize {
        1 + self.dimension
    }

    /// Total macroscopic variables per node.
    #[inline]
    pub fn n_macro_vars(&self) -> usize {
        self.n_components() * self.vars_per_component()
    }

    /// Index of the density of component `c`.
    #[inline]
    pub fn density_var(&self, c: ComponentIndex) -> MacroVarIndex {
        MacroVarIndex::new(c.get() * self.vars_per_component())
    }

    /// Index of velocity component `axis` of component `c`.
    #[inline]
    pub fn velocity_var(&self, c: ComponentIndex, axis: usize) -> MacroVarIndex {
        MacroVarIndex::new(c.get() * self.vars_per_component() + 1 + axis)
    }

    /// Names of the macroscopic variables, `rho, u, v[, w]` per component.
    pub fn macro_var_names(&self) -> Vec<String> {
        const NAMES: [&str; 4] = ["rho", "u", "v", "w"];
        let mut names = Vec::with_capacity(self.n_macro_vars());
        for c in 0..self.n_components() {
            for name in NAMES.iter().take(self.vars_per_component()) {
                if self.n_components() == 1 {
                    names.push((*name).to_string());
                } else {
                    names.push(format!("{name}{c}"));
                }
            }
        }
        names
    }

    /// Compute `rho` and `u` of every component from one node's distributions.
    ///
    /// `rho = sum f`, `rho * u = sum xi f`. A node with zero density reports
    /// zero velocity.
    pub fn moments(&self, f: &[f64], out: &mut [f64]) {
        let dim = self.dimension;
        for (c, comp) in self.components.iter().enumerate() {
            let mut rho = 0.0;
            let mut mom = [0.0; 3];
            for d in comp.directions.clone() {
                let fd = f[d];
                rho += fd;
                let v = self.velocities[d];
                for a in 0..dim {
                    mom[a] += CS * v[a] as f64 * fd;
                }
            }
            let base = c * (1 + dim);
            out[base] = rho;
            for a in 0..dim {
                out[base + 1 + a] = if rho != 0.0 { mom[a] / rho } else { 0.0 };
            }
        }
    }

    /// Density and velocity of component `c` from a macro-variable row.
    #[inline]
    pub fn component_state(&self, c: ComponentIndex, vars: &[f64]) -> (f64, [f64; 3]) {
        let base = c.get() * self.vars_per_component();
        let mut u = [0.0; 3];
        u[..self.dimension].copy_from_slice(&vars[base + 1..base + 1 + self.dimension]);
        (vars[base], u)
    }
}
