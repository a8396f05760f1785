//! Per-node update kernels.
//!
//! - [`collide`]: BGK relaxation into the staging field
//! - [`stream`]: gated propagation of the staging field into `f`
//! - [`compute_gradient`]: cut-cell upwind gradients into the staging field
//! - [`march`]: explicit / semi-implicit update of `f`
//! - field refresh: macroscopic variables, equilibrium, body force, tau
//!
//! Every kernel is a pure function of a two-cell neighbourhood of the field
//! it reads and writes a different field, so node sweeps may run in any
//! order (see [`Sweep`]).

mod collision;
mod gradient;
mod marching;
mod refresh;
mod streaming;
mod sweep;

pub use collision::{collide, collision_factor};
pub use gradient::{
    compute_gradient, stencil_order, three_point_derivative, two_point_derivative, StencilOrder,
};
pub use marching::{march, TimeIntegrator};
pub use refresh::{update_equilibrium_and_body_force, update_macro_vars, update_relaxation_time};
pub use streaming::stream;
pub use sweep::Sweep;
