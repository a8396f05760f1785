//! Run-time analysis: residual convergence monitoring and numerical
//! stability diagnostics.

mod residual;
mod stability;

pub use residual::{ResidualMonitor, ResidualPair, ResidualReport};
pub(crate) use stability::CheckSite;
pub use stability::{is_physical, Diagnostics, NumericalInstability, UpdateStage};
