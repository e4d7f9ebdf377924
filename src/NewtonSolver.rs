//! Outer Newton-Raphson solve of one probe case.
//!
//! Unknowns are the free-stream static temperature T, velocity u, total
//! temperature T_t and, when a Barker correction is active, total pressure
//! P_t. The equations balance measured heat flux, total enthalpy, entropy
//! and (optionally) the indicated Pitot pressure.
use crate::HeatFlux::heat_flux_api::HeatFluxError;
use crate::Numerics::NumericsError;
use crate::Thermodynamics::mixture_api::PropertyError;
use thiserror::Error;

/// Barker/Pitot rarefaction correction
pub mod barker;
/// per-case outputs, status and the multi-case runner
pub mod case_output;
/// free variables and measured targets
pub mod case_state;
/// the Newton iteration
pub mod newton_loop;
#[cfg(test)]
mod newton_tests;
/// step limiting and Jacobian-step stabilisation
pub mod relaxation;
/// residual vector and finite-difference Jacobian
pub mod residuals;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NewtonError {
    #[error("Heat flux evaluation failed: {0}")]
    HeatFlux(#[from] HeatFluxError),
    #[error("Property evaluation failed: {0}")]
    Property(#[from] PropertyError),
    #[error("Newton step could not be computed: {0}")]
    LinearSolve(#[from] NumericsError),
    #[error("Under-relaxation found no admissible step after {halvings} halvings")]
    RelaxationExhausted { halvings: usize },
}
