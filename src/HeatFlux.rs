//! Stagnation-point heat flux to a cold-wall probe.
//!
//! Two laws share one contract (`StagnationHeatFlux`): the exact law solves
//! the quasi-similar compressible boundary-layer equations, Fay-Riddell is a
//! closed-form correlation. The law is selected once per case.

/// self-similar boundary-layer solver (exact law)
pub mod boundary_layer;
/// Fay-Riddell correlation
pub mod fay_riddell;
/// law selector, result and error types, dispatch enum
pub mod heat_flux_api;
