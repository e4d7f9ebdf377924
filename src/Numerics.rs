//! Small numerical kernels shared by the boundary-layer and Newton solvers:
//! tridiagonal elimination, dense solve of the Newton step, finite-difference
//! derivatives and the cumulative Simpson integral.
use thiserror::Error;

/// dense solve of the (at most 4x4) Newton system
pub mod dense;
/// first-derivative stencils and cumulative integral
pub mod finite_difference;
/// Thomas algorithm and the two-point boundary value discretisation
pub mod tridiagonal;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumericsError {
    #[error("Wrong input size: {0}")]
    WrongInputSize(String),
    #[error("Zero pivot in tridiagonal elimination at row {0}")]
    ZeroPivot(usize),
    #[error("Singular matrix of size {0}")]
    SingularMatrix(usize),
    #[error("Array of length {0} is too short for the stencil")]
    ArrayTooShort(usize),
    #[error("Unsupported finite difference order {0}")]
    UnsupportedOrder(usize),
}
