use super::NumericsError;
use nalgebra::{DMatrix, DVector};

/// Solves `J·dx = rhs` for the Newton increment by LU decomposition.
/// A singular matrix or a non-finite solution is an error.
pub fn solve_dense(jac: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, NumericsError> {
    let n = jac.nrows();
    if jac.ncols() != n || rhs.len() != n {
        return Err(NumericsError::WrongInputSize(format!(
            "matrix {}x{}, rhs {}",
            n,
            jac.ncols(),
            rhs.len()
        )));
    }
    let dx = jac
        .clone()
        .lu()
        .solve(rhs)
        .ok_or(NumericsError::SingularMatrix(n))?;
    if dx.iter().any(|v| !v.is_finite()) {
        return Err(NumericsError::SingularMatrix(n));
    }
    Ok(dx)
}
