use super::NumericsError;

/// order used by the boundary-layer solver
pub const DEFAULT_ORDER: usize = 4;

/// First derivative on a uniform grid with step `dx`.
///
/// Central differences in the interior and one-sided stencils at the ends.
/// The effective order is 4, reduced to 2 for arrays of 3 or 4 points or when
/// a lower order is requested. Arrays shorter than 3 points are rejected.
pub fn first_derivative(f: &[f64], dx: f64, order: usize) -> Result<Vec<f64>, NumericsError> {
    let n = f.len();
    if n <= 2 {
        return Err(NumericsError::ArrayTooShort(n));
    }
    let max_order = if n <= 4 { 2 } else { 4 };
    let order = order.min(max_order);
    let mut df = vec![0.0; n];
    match order {
        2 => {
            df[0] = (-3.0 * f[0] + 4.0 * f[1] - f[2]) / (2.0 * dx);
            df[n - 1] = (3.0 * f[n - 1] - 4.0 * f[n - 2] + f[n - 3]) / (2.0 * dx);
            for i in 1..n - 1 {
                df[i] = (f[i + 1] - f[i - 1]) / (2.0 * dx);
            }
        }
        4 => {
            let h12 = 12.0 * dx;
            df[0] = (-25.0 * f[0] + 48.0 * f[1] - 36.0 * f[2] + 16.0 * f[3] - 3.0 * f[4]) / h12;
            df[1] = (-3.0 * f[0] - 10.0 * f[1] + 18.0 * f[2] - 6.0 * f[3] + f[4]) / h12;
            df[n - 1] = (25.0 * f[n - 1] - 48.0 * f[n - 2] + 36.0 * f[n - 3] - 16.0 * f[n - 4]
                + 3.0 * f[n - 5])
                / h12;
            df[n - 2] = (3.0 * f[n - 1] + 10.0 * f[n - 2] - 18.0 * f[n - 3] + 6.0 * f[n - 4]
                - f[n - 5])
                / h12;
            for i in 2..n - 2 {
                df[i] = (f[i - 2] - 8.0 * f[i - 1] + 8.0 * f[i + 1] - f[i + 2]) / h12;
            }
        }
        other => return Err(NumericsError::UnsupportedOrder(other)),
    }
    Ok(df)
}

/// Cumulative integral of `y` from the first grid point, V[0] = 0.
/// The second point uses a 5-point start formula, the rest march with
/// Simpson's rule over two steps.
pub fn cumulative_simpson(y: &[f64], dx: f64) -> Result<Vec<f64>, NumericsError> {
    let n = y.len();
    if n < 5 {
        return Err(NumericsError::ArrayTooShort(n));
    }
    let mut v = vec![0.0; n];
    v[1] = (17.0 * y[0] + 42.0 * y[1] - 16.0 * y[2] + 6.0 * y[3] - y[4]) * dx / 48.0;
    for i in 2..n {
        v[i] = v[i - 2] + (y[i - 2] + 4.0 * y[i - 1] + y[i]) * dx / 3.0;
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fourth_order_is_exact_for_quartic() {
        let dx = 0.1;
        let f: Vec<f64> = (0..11).map(|i| (i as f64 * dx).powi(4)).collect();
        let df = first_derivative(&f, dx, DEFAULT_ORDER).unwrap();
        for (i, d) in df.iter().enumerate() {
            let x = i as f64 * dx;
            assert_relative_eq!(*d, 4.0 * x.powi(3), epsilon = 1e-10);
        }
    }

    #[test]
    fn short_arrays_fall_back_to_second_order() {
        let dx = 0.5;
        let f = vec![0.0, 0.25, 1.0, 2.25];
        let df = first_derivative(&f, dx, 4).unwrap();
        for (i, d) in df.iter().enumerate() {
            assert_relative_eq!(*d, 2.0 * i as f64 * dx, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_two_points_and_odd_orders() {
        assert_eq!(
            first_derivative(&[1.0, 2.0], 1.0, 2),
            Err(NumericsError::ArrayTooShort(2))
        );
        assert_eq!(
            first_derivative(&[1.0, 2.0, 3.0, 4.0, 5.0], 1.0, 3),
            Err(NumericsError::UnsupportedOrder(3))
        );
    }

    #[test]
    fn simpson_integrates_cubic() {
        let dx = 0.05;
        let y: Vec<f64> = (0..41).map(|i| (i as f64 * dx).powi(3)).collect();
        let v = cumulative_simpson(&y, dx).unwrap();
        assert_eq!(v[0], 0.0);
        for (i, vi) in v.iter().enumerate() {
            let x = i as f64 * dx;
            assert_relative_eq!(*vi, x.powi(4) / 4.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn simpson_needs_five_points() {
        assert_eq!(
            cumulative_simpson(&[1.0; 4], 0.1),
            Err(NumericsError::ArrayTooShort(4))
        );
    }
}
