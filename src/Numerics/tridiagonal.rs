use super::NumericsError;

/// Thomas algorithm for a tridiagonal system.
/// `diag` has length n, `upper` and `lower` have length n-1
/// (`upper[i]` multiplies x[i+1] in row i, `lower[i]` multiplies x[i] in row i+1).
pub fn thomas(
    diag: &[f64],
    upper: &[f64],
    lower: &[f64],
    rhs: &[f64],
) -> Result<Vec<f64>, NumericsError> {
    let n = diag.len();
    if n == 0 || rhs.len() != n || upper.len() + 1 != n || lower.len() + 1 != n {
        return Err(NumericsError::WrongInputSize(format!(
            "diag {}, upper {}, lower {}, rhs {}",
            n,
            upper.len(),
            lower.len(),
            rhs.len()
        )));
    }
    let mut alpha = vec![0.0; n];
    let mut beta = vec![0.0; n.saturating_sub(1)];
    alpha[0] = diag[0];
    for i in 0..n - 1 {
        if alpha[i] == 0.0 || !alpha[i].is_finite() {
            return Err(NumericsError::ZeroPivot(i));
        }
        beta[i] = lower[i] / alpha[i];
        alpha[i + 1] = diag[i + 1] - beta[i] * upper[i];
    }
    if alpha[n - 1] == 0.0 || !alpha[n - 1].is_finite() {
        return Err(NumericsError::ZeroPivot(n - 1));
    }
    // forward sweep
    let mut y = vec![0.0; n];
    y[0] = rhs[0];
    for i in 1..n {
        y[i] = rhs[i] - beta[i - 1] * y[i - 1];
    }
    // back substitution
    let mut x = vec![0.0; n];
    x[n - 1] = y[n - 1] / alpha[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = (y[i] - upper[i] * x[i + 1]) / alpha[i];
    }
    Ok(x)
}

/// Solves the linear two-point problem  a·f'' + b·f' = d  (coefficients already
/// scaled by the grid step) with Dirichlet values `f_init`, `f_final`.
///
/// Each interior row couples three neighbouring stencils; the higher-order
/// correction terms of the compact scheme are eliminated with 2x2 determinants
/// so the interior unknowns form a tridiagonal system.
pub fn solve_two_point_bvp(
    a: &[f64],
    b: &[f64],
    d: &[f64],
    f_init: f64,
    f_final: f64,
) -> Result<Vec<f64>, NumericsError> {
    let n = a.len();
    if b.len() != n || d.len() != n {
        return Err(NumericsError::WrongInputSize(format!(
            "a {}, b {}, d {}",
            n,
            b.len(),
            d.len()
        )));
    }
    if n < 4 {
        return Err(NumericsError::ArrayTooShort(n));
    }
    let ns = n - 2;
    let mut sub = vec![0.0; ns];
    let mut main = vec![0.0; ns];
    let mut sup = vec![0.0; ns];
    let mut rhs = vec![0.0; ns];
    for i in 1..=ns {
        let (ap, bp) = (a[i + 1], b[i + 1]);
        let (a0, b0) = (a[i], b[i]);
        let (am, bm) = (a[i - 1], b[i - 1]);

        let mnp1p1 = ap + 1.5 * bp;
        let mnp10 = -2.0 * (ap + bp);
        let mnp1m1 = ap + 0.5 * bp;
        let mnp1al = -(6.0 * ap + 2.0 * bp);
        let mnp1be = -(10.0 * ap + 2.0 * bp);

        let mnp1 = a0 + 0.5 * b0;
        let mn0 = -2.0 * a0;
        let mnm1 = a0 - 0.5 * b0;
        let mnal = b0;
        let mnbe = 2.0 * a0;

        let mnm1p1 = am - 0.5 * bm;
        let mnm10 = 2.0 * (-am + bm);
        let mnm1m1 = am - 1.5 * bm;
        let mnm1al = 6.0 * am - 2.0 * bm;
        let mnm1be = -10.0 * am + 2.0 * bm;

        let delnp1 = mnal * mnp1be - mnp1al * mnbe;
        let deln = mnp1al * mnm1be - mnm1al * mnp1be;
        let delnm1 = mnm1al * mnbe - mnal * mnm1be;

        sup[i - 1] = mnm1p1 * delnp1 + mnp1 * deln + mnp1p1 * delnm1;
        main[i - 1] = mnm10 * delnp1 + mn0 * deln + mnp10 * delnm1;
        sub[i - 1] = mnm1m1 * delnp1 + mnm1 * deln + mnp1m1 * delnm1;
        rhs[i - 1] = d[i - 1] * delnp1 + d[i] * deln + d[i + 1] * delnm1;
    }
    rhs[0] -= sub[0] * f_init;
    rhs[ns - 1] -= sup[ns - 1] * f_final;

    let interior = thomas(&main, &sup[..ns - 1], &sub[1..], &rhs)?;
    let mut res = Vec::with_capacity(n);
    res.push(f_init);
    res.extend_from_slice(&interior);
    res.push(f_final);
    Ok(res)
}
