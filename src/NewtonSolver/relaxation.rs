use super::NewtonError;
use super::case_state::CaseState;
use crate::settings::{ProbeConfig, SolverSettings};
use nalgebra::DVector;
use rand::Rng;

/// relative change of the convergence metric below which the solve is stalled
pub const DCNV_PERCENT: f64 = 0.01;
/// ceiling of the Jacobian step
pub const JAC_DIFF_MAX: f64 = 0.1;
pub const JAC_DIFF_INCREASE: f64 = 4.0;
/// relative size of the random kick applied to a stalled state
pub const VARS_INCREASE: f64 = 0.05;
/// a total temperature kicked above the maximum is moved this far below it, K
pub const OFFSET_T_T: f64 = 5000.0;
/// halvings allowed in each phase of the under-relaxation
pub const MAX_HALVINGS: usize = 60;

/// Admissible region of the Newton iterates.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationBounds {
    pub min_T: f64,
    pub max_T: f64,
    pub T_w: f64,
}

impl RelaxationBounds {
    pub fn new(settings: &SolverSettings, probe: &ProbeConfig) -> Self {
        Self {
            min_T: settings.min_T_relax,
            max_T: settings.max_T_relax,
            T_w: probe.T_w,
        }
    }

    /// T, T_t above the minimum, T_t above the wall, u and P_t non-negative
    pub fn lower_ok(&self, x: &CaseState) -> bool {
        x.T >= self.min_T && x.u >= 0.0 && x.T_t >= self.min_T && x.P_t >= 0.0 && x.T_t >= self.T_w
    }

    pub fn upper_ok(&self, x: &CaseState) -> bool {
        x.T <= self.max_T && x.T_t <= self.max_T
    }
}

/// Applies the Newton increment `dx`, halving it first until the lower
/// bounds hold and then until the upper bounds hold. NaN counts as a
/// violation. Fails if either phase needs more than `MAX_HALVINGS`.
pub fn under_relax(
    x: &CaseState,
    dx: &DVector<f64>,
    bounds: &RelaxationBounds,
) -> Result<CaseState, NewtonError> {
    let mut scale = 1.0;
    let mut candidate = x.step(dx, scale);
    let mut halvings = 0;
    while !bounds.lower_ok(&candidate) {
        if halvings == MAX_HALVINGS {
            return Err(NewtonError::RelaxationExhausted { halvings });
        }
        scale *= 0.5;
        halvings += 1;
        candidate = x.step(dx, scale);
    }
    let mut upper_halvings = 0;
    while !bounds.upper_ok(&candidate) {
        if upper_halvings == MAX_HALVINGS {
            return Err(NewtonError::RelaxationExhausted {
                halvings: halvings + upper_halvings,
            });
        }
        scale *= 0.5;
        upper_halvings += 1;
        candidate = x.step(dx, scale);
    }
    // the second phase may undo the first when the current state is itself outside
    if !bounds.lower_ok(&candidate) {
        return Err(NewtonError::RelaxationExhausted {
            halvings: halvings + upper_halvings,
        });
    }
    Ok(candidate)
}

/// True when the metric barely moved and the Jacobian step may still grow.
pub fn is_stalled(cnv: f64, cnv_old: f64, jac_diff: f64) -> bool {
    let dcnv = (cnv_old - cnv).abs() / cnv_old;
    dcnv < DCNV_PERCENT && jac_diff < JAC_DIFF_MAX
}

pub fn increase_jac_diff(jac_diff: f64) -> f64 {
    (jac_diff * JAC_DIFF_INCREASE).min(JAC_DIFF_MAX)
}

/// Kicks each free variable by +/- `VARS_INCREASE` of its value (random sign)
/// and brings the temperatures back inside the relaxation bounds. The total
/// temperature is also kept above the wall temperature, so the kicked state
/// is a valid start for `under_relax`.
pub fn perturb_state<R: Rng + ?Sized>(
    x: &CaseState,
    n_eq: usize,
    bounds: &RelaxationBounds,
    rng: &mut R,
) -> CaseState {
    let mut next = *x;
    for i in 0..n_eq.min(4) {
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let value = x.get(i);
        next.set(i, value + sign * VARS_INCREASE * value);
    }
    next.T = next.T.clamp(bounds.min_T, bounds.max_T);
    if next.T_t > bounds.max_T {
        next.T_t = bounds.max_T - OFFSET_T_T;
    }
    next.T_t = next.T_t.max(bounds.min_T).max(bounds.T_w);
    next
}
