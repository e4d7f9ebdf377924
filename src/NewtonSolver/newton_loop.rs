use super::NewtonError;
use super::case_state::{CaseState, CaseTargets};
use super::relaxation::{RelaxationBounds, increase_jac_diff, is_stalled, perturb_state, under_relax};
use super::residuals::{FlowQuantities, ResidualSystem};
use crate::HeatFlux::heat_flux_api::HeatFluxModel;
use crate::Numerics::dense::solve_dense;
use crate::Thermodynamics::mixture_api::Mixture;
use crate::settings::{ProbeConfig, SolverSettings};
use log::{info, warn};
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonStatus {
    Converged,
    /// iteration cap reached
    MaxIterations,
}

impl fmt::Display for NewtonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewtonStatus::Converged => write!(f, "converged"),
            NewtonStatus::MaxIterations => write!(f, "iteration cap reached"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewtonReport {
    pub state: CaseState,
    pub status: NewtonStatus,
    pub iterations: usize,
    /// residual norm relative to the first iteration
    pub cnv: f64,
    /// absolute residual norm of the last evaluation
    pub residual_norm: f64,
    /// quantities of the last evaluated state
    pub flow: FlowQuantities,
    /// Jacobian step at exit, after any stabilisation growth
    pub jac_diff: f64,
}

impl NewtonReport {
    pub fn converged(&self) -> bool {
        self.status == NewtonStatus::Converged
    }
}

/// Newton-Raphson solve of one case from `initial`.
///
/// The convergence metric is the residual norm divided by the norm of the
/// first iteration, so the first iteration always reports 1. An exact root
/// at the first iteration (zero norm) is accepted as converged.
pub fn solve<R: Rng + ?Sized>(
    mixture: &mut dyn Mixture,
    model: &mut HeatFluxModel,
    probe: &ProbeConfig,
    targets: &CaseTargets,
    settings: &SolverSettings,
    initial: CaseState,
    rng: &mut R,
) -> Result<NewtonReport, NewtonError> {
    let mut system = ResidualSystem::new(mixture, model, probe, targets);
    let n_eq = system.n_eq();
    let bounds = RelaxationBounds::new(settings, probe);
    let mut jac_diff = settings.jac_diff;

    let mut x = initial;
    let mut cnv = 1.0;
    let mut cnv_ref = 1.0;
    let mut cnv_old = 1.0;
    let mut residual_norm = f64::NAN;
    let mut last: Option<FlowQuantities> = None;
    let mut status = NewtonStatus::MaxIterations;
    let mut iterations = 0;

    while iterations < settings.max_newton_iter {
        iterations += 1;
        let mut flow = system.evaluate(&x)?;
        let mut res = system.residuals(&x, &flow);
        residual_norm = res.norm();

        if iterations == 1 {
            cnv_ref = residual_norm;
            cnv = 1.0;
            cnv_old = 1.0;
            if residual_norm == 0.0 {
                info!("Iteration 1: initial state is an exact root");
                last = Some(flow);
                status = NewtonStatus::Converged;
                break;
            }
        } else {
            cnv = residual_norm / cnv_ref;
            if is_stalled(cnv, cnv_old, jac_diff) {
                let grown = increase_jac_diff(jac_diff);
                warn!(
                    "convergence criteria {:e} too close to previous {:e}, jac_diff {:e} -> {:e}",
                    cnv, cnv_old, jac_diff, grown
                );
                jac_diff = grown;
                let kicked = perturb_state(&x, n_eq, &bounds, rng);
                match system.evaluate(&kicked) {
                    Ok(kicked_flow) => {
                        res = system.residuals(&kicked, &kicked_flow);
                        residual_norm = res.norm();
                        cnv = residual_norm / cnv_ref;
                        x = kicked;
                        flow = kicked_flow;
                    }
                    Err(e) => warn!("stabilisation kick cancelled: {}", e),
                }
            }
            cnv_old = cnv;
        }
        info!("Iteration {}, convergence criteria: {:e}", iterations, cnv);

        if cnv < settings.newton_conv {
            last = Some(flow);
            status = NewtonStatus::Converged;
            break;
        }
        let jac = system.jacobian(&x, &flow, jac_diff)?;
        let dx = solve_dense(&jac, &res)?;
        x = under_relax(&x, &dx, &bounds)?;
        last = Some(flow);
    }

    let flow = match last {
        Some(flow) => flow,
        None => system.evaluate(&x)?,
    };
    if status == NewtonStatus::MaxIterations {
        warn!(
            "Newton loop stopped after {} iterations, convergence criteria {:e}",
            iterations, cnv
        );
    }
    Ok(NewtonReport {
        state: x,
        status,
        iterations,
        cnv,
        residual_norm,
        flow,
        jac_diff,
    })
}
