use super::NewtonError;
use super::barker::barker_pressure;
use super::case_state::{CaseState, CaseTargets};
use crate::HeatFlux::heat_flux_api::{HeatFluxModel, StagnationHeatFlux};
use crate::Thermodynamics::mixture_api::{Mixture, enthalpy_entropy_at};
use crate::settings::ProbeConfig;
use nalgebra::{DMatrix, DVector};

/// Everything the residuals depend on at one state.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowQuantities {
    pub q: f64,
    pub heat_flux_converged: bool,
    /// static enthalpy and entropy at (T, P)
    pub h: f64,
    pub s: f64,
    /// total enthalpy and entropy at (T_t, P_t)
    pub h_t: f64,
    pub s_t: f64,
    pub P_b: f64,
    pub Re: f64,
}

/// Residual and Jacobian assembly for one case. The system size is fixed
/// by the Barker selector: 3 equations without correction, 4 with it.
pub struct ResidualSystem<'a> {
    mixture: &'a mut dyn Mixture,
    model: &'a mut HeatFluxModel,
    probe: &'a ProbeConfig,
    targets: &'a CaseTargets,
    n_eq: usize,
}

/// forward-difference step for a variable, absolute `jac_diff` at zero
fn perturbation(value: f64, jac_diff: f64) -> f64 {
    if value == 0.0 {
        jac_diff
    } else {
        value * jac_diff
    }
}

#[allow(non_snake_case)]
impl<'a> ResidualSystem<'a> {
    pub fn new(
        mixture: &'a mut dyn Mixture,
        model: &'a mut HeatFluxModel,
        probe: &'a ProbeConfig,
        targets: &'a CaseTargets,
    ) -> Self {
        let n_eq = probe.barker_type.n_equations();
        Self {
            mixture,
            model,
            probe,
            targets,
            n_eq,
        }
    }

    pub fn n_eq(&self) -> usize {
        self.n_eq
    }

    fn heat_flux(&mut self, u: f64, T_t: f64, P_t: f64) -> Result<(f64, bool), NewtonError> {
        let r = self
            .model
            .heat_flux(&mut *self.mixture, self.probe, P_t, T_t, u)?;
        Ok((r.q, r.converged))
    }

    fn static_state(&mut self, T: f64) -> Result<(f64, f64), NewtonError> {
        Ok(enthalpy_entropy_at(&mut *self.mixture, T, self.targets.P)?)
    }

    fn total_state(&mut self, T_t: f64, P_t: f64) -> Result<(f64, f64), NewtonError> {
        Ok(enthalpy_entropy_at(&mut *self.mixture, T_t, P_t)?)
    }

    fn pitot(&mut self, P_t: f64, T: f64, u: f64) -> Result<(f64, f64), NewtonError> {
        let b = barker_pressure(&mut *self.mixture, self.probe, P_t, self.targets.P, T, u)?;
        Ok((b.P_b, b.Re))
    }

    pub fn evaluate(&mut self, x: &CaseState) -> Result<FlowQuantities, NewtonError> {
        let (q, heat_flux_converged) = self.heat_flux(x.u, x.T_t, x.P_t)?;
        let (h, s) = self.static_state(x.T)?;
        let (h_t, s_t) = self.total_state(x.T_t, x.P_t)?;
        let (P_b, Re) = self.pitot(x.P_t, x.T, x.u)?;
        Ok(FlowQuantities {
            q,
            heat_flux_converged,
            h,
            s,
            h_t,
            s_t,
            P_b,
            Re,
        })
    }

    /// r = -(model - measurement) for heat flux, energy, entropy and Pitot pressure
    pub fn residuals(&self, x: &CaseState, f: &FlowQuantities) -> DVector<f64> {
        let all = [
            -(f.q - self.targets.q_target),
            -(f.h_t - (f.h + 0.5 * x.u * x.u)),
            -(f.s_t - f.s),
            -(f.P_b - self.targets.P_stag),
        ];
        DVector::from_column_slice(&all[..self.n_eq])
    }

    /// Jacobian of the equations by one-sided differences around `x`.
    /// Each column re-evaluates only the quantities that depend on the
    /// perturbed variable; d(h + u^2/2)/du = u is taken analytically.
    pub fn jacobian(
        &mut self,
        x: &CaseState,
        f: &FlowQuantities,
        jac_diff: f64,
    ) -> Result<DMatrix<f64>, NewtonError> {
        let n = self.n_eq;
        let barker = n == 4;
        let mut jac = DMatrix::<f64>::zeros(n, n);

        // column T: static enthalpy, static entropy, Pitot pressure
        let dT = perturbation(x.T, jac_diff);
        let (h, s) = self.static_state(x.T + dT)?;
        jac[(1, 0)] = -(h - f.h) / dT;
        jac[(2, 0)] = -(s - f.s) / dT;
        if barker {
            let (P_b, _) = self.pitot(x.P_t, x.T + dT, x.u)?;
            jac[(3, 0)] = (P_b - f.P_b) / dT;
        }

        // column u: heat flux, kinetic energy, Pitot pressure
        let du = perturbation(x.u, jac_diff);
        let (q, _) = self.heat_flux(x.u + du, x.T_t, x.P_t)?;
        jac[(0, 1)] = (q - f.q) / du;
        jac[(1, 1)] = -x.u;
        if barker {
            let (P_b, _) = self.pitot(x.P_t, x.T, x.u + du)?;
            jac[(3, 1)] = (P_b - f.P_b) / du;
        }

        // column T_t: heat flux, total enthalpy, total entropy
        let dT_t = perturbation(x.T_t, jac_diff);
        let (q, _) = self.heat_flux(x.u, x.T_t + dT_t, x.P_t)?;
        let (h_t, s_t) = self.total_state(x.T_t + dT_t, x.P_t)?;
        jac[(0, 2)] = (q - f.q) / dT_t;
        jac[(1, 2)] = (h_t - f.h_t) / dT_t;
        jac[(2, 2)] = (s_t - f.s_t) / dT_t;

        // column P_t
        if barker {
            let dP_t = perturbation(x.P_t, jac_diff);
            let (q, _) = self.heat_flux(x.u, x.T_t, x.P_t + dP_t)?;
            let (h_t, s_t) = self.total_state(x.T_t, x.P_t + dP_t)?;
            let (P_b, _) = self.pitot(x.P_t + dP_t, x.T, x.u)?;
            jac[(0, 3)] = (q - f.q) / dP_t;
            jac[(1, 3)] = (h_t - f.h_t) / dP_t;
            jac[(2, 3)] = (s_t - f.s_t) / dP_t;
            jac[(3, 3)] = (P_b - f.P_b) / dP_t;
        }
        Ok(jac)
    }
}
