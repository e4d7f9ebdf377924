use super::heat_flux_api::{HeatFluxError, HeatFluxResult, StagnationHeatFlux};
use crate::Thermodynamics::mixture_api::{Mixture, transport_at};
use crate::settings::ProbeConfig;

/// Fay-Riddell stagnation-point correlation:
/// q = 0.76 Pr_w^-0.6 (rho_e mu_e)^0.4 (rho_w mu_w)^0.1 sqrt(beta) (h_e - h_w)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FayRiddell;

impl StagnationHeatFlux for FayRiddell {
    fn heat_flux(
        &mut self,
        mixture: &mut dyn Mixture,
        probe: &ProbeConfig,
        P_e: f64,
        T_e: f64,
        u: f64,
    ) -> Result<HeatFluxResult, HeatFluxError> {
        let edge = transport_at(mixture, T_e, P_e)?;
        let h_e = mixture.enthalpy()?;
        let wall = transport_at(mixture, probe.T_w, P_e)?;
        let h_w = mixture.enthalpy()?;

        let Pr_w = wall.mu * wall.Cp / wall.Lambda;
        let beta = probe.velocity_gradient(u);
        let q = 0.76
            * Pr_w.powf(-0.6)
            * (edge.rho * edge.mu).powf(0.4)
            * (wall.rho * wall.mu).powf(0.1)
            * beta.sqrt()
            * (h_e - h_w);
        Ok(HeatFluxResult { q, converged: true })
    }
}
