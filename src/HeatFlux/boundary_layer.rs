//! Quasi-similar compressible boundary layer at the stagnation point.
//!
//! The momentum (F) and energy (g = T/T_e) equations are quasi-linearised
//! around the current iterate, discretised on a uniform eta grid and solved
//! as two-point boundary value problems. Successive iterates are blended with
//! a fixed factor until the largest pointwise change drops below `hf_conv`.
//! The heat flux follows from g'(0).
use super::heat_flux_api::{HeatFluxError, HeatFluxResult, StagnationHeatFlux};
use crate::Numerics::finite_difference::{DEFAULT_ORDER, cumulative_simpson, first_derivative};
use crate::Numerics::tridiagonal::solve_two_point_bvp;
use crate::Thermodynamics::mixture_api::{Mixture, TransportSnapshot, transport_at};
use crate::settings::{ProbeConfig, SolverSettings};
use log::{debug, error, warn};

/// temperatures at or below this value are outside the property range, K
pub const T_FLOOR: f64 = 4.0;
/// weight of the new iterate in the profile update
pub const RELAXATION: f64 = 0.5;
/// smallest grid the 4th-order stencils and the Simpson start can work on
pub const MIN_GRID_POINTS: usize = 5;

/// Hartree-type starting profile for F on a stretched coordinate xi = 6 eta/eta_max
fn hartree_f(xi: f64) -> f64 {
    0.007005 * xi.powi(3) - 0.114439 * xi.powi(2) + 0.598555 * xi
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayerProfile {
    pub eta: Vec<f64>,
    pub F: Vec<f64>,
    pub g: Vec<f64>,
}

#[allow(non_snake_case)]
impl BoundaryLayerProfile {
    /// Starting profile with boundary values F = (0, 1), g = (g_wall, 1).
    pub fn hartree(N_p: usize, eta_max: f64, g_wall: f64) -> Self {
        let deta = eta_max / (N_p.max(2) - 1) as f64;
        let mut eta = Vec::with_capacity(N_p);
        let mut F = Vec::with_capacity(N_p);
        let mut g = Vec::with_capacity(N_p);
        for i in 0..N_p {
            let e = i as f64 * deta;
            let f = hartree_f(6.0 * e / eta_max);
            eta.push(e);
            F.push(f);
            g.push((f + g_wall * (eta_max - e) / eta_max).min(1.0));
        }
        let mut profile = Self { eta, F, g };
        profile.impose_boundary_values(g_wall);
        profile
    }

    pub fn len(&self) -> usize {
        self.eta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eta.is_empty()
    }

    pub fn impose_boundary_values(&mut self, g_wall: f64) {
        if self.is_empty() {
            return;
        }
        let n = self.len();
        self.F[0] = 0.0;
        self.F[n - 1] = 1.0;
        self.g[0] = g_wall;
        self.g[n - 1] = 1.0;
    }
}

/// Boundary-layer part of the solver settings.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayerSettings {
    pub N_p: usize,
    pub eta_max: f64,
    pub max_iter: usize,
    pub conv: f64,
    pub max_T: f64,
    pub use_prev_ite: bool,
    pub log_warning: bool,
}

impl From<&SolverSettings> for BoundaryLayerSettings {
    fn from(s: &SolverSettings) -> Self {
        Self {
            N_p: s.N_p,
            eta_max: s.eta_max,
            max_iter: s.max_hf_iter,
            conv: s.hf_conv,
            max_T: s.max_T_relax,
            use_prev_ite: s.use_prev_ite,
            log_warning: s.log_warning_hf,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayerSolution {
    pub q: f64,
    pub converged: bool,
    pub iterations: usize,
    pub max_residual: f64,
    /// iterate the heat flux was computed from
    pub profile: BoundaryLayerProfile,
}

/// property ratios across the layer, normalised by edge rho*mu
#[allow(non_snake_case)]
struct LayerProperties {
    l0: Vec<f64>,
    rr: Vec<f64>,
    chi: Vec<f64>,
    Cp: Vec<f64>,
}

/// Exact heat-flux law. Owns the warm-start profile of the current case.
#[derive(Debug, Clone)]
pub struct BoundaryLayerSolver {
    pub settings: BoundaryLayerSettings,
    warm_start: Option<BoundaryLayerProfile>,
}

#[allow(non_snake_case)]
impl BoundaryLayerSolver {
    pub fn new(settings: &SolverSettings) -> Self {
        Self {
            settings: BoundaryLayerSettings::from(settings),
            warm_start: None,
        }
    }

    pub fn warm_start(&self) -> Option<&BoundaryLayerProfile> {
        self.warm_start.as_ref()
    }

    pub fn set_warm_start(&mut self, profile: BoundaryLayerProfile) {
        self.warm_start = Some(profile);
    }

    fn starting_profile(&self, g_wall: f64) -> BoundaryLayerProfile {
        let s = &self.settings;
        match &self.warm_start {
            Some(prev) if s.use_prev_ite && prev.len() == s.N_p => {
                let mut profile = prev.clone();
                profile.impose_boundary_values(g_wall);
                profile
            }
            _ => BoundaryLayerProfile::hartree(s.N_p, s.eta_max, g_wall),
        }
    }

    /// first temperature of the profile outside (T_FLOOR, max_T], NaN included
    fn out_of_range(&self, g: &[f64], T_e: f64) -> Option<f64> {
        g.iter()
            .map(|gi| T_e * gi)
            .find(|T| !(*T > T_FLOOR && *T <= self.settings.max_T))
    }

    fn layer_properties(
        &self,
        mixture: &mut dyn Mixture,
        g: &[f64],
        T_e: f64,
        P_e: f64,
        edge: &TransportSnapshot,
    ) -> Result<LayerProperties, HeatFluxError> {
        let n = g.len();
        let rho_mu_e = edge.rho * edge.mu;
        let mut props = LayerProperties {
            l0: Vec::with_capacity(n),
            rr: Vec::with_capacity(n),
            chi: Vec::with_capacity(n),
            Cp: Vec::with_capacity(n),
        };
        for gi in g {
            let p = transport_at(mixture, T_e * gi, P_e)?;
            props.l0.push(p.rho * p.mu / rho_mu_e);
            props.rr.push(edge.rho / p.rho);
            props.chi.push(p.Lambda * p.rho / rho_mu_e);
            props.Cp.push(p.Cp);
        }
        Ok(props)
    }

    /// Solves the boundary layer at edge state (P_e, T_e) and returns the
    /// wall heat flux together with the iteration record.
    pub fn evaluate(
        &mut self,
        mixture: &mut dyn Mixture,
        probe: &ProbeConfig,
        P_e: f64,
        T_e: f64,
        u: f64,
    ) -> Result<BoundaryLayerSolution, HeatFluxError> {
        let N_p = self.settings.N_p;
        if N_p < MIN_GRID_POINTS {
            return Err(HeatFluxError::GridTooSmall(N_p));
        }
        let eta_max = self.settings.eta_max;
        let deta = eta_max / (N_p - 1) as f64;
        let g_wall = probe.T_w / T_e;

        let mut profile = self.starting_profile(g_wall);
        let edge = transport_at(mixture, T_e, P_e)?;
        let wall = transport_at(mixture, probe.T_w, P_e)?;

        let mut already_reset = false;
        let mut iterations = 0;
        let mut converged = false;
        let mut max_residual = f64::INFINITY;
        while iterations < self.settings.max_iter {
            iterations += 1;
            if let Some(T) = self.out_of_range(&profile.g, T_e) {
                if already_reset {
                    error!("boundary layer: T = {} out of range again after reset", T);
                    return Err(HeatFluxError::DomainViolation { T });
                }
                warn!("boundary layer: T = {} out of range, resetting profile", T);
                profile = BoundaryLayerProfile::hartree(N_p, eta_max, g_wall);
                if let Some(T) = self.out_of_range(&profile.g, T_e) {
                    error!("boundary layer: reset profile still out of range, T = {}", T);
                    return Err(HeatFluxError::DomainViolation { T });
                }
                already_reset = true;
            }
            let props = self.layer_properties(mixture, &profile.g, T_e, P_e, &edge)?;

            // continuity: V' = -F
            let minus_F: Vec<f64> = profile.F.iter().map(|f| -f).collect();
            let V = cumulative_simpson(&minus_F, deta)?;

            // momentum
            let dl0 = first_derivative(&props.l0, deta, DEFAULT_ORDER)?;
            let a: Vec<f64> = props.l0.iter().map(|l| l / deta.powi(2)).collect();
            let b: Vec<f64> = (0..N_p).map(|i| (dl0[i] - V[i]) / deta).collect();
            let d: Vec<f64> = (0..N_p)
                .map(|i| 0.5 * (profile.F[i].powi(2) - props.rr[i]))
                .collect();
            let new_F = solve_two_point_bvp(&a, &b, &d, 0.0, 1.0)?;

            // energy
            let dchi = first_derivative(&props.chi, deta, DEFAULT_ORDER)?;
            let a: Vec<f64> = (0..N_p)
                .map(|i| props.chi[i] / props.Cp[i] / deta.powi(2))
                .collect();
            let b: Vec<f64> = (0..N_p)
                .map(|i| (dchi[i] / props.Cp[i] - V[i]) / deta)
                .collect();
            let d = vec![0.0; N_p];
            let new_g = solve_two_point_bvp(&a, &b, &d, g_wall, 1.0)?;

            max_residual = 0.0;
            for i in 0..N_p {
                let r = (new_F[i] - profile.F[i])
                    .abs()
                    .max((new_g[i] - profile.g[i]).abs());
                if r.is_nan() || r > max_residual {
                    max_residual = r;
                }
            }
            converged = max_residual <= self.settings.conv;
            if converged || iterations >= self.settings.max_iter {
                break;
            }
            for i in 0..N_p {
                profile.F[i] = (1.0 - RELAXATION) * profile.F[i] + RELAXATION * new_F[i];
                profile.g[i] = (1.0 - RELAXATION) * profile.g[i] + RELAXATION * new_g[i];
            }
        }
        if !converged && self.settings.log_warning {
            warn!(
                "boundary layer did not converge in {} iterations, max residual {:e}",
                iterations, max_residual
            );
        }

        let dg = first_derivative(&profile.g, deta, DEFAULT_ORDER)?[0];
        let beta = probe.velocity_gradient(u);
        let q = (2.0 / (edge.rho * edge.mu)).sqrt() * dg * T_e * wall.rho * wall.Lambda * beta.sqrt();
        debug!(
            "boundary layer: q = {:e} after {} iterations (P_e = {}, T_e = {}, u = {})",
            q, iterations, P_e, T_e, u
        );

        if self.settings.use_prev_ite && converged {
            self.warm_start = Some(profile.clone());
        }
        Ok(BoundaryLayerSolution {
            q,
            converged,
            iterations,
            max_residual,
            profile,
        })
    }
}

impl StagnationHeatFlux for BoundaryLayerSolver {
    fn heat_flux(
        &mut self,
        mixture: &mut dyn Mixture,
        probe: &ProbeConfig,
        P_e: f64,
        T_e: f64,
        u: f64,
    ) -> Result<HeatFluxResult, HeatFluxError> {
        let solution = self.evaluate(mixture, probe, P_e, T_e, u)?;
        Ok(HeatFluxResult {
            q: solution.q,
            converged: solution.converged,
        })
    }
}
