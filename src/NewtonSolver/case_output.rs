//! Case-level driver: validation, Newton solve, output properties, status.
//! A failed case never aborts the run; its outputs are set to a sentinel.
use super::barker::barker_pressure;
use super::case_state::{CaseState, CaseTargets};
use super::newton_loop::{NewtonReport, solve};
use crate::HeatFlux::heat_flux_api::HeatFluxModel;
use crate::Thermodynamics::mixture_api::{Mixture, MixtureFactory, PropertyError};
use crate::settings::{CaseConfig, ProbeConfig};
use log::{error, info, warn};
use prettytable::{Cell, Row, Table};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;

/// value of every output quantity of a failed case
pub const SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Converged,
    NotConverged,
    InvalidInput,
    ComputationError,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStatus::Converged => "yes",
            CaseStatus::NotConverged => "no",
            CaseStatus::InvalidInput => "Error: invalid data",
            CaseStatus::ComputationError => "Error detected during the computation",
        };
        write!(f, "{}", s)
    }
}

/// Free-stream state and derived quantities reported for a case.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct OutputProperties {
    pub rho: f64,
    pub T: f64,
    pub h: f64,
    pub u: f64,
    /// equilibrium sound speed
    pub a: f64,
    pub M: f64,
    pub T_t: f64,
    pub h_t: f64,
    pub P_t: f64,
    /// Pitot Reynolds number
    pub Re: f64,
    pub P_b: f64,
    pub mfp: f64,
    /// Knudsen number on the jet radius
    pub Kn: f64,
    pub q: f64,
    /// final convergence metric
    pub cnv: f64,
    pub species_names: Vec<String>,
    pub species_Y: Vec<f64>,
}

#[allow(non_snake_case)]
impl OutputProperties {
    pub fn sentinel() -> Self {
        Self {
            rho: SENTINEL,
            T: SENTINEL,
            h: SENTINEL,
            u: SENTINEL,
            a: SENTINEL,
            M: SENTINEL,
            T_t: SENTINEL,
            h_t: SENTINEL,
            P_t: SENTINEL,
            Re: SENTINEL,
            P_b: SENTINEL,
            mfp: SENTINEL,
            Kn: SENTINEL,
            q: SENTINEL,
            cnv: SENTINEL,
            species_names: Vec::new(),
            species_Y: Vec::new(),
        }
    }

    /// Evaluates the output quantities at the final static state.
    pub fn compute(
        mixture: &mut dyn Mixture,
        state: &CaseState,
        targets: &CaseTargets,
        probe: &ProbeConfig,
        report: &NewtonReport,
    ) -> Result<Self, PropertyError> {
        let P = targets.P;
        mixture.equilibrate(state.T, P)?;
        let rho = mixture.density()?;
        let a = mixture.sound_speed()?;
        let h = mixture.enthalpy()?;
        let mfp = mixture.mean_free_path()?;
        let (species_names, species_Y) = mixture.species_mass_fractions()?;
        let pitot = barker_pressure(mixture, probe, state.P_t, P, state.T, state.u)?;
        Ok(Self {
            rho,
            T: state.T,
            h,
            u: state.u,
            a,
            M: state.u / a,
            T_t: state.T_t,
            h_t: h + 0.5 * state.u * state.u,
            P_t: state.P_t,
            Re: pitot.Re,
            P_b: pitot.P_b,
            mfp,
            Kn: mfp / probe.R_j,
            q: report.flow.q,
            cnv: report.cnv,
            species_names,
            species_Y,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub comment: String,
    pub mixture_name: String,
    pub status: CaseStatus,
    pub iterations: usize,
    pub properties: OutputProperties,
    pub warnings: Vec<String>,
}

impl CaseOutcome {
    fn failed(case: &CaseConfig, status: CaseStatus, message: String) -> Self {
        Self {
            comment: case.inputs.comment.clone(),
            mixture_name: case.inputs.mixture_name.clone(),
            status,
            iterations: 0,
            properties: OutputProperties::sentinel(),
            warnings: vec![message],
        }
    }

    pub fn converged(&self) -> bool {
        self.status == CaseStatus::Converged
    }

    /// warnings joined with `|`, "None" when there are none
    pub fn warnings_string(&self) -> String {
        if self.warnings.is_empty() {
            "None".to_string()
        } else {
            self.warnings.join("|")
        }
    }

    pub fn table(&self) -> Table {
        let p = &self.properties;
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Quantity"), Cell::new("Value")]));
        let mut add = |name: &str, value: String| {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        };
        add("comment", self.comment.clone());
        add("mixture", self.mixture_name.clone());
        add("converged", self.status.to_string());
        add("iterations", self.iterations.to_string());
        add("rho [kg/m3]", format!("{:.6e}", p.rho));
        add("T [K]", format!("{:.3}", p.T));
        add("h [J/kg]", format!("{:.6e}", p.h));
        add("u [m/s]", format!("{:.4}", p.u));
        add("a [m/s]", format!("{:.4}", p.a));
        add("M", format!("{:.6}", p.M));
        add("T_t [K]", format!("{:.3}", p.T_t));
        add("h_t [J/kg]", format!("{:.6e}", p.h_t));
        add("P_t [Pa]", format!("{:.4}", p.P_t));
        add("P_b [Pa]", format!("{:.4}", p.P_b));
        add("Re", format!("{:.4}", p.Re));
        add("Kn", format!("{:.6e}", p.Kn));
        add("q [W/m2]", format!("{:.6e}", p.q));
        add("cnv", format!("{:.3e}", p.cnv));
        for (name, y) in p.species_names.iter().zip(p.species_Y.iter()) {
            add(&format!("Y_{}", name), format!("{:.6}", y));
        }
        add("warnings", self.warnings_string());
        table
    }

    pub fn pretty_print(&self) {
        self.table().printstd();
    }
}

/// Solves one case with the given property provider.
pub fn solve_case(case: &CaseConfig, mixture: &mut dyn Mixture) -> CaseOutcome {
    let resolved = match case.resolve() {
        Ok(r) => r,
        Err(e) => {
            error!("case '{}': {}", case.inputs.comment, e);
            return CaseOutcome::failed(case, CaseStatus::InvalidInput, e.to_string());
        }
    };
    let t = &resolved.targets;
    info!(
        "case '{}': P = {}, P_stag = {}, q_target = {}, mixture {}",
        resolved.comment, t.P, t.P_stag, t.q_target, resolved.mixture_name
    );

    let mut model = HeatFluxModel::for_case(resolved.probe.hf_law, &resolved.settings);
    let mut rng = StdRng::seed_from_u64(resolved.settings.seed);
    let report = match solve(
        mixture,
        &mut model,
        &resolved.probe,
        &resolved.targets,
        &resolved.settings,
        resolved.initial,
        &mut rng,
    ) {
        Ok(r) => r,
        Err(e) => {
            error!("case '{}' skipped: {}", resolved.comment, e);
            return CaseOutcome::failed(case, CaseStatus::ComputationError, e.to_string());
        }
    };
    let properties = match OutputProperties::compute(
        mixture,
        &report.state,
        &resolved.targets,
        &resolved.probe,
        &report,
    ) {
        Ok(p) => p,
        Err(e) => {
            error!("case '{}': output properties failed: {}", resolved.comment, e);
            return CaseOutcome::failed(case, CaseStatus::ComputationError, e.to_string());
        }
    };

    let mut warnings = resolved.warnings.clone();
    let mut status = if report.converged() {
        CaseStatus::Converged
    } else {
        CaseStatus::NotConverged
    };
    if !report.flow.heat_flux_converged {
        let msg = "heat flux did not converge in the last iteration".to_string();
        warn!("case '{}': {}", resolved.comment, msg);
        warnings.push(msg);
        status = CaseStatus::NotConverged;
    }
    if properties.M >= 1.0 {
        let msg = format!(
            "free-stream Mach number {:.4} violates the subsonic model assumption",
            properties.M
        );
        warn!("case '{}': {}", resolved.comment, msg);
        warnings.push(msg);
    }
    info!(
        "case '{}' finished: {} after {} iterations",
        resolved.comment, report.status, report.iterations
    );
    CaseOutcome {
        comment: resolved.comment,
        mixture_name: resolved.mixture_name,
        status,
        iterations: report.iterations,
        properties,
        warnings,
    }
}

/// Runs cases one after another with a fresh mixture for each.
pub fn run_cases(cases: &[CaseConfig], factory: &mut MixtureFactory<'_>) -> Vec<CaseOutcome> {
    cases
        .iter()
        .map(|case| match factory(&case.inputs.mixture_name) {
            Ok(mut mixture) => solve_case(case, mixture.as_mut()),
            Err(e) => {
                error!("case '{}': {}", case.inputs.comment, e);
                CaseOutcome::failed(case, CaseStatus::InvalidInput, e.to_string())
            }
        })
        .collect()
}
