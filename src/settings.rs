//! # Settings Module
//!
//! ## Purpose
//! Per-case configuration of a probe data-reduction run: measured inputs,
//! initial guess, probe geometry and model selectors, numerical settings.
//! Records are plain serde structs so a case can be read from JSON.
//!
//! ## Key Features
//! - **Pressure completion**: any two of P, P_dyn, P_stag determine the third
//! - **Validation**: positivity and consistency checks before a case is solved
//! - **Laboratory units**: kPa, W/cm2 and mm inputs converted to SI
//! - **Case-insensitive selectors**: `flat`, `exact`/`fay_riddell`, `none`/`homann`/`carleton`
//!
//! ## Usage Pattern
//! ```rust, ignore
//! use plasflow::settings::CaseConfig;
//!
//! let case = CaseConfig::from_file("case.json")?.with_lab_units();
//! let resolved = case.resolve()?;
//! ```
use crate::HeatFlux::boundary_layer::MIN_GRID_POINTS;
use crate::HeatFlux::heat_flux_api::HeatFluxLaw;
use crate::NewtonSolver::barker::BarkerType;
use crate::NewtonSolver::case_state::{CaseState, CaseTargets};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// tolerance on P_stag - P - P_dyn when all three pressures are given, Pa
pub const P_TOL: f64 = 1e-3;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown selector value: {0}")]
    UnknownSelector(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// conversion factors from laboratory units to SI
pub struct UnitConversion;

impl UnitConversion {
    /// kPa -> Pa
    pub const P_CF: f64 = 1e3;
    /// W/cm2 -> W/m2
    pub const Q_CF: f64 = 1e4;
    /// mm -> m
    pub const L_CF: f64 = 1e-3;
}

/// Stagnation-point velocity gradient correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StagnationType {
    /// flat-faced probe, Kolesnikov's relation
    #[default]
    Flat,
}

#[allow(non_snake_case)]
impl StagnationType {
    /// shape factor of the velocity gradient, beta = stag_var * u / R_m
    pub fn stag_var(&self, R_m: f64, R_j: f64) -> f64 {
        match self {
            StagnationType::Flat => {
                let ratio = R_m / R_j;
                if ratio <= 1.0 {
                    let den = 2.0
                        - ratio
                        - 1.68 * (ratio - 1.0).powi(2)
                        - 1.28 * (ratio - 1.0).powi(3);
                    1.0 / den
                } else {
                    ratio
                }
            }
        }
    }
}

impl FromStr for StagnationType {
    type Err = SettingsError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(StagnationType::Flat),
            _ => Err(SettingsError::UnknownSelector(format!("stagnation type '{}'", s))),
        }
    }
}

impl TryFrom<String> for StagnationType {
    type Error = SettingsError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StagnationType> for String {
    fn from(t: StagnationType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for StagnationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagnationType::Flat => write!(f, "flat"),
        }
    }
}

/// Measured quantities of one case, SI units.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseInputs {
    #[serde(default)]
    pub comment: String,
    /// static pressure
    pub P: f64,
    #[serde(default)]
    pub P_dyn: Option<f64>,
    #[serde(default)]
    pub P_stag: Option<f64>,
    /// measured cold-wall heat flux
    pub q_target: f64,
    pub mixture_name: String,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub T_0: f64,
    pub T_t0: f64,
    pub u_0: f64,
    /// 0 means "start from the stagnation pressure"
    #[serde(default)]
    pub P_t0: f64,
}

/// Probe description as read from a case file.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    pub T_w: f64,
    /// Pitot external radius
    pub R_p: f64,
    /// heat-flux probe external radius
    pub R_m: f64,
    /// plasma jet radius
    pub R_j: f64,
    #[serde(default)]
    pub stag_type: StagnationType,
    #[serde(default)]
    pub hf_law: HeatFluxLaw,
    #[serde(default)]
    pub barker_type: BarkerType,
}

/// Immutable probe data used by the solvers, with the stagnation
/// variable computed once.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub T_w: f64,
    pub R_p: f64,
    pub R_m: f64,
    pub R_j: f64,
    pub stag_type: StagnationType,
    pub stag_var: f64,
    pub hf_law: HeatFluxLaw,
    pub barker_type: BarkerType,
}

#[allow(non_snake_case)]
impl ProbeConfig {
    pub fn new(
        T_w: f64,
        R_p: f64,
        R_m: f64,
        R_j: f64,
        stag_type: StagnationType,
        hf_law: HeatFluxLaw,
        barker_type: BarkerType,
    ) -> Self {
        Self {
            T_w,
            R_p,
            R_m,
            R_j,
            stag_type,
            stag_var: stag_type.stag_var(R_m, R_j),
            hf_law,
            barker_type,
        }
    }

    /// stagnation-point velocity gradient for a free-stream velocity `u`
    pub fn velocity_gradient(&self, u: f64) -> f64 {
        self.stag_var * u / self.R_m
    }
}

impl From<&ProbeSettings> for ProbeConfig {
    fn from(p: &ProbeSettings) -> Self {
        ProbeConfig::new(
            p.T_w,
            p.R_p,
            p.R_m,
            p.R_j,
            p.stag_type,
            p.hf_law,
            p.barker_type,
        )
    }
}

/// Numerical settings of the boundary-layer and Newton solvers.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// boundary-layer grid points
    pub N_p: usize,
    pub eta_max: f64,
    pub max_hf_iter: usize,
    pub hf_conv: f64,
    pub max_newton_iter: usize,
    pub newton_conv: f64,
    /// relative finite-difference step of the Jacobian
    pub jac_diff: f64,
    pub min_T_relax: f64,
    pub max_T_relax: f64,
    /// reuse the last converged boundary-layer profile within a case
    pub use_prev_ite: bool,
    pub log_warning_hf: bool,
    /// seed of the stabilisation perturbation
    pub seed: u64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            N_p: 101,
            eta_max: 6.0,
            max_hf_iter: 1000,
            hf_conv: 1e-6,
            max_newton_iter: 100,
            newton_conv: 1e-6,
            jac_diff: 1e-4,
            min_T_relax: 250.0,
            max_T_relax: 15000.0,
            use_prev_ite: true,
            log_warning_hf: true,
            seed: 0,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.N_p < MIN_GRID_POINTS {
            return Err(invalid(format!("N_p = {} < {}", self.N_p, MIN_GRID_POINTS)));
        }
        check_positive("eta_max", self.eta_max)?;
        check_positive("hf_conv", self.hf_conv)?;
        check_positive("newton_conv", self.newton_conv)?;
        check_positive("jac_diff", self.jac_diff)?;
        check_positive("min_T_relax", self.min_T_relax)?;
        if self.max_hf_iter < 1 || self.max_newton_iter < 1 {
            return Err(invalid("iteration caps must be at least 1".to_string()));
        }
        if !(self.min_T_relax < self.max_T_relax) {
            return Err(invalid(format!(
                "min_T_relax {} must be below max_T_relax {}",
                self.min_T_relax, self.max_T_relax
            )));
        }
        Ok(())
    }
}

/// Everything needed to solve one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseConfig {
    pub inputs: CaseInputs,
    pub initial: InitialConditions,
    pub probe: ProbeSettings,
    #[serde(default)]
    pub settings: SolverSettings,
}

/// A validated case in SI units with completed pressures.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCase {
    pub comment: String,
    pub mixture_name: String,
    pub targets: CaseTargets,
    pub initial: CaseState,
    pub probe: ProbeConfig,
    pub settings: SolverSettings,
    pub warnings: Vec<String>,
}

fn invalid(msg: String) -> SettingsError {
    SettingsError::InvalidInput(msg)
}

fn check_positive(name: &str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be positive, got {}", name, value)))
    }
}

/// Completes (P_dyn, P_stag) from whichever of the two is given.
#[allow(non_snake_case)]
pub fn complete_pressures(
    P: f64,
    P_dyn: Option<f64>,
    P_stag: Option<f64>,
) -> Result<(f64, f64), SettingsError> {
    match (P_dyn, P_stag) {
        (Some(P_dyn), None) => Ok((P_dyn, P + P_dyn)),
        (None, Some(P_stag)) => Ok((P_stag - P, P_stag)),
        (Some(P_dyn), Some(P_stag)) => {
            if (P_stag - P - P_dyn).abs() > P_TOL {
                Err(invalid(format!(
                    "P_stag = {} is not P + P_dyn = {}",
                    P_stag,
                    P + P_dyn
                )))
            } else {
                Ok((P_dyn, P_stag))
            }
        }
        (None, None) => Err(invalid(
            "either P_dyn or P_stag must be given".to_string(),
        )),
    }
}

impl CaseConfig {
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Converts a case given in kPa, W/cm2 and mm into SI units.
    pub fn with_lab_units(mut self) -> Self {
        let p_cf = UnitConversion::P_CF;
        self.inputs.P *= p_cf;
        self.inputs.P_dyn = self.inputs.P_dyn.map(|p| p * p_cf);
        self.inputs.P_stag = self.inputs.P_stag.map(|p| p * p_cf);
        self.inputs.q_target *= UnitConversion::Q_CF;
        self.initial.P_t0 *= p_cf;
        self.probe.R_p *= UnitConversion::L_CF;
        self.probe.R_m *= UnitConversion::L_CF;
        self.probe.R_j *= UnitConversion::L_CF;
        self
    }

    /// Validates the case, completes the pressures and builds the
    /// initial state. Non-fatal adjustments are returned as warnings.
    #[allow(non_snake_case)]
    pub fn resolve(&self) -> Result<ResolvedCase, SettingsError> {
        let inputs = &self.inputs;
        let mut warnings = Vec::new();

        check_positive("P", inputs.P)?;
        let (P_dyn, P_stag) = complete_pressures(inputs.P, inputs.P_dyn, inputs.P_stag)?;
        check_positive("P_dyn", P_dyn)?;
        check_positive("P_stag", P_stag)?;
        check_positive("q_target", inputs.q_target)?;

        let init = &self.initial;
        check_positive("T_0", init.T_0)?;
        check_positive("T_t0", init.T_t0)?;
        check_positive("u_0", init.u_0)?;
        if !(init.P_t0.is_finite() && init.P_t0 >= 0.0) {
            return Err(invalid(format!("P_t0 must not be negative, got {}", init.P_t0)));
        }

        let probe = &self.probe;
        check_positive("T_w", probe.T_w)?;
        check_positive("R_p", probe.R_p)?;
        check_positive("R_m", probe.R_m)?;
        check_positive("R_j", probe.R_j)?;

        let settings = &self.settings;
        settings.validate()?;
        if !(probe.T_w < settings.max_T_relax) {
            return Err(invalid(format!(
                "T_w = {} must be below max_T_relax = {}",
                probe.T_w, settings.max_T_relax
            )));
        }
        // the start must lie in the region kept by the under-relaxation
        let (min_T, max_T) = (settings.min_T_relax, settings.max_T_relax);
        if !(init.T_0 >= min_T && init.T_0 <= max_T) {
            return Err(invalid(format!(
                "T_0 = {} outside [{}, {}]",
                init.T_0, min_T, max_T
            )));
        }
        let min_T_t = min_T.max(probe.T_w);
        if !(init.T_t0 >= min_T_t && init.T_t0 <= max_T) {
            return Err(invalid(format!(
                "T_t0 = {} outside [{}, {}]",
                init.T_t0, min_T_t, max_T
            )));
        }

        let mut P_t0 = if init.P_t0 == 0.0 { P_stag } else { init.P_t0 };
        if !probe.barker_type.is_active() && P_t0 != P_stag {
            let msg = format!(
                "P_t0 = {} reset to P_stag = {} (no Barker correction)",
                P_t0, P_stag
            );
            warn!("{}", msg);
            warnings.push(msg);
            P_t0 = P_stag;
        }

        Ok(ResolvedCase {
            comment: inputs.comment.clone(),
            mixture_name: inputs.mixture_name.clone(),
            targets: CaseTargets {
                P: inputs.P,
                P_dyn,
                P_stag,
                q_target: inputs.q_target,
            },
            initial: CaseState {
                T: init.T_0,
                u: init.u_0,
                T_t: init.T_t0,
                P_t: P_t0,
            },
            probe: ProbeConfig::from(probe),
            settings: settings.clone(),
            warnings,
        })
    }
}
