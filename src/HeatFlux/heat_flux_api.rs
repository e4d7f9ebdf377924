use super::boundary_layer::BoundaryLayerSolver;
use super::fay_riddell::FayRiddell;
use crate::Numerics::NumericsError;
use crate::Thermodynamics::mixture_api::{Mixture, PropertyError};
use crate::settings::{ProbeConfig, SettingsError, SolverSettings};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeatFluxError {
    #[error("Boundary-layer temperature out of range ({T} K) after profile reset")]
    DomainViolation { T: f64 },
    #[error("Boundary-layer grid of {0} points is too small")]
    GridTooSmall(usize),
    #[error("Property evaluation failed: {0}")]
    Property(#[from] PropertyError),
    #[error("Numerical kernel failed: {0}")]
    Numerics(#[from] NumericsError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatFluxResult {
    /// W/m2
    pub q: f64,
    /// false if the boundary-layer iteration hit its cap
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HeatFluxLaw {
    /// boundary-layer equations
    #[default]
    Exact,
    FayRiddell,
}

impl FromStr for HeatFluxLaw {
    type Err = SettingsError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(HeatFluxLaw::Exact),
            "fay_riddell" | "fay-riddell" | "fayriddell" => Ok(HeatFluxLaw::FayRiddell),
            _ => Err(SettingsError::UnknownSelector(format!(
                "heat flux law '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for HeatFluxLaw {
    type Error = SettingsError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HeatFluxLaw> for String {
    fn from(law: HeatFluxLaw) -> Self {
        law.to_string()
    }
}

impl fmt::Display for HeatFluxLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatFluxLaw::Exact => write!(f, "exact"),
            HeatFluxLaw::FayRiddell => write!(f, "fay_riddell"),
        }
    }
}

#[enum_dispatch]
pub trait StagnationHeatFlux {
    /// Heat flux at edge conditions (P_e, T_e) for free-stream velocity `u`.
    fn heat_flux(
        &mut self,
        mixture: &mut dyn Mixture,
        probe: &ProbeConfig,
        P_e: f64,
        T_e: f64,
        u: f64,
    ) -> Result<HeatFluxResult, HeatFluxError>;
}

/// heat-flux law resolved for one case
#[derive(Debug, Clone)]
#[enum_dispatch(StagnationHeatFlux)]
pub enum HeatFluxModel {
    Exact(BoundaryLayerSolver),
    FayRiddell(FayRiddell),
}

impl HeatFluxModel {
    pub fn for_case(law: HeatFluxLaw, settings: &SolverSettings) -> Self {
        match law {
            HeatFluxLaw::Exact => HeatFluxModel::Exact(BoundaryLayerSolver::new(settings)),
            HeatFluxLaw::FayRiddell => HeatFluxModel::FayRiddell(FayRiddell),
        }
    }
}
