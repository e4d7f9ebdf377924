use crate::Thermodynamics::mixture_api::{Mixture, PropertyError};
use crate::settings::{ProbeConfig, SettingsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pitot-pressure correlation for viscous (low Reynolds number) effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BarkerType {
    #[default]
    None,
    /// Homann, spheres
    Homann,
    Carleton,
}

#[allow(non_snake_case)]
impl BarkerType {
    /// C_p in P_b = P_t + 0.5 rho u^2 C_p
    pub fn pressure_coefficient(&self, Re: f64) -> f64 {
        match self {
            BarkerType::None => 0.0,
            BarkerType::Homann => 6.0 / (Re + 0.455 * Re.sqrt()),
            BarkerType::Carleton => 1.0 + 8.0 / (Re + 0.5576 * Re.sqrt()),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, BarkerType::None)
    }

    /// size of the Newton system: P_t is a free variable only with a correction
    pub fn n_equations(&self) -> usize {
        if self.is_active() { 4 } else { 3 }
    }
}

impl FromStr for BarkerType {
    type Err = SettingsError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(BarkerType::None),
            "homann" => Ok(BarkerType::Homann),
            "carleton" => Ok(BarkerType::Carleton),
            _ => Err(SettingsError::UnknownSelector(format!(
                "Barker correction '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for BarkerType {
    type Error = SettingsError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BarkerType> for String {
    fn from(t: BarkerType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for BarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BarkerType::None => "none",
            BarkerType::Homann => "homann",
            BarkerType::Carleton => "carleton",
        };
        write!(f, "{}", name)
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarkerPressure {
    /// indicated Pitot pressure
    pub P_b: f64,
    /// Pitot Reynolds number based on diameter
    pub Re: f64,
}

/// Indicated Pitot pressure for total pressure `P_t` in a free stream (P, T, u).
/// Without a correction P_b is P_t exactly.
#[allow(non_snake_case)]
pub fn barker_pressure(
    mixture: &mut dyn Mixture,
    probe: &ProbeConfig,
    P_t: f64,
    P: f64,
    T: f64,
    u: f64,
) -> Result<BarkerPressure, PropertyError> {
    mixture.equilibrate(T, P)?;
    let rho = mixture.density()?;
    let mu = mixture.viscosity()?;
    let Re = rho * u * 2.0 * probe.R_p / mu;
    let P_b = match probe.barker_type {
        BarkerType::None => P_t,
        kind => P_t + 0.5 * rho * u * u * kind.pressure_coefficient(Re),
    };
    Ok(BarkerPressure { P_b, Re })
}
