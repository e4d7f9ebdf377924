//! Contract of the equilibrium property provider.
//!
//! A mixture is first equilibrated at a (T, P) state; every getter then reads
//! off that state. Repeated `equilibrate` calls at varying states are the
//! normal usage pattern (one per boundary-layer grid point per iteration).
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    #[error("Invalid temperature: {0}")]
    InvalidTemperature(f64),
    #[error("Invalid pressure: {0}")]
    InvalidPressure(f64),
    #[error("Unknown mixture: {0}")]
    UnknownMixture(String),
    #[error("Equilibrium computation failed: {0}")]
    EquilibriumFailed(String),
    #[error("Mixture queried before equilibrate()")]
    NotEquilibrated,
}

#[allow(non_snake_case)]
pub trait Mixture {
    fn name(&self) -> &str;
    /// set the (T, P) state; must be idempotent for identical inputs
    fn equilibrate(&mut self, T: f64, P: f64) -> Result<(), PropertyError>;
    /// kg/m3
    fn density(&self) -> Result<f64, PropertyError>;
    /// Pa*s
    fn viscosity(&self) -> Result<f64, PropertyError>;
    /// frozen specific heat, J/kg/K
    fn specific_heat(&self) -> Result<f64, PropertyError>;
    /// W/m/K
    fn thermal_conductivity(&self) -> Result<f64, PropertyError>;
    /// J/kg
    fn enthalpy(&self) -> Result<f64, PropertyError>;
    /// J/kg/K
    fn entropy(&self) -> Result<f64, PropertyError>;
    /// equilibrium sound speed, m/s
    fn sound_speed(&self) -> Result<f64, PropertyError>;
    /// m
    fn mean_free_path(&self) -> Result<f64, PropertyError>;
    fn species_mass_fractions(&self) -> Result<(Vec<String>, Vec<f64>), PropertyError>;
}

/// Builds a fresh provider for a mixture name.
pub type MixtureFactory<'a> = dyn FnMut(&str) -> Result<Box<dyn Mixture>, PropertyError> + 'a;

pub fn validate_state(T: f64, P: f64) -> Result<(), PropertyError> {
    if !T.is_finite() || T <= 0.0 {
        return Err(PropertyError::InvalidTemperature(T));
    }
    if !P.is_finite() || P <= 0.0 {
        return Err(PropertyError::InvalidPressure(P));
    }
    Ok(())
}

/// Properties needed by the boundary-layer equations at one state.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    pub rho: f64,
    pub mu: f64,
    pub Cp: f64,
    pub Lambda: f64,
}

#[allow(non_snake_case)]
pub fn transport_at(
    mixture: &mut dyn Mixture,
    T: f64,
    P: f64,
) -> Result<TransportSnapshot, PropertyError> {
    mixture.equilibrate(T, P)?;
    Ok(TransportSnapshot {
        rho: mixture.density()?,
        mu: mixture.viscosity()?,
        Cp: mixture.specific_heat()?,
        Lambda: mixture.thermal_conductivity()?,
    })
}

/// (h, s) at the given state
#[allow(non_snake_case)]
pub fn enthalpy_entropy_at(
    mixture: &mut dyn Mixture,
    T: f64,
    P: f64,
) -> Result<(f64, f64), PropertyError> {
    mixture.equilibrate(T, P)?;
    Ok((mixture.enthalpy()?, mixture.entropy()?))
}
