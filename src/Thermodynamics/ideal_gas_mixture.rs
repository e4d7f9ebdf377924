//! Calorically perfect gas with Sutherland viscosity and constant Prandtl
//! number. Used as a reference property provider in tests and demos; it
//! satisfies the same contract as a full equilibrium-chemistry provider.
use super::mixture_api::{Mixture, PropertyError, validate_state};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const T_REF: f64 = 298.15;
pub const P_REF: f64 = 101325.0;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealGasMixture {
    pub name: String,
    /// specific gas constant, J/kg/K
    pub R: f64,
    pub Cp: f64,
    /// Sutherland reference viscosity, temperature and constant
    pub mu0: f64,
    pub T0: f64,
    pub S: f64,
    pub Pr: f64,
    pub species: Vec<String>,
    pub mass_fractions: Vec<f64>,
    #[serde(skip)]
    state: Option<(f64, f64)>,
}

#[allow(non_snake_case)]
impl IdealGasMixture {
    pub fn new(
        name: &str,
        R: f64,
        Cp: f64,
        sutherland: (f64, f64, f64),
        Pr: f64,
        species: Vec<(&str, f64)>,
    ) -> Self {
        let (mu0, T0, S) = sutherland;
        Self {
            name: name.to_string(),
            R,
            Cp,
            mu0,
            T0,
            S,
            Pr,
            species: species.iter().map(|(s, _)| s.to_string()).collect(),
            mass_fractions: species.iter().map(|(_, y)| *y).collect(),
            state: None,
        }
    }

    pub fn air() -> Self {
        Self::new(
            "air",
            287.05,
            1004.5,
            (1.716e-5, 273.15, 110.4),
            0.71,
            vec![("N2", 0.767), ("O2", 0.233)],
        )
    }

    pub fn nitrogen() -> Self {
        Self::new(
            "N2",
            296.8,
            1040.0,
            (1.663e-5, 273.0, 107.0),
            0.72,
            vec![("N2", 1.0)],
        )
    }

    pub fn argon() -> Self {
        Self::new(
            "Ar",
            208.1,
            520.3,
            (2.125e-5, 273.0, 144.0),
            0.667,
            vec![("Ar", 1.0)],
        )
    }
    /// case-insensitive lookup of the built-in gases
    pub fn from_name(name: &str) -> Result<Self, PropertyError> {
        match name.trim().to_lowercase().as_str() {
            "air" | "air_5" | "air_11" => Ok(Self::air()),
            "n2" | "nitrogen" => Ok(Self::nitrogen()),
            "ar" | "argon" => Ok(Self::argon()),
            _ => Err(PropertyError::UnknownMixture(name.to_string())),
        }
    }

    pub fn gamma(&self) -> f64 {
        self.Cp / (self.Cp - self.R)
    }

    fn state(&self) -> Result<(f64, f64), PropertyError> {
        self.state.ok_or(PropertyError::NotEquilibrated)
    }

    fn sutherland(&self, T: f64) -> f64 {
        self.mu0 * (T / self.T0).powf(1.5) * (self.T0 + self.S) / (T + self.S)
    }
}

#[allow(non_snake_case)]
impl Mixture for IdealGasMixture {
    fn name(&self) -> &str {
        &self.name
    }

    fn equilibrate(&mut self, T: f64, P: f64) -> Result<(), PropertyError> {
        validate_state(T, P)?;
        self.state = Some((T, P));
        Ok(())
    }

    fn density(&self) -> Result<f64, PropertyError> {
        let (T, P) = self.state()?;
        Ok(P / (self.R * T))
    }

    fn viscosity(&self) -> Result<f64, PropertyError> {
        let (T, _) = self.state()?;
        Ok(self.sutherland(T))
    }

    fn specific_heat(&self) -> Result<f64, PropertyError> {
        self.state()?;
        Ok(self.Cp)
    }

    fn thermal_conductivity(&self) -> Result<f64, PropertyError> {
        let (T, _) = self.state()?;
        Ok(self.sutherland(T) * self.Cp / self.Pr)
    }

    fn enthalpy(&self) -> Result<f64, PropertyError> {
        let (T, _) = self.state()?;
        Ok(self.Cp * T)
    }

    fn entropy(&self) -> Result<f64, PropertyError> {
        let (T, P) = self.state()?;
        Ok(self.Cp * (T / T_REF).ln() - self.R * (P / P_REF).ln())
    }

    fn sound_speed(&self) -> Result<f64, PropertyError> {
        let (T, _) = self.state()?;
        Ok((self.gamma() * self.R * T).sqrt())
    }

    fn mean_free_path(&self) -> Result<f64, PropertyError> {
        let (T, P) = self.state()?;
        Ok(self.sutherland(T) / P * (PI * self.R * T / 2.0).sqrt())
    }

    fn species_mass_fractions(&self) -> Result<(Vec<String>, Vec<f64>), PropertyError> {
        self.state()?;
        Ok((self.species.clone(), self.mass_fractions.clone()))
    }
}

/// factory usable by the multi-case runner
pub fn ideal_gas_factory(name: &str) -> Result<Box<dyn Mixture>, PropertyError> {
    Ok(Box::new(IdealGasMixture::from_name(name)?))
}
