use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Free variables of the Newton solve.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseState {
    pub T: f64,
    pub u: f64,
    pub T_t: f64,
    pub P_t: f64,
}

impl CaseState {
    /// variable by position in the unknown vector (T, u, T_t, P_t)
    pub fn get(&self, i: usize) -> f64 {
        match i {
            0 => self.T,
            1 => self.u,
            2 => self.T_t,
            _ => self.P_t,
        }
    }

    pub fn set(&mut self, i: usize, value: f64) {
        match i {
            0 => self.T = value,
            1 => self.u = value,
            2 => self.T_t = value,
            _ => self.P_t = value,
        }
    }

    /// `self + scale * dx` on the first `dx.len()` variables
    pub fn step(&self, dx: &DVector<f64>, scale: f64) -> CaseState {
        let mut next = *self;
        for (i, d) in dx.iter().enumerate().take(4) {
            next.set(i, self.get(i) + scale * d);
        }
        next
    }
}

/// Measured quantities the solution has to reproduce.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseTargets {
    /// static pressure
    pub P: f64,
    pub P_dyn: f64,
    pub P_stag: f64,
    pub q_target: f64,
}
