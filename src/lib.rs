#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod HeatFlux;
#[allow(non_snake_case)]
pub mod NewtonSolver;
#[allow(non_snake_case)]
pub mod Numerics;
#[allow(non_snake_case)]
pub mod Thermodynamics;
pub mod settings;
