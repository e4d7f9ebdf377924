/// property provider contract: `Mixture`, `PropertyError`, state helpers
pub mod mixture_api;
/// perfect gas reference provider
pub mod ideal_gas_mixture;
