use crate::HeatFlux::boundary_layer::BoundaryLayerSolver;
use crate::HeatFlux::fay_riddell::FayRiddell;
use crate::HeatFlux::heat_flux_api::{HeatFluxLaw, StagnationHeatFlux};
use crate::NewtonSolver::barker::BarkerType;
use crate::NewtonSolver::case_output::{run_cases, solve_case};
use crate::Thermodynamics::ideal_gas_mixture::{IdealGasMixture, ideal_gas_factory};
use crate::settings::{
    CaseConfig, CaseInputs, InitialConditions, ProbeConfig, ProbeSettings, SolverSettings,
    StagnationType,
};

// a 5 kPa air jet at 5000 K and 150 m/s seen by a 10.1 mm probe
const P_STATIC: f64 = 5000.0;
const P_DYN: f64 = 39.3016;
const Q_FAY_RIDDELL: f64 = 3.0051e5;
const Q_EXACT: f64 = 3.00645e5;

fn air_case(comment: &str, q_target: f64, hf_law: HeatFluxLaw, barker_type: BarkerType) -> CaseConfig {
    CaseConfig {
        inputs: CaseInputs {
            comment: comment.to_string(),
            P: P_STATIC,
            P_dyn: Some(P_DYN),
            P_stag: None,
            q_target,
            mixture_name: "air".to_string(),
        },
        initial: InitialConditions {
            T_0: 4000.0,
            T_t0: 4000.0,
            u_0: 100.0,
            P_t0: 0.0,
        },
        probe: ProbeSettings {
            T_w: 350.0,
            R_p: 0.0143,
            R_m: 0.0101,
            R_j: 0.05,
            stag_type: StagnationType::Flat,
            hf_law,
            barker_type,
        },
        settings: SolverSettings::default(),
    }
}

const LAB_CASES: &str = r#"[
    {
        "inputs": { "comment": "argon, low power", "P": 10.0, "P_dyn": 0.02,
                    "q_target": 15.0, "mixture_name": "argon" },
        "initial": { "T_0": 6000.0, "T_t0": 6000.0, "u_0": 80.0 },
        "probe": { "T_w": 300.0, "R_p": 14.3, "R_m": 10.1, "R_j": 50.0,
                   "stag_type": "FLAT", "hf_law": "FayRiddell" }
    },
    {
        "inputs": { "comment": "nitrogen, Pitot corrected", "P": 5.0, "P_stag": 5.06,
                    "q_target": 40.0, "mixture_name": "N2" },
        "initial": { "T_0": 5000.0, "T_t0": 5000.0, "u_0": 150.0 },
        "probe": { "T_w": 350.0, "R_p": 14.3, "R_m": 10.1, "R_j": 50.0,
                   "stag_type": "FLAT", "hf_law": "Exact", "barker_type": "Homann" },
        "settings": { "N_p": 61 }
    },
    {
        "inputs": { "comment": "unknown gas", "P": 5.0, "P_dyn": 0.04,
                    "q_target": 30.0, "mixture_name": "CO2_N2" },
        "initial": { "T_0": 5000.0, "T_t0": 5000.0, "u_0": 100.0 },
        "probe": { "T_w": 350.0, "R_p": 14.3, "R_m": 10.1, "R_j": 50.0 }
    }
]"#;

pub fn probe_examples(task: usize) {
    match task {
        0 => {
            // free stream from the Fay-Riddell law, no Pitot correction
            let case = air_case("air, Fay-Riddell", Q_FAY_RIDDELL, HeatFluxLaw::FayRiddell, BarkerType::None);
            let mut air = IdealGasMixture::air();
            let outcome = solve_case(&case, &mut air);
            outcome.pretty_print();
        }
        1 => {
            // boundary-layer heat flux
            let mut case = air_case("air, boundary layer", Q_EXACT, HeatFluxLaw::Exact, BarkerType::None);
            case.settings.N_p = 61;
            let mut air = IdealGasMixture::air();
            let outcome = solve_case(&case, &mut air);
            outcome.pretty_print();
        }
        2 => {
            // Homann correction of the Pitot reading, total pressure becomes an unknown
            let mut case = air_case("air, Homann", Q_FAY_RIDDELL, HeatFluxLaw::FayRiddell, BarkerType::Homann);
            case.inputs.P_dyn = None;
            case.inputs.P_stag = Some(5040.8314);
            let mut air = IdealGasMixture::air();
            let outcome = solve_case(&case, &mut air);
            outcome.pretty_print();
            println!("Pitot Reynolds number: {:.3}", outcome.properties.Re);
        }
        3 => {
            // a batch in kPa, W/cm2 and mm; the unknown gas fails alone
            let cases: Vec<CaseConfig> = match serde_json::from_str(LAB_CASES) {
                Ok(cases) => cases,
                Err(e) => {
                    println!("cannot parse cases: {}", e);
                    return;
                }
            };
            let cases: Vec<CaseConfig> = cases.into_iter().map(|c| c.with_lab_units()).collect();
            let outcomes = run_cases(&cases, &mut ideal_gas_factory);
            for outcome in &outcomes {
                outcome.pretty_print();
            }
            let n_ok = outcomes.iter().filter(|o| o.converged()).count();
            println!("{} of {} cases converged", n_ok, outcomes.len());
        }
        4 => {
            // heat flux alone: boundary layer against Fay-Riddell, then a warm restart
            let probe = ProbeConfig::new(
                350.0,
                0.0143,
                0.0101,
                0.05,
                StagnationType::Flat,
                HeatFluxLaw::Exact,
                BarkerType::None,
            );
            let mut air = IdealGasMixture::air();
            let mut solver = BoundaryLayerSolver::new(&SolverSettings::default());
            for _ in 0..2 {
                match solver.evaluate(&mut air, &probe, 1.0e4, 6000.0, 100.0) {
                    Ok(sol) => println!(
                        "boundary layer: q = {:.6e} W/m2, {} iterations, converged: {}",
                        sol.q, sol.iterations, sol.converged
                    ),
                    Err(e) => println!("boundary layer failed: {}", e),
                }
            }
            match FayRiddell.heat_flux(&mut air, &probe, 1.0e4, 6000.0, 100.0) {
                Ok(r) => println!("Fay-Riddell:    q = {:.6e} W/m2", r.q),
                Err(e) => println!("Fay-Riddell failed: {}", e),
            }
        }
        _ => println!("no such example: {}", task),
    }
}
