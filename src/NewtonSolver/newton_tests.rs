///////////////////////////TESTING////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::HeatFlux::boundary_layer::BoundaryLayerSolver;
    use crate::HeatFlux::fay_riddell::FayRiddell;
    use crate::HeatFlux::heat_flux_api::{
        HeatFluxError, HeatFluxLaw, HeatFluxModel, StagnationHeatFlux,
    };
    use crate::NewtonSolver::NewtonError;
    use crate::NewtonSolver::barker::{BarkerType, barker_pressure};
    use crate::NewtonSolver::case_output::{CaseStatus, SENTINEL, run_cases, solve_case};
    use crate::NewtonSolver::case_state::{CaseState, CaseTargets};
    use crate::NewtonSolver::newton_loop::{NewtonReport, NewtonStatus, solve};
    use crate::NewtonSolver::relaxation::JAC_DIFF_MAX;
    use crate::Thermodynamics::ideal_gas_mixture::{IdealGasMixture, ideal_gas_factory};
    use crate::Thermodynamics::mixture_api::{Mixture, PropertyError};
    use crate::settings::{
        CaseConfig, CaseInputs, InitialConditions, ProbeConfig, ProbeSettings, SolverSettings,
        StagnationType,
    };
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const P_STATIC: f64 = 5000.0;
    const T_TRUE: f64 = 5000.0;
    const U_TRUE: f64 = 150.0;

    fn probe(law: HeatFluxLaw, barker: BarkerType) -> ProbeConfig {
        ProbeConfig::new(
            350.0,
            0.0143,
            0.0101,
            0.05,
            StagnationType::Flat,
            law,
            barker,
        )
    }

    /// Total state of a perfect-gas free stream (T_TRUE, U_TRUE, P_STATIC):
    /// isentropic stagnation at constant total enthalpy.
    fn true_state(air: &IdealGasMixture) -> CaseState {
        let T_t = T_TRUE + U_TRUE * U_TRUE / (2.0 * air.Cp);
        let P_t = P_STATIC * (T_t / T_TRUE).powf(air.Cp / air.R);
        CaseState {
            T: T_TRUE,
            u: U_TRUE,
            T_t,
            P_t,
        }
    }

    /// Measurements that the true state reproduces.
    fn synthetic_targets(
        air: &mut IdealGasMixture,
        model: &mut dyn StagnationHeatFlux,
        probe: &ProbeConfig,
    ) -> (CaseState, CaseTargets) {
        let truth = true_state(air);
        let q = model
            .heat_flux(air, probe, truth.P_t, truth.T_t, truth.u)
            .unwrap()
            .q;
        let P_b = barker_pressure(air, probe, truth.P_t, P_STATIC, truth.T, truth.u)
            .unwrap()
            .P_b;
        let targets = CaseTargets {
            P: P_STATIC,
            P_dyn: P_b - P_STATIC,
            P_stag: P_b,
            q_target: q,
        };
        (truth, targets)
    }

    fn guess(P_t: f64) -> CaseState {
        CaseState {
            T: 4000.0,
            u: 100.0,
            T_t: 4000.0,
            P_t,
        }
    }

    fn assert_recovered(found: &CaseState, truth: &CaseState, tol: f64) {
        assert_relative_eq!(found.T, truth.T, max_relative = tol);
        assert_relative_eq!(found.u, truth.u, max_relative = tol);
        assert_relative_eq!(found.T_t, truth.T_t, max_relative = tol);
        assert_relative_eq!(found.P_t, truth.P_t, max_relative = tol);
    }

    #[test]
    fn recovers_free_stream_with_fay_riddell() {
        let probe = probe(HeatFluxLaw::FayRiddell, BarkerType::None);
        let mut air = IdealGasMixture::air();
        let (truth, targets) = synthetic_targets(&mut air, &mut FayRiddell, &probe);
        let settings = SolverSettings::default();
        let mut model = HeatFluxModel::for_case(probe.hf_law, &settings);
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let report = solve(
            &mut air,
            &mut model,
            &probe,
            &targets,
            &settings,
            guess(targets.P_stag),
            &mut rng,
        )
        .unwrap();
        assert_eq!(report.status, NewtonStatus::Converged);
        assert!(report.iterations > 1 && report.iterations < 20);
        assert!(report.cnv < settings.newton_conv);
        assert_recovered(&report.state, &truth, 1e-5);
        // P_t is locked to the stagnation pressure without a correction
        assert_eq!(report.state.P_t, targets.P_stag);
    }

    #[test]
    fn recovers_free_stream_with_boundary_layer() {
        let probe = probe(HeatFluxLaw::Exact, BarkerType::None);
        let settings = SolverSettings {
            N_p: 41,
            hf_conv: 1e-8,
            ..SolverSettings::default()
        };
        let mut air = IdealGasMixture::air();
        let mut reference = BoundaryLayerSolver::new(&settings);
        let (truth, targets) = synthetic_targets(&mut air, &mut reference, &probe);
        let mut model = HeatFluxModel::for_case(probe.hf_law, &settings);
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let report = solve(
            &mut air,
            &mut model,
            &probe,
            &targets,
            &settings,
            guess(targets.P_stag),
            &mut rng,
        )
        .unwrap();
        assert!(report.converged());
        assert!(report.flow.heat_flux_converged);
        assert_recovered(&report.state, &truth, 1e-4);
    }

    #[test]
    fn recovers_total_pressure_with_barker_correction() {
        for kind in [BarkerType::Homann, BarkerType::Carleton] {
            let probe = probe(HeatFluxLaw::FayRiddell, kind);
            let mut air = IdealGasMixture::air();
            let (truth, targets) = synthetic_targets(&mut air, &mut FayRiddell, &probe);
            assert!(targets.P_stag > truth.P_t);
            let settings = SolverSettings::default();
            let mut model = HeatFluxModel::for_case(probe.hf_law, &settings);
            let mut rng = StdRng::seed_from_u64(3);
            let report = solve(
                &mut air,
                &mut model,
                &probe,
                &targets,
                &settings,
                guess(targets.P_stag),
                &mut rng,
            )
            .unwrap();
            assert!(report.converged(), "{:?} did not converge", kind);
            assert_recovered(&report.state, &truth, 1e-5);
        }
    }

    /// Perfect gas whose entropy does not depend on the state, so that a
    /// state with T_t = T + u^2/(2 Cp) is an exact root in floating point.
    struct FlatEntropyGas(IdealGasMixture);

    impl Mixture for FlatEntropyGas {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn equilibrate(&mut self, T: f64, P: f64) -> Result<(), PropertyError> {
            self.0.equilibrate(T, P)
        }
        fn density(&self) -> Result<f64, PropertyError> {
            self.0.density()
        }
        fn viscosity(&self) -> Result<f64, PropertyError> {
            self.0.viscosity()
        }
        fn specific_heat(&self) -> Result<f64, PropertyError> {
            self.0.specific_heat()
        }
        fn thermal_conductivity(&self) -> Result<f64, PropertyError> {
            self.0.thermal_conductivity()
        }
        fn enthalpy(&self) -> Result<f64, PropertyError> {
            self.0.enthalpy()
        }
        fn entropy(&self) -> Result<f64, PropertyError> {
            Ok(0.0)
        }
        fn sound_speed(&self) -> Result<f64, PropertyError> {
            self.0.sound_speed()
        }
        fn mean_free_path(&self) -> Result<f64, PropertyError> {
            self.0.mean_free_path()
        }
        fn species_mass_fractions(&self) -> Result<(Vec<String>, Vec<f64>), PropertyError> {
            self.0.species_mass_fractions()
        }
    }

    #[test]
    fn exact_root_converges_at_first_iteration() {
        // Cp = 1000, u = 100: T_t = T + 5 exactly
        let gas = IdealGasMixture::new(
            "test",
            250.0,
            1000.0,
            (1.716e-5, 273.15, 110.4),
            0.71,
            vec![("X", 1.0)],
        );
        let mut gas = FlatEntropyGas(gas);
        let probe = probe(HeatFluxLaw::FayRiddell, BarkerType::None);
        let root = CaseState {
            T: 5000.0,
            u: 100.0,
            T_t: 5005.0,
            P_t: 5040.0,
        };
        let q = FayRiddell
            .heat_flux(&mut gas, &probe, root.P_t, root.T_t, root.u)
            .unwrap()
            .q;
        let targets = CaseTargets {
            P: P_STATIC,
            P_dyn: 40.0,
            P_stag: 5040.0,
            q_target: q,
        };
        let settings = SolverSettings::default();
        let mut model = HeatFluxModel::for_case(probe.hf_law, &settings);
        let mut rng = StdRng::seed_from_u64(0);
        let report = solve(
            &mut gas, &mut model, &probe, &targets, &settings, root, &mut rng,
        )
        .unwrap();
        assert_eq!(report.status, NewtonStatus::Converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.cnv, 1.0);
        assert_eq!(report.residual_norm, 0.0);
        assert_eq!(report.state, root);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let probe = probe(HeatFluxLaw::FayRiddell, BarkerType::None);
        let mut air = IdealGasMixture::air();
        let (_, targets) = synthetic_targets(&mut air, &mut FayRiddell, &probe);
        let settings = SolverSettings {
            max_newton_iter: 2,
            ..SolverSettings::default()
        };
        let mut model = HeatFluxModel::for_case(probe.hf_law, &settings);
        let mut rng = StdRng::seed_from_u64(0);
        let report = solve(
            &mut air,
            &mut model,
            &probe,
            &targets,
            &settings,
            guess(targets.P_stag),
            &mut rng,
        )
        .unwrap();
        assert_eq!(report.status, NewtonStatus::MaxIterations);
        assert_eq!(report.iterations, 2);
        assert!(report.cnv < 1.0);
    }

    #[test]
    fn boundary_layer_failure_fails_the_case() {
        let probe = probe(HeatFluxLaw::Exact, BarkerType::None);
        let mut air = IdealGasMixture::air();
        let settings = SolverSettings {
            max_T_relax: 3000.0,
            ..SolverSettings::default()
        };
        let targets = CaseTargets {
            P: P_STATIC,
            P_dyn: 40.0,
            P_stag: 5040.0,
            q_target: 3.0e5,
        };
        let mut model = HeatFluxModel::for_case(probe.hf_law, &settings);
        let mut rng = StdRng::seed_from_u64(0);
        let r = solve(
            &mut air,
            &mut model,
            &probe,
            &targets,
            &settings,
            guess(5040.0),
            &mut rng,
        );
        assert!(matches!(
            r,
            Err(NewtonError::HeatFlux(HeatFluxError::DomainViolation { .. }))
        ));
    }

    /// Air that refuses one static temperature and counts the refusals.
    struct FailsAtTemperature {
        gas: IdealGasMixture,
        T_fail: f64,
        failures: usize,
    }

    impl FailsAtTemperature {
        fn new(T_fail: f64) -> Self {
            Self {
                gas: IdealGasMixture::air(),
                T_fail,
                failures: 0,
            }
        }
    }

    impl Mixture for FailsAtTemperature {
        fn name(&self) -> &str {
            self.gas.name()
        }
        fn equilibrate(&mut self, T: f64, P: f64) -> Result<(), PropertyError> {
            if T == self.T_fail {
                self.failures += 1;
                return Err(PropertyError::EquilibriumFailed(format!("T = {}", T)));
            }
            self.gas.equilibrate(T, P)
        }
        fn density(&self) -> Result<f64, PropertyError> {
            self.gas.density()
        }
        fn viscosity(&self) -> Result<f64, PropertyError> {
            self.gas.viscosity()
        }
        fn specific_heat(&self) -> Result<f64, PropertyError> {
            self.gas.specific_heat()
        }
        fn thermal_conductivity(&self) -> Result<f64, PropertyError> {
            self.gas.thermal_conductivity()
        }
        fn enthalpy(&self) -> Result<f64, PropertyError> {
            self.gas.enthalpy()
        }
        fn entropy(&self) -> Result<f64, PropertyError> {
            self.gas.entropy()
        }
        fn sound_speed(&self) -> Result<f64, PropertyError> {
            self.gas.sound_speed()
        }
        fn mean_free_path(&self) -> Result<f64, PropertyError> {
            self.gas.mean_free_path()
        }
        fn species_mass_fractions(&self) -> Result<(Vec<String>, Vec<f64>), PropertyError> {
            self.gas.species_mass_fractions()
        }
    }

    const T_CAP: f64 = 6000.0;

    /// Measurements of an 8000 K stream solved with max_T_relax = 6000 K:
    /// the iterates pile up under the cap and the metric stops moving
    /// (first at iteration 6, before any random kick).
    fn capped_case() -> (ProbeConfig, CaseTargets, SolverSettings) {
        let probe = probe(HeatFluxLaw::FayRiddell, BarkerType::None);
        let mut air = IdealGasMixture::air();
        let (T, u): (f64, f64) = (8000.0, 150.0);
        let T_t = T + u * u / (2.0 * air.Cp);
        let P_t = P_STATIC * (T_t / T).powf(air.Cp / air.R);
        let q = FayRiddell
            .heat_flux(&mut air, &probe, P_t, T_t, u)
            .unwrap()
            .q;
        let targets = CaseTargets {
            P: P_STATIC,
            P_dyn: P_t - P_STATIC,
            P_stag: P_t,
            q_target: q,
        };
        let settings = SolverSettings {
            max_T_relax: T_CAP,
            max_newton_iter: 30,
            ..SolverSettings::default()
        };
        (probe, targets, settings)
    }

    fn solve_capped(
        mixture: &mut dyn Mixture,
        settings: &SolverSettings,
        seed: u64,
    ) -> Result<NewtonReport, NewtonError> {
        let (probe, targets, _) = capped_case();
        let mut model = HeatFluxModel::for_case(probe.hf_law, settings);
        let mut rng = StdRng::seed_from_u64(seed);
        solve(
            mixture,
            &mut model,
            &probe,
            &targets,
            settings,
            guess(targets.P_stag),
            &mut rng,
        )
    }

    #[test]
    fn stall_grows_jacobian_step_and_kicks_the_state() {
        let (_, _, settings) = capped_case();
        let settings = SolverSettings {
            max_newton_iter: 6,
            ..settings
        };
        for seed in [0, 5, 17] {
            let mut air = IdealGasMixture::air();
            let report = solve_capped(&mut air, &settings, seed).unwrap();
            assert_eq!(report.status, NewtonStatus::MaxIterations);
            assert_eq!(report.iterations, 6);
            assert_eq!(report.jac_diff, 4.0 * settings.jac_diff);
            // without the kick the metric would sit near 0.607; the reported
            // value is the residual of the kicked state
            assert!(report.cnv > 0.62, "cnv {}", report.cnv);
        }
    }

    #[test]
    fn stabilised_run_is_reproducible_for_a_seed() {
        let (_, _, settings) = capped_case();
        let mut air = IdealGasMixture::air();
        let first = solve_capped(&mut air, &settings, 11).unwrap();
        let mut air = IdealGasMixture::air();
        let second = solve_capped(&mut air, &settings, 11).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.status, NewtonStatus::MaxIterations);
        assert!(first.jac_diff > settings.jac_diff);
        assert!(first.jac_diff <= JAC_DIFF_MAX);
        assert!(first.state.T <= T_CAP && first.state.T_t <= T_CAP);
        assert!(first.state.T_t >= 350.0);
    }

    #[test]
    fn failed_kick_is_dropped_without_failing_the_case() {
        let (_, _, settings) = capped_case();
        let mut refused = 0;
        for seed in 0..8 {
            // a kick pushing T over the cap is clamped to exactly T_CAP
            let mut gas = FailsAtTemperature::new(T_CAP);
            let report = solve_capped(&mut gas, &settings, seed).unwrap();
            assert!(report.jac_diff > settings.jac_diff);
            assert!(report.state.T < T_CAP);
            refused += gas.failures;
        }
        assert!(refused > 0);
    }

    fn synthetic_case(comment: &str) -> CaseConfig {
        let probe = probe(HeatFluxLaw::FayRiddell, BarkerType::None);
        let mut air = IdealGasMixture::air();
        let (_, targets) = synthetic_targets(&mut air, &mut FayRiddell, &probe);
        CaseConfig {
            inputs: CaseInputs {
                comment: comment.to_string(),
                P: targets.P,
                P_dyn: None,
                P_stag: Some(targets.P_stag),
                q_target: targets.q_target,
                mixture_name: "air".to_string(),
            },
            initial: InitialConditions {
                T_0: 4000.0,
                T_t0: 4000.0,
                u_0: 100.0,
                P_t0: 0.0,
            },
            probe: ProbeSettings {
                T_w: probe.T_w,
                R_p: probe.R_p,
                R_m: probe.R_m,
                R_j: probe.R_j,
                stag_type: StagnationType::Flat,
                hf_law: HeatFluxLaw::FayRiddell,
                barker_type: BarkerType::None,
            },
            settings: SolverSettings::default(),
        }
    }

    #[test]
    fn solved_case_reports_output_properties() {
        let case = synthetic_case("synthetic");
        let mut air = IdealGasMixture::air();
        let outcome = solve_case(&case, &mut air);
        assert_eq!(outcome.status, CaseStatus::Converged);
        assert_eq!(outcome.warnings_string(), "None");
        let p = &outcome.properties;
        assert_relative_eq!(p.T, T_TRUE, max_relative = 1e-5);
        assert_relative_eq!(p.u, U_TRUE, max_relative = 1e-5);
        assert_relative_eq!(p.rho, P_STATIC / (air.R * p.T), max_relative = 1e-12);
        assert_relative_eq!(p.M, p.u / p.a, max_relative = 1e-12);
        assert!(p.M < 1.0);
        assert_relative_eq!(p.h_t, p.h + 0.5 * p.u * p.u, max_relative = 1e-12);
        assert_relative_eq!(p.Kn, p.mfp / 0.05, max_relative = 1e-12);
        assert_eq!(p.P_b, p.P_t);
        assert_eq!(p.species_names.len(), 2);
        outcome.table();
    }

    #[test]
    fn failed_cases_do_not_affect_the_run() {
        let good = synthetic_case("first");
        let mut bad_input = synthetic_case("bad input");
        bad_input.inputs.P_stag = None;
        let mut bad_gas = synthetic_case("bad gas");
        bad_gas.inputs.mixture_name = "unobtainium".to_string();
        let mut bad_start = synthetic_case("bad start");
        bad_start.initial.T_t0 = 300.0;
        let mut bad_run = synthetic_case("bad run");
        bad_run.inputs.mixture_name = "faulty air".to_string();
        let last = synthetic_case("last");

        let mut factory = |name: &str| -> Result<Box<dyn Mixture>, PropertyError> {
            if name == "faulty air" {
                Ok(Box::new(FailsAtTemperature::new(4000.0)))
            } else {
                ideal_gas_factory(name)
            }
        };
        let cases = vec![good, bad_input, bad_gas, bad_start, bad_run, last];
        let outcomes = run_cases(&cases, &mut factory);
        let statuses: Vec<CaseStatus> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                CaseStatus::Converged,
                CaseStatus::InvalidInput,
                CaseStatus::InvalidInput,
                CaseStatus::InvalidInput,
                CaseStatus::ComputationError,
                CaseStatus::Converged,
            ]
        );
        for failed in &outcomes[1..5] {
            assert_eq!(failed.properties.T, SENTINEL);
            assert_eq!(failed.properties.Re, SENTINEL);
            assert_ne!(failed.warnings_string(), "None");
        }
        assert_eq!(outcomes[0].properties, outcomes[5].properties);
    }
}
