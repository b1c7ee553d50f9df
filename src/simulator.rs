//! Turns a model, initial conditions and a horizon into daily trajectories.
//!
//! The simulator integrates one day at a time. Between days it checks the intervention
//! threshold so the activation day can be pulled forward, keeping the running minimum so it never
//! moves later once triggered. Each call owns its own run state; nothing persists between calls.

use crate::compartment::{Compartment, CompartmentState, STATE_LEN};
use crate::error::SeirdError;
use crate::model::{ActivationNotice, EpidemicModel};
use crate::parameters::{InterventionPolicy, Scenario};
use crate::solver::{OdeSolver, RungeKutta4};
use log::{debug, trace};

/// Daily compartment counts produced by [`Simulator::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// The day grid `0..days_to_simulate`.
    pub days: Vec<u32>,
    /// One state per entry of `days`.
    pub states: Vec<CompartmentState>,
    /// The activation day actually used, after any pull-forward.
    pub activation_day: u32,
    /// The simulated time at which the transmission rate first used the post-activation branch,
    /// if it did within the horizon.
    pub countermeasures_observed_at: Option<f64>,
    pub population_size: f64,
    /// The compartments the model populates.
    pub compartments: &'static [Compartment],
}

impl Trajectory {
    /// The values of one compartment over the whole run.
    #[must_use]
    pub fn column(&self, compartment: Compartment) -> Vec<f64> {
        self.states
            .iter()
            .map(|state| state.get(compartment))
            .collect()
    }

    /// The values of one compartment as a percentage of the initial population.
    #[must_use]
    pub fn percent_of_population(&self, compartment: Compartment) -> Vec<f64> {
        self.states
            .iter()
            .map(|state| state.get(compartment) / self.population_size * 100.0)
            .collect()
    }

    /// The state on the last simulated day.
    #[must_use]
    pub fn last(&self) -> Option<&CompartmentState> {
        self.states.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Drives an [`OdeSolver`] over a model.
#[derive(Debug)]
pub struct Simulator {
    solver: Box<dyn OdeSolver>,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new(RungeKutta4::default())
    }
}

impl Simulator {
    pub fn new<S: OdeSolver + 'static>(solver: S) -> Self {
        Simulator {
            solver: Box::new(solver),
        }
    }

    pub fn from_boxed(solver: Box<dyn OdeSolver>) -> Self {
        Simulator { solver }
    }

    #[must_use]
    pub fn solver(&self) -> &dyn OdeSolver {
        self.solver.as_ref()
    }

    /// Integrates `model` from `(N - E0, E0, 0, 0, 0, 0)` over `days_to_simulate` days.
    ///
    /// # Errors
    /// `InvalidParameter` if `days_to_simulate` is zero, `population_size` is not positive, or
    /// `initial_exposed` is outside `[0, population_size]`. `IntegrationError` if the solver
    /// fails or produces non-finite values.
    pub fn solve(
        &self,
        model: &EpidemicModel,
        population_size: f64,
        initial_exposed: f64,
        policy: &InterventionPolicy,
        days_to_simulate: u32,
    ) -> Result<Trajectory, SeirdError> {
        validate_run(population_size, initial_exposed, days_to_simulate)?;
        policy.validate()?;

        debug!(
            "solving {days_to_simulate} days for N={population_size}, E0={initial_exposed} with {}",
            self.solver.name()
        );

        let days: Vec<u32> = (0..days_to_simulate).collect();
        let mut states = Vec::with_capacity(days.len());

        let initial = CompartmentState::initial(population_size, initial_exposed);
        let mut activation_day = model.resolve_activation_day(0, initial.affected(), policy);
        let mut notice = ActivationNotice::new();
        let mut y = initial.to_array();
        states.push(initial);

        for day in 1..days_to_simulate {
            let activation = f64::from(activation_day);
            let mut rhs = |t: f64, y: &[f64], dy: &mut [f64]| {
                notice.observe(t, activation);
                let state = CompartmentState::from_slice(y);
                let delta = model.derivative(&state, t, population_size, activation);
                dy[..STATE_LEN].copy_from_slice(&delta.to_array());
            };
            self.solver
                .integrate(&mut rhs, f64::from(day - 1), f64::from(day), &mut y)?;

            let state = CompartmentState::from_array(y);
            if !state.is_finite() {
                return Err(SeirdError::integration(format!(
                    "non-finite state on day {day}: {state:?}"
                )));
            }
            trace!("day {day}: {state:?}");

            let resolved = model.resolve_activation_day(day, state.affected(), policy);
            if resolved < activation_day {
                debug!(
                    "affected population {} exceeded threshold on day {day}, activation moved from day {activation_day}",
                    state.affected()
                );
                activation_day = resolved;
            }
            states.push(state);
        }

        Ok(Trajectory {
            days,
            states,
            activation_day,
            countermeasures_observed_at: notice.observed_at(),
            population_size,
            compartments: model.compartments(),
        })
    }

    /// Builds the model described by `scenario` and solves it.
    ///
    /// # Errors
    /// Any validation or integration error from [`EpidemicModel::new`] or [`Simulator::solve`].
    pub fn solve_scenario(&self, scenario: &Scenario) -> Result<Trajectory, SeirdError> {
        let model = EpidemicModel::new(scenario.parameters.clone())?;
        self.solve(
            &model,
            scenario.population_size,
            scenario.initial_exposed,
            &scenario.policy,
            scenario.days_to_simulate,
        )
    }
}

fn validate_run(
    population_size: f64,
    initial_exposed: f64,
    days_to_simulate: u32,
) -> Result<(), SeirdError> {
    if days_to_simulate == 0 {
        return Err(SeirdError::invalid("days_to_simulate must be positive"));
    }
    if !(population_size > 0.0 && population_size.is_finite()) {
        return Err(SeirdError::invalid(format!(
            "population_size must be positive, got {population_size}"
        )));
    }
    if !(0.0..=population_size).contains(&initial_exposed) {
        return Err(SeirdError::invalid(format!(
            "initial_exposed must be in [0, {population_size}], got {initial_exposed}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment::SEIRD;
    use crate::parameters::{FatalityRho, ModelParameters, VitalRates};
    use crate::presets;
    use crate::rates;
    use crate::solver::DormandPrince;
    use approx::assert_relative_eq;

    fn end_to_end() -> Scenario {
        presets::covid19_seird()
    }

    fn model(scenario: &Scenario) -> EpidemicModel {
        EpidemicModel::new(scenario.parameters.clone()).unwrap()
    }

    #[test]
    fn population_is_conserved() {
        let scenario = end_to_end();
        let trajectory = Simulator::default().solve_scenario(&scenario).unwrap();
        for state in &trajectory.states {
            assert_relative_eq!(
                state.disease_total(),
                scenario.population_size,
                max_relative = 1e-6
            );
        }
    }

    /// A fast epidemic with a load term strong enough to push the fatality rate past one.
    fn overloaded() -> Scenario {
        let mut scenario = end_to_end();
        scenario.parameters.r0 = 4.0;
        scenario.parameters.disease_scaling_factor = 100.0;
        scenario
    }

    #[test]
    fn population_is_conserved_by_both_solvers_under_clamped_fatality() {
        let scenario = overloaded();
        let model = model(&scenario);
        let simulators = [
            Simulator::default(),
            Simulator::new(DormandPrince::default()),
        ];
        for simulator in &simulators {
            let trajectory = simulator.solve_scenario(&scenario).unwrap();
            let peak_raw_alpha = trajectory
                .states
                .iter()
                .map(|state| rates::raw_fatality_rate(state.i, 10_000.0, 0.07, 100.0))
                .fold(0.0, f64::max);
            assert!(peak_raw_alpha > 1.0, "peak raw alpha {peak_raw_alpha}");
            assert!(trajectory
                .states
                .iter()
                .all(|state| model.fatality_rate(state.i, 10_000.0) <= 1.0));

            for state in &trajectory.states {
                assert_relative_eq!(
                    state.disease_total(),
                    scenario.population_size,
                    max_relative = 1e-6
                );
            }
        }
    }

    #[test]
    fn population_is_conserved_by_dormand_prince() {
        let scenario = end_to_end();
        let trajectory = Simulator::new(DormandPrince::default())
            .solve_scenario(&scenario)
            .unwrap();
        for state in &trajectory.states {
            assert_relative_eq!(
                state.disease_total(),
                scenario.population_size,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn end_to_end_epidemic_takes_hold() {
        let scenario = end_to_end();
        let trajectory = Simulator::default().solve_scenario(&scenario).unwrap();
        assert_eq!(trajectory.len(), 150);
        assert_eq!(trajectory.days, (0..150).collect::<Vec<u32>>());

        let s = trajectory.column(Compartment::Susceptible);
        let d = trajectory.column(Compartment::Dead);
        for pair in s.windows(2) {
            assert!(pair[1] <= pair[0], "S increased: {pair:?}");
        }
        for pair in d.windows(2) {
            assert!(pair[1] >= pair[0], "D decreased: {pair:?}");
        }
        assert!(s[149] < scenario.population_size);
        assert_eq!(trajectory.activation_day, 57);
        assert!(trajectory.countermeasures_observed_at.is_some());
        assert_eq!(trajectory.compartments, &SEIRD[..]);
    }

    #[test]
    fn no_seed_means_no_epidemic() {
        let scenario = end_to_end();
        let trajectory = Simulator::default()
            .solve(
                &model(&scenario),
                scenario.population_size,
                0.0,
                &scenario.policy,
                scenario.days_to_simulate,
            )
            .unwrap();
        for compartment in [
            Compartment::Exposed,
            Compartment::Infectious,
            Compartment::Recovered,
            Compartment::Dead,
        ] {
            assert!(trajectory.column(compartment).iter().all(|v| *v == 0.0));
        }
        assert!(trajectory
            .column(Compartment::Susceptible)
            .iter()
            .all(|v| *v == scenario.population_size));
    }

    #[test]
    fn single_day_is_the_initial_condition() {
        let scenario = end_to_end();
        let trajectory = Simulator::default()
            .solve(&model(&scenario), 10_000.0, 1.0, &scenario.policy, 1)
            .unwrap();
        assert_eq!(trajectory.days, vec![0]);
        assert_eq!(
            trajectory.states,
            vec![CompartmentState::initial(10_000.0, 1.0)]
        );
        assert!(trajectory.countermeasures_observed_at.is_none());
    }

    #[test]
    fn threshold_pulls_activation_forward() {
        let scenario = end_to_end();
        let model = model(&scenario);
        let simulator = Simulator::default();

        // Before the intervention the two runs are identical, so the crossing day of the
        // unthresholded run is the day the thresholded run must activate on.
        let baseline = simulator
            .solve(&model, 10_000.0, 1.0, &InterventionPolicy::on_day(57), 150)
            .unwrap();
        let crossing = baseline
            .states
            .iter()
            .position(|state| state.affected() > 200.0)
            .unwrap();
        let crossing = u32::try_from(crossing).unwrap();
        assert!(crossing < 57, "crossing on day {crossing}");

        let policy = InterventionPolicy::on_day(57).with_threshold_count(200.0);
        let trajectory = simulator
            .solve(&model, 10_000.0, 1.0, &policy, 150)
            .unwrap();
        assert_eq!(trajectory.activation_day, crossing);

        let index = crossing as usize;
        assert_eq!(trajectory.states[..=index], baseline.states[..=index]);
        // Distancing starts earlier, so fewer people are eventually infected.
        assert!(trajectory.states[149].s > baseline.states[149].s);
    }

    #[test]
    fn threshold_never_delays_activation() {
        let scenario = end_to_end();
        let policy = InterventionPolicy::on_day(20).with_threshold_count(1e9);
        let trajectory = Simulator::default()
            .solve(&model(&scenario), 10_000.0, 1.0, &policy, 60)
            .unwrap();
        assert_eq!(trajectory.activation_day, 20);
    }

    #[test]
    fn solvers_agree() {
        let scenario = end_to_end();
        let rk4 = Simulator::default().solve_scenario(&scenario).unwrap();
        let dopri = Simulator::new(DormandPrince::default())
            .solve_scenario(&scenario)
            .unwrap();
        // E and I are nearly extinct by the last day, so compare the large compartments.
        for compartment in [
            Compartment::Susceptible,
            Compartment::Recovered,
            Compartment::Dead,
        ] {
            let a = rk4.last().unwrap().get(compartment);
            let b = dopri.last().unwrap().get(compartment);
            assert_relative_eq!(a, b, max_relative = 1e-3);
        }
    }

    #[test]
    fn vital_rates_fill_the_passed_away_pool() {
        let scenario = presets::covid19_seirdp();
        let trajectory = Simulator::default().solve_scenario(&scenario).unwrap();
        assert_eq!(trajectory.compartments.len(), 6);
        let p = trajectory.column(Compartment::PassedAway);
        assert_eq!(p[0], 0.0);
        assert!(p.last().copied().unwrap() > 0.0);
        assert!(p.windows(2).all(|pair| pair[1] >= pair[0]));
    }

    #[test]
    fn percent_of_population() {
        let scenario = end_to_end();
        let trajectory = Simulator::default()
            .solve(&model(&scenario), 10_000.0, 100.0, &scenario.policy, 2)
            .unwrap();
        let exposed = trajectory.percent_of_population(Compartment::Exposed);
        assert_relative_eq!(exposed[0], 1.0);
    }

    #[test]
    fn run_bounds_are_validated() {
        let scenario = end_to_end();
        let model = model(&scenario);
        let simulator = Simulator::default();
        let policy = scenario.policy;
        let cases = [
            (10_000.0, 1.0, 0),
            (0.0, 0.0, 10),
            (-5.0, 0.0, 10),
            (f64::NAN, 0.0, 10),
            (10_000.0, -1.0, 10),
            (10_000.0, 10_001.0, 10),
        ];
        for (population, exposed, days) in cases {
            let result = simulator.solve(&model, population, exposed, &policy, days);
            assert!(
                matches!(result, Err(SeirdError::InvalidParameter(_))),
                "N={population}, E0={exposed}, days={days}"
            );
        }
    }

    #[test]
    fn whole_population_exposed_is_allowed() {
        let rho = FatalityRho::Average(0.8);
        let parameters = ModelParameters::new(2.5, 1.5, 0.25, 0.4, 0.07, rho)
            .with_vital_rates(VitalRates::from_annual(0.0, 0.0));
        let model = EpidemicModel::new(parameters).unwrap();
        let trajectory = Simulator::default()
            .solve(&model, 100.0, 100.0, &InterventionPolicy::on_day(5), 10)
            .unwrap();
        assert_eq!(trajectory.states[0].s, 0.0);
        assert_relative_eq!(
            trajectory.last().unwrap().total(),
            100.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn divergent_solver_is_an_integration_error() {
        let scenario = end_to_end();
        let simulator = Simulator::new(DormandPrince {
            max_steps: 1,
            initial_step: 1e-6,
            ..DormandPrince::default()
        });
        let result = simulator.solve_scenario(&scenario);
        assert!(matches!(result, Err(SeirdError::IntegrationError(_))));
    }
}
