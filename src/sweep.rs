//! Runs independent scenarios concurrently, one thread per scenario.

use crate::error::SeirdError;
use crate::parameters::Scenario;
use crate::simulator::{Simulator, Trajectory};
use log::debug;
use std::thread;

/// Solves every scenario on its own scoped thread, sharing `simulator` and its solver.
///
/// Each thread builds its own model and run state, so scenarios cannot affect each other.
/// Results come back in the order of `scenarios`; a failure in one scenario does not stop the
/// others.
pub fn sweep(scenarios: &[Scenario], simulator: &Simulator) -> Vec<Result<Trajectory, SeirdError>> {
    thread::scope(|scope| {
        let handles: Vec<_> = scenarios
            .iter()
            .map(|scenario| {
                scope.spawn(move || {
                    debug!("sweep: starting scenario {}", scenario.name);
                    simulator.solve_scenario(scenario)
                })
            })
            .collect();

        handles
            .into_iter()
            .zip(scenarios)
            .map(|(handle, scenario)| {
                handle.join().unwrap_or_else(|_| {
                    Err(SeirdError::integration(format!(
                        "worker for scenario {} panicked",
                        scenario.name
                    )))
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use crate::solver::DormandPrince;

    #[test]
    fn results_follow_input_order() {
        let mut short = presets::covid19_seird();
        short.name = "short".to_string();
        short.days_to_simulate = 10;
        let scenarios = vec![presets::covid19_seird(), presets::covid19_seirdp(), short];

        let results = sweep(&scenarios, &Simulator::default());
        let lengths: Vec<usize> = results.iter().map(|r| r.as_ref().unwrap().len()).collect();
        assert_eq!(lengths, [150, 100, 10]);
    }

    #[test]
    fn matches_sequential_runs() {
        let scenarios = vec![presets::covid19_seird(), presets::covid19_seirdp()];
        let simulator = Simulator::new(DormandPrince::default());
        let results = sweep(&scenarios, &simulator);
        for (scenario, result) in scenarios.iter().zip(results) {
            let sequential = simulator.solve_scenario(scenario).unwrap();
            assert_eq!(result.unwrap(), sequential);
        }
    }

    #[test]
    fn one_failure_does_not_stop_the_rest() {
        let mut broken = presets::covid19_seird();
        broken.parameters.gamma = -1.0;
        let scenarios = vec![broken, presets::covid19_seird()];

        let results = sweep(&scenarios, &Simulator::default());
        assert!(matches!(results[0], Err(SeirdError::InvalidParameter(_))));
        assert!(results[1].is_ok());
    }

    #[test]
    fn empty_sweep() {
        assert!(sweep(&[], &Simulator::default()).is_empty());
    }
}
