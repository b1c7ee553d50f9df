use std::path::PathBuf;

use crate::error::SeirdError;
use crate::log::{set_log_level, LevelFilter};
use crate::parameters::Scenario;
use crate::presets;
use crate::report::{write_csv_file, Summary};
use crate::simulator::{Simulator, Trajectory};
use crate::solver::{DormandPrince, RungeKutta4};
use clap::{Args, Command, FromArgMatches as _, ValueEnum};
use log::info;

/// Integration method used by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SolverKind {
    /// Fixed-step classical Runge-Kutta
    #[default]
    Rk4,
    /// Adaptive Dormand-Prince 5(4)
    Dopri5,
}

/// Default cli arguments for a simulation run
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Name of a built-in scenario; `covid19-seird` if neither this nor `--config` is given
    #[arg(short, long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// Optional path to a JSON scenario file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional path for the per-day CSV report
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Integration method
    #[arg(short, long, value_enum, default_value_t = SolverKind::Rk4)]
    pub solver: SolverKind,

    /// Override the number of days to simulate
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Enable logging at this level (error, warn, info, debug, trace)
    #[arg(short, long, value_parser = parse_level)]
    pub log_level: Option<LevelFilter>,
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level '{level}'"))
}

impl RunArgs {
    /// The scenario selected by `--config` or `--preset`.
    ///
    /// # Errors
    /// Propagates failures to read or parse the scenario file, or an unknown preset name.
    pub fn scenario(&self) -> Result<Scenario, SeirdError> {
        let mut scenario = match (&self.config, &self.preset) {
            (Some(path), _) => {
                info!("Loading scenario from: {}", path.display());
                Scenario::from_json_file(path)?
            }
            (None, Some(name)) => presets::by_name(name)?,
            (None, None) => presets::covid19_seird(),
        };
        if let Some(days) = self.days {
            scenario.days_to_simulate = days;
        }
        Ok(scenario)
    }

    #[must_use]
    pub fn simulator(&self) -> Simulator {
        match self.solver {
            SolverKind::Rk4 => Simulator::new(RungeKutta4::default()),
            SolverKind::Dopri5 => Simulator::new(DormandPrince::default()),
        }
    }
}

fn create_seird_cli() -> Command {
    let cli = Command::new("seird").about("Deterministic SEIRD outbreak simulation");
    RunArgs::augment_args(cli)
}

/// Parses the process arguments, runs the simulation and prints the final-day summary.
///
/// # Errors
/// Returns an error if argument parsing or the run fails.
pub fn run() -> Result<Trajectory, Box<dyn std::error::Error>> {
    let matches = create_seird_cli().get_matches();
    let args = RunArgs::from_arg_matches(&matches)?;
    let (scenario, trajectory) = run_with_args(&args)?;

    println!("Scenario: {}", scenario.name);
    if let Some(summary) = Summary::from_trajectory(&trajectory) {
        println!("{summary}");
    }
    Ok(trajectory)
}

/// Configures logging, solves the selected scenario and writes the CSV report if requested.
///
/// # Errors
/// Any error from loading the scenario, solving it, or writing the report.
pub fn run_with_args(args: &RunArgs) -> Result<(Scenario, Trajectory), SeirdError> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let scenario = args.scenario()?;
    let trajectory = args.simulator().solve_scenario(&scenario)?;

    if let Some(path) = &args.output {
        write_csv_file(&trajectory, path)?;
        info!("Wrote {} days to {}", trajectory.len(), path.display());
    }
    Ok((scenario, trajectory))
}
