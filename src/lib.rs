//! Deterministic simulation of an outbreak in a closed population
//!
//! The model is a compartmental SEIRD system: Susceptible, Exposed, Infectious, Recovered and
//! Dead, with an optional sixth pool for deaths of other causes when births and natural deaths
//! are modeled. Two features set it apart from a textbook SEIRD:
//! * The transmission rate transitions smoothly from a pre-intervention reproduction number to a
//!   post-intervention one around an activation day, which can be pulled forward when the
//!   affected population crosses a threshold.
//! * The disease fatality rate grows with the number of infectious people, modeling a strained
//!   health system.
//!
//! A run is described by a [`Scenario`], either one of the [`presets`] or loaded from JSON, and
//! solved by a [`Simulator`] wrapping an [`OdeSolver`]:
//!
//! ```rust
//! use seird::{presets, Compartment, Simulator};
//!
//! let trajectory = Simulator::default()
//!     .solve_scenario(&presets::covid19_seird())
//!     .unwrap();
//! let susceptible = trajectory.column(Compartment::Susceptible);
//! assert!(susceptible[149] < susceptible[0]);
//! ```
pub mod compartment;
pub mod error;
pub mod log;
pub mod macros;
pub mod model;
pub mod numeric;
pub mod parameters;
pub mod presets;
pub mod rates;
pub mod report;
pub mod runner;
pub mod simulator;
pub mod solver;
pub mod sweep;

pub use compartment::{Compartment, CompartmentState};
pub use error::SeirdError;
pub use model::{ActivationNotice, EpidemicModel};
pub use parameters::{
    AgeBand, FatalityRho, InterventionPolicy, ModelParameters, Scenario, VitalRates,
};
pub use report::{write_csv, Summary};
pub use simulator::{Simulator, Trajectory};
pub use solver::{DormandPrince, OdeSolver, RungeKutta4};
pub use sweep::sweep;
