//! The compartments of the model and the per-day state vector.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Number of entries in a [`CompartmentState`].
pub const STATE_LEN: usize = 6;

/// A mutually exclusive sub-population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Compartment {
    #[strum(serialize = "S")]
    Susceptible,
    #[strum(serialize = "E")]
    Exposed,
    #[strum(serialize = "I")]
    Infectious,
    #[strum(serialize = "R")]
    Recovered,
    /// Deaths caused by the disease.
    #[strum(serialize = "D")]
    Dead,
    /// Deaths of other causes; only populated when vital rates are configured.
    #[strum(serialize = "P")]
    PassedAway,
}

/// The disease compartments, without the deaths-of-other-causes pool.
pub const SEIRD: [Compartment; 5] = [
    Compartment::Susceptible,
    Compartment::Exposed,
    Compartment::Infectious,
    Compartment::Recovered,
    Compartment::Dead,
];

/// All six compartments, used when vital rates are configured.
pub const SEIRDP: [Compartment; 6] = [
    Compartment::Susceptible,
    Compartment::Exposed,
    Compartment::Infectious,
    Compartment::Recovered,
    Compartment::Dead,
    Compartment::PassedAway,
];

impl Compartment {
    /// Position of this compartment in the state vector.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human readable label used in summaries.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Compartment::Susceptible => "Susceptible",
            Compartment::Exposed => "Exposed",
            Compartment::Infectious => "Infected",
            Compartment::Recovered => "Recovered",
            Compartment::Dead => "Dead due to Disease",
            Compartment::PassedAway => "Dead due to natural causes",
        }
    }
}

/// Population counts for one simulated day, ordered `S, E, I, R, D, P`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompartmentState {
    pub s: f64,
    pub e: f64,
    pub i: f64,
    pub r: f64,
    pub d: f64,
    pub p: f64,
}

impl CompartmentState {
    /// The day-zero state: everyone susceptible except `initial_exposed`.
    #[must_use]
    pub fn initial(population_size: f64, initial_exposed: f64) -> Self {
        CompartmentState {
            s: population_size - initial_exposed,
            e: initial_exposed,
            ..CompartmentState::default()
        }
    }

    #[must_use]
    pub fn from_array(values: [f64; STATE_LEN]) -> Self {
        let [s, e, i, r, d, p] = values;
        CompartmentState { s, e, i, r, d, p }
    }

    /// Reads the first [`STATE_LEN`] entries of a solver buffer.
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Self {
        let mut array = [0.0; STATE_LEN];
        array.copy_from_slice(&values[..STATE_LEN]);
        Self::from_array(array)
    }

    #[must_use]
    pub fn to_array(self) -> [f64; STATE_LEN] {
        [self.s, self.e, self.i, self.r, self.d, self.p]
    }

    #[must_use]
    pub fn get(&self, compartment: Compartment) -> f64 {
        match compartment {
            Compartment::Susceptible => self.s,
            Compartment::Exposed => self.e,
            Compartment::Infectious => self.i,
            Compartment::Recovered => self.r,
            Compartment::Dead => self.d,
            Compartment::PassedAway => self.p,
        }
    }

    /// Sum over every compartment, including `P`.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }

    /// Sum over the living and disease-dead compartments, `S + E + I + R + D`.
    #[must_use]
    pub fn disease_total(&self) -> f64 {
        SEIRD.iter().map(|c| self.get(*c)).sum()
    }

    /// Cumulative affected population `I + R + D`, compared against the intervention threshold.
    #[must_use]
    pub fn affected(&self) -> f64 {
        self.i + self.r + self.d
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        Compartment::iter().all(|c| self.get(c).is_finite())
    }
}
