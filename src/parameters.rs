//! Parameter records consumed by the model: disease and population parameters, the
//! social-distancing policy, and the complete scenario handed over by a parameter source.
//!
//! Every record derives `Serialize`/`Deserialize` so scenarios can be kept as JSON files:
//!
//! ```json
//! {
//!   "name": "example",
//!   "parameters": {
//!     "r0": 2.5, "r1": 1.5, "gamma": 0.263, "sigma": 0.37,
//!     "base_fatality_rate": 0.07, "fatality_rho": 0.8
//!   },
//!   "policy": { "threshold_day": 57, "threshold_infected_count": 200.0 },
//!   "population_size": 10000.0,
//!   "initial_exposed": 1.0,
//!   "days_to_simulate": 150
//! }
//! ```

use crate::error::SeirdError;
use crate::numeric::{is_probability, sums_to_one};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Used to convert annual vital rates to daily ones.
pub const DAYS_PER_YEAR: f64 = 365.0;

const DEFAULT_SOCIAL_DISTANCE_RESPONSE_FACTOR: f64 = 1.0;
const DEFAULT_DISEASE_SCALING_FACTOR: f64 = 0.1;

/// Birth and natural-death rates, per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalRates {
    pub birth_rate_daily: f64,
    pub natural_death_rate_daily: f64,
}

impl VitalRates {
    /// Converts rates given per year (e.g. `15.0 / 1000.0` births per capita) to daily rates.
    #[must_use]
    pub fn from_annual(birth_rate_annual: f64, natural_death_rate_annual: f64) -> Self {
        VitalRates {
            birth_rate_daily: birth_rate_annual / DAYS_PER_YEAR,
            natural_death_rate_daily: natural_death_rate_annual / DAYS_PER_YEAR,
        }
    }

    fn validate(&self) -> Result<(), SeirdError> {
        non_negative("birth_rate_daily", self.birth_rate_daily)?;
        non_negative("natural_death_rate_daily", self.natural_death_rate_daily)?;
        Ok(())
    }
}

/// One age band of the population with its share and disease fatality rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub label: String,
    pub population_share: f64,
    pub fatality_rate: f64,
}

impl AgeBand {
    #[must_use]
    pub fn new(label: &str, population_share: f64, fatality_rate: f64) -> Self {
        AgeBand {
            label: label.to_string(),
            population_share,
            fatality_rate,
        }
    }
}

/// The disease-specific fatality multiplier `rho`, given directly or as an age-stratified table
/// from which the population-weighted average is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FatalityRho {
    Average(f64),
    AgeStratified(Vec<AgeBand>),
}

impl FatalityRho {
    /// Resolves to the single average multiplier used by the model.
    ///
    /// # Errors
    /// `InvalidParameter` if a rate or share is outside `[0, 1]`, the table is empty, or the
    /// shares do not sum to one.
    pub fn average(&self) -> Result<f64, SeirdError> {
        match self {
            FatalityRho::Average(rho) => probability("fatality_rho", *rho),
            FatalityRho::AgeStratified(bands) => {
                if bands.is_empty() {
                    return Err(SeirdError::invalid("age-stratified fatality table is empty"));
                }
                for band in bands {
                    let label = &band.label;
                    probability(&format!("population_share[{label}]"), band.population_share)?;
                    probability(&format!("fatality_rate[{label}]"), band.fatality_rate)?;
                }
                if !sums_to_one(bands.iter().map(|band| band.population_share)) {
                    let total: f64 = bands.iter().map(|band| band.population_share).sum();
                    return Err(SeirdError::invalid(format!(
                        "age band population shares must sum to 1, got {total}"
                    )));
                }
                Ok(bands
                    .iter()
                    .map(|band| band.population_share * band.fatality_rate)
                    .sum())
            }
        }
    }
}

/// Disease and population parameters of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Reproduction number before the intervention.
    pub r0: f64,
    /// Reproduction number after the intervention.
    pub r1: f64,
    /// Recovery rate, one over the infectious duration.
    pub gamma: f64,
    /// Rate of progression from exposed to infectious.
    pub sigma: f64,
    /// Daily probability an infectious person dies under unstressed conditions.
    pub base_fatality_rate: f64,
    pub fatality_rho: FatalityRho,
    /// Steepness of the logistic transition from `r0` to `r1`.
    #[serde(default = "default_social_distance_response_factor")]
    pub social_distance_response_factor: f64,
    /// Strength of the load-dependent fatality increase.
    #[serde(default = "default_disease_scaling_factor")]
    pub disease_scaling_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vital_rates: Option<VitalRates>,
}

fn default_social_distance_response_factor() -> f64 {
    DEFAULT_SOCIAL_DISTANCE_RESPONSE_FACTOR
}

fn default_disease_scaling_factor() -> f64 {
    DEFAULT_DISEASE_SCALING_FACTOR
}

impl ModelParameters {
    /// Parameters with the default response and scaling factors and no vital rates.
    #[must_use]
    pub fn new(
        r0: f64,
        r1: f64,
        gamma: f64,
        sigma: f64,
        base_fatality_rate: f64,
        fatality_rho: FatalityRho,
    ) -> Self {
        ModelParameters {
            r0,
            r1,
            gamma,
            sigma,
            base_fatality_rate,
            fatality_rho,
            social_distance_response_factor: DEFAULT_SOCIAL_DISTANCE_RESPONSE_FACTOR,
            disease_scaling_factor: DEFAULT_DISEASE_SCALING_FACTOR,
            vital_rates: None,
        }
    }

    #[must_use]
    pub fn with_social_distance_response_factor(mut self, factor: f64) -> Self {
        self.social_distance_response_factor = factor;
        self
    }

    #[must_use]
    pub fn with_disease_scaling_factor(mut self, factor: f64) -> Self {
        self.disease_scaling_factor = factor;
        self
    }

    #[must_use]
    pub fn with_vital_rates(mut self, vital_rates: VitalRates) -> Self {
        self.vital_rates = Some(vital_rates);
        self
    }

    /// Checks every parameter and returns the resolved average fatality multiplier.
    ///
    /// # Errors
    /// `InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<f64, SeirdError> {
        positive("r0", self.r0)?;
        positive("r1", self.r1)?;
        positive("gamma", self.gamma)?;
        positive("sigma", self.sigma)?;
        probability("base_fatality_rate", self.base_fatality_rate)?;
        non_negative(
            "social_distance_response_factor",
            self.social_distance_response_factor,
        )?;
        non_negative("disease_scaling_factor", self.disease_scaling_factor)?;
        if let Some(vital_rates) = &self.vital_rates {
            vital_rates.validate()?;
        }
        self.fatality_rho.average()
    }
}

/// Progression rate from the time of symptom onset and the presymptomatic infectious period,
/// `1 / (symptom_onset - presymptomatic)`.
///
/// # Errors
/// `InvalidParameter` when the incubation window is not positive.
pub fn sigma_from_incubation(symptom_onset: f64, presymptomatic: f64) -> Result<f64, SeirdError> {
    let window = symptom_onset - presymptomatic;
    if window > 0.0 && window.is_finite() {
        Ok(1.0 / window)
    } else {
        Err(SeirdError::invalid(format!(
            "symptom onset ({symptom_onset}) must come after the presymptomatic period ({presymptomatic})"
        )))
    }
}

/// Recovery rate from the serial interval, `1 / (2 * (serial_interval - 1 / sigma))`.
///
/// # Errors
/// `InvalidParameter` when the serial interval does not exceed the latent period `1 / sigma`.
pub fn gamma_from_serial_interval(serial_interval: f64, sigma: f64) -> Result<f64, SeirdError> {
    positive("sigma", sigma)?;
    let infectious_half = serial_interval - 1.0 / sigma;
    if infectious_half > 0.0 && infectious_half.is_finite() {
        Ok(1.0 / (2.0 * infectious_half))
    } else {
        Err(SeirdError::invalid(format!(
            "serial interval ({serial_interval}) must exceed the latent period ({})",
            1.0 / sigma
        )))
    }
}

/// When social distancing begins to take effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionPolicy {
    /// The latest day the intervention starts.
    pub threshold_day: u32,
    /// If set, the intervention starts on the first day the cumulative affected population
    /// (`I + R + D`) exceeds this count, when that happens before `threshold_day`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_infected_count: Option<f64>,
}

impl InterventionPolicy {
    #[must_use]
    pub fn on_day(threshold_day: u32) -> Self {
        InterventionPolicy {
            threshold_day,
            threshold_infected_count: None,
        }
    }

    #[must_use]
    pub fn with_threshold_count(mut self, count: f64) -> Self {
        self.threshold_infected_count = Some(count);
        self
    }

    /// # Errors
    /// `InvalidParameter` if the threshold count is negative or not finite.
    pub fn validate(&self) -> Result<(), SeirdError> {
        if let Some(count) = self.threshold_infected_count {
            non_negative("threshold_infected_count", count)?;
        }
        Ok(())
    }
}

/// Everything a run needs, as supplied by a parameter source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub parameters: ModelParameters,
    pub policy: InterventionPolicy,
    pub population_size: f64,
    pub initial_exposed: f64,
    pub days_to_simulate: u32,
}

impl Scenario {
    /// # Errors
    /// `JsonError` if the text is not a valid scenario record.
    pub fn from_json_str(json: &str) -> Result<Self, SeirdError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// `IoError` if the file cannot be opened, `JsonError` if it is not a valid scenario record.
    pub fn from_json_file(path: &Path) -> Result<Self, SeirdError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// # Errors
    /// `JsonError` if serialization fails.
    pub fn to_json_string(&self) -> Result<String, SeirdError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn positive(name: &str, value: f64) -> Result<f64, SeirdError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(SeirdError::invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<f64, SeirdError> {
    if value >= 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(SeirdError::invalid(format!("{name} must be non-negative, got {value}")))
    }
}

fn probability(name: &str, value: f64) -> Result<f64, SeirdError> {
    if is_probability(value) {
        Ok(value)
    } else {
        Err(SeirdError::invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}
