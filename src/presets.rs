//! Named scenarios for a COVID-19-like outbreak in a town of 10,000 people.
//!
//! Both presets derive `sigma` from a 5.2 day symptom onset with 2.5 presymptomatic days and
//! `gamma` from a 4.6 day serial interval. They differ in their fatality tables and in whether
//! births and natural deaths are modeled.

use crate::error::SeirdError;
use crate::parameters::{
    AgeBand, FatalityRho, InterventionPolicy, ModelParameters, Scenario, VitalRates,
};

const POPULATION: f64 = 10_000.0;
const INITIAL_EXPOSED: f64 = 1.0;
const R0: f64 = 2.5;
const R1: f64 = 1.5;
const SYMPTOM_ONSET: f64 = 5.2;
const TIME_PRESYMPTOMATIC: f64 = 2.5;
const SERIAL_INTERVAL: f64 = 4.6;
const SOCIAL_DISTANCE_RESPONSE_FACTOR: f64 = 0.5;
const SOCIAL_DISTANCE_DAY: u32 = 57;
const SOCIAL_DISTANCE_THRESHOLD_POPULATION: f64 = 200.0;
const BIRTH_RATE_ANNUAL: f64 = 15.0 / 1000.0;
const NATURAL_DEATH_RATE_ANNUAL: f64 = 7.0 / 1000.0;

/// Names accepted by [`by_name`].
pub const PRESET_NAMES: [&str; 2] = ["covid19-seird", "covid19-seirdp"];

fn age_bands(fatality_rates: [f64; 5]) -> Vec<AgeBand> {
    let labels = ["0-1", "2-29", "30-59", "60-89", "89+"];
    let shares = [0.01, 0.19, 0.3, 0.3, 0.2];
    labels
        .iter()
        .zip(shares)
        .zip(fatality_rates)
        .map(|((label, share), rate)| AgeBand::new(label, share, rate))
        .collect()
}

fn rates() -> (f64, f64) {
    // The constants above keep both denominators positive.
    let sigma = 1.0 / (SYMPTOM_ONSET - TIME_PRESYMPTOMATIC);
    let gamma = 1.0 / (2.0 * (SERIAL_INTERVAL - 1.0 / sigma));
    (sigma, gamma)
}

/// SEIRD without vital rates over 150 days, distancing on day 57.
#[must_use]
pub fn covid19_seird() -> Scenario {
    let (sigma, gamma) = rates();
    let parameters = ModelParameters::new(
        R0,
        R1,
        gamma,
        sigma,
        0.07,
        FatalityRho::AgeStratified(age_bands([0.50, 0.01, 0.99, 0.99, 0.99])),
    )
    .with_social_distance_response_factor(SOCIAL_DISTANCE_RESPONSE_FACTOR);

    Scenario {
        name: PRESET_NAMES[0].to_string(),
        parameters,
        policy: InterventionPolicy::on_day(SOCIAL_DISTANCE_DAY),
        population_size: POPULATION,
        initial_exposed: INITIAL_EXPOSED,
        days_to_simulate: 150,
    }
}

/// SEIRDP with births and natural deaths over 100 days. Distancing starts on day 57 or as soon
/// as 200 people have been affected.
#[must_use]
pub fn covid19_seirdp() -> Scenario {
    let (sigma, gamma) = rates();
    let parameters = ModelParameters::new(
        R0,
        R1,
        gamma,
        sigma,
        0.1,
        FatalityRho::AgeStratified(age_bands([0.50, 0.01, 0.05, 0.20, 0.30])),
    )
    .with_social_distance_response_factor(SOCIAL_DISTANCE_RESPONSE_FACTOR)
    .with_disease_scaling_factor(0.0)
    .with_vital_rates(VitalRates::from_annual(
        BIRTH_RATE_ANNUAL,
        NATURAL_DEATH_RATE_ANNUAL,
    ));

    Scenario {
        name: PRESET_NAMES[1].to_string(),
        parameters,
        policy: InterventionPolicy::on_day(SOCIAL_DISTANCE_DAY)
            .with_threshold_count(SOCIAL_DISTANCE_THRESHOLD_POPULATION),
        population_size: POPULATION,
        initial_exposed: INITIAL_EXPOSED,
        days_to_simulate: 100,
    }
}

/// Looks up a preset by name.
///
/// # Errors
/// `InvalidParameter` listing the known names if `name` is not one of them.
pub fn by_name(name: &str) -> Result<Scenario, SeirdError> {
    match name {
        "covid19-seird" => Ok(covid19_seird()),
        "covid19-seirdp" => Ok(covid19_seirdp()),
        _ => Err(SeirdError::invalid(format!(
            "unknown preset '{name}', expected one of {PRESET_NAMES:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use crate::model::EpidemicModel;
    use crate::parameters::{gamma_from_serial_interval, sigma_from_incubation};

    #[test]
    fn presets_are_valid() {
        for name in PRESET_NAMES {
            let scenario = by_name(name).unwrap();
            assert_eq!(scenario.name, name);
            assert!(EpidemicModel::new(scenario.parameters).is_ok());
        }
    }

    #[test]
    fn unknown_preset() {
        assert!(matches!(
            by_name("measles"),
            Err(SeirdError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rates_match_helpers() {
        let (sigma, gamma) = rates();
        let checked_sigma = sigma_from_incubation(SYMPTOM_ONSET, TIME_PRESYMPTOMATIC).unwrap();
        let checked_gamma = gamma_from_serial_interval(SERIAL_INTERVAL, checked_sigma).unwrap();
        assert_almost_eq!(sigma, checked_sigma, 1e-15);
        assert_almost_eq!(gamma, checked_gamma, 1e-15);
    }

    #[test]
    fn seird_average_fatality() {
        let model = EpidemicModel::new(covid19_seird().parameters).unwrap();
        assert_almost_eq!(model.rho(), 0.7989, 1e-12);
    }

    #[test]
    fn seirdp_has_daily_vital_rates() {
        let scenario = covid19_seirdp();
        let vital = scenario.parameters.vital_rates.unwrap();
        assert_almost_eq!(vital.birth_rate_daily, 0.015 / 365.0, 1e-15);
        assert_eq!(scenario.policy.threshold_infected_count, Some(200.0));
    }
}
