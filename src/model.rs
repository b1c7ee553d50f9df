//! The SEIRD(P) differential equations.
//!
//! An [`EpidemicModel`] is immutable once built: it holds validated parameters and the derived
//! average fatality multiplier, and evaluates the right-hand side of the system for the
//! integrator. Anything that changes during a run (the effective activation day, whether the
//! countermeasure notice was emitted) is owned by the caller, so a single model can be shared by
//! concurrent runs.

use crate::compartment::{Compartment, CompartmentState, SEIRD, SEIRDP};
use crate::error::SeirdError;
use crate::parameters::{InterventionPolicy, ModelParameters, VitalRates};
use crate::rates::{fatality_rate, transmission_rate};
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub struct EpidemicModel {
    parameters: ModelParameters,
    /// Population-weighted average fatality multiplier, resolved at construction.
    rho: f64,
}

impl EpidemicModel {
    /// # Errors
    /// `InvalidParameter` if any parameter is out of range; see [`ModelParameters::validate`].
    pub fn new(parameters: ModelParameters) -> Result<Self, SeirdError> {
        let rho = parameters.validate()?;
        Ok(EpidemicModel { parameters, rho })
    }

    #[must_use]
    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    #[must_use]
    pub fn rho(&self) -> f64 {
        self.rho
    }

    #[must_use]
    pub fn has_vital_rates(&self) -> bool {
        self.parameters.vital_rates.is_some()
    }

    /// The compartments this model populates: `P` only exists with vital rates.
    #[must_use]
    pub fn compartments(&self) -> &'static [Compartment] {
        if self.has_vital_rates() {
            &SEIRDP
        } else {
            &SEIRD
        }
    }

    /// `beta` on `day` given the effective activation day.
    #[must_use]
    pub fn transmission_rate(&self, day: f64, activation_day: f64) -> f64 {
        let p = &self.parameters;
        transmission_rate(
            day,
            activation_day,
            p.social_distance_response_factor,
            p.r0,
            p.r1,
            p.gamma,
        )
    }

    /// `alpha` for the current infectious count, clamped to `[0, 1]`.
    #[must_use]
    pub fn fatality_rate(&self, infectious: f64, population_size: f64) -> f64 {
        fatality_rate(
            infectious,
            population_size,
            self.parameters.base_fatality_rate,
            self.parameters.disease_scaling_factor,
        )
    }

    /// Instantaneous rate of change of every compartment.
    #[must_use]
    pub fn derivative(
        &self,
        state: &CompartmentState,
        day: f64,
        population_size: f64,
        activation_day: f64,
    ) -> CompartmentState {
        let CompartmentState { s, e, i, r, .. } = *state;
        let n = population_size;
        let gamma = self.parameters.gamma;
        let sigma = self.parameters.sigma;
        let rho = self.rho;

        let beta = self.transmission_rate(day, activation_day);
        let alpha = self.fatality_rate(i, n);

        let infection = beta * s * i / n;
        let recovery = (1.0 - alpha) * gamma * i;
        let death = alpha * rho * i;

        let mut delta = CompartmentState {
            s: -infection,
            e: infection - sigma * e,
            i: sigma * e - recovery - death,
            r: recovery,
            d: death,
            p: 0.0,
        };

        if let Some(VitalRates {
            birth_rate_daily: b,
            natural_death_rate_daily: mu,
        }) = self.parameters.vital_rates
        {
            delta.s += b * n - mu * s;
            delta.e += b * e;
            delta.r += b * n - mu * r;
            delta.p = mu * (s + r);
        }

        delta
    }

    /// The activation day implied by the state on `day`: pulled forward to `day` when the
    /// cumulative affected population exceeds the policy's threshold count before the policy's
    /// threshold day, otherwise the threshold day itself.
    ///
    /// This is evaluated fresh on each call. Callers keep the running minimum so the activation
    /// day never moves later once triggered.
    #[must_use]
    pub fn resolve_activation_day(
        &self,
        day: u32,
        cumulative_affected: f64,
        policy: &InterventionPolicy,
    ) -> u32 {
        let exceeded = policy
            .threshold_infected_count
            .is_some_and(|threshold| cumulative_affected > threshold);
        if exceeded && day < policy.threshold_day {
            day
        } else {
            policy.threshold_day
        }
    }
}

/// One-shot "countermeasures active" notification for a single run.
///
/// A fresh notice is created at the start of every solve. The first observation at or after the
/// activation day logs a single `info!` record and records the day; later observations are
/// silent. It never affects numeric output.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ActivationNotice {
    observed_at: Option<f64>,
}

impl ActivationNotice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the observation that emitted the notice.
    pub fn observe(&mut self, day: f64, activation_day: f64) -> bool {
        if self.observed_at.is_some() || day < activation_day {
            return false;
        }
        info!("Countermeasures come into effect on day: {}", day.round());
        self.observed_at = Some(day);
        true
    }

    /// The simulated time at which countermeasures were first seen active.
    #[must_use]
    pub fn observed_at(&self) -> Option<f64> {
        self.observed_at
    }
}
