//! Time- and state-dependent rates of the model.
//!
//! These are free functions with every input passed explicitly so they can be evaluated and
//! tested without constructing a model.

/// Logistic blend from `r0` (far before `x0`) to `r1` (far after `x0`) with steepness `k`.
///
/// At `x == x0` the value is the midpoint `(r0 + r1) / 2`.
#[must_use]
pub fn logistic(x: f64, x0: f64, k: f64, r0: f64, r1: f64) -> f64 {
    (r0 - r1) / (1.0 + (-k * (x0 - x)).exp()) + r1
}

/// Transmission rate `beta` on `day`.
///
/// Constant at `r0 * gamma` before `activation_day`; from then on it follows the logistic
/// decline toward `r1 * gamma`, modeling gradual compliance with social distancing.
#[must_use]
pub fn transmission_rate(
    day: f64,
    activation_day: f64,
    steepness: f64,
    r0: f64,
    r1: f64,
    gamma: f64,
) -> f64 {
    if day < activation_day {
        r0 * gamma
    } else {
        logistic(day, activation_day, steepness, r0, r1) * gamma
    }
}

/// Unclamped fatality rate: the baseline plus a term growing with the infectious fraction of the
/// population (health-system overload). May exceed one for large scaling factors.
#[must_use]
pub fn raw_fatality_rate(
    infectious: f64,
    population_size: f64,
    base_fatality_rate: f64,
    disease_scaling_factor: f64,
) -> f64 {
    disease_scaling_factor * infectious / population_size + base_fatality_rate
}

/// Fatality rate `alpha`, clamped to `[0, 1]`.
#[must_use]
pub fn fatality_rate(
    infectious: f64,
    population_size: f64,
    base_fatality_rate: f64,
    disease_scaling_factor: f64,
) -> f64 {
    raw_fatality_rate(
        infectious,
        population_size,
        base_fatality_rate,
        disease_scaling_factor,
    )
    .clamp(0.0, 1.0)
}
