//! Explicit initial-value-problem integrators.
//!
//! The simulator talks to an integrator only through [`OdeSolver`]: it hands over a right-hand
//! side `f(t, y, dy)`, an interval `[t0, t1]` and the state at `t0`, and gets the state at `t1`
//! back in place. Two implementations are provided:
//!
//! * [`RungeKutta4`]: the classical fourth-order method with a fixed number of equal substeps
//!   per interval. Deterministic cost, the default.
//! * [`DormandPrince`]: the embedded 5(4) pair with adaptive step-size control and an iteration
//!   budget, for callers who prefer error control over a fixed grid.
//!
//! Both are explicit Runge-Kutta methods, so any linear invariant of the system (such as the
//! total population without vital rates) is preserved up to rounding.

use crate::error::SeirdError;
use log::{debug, trace};
use std::fmt::Debug;

/// The right-hand side of `dy/dt = f(t, y)`, writing `f(t, y)` into the last argument.
pub type RightHandSide<'a> = dyn FnMut(f64, &[f64], &mut [f64]) + 'a;

pub trait OdeSolver: Debug + Send + Sync {
    /// Advances `y` from `t0` to `t1`.
    ///
    /// # Errors
    /// `IntegrationError` if the solver cannot reach `t1` within its limits or produces
    /// non-finite values.
    fn integrate(
        &self,
        rhs: &mut RightHandSide<'_>,
        t0: f64,
        t1: f64,
        y: &mut [f64],
    ) -> Result<(), SeirdError>;

    fn name(&self) -> &'static str;
}

/// Default number of RK4 substeps per simulated day.
pub const DEFAULT_SUBSTEPS: u32 = 24;

/// Classical fourth-order Runge-Kutta with `substeps` equal steps per interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RungeKutta4 {
    pub substeps: u32,
}

impl Default for RungeKutta4 {
    fn default() -> Self {
        RungeKutta4 {
            substeps: DEFAULT_SUBSTEPS,
        }
    }
}

impl RungeKutta4 {
    #[must_use]
    pub fn with_substeps(substeps: u32) -> Self {
        RungeKutta4 { substeps }
    }
}

impl OdeSolver for RungeKutta4 {
    fn integrate(
        &self,
        rhs: &mut RightHandSide<'_>,
        t0: f64,
        t1: f64,
        y: &mut [f64],
    ) -> Result<(), SeirdError> {
        if self.substeps == 0 {
            return Err(SeirdError::invalid("RK4 needs at least one substep"));
        }
        let n = y.len();
        let h = (t1 - t0) / f64::from(self.substeps);
        let mut k1 = vec![0.0; n];
        let mut k2 = vec![0.0; n];
        let mut k3 = vec![0.0; n];
        let mut k4 = vec![0.0; n];
        let mut scratch = vec![0.0; n];

        for step in 0..self.substeps {
            let t = t0 + f64::from(step) * h;
            let t_end = if step + 1 == self.substeps {
                t1
            } else {
                t0 + f64::from(step + 1) * h
            };
            let t_mid = t + 0.5 * h;

            rhs(t, y, &mut k1);
            axpy(&mut scratch, y, 0.5 * h, &k1);
            rhs(t_mid, &scratch, &mut k2);
            axpy(&mut scratch, y, 0.5 * h, &k2);
            rhs(t_mid, &scratch, &mut k3);
            axpy(&mut scratch, y, h, &k3);
            rhs(t_end, &scratch, &mut k4);

            for j in 0..n {
                y[j] += h / 6.0 * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
            }
        }

        ensure_finite(y, t1)
    }

    fn name(&self) -> &'static str {
        "rk4"
    }
}

/// Adaptive Dormand-Prince 5(4) integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DormandPrince {
    /// Relative tolerance per component.
    pub rtol: f64,
    /// Absolute tolerance per component.
    pub atol: f64,
    /// Maximum number of attempted steps per call to `integrate`.
    pub max_steps: usize,
    /// First trial step size.
    pub initial_step: f64,
}

impl Default for DormandPrince {
    fn default() -> Self {
        DormandPrince {
            rtol: 1e-8,
            atol: 1e-8,
            max_steps: 10_000,
            initial_step: 0.1,
        }
    }
}

// Butcher tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between the fifth- and fourth-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

impl OdeSolver for DormandPrince {
    #[allow(clippy::too_many_lines)]
    fn integrate(
        &self,
        rhs: &mut RightHandSide<'_>,
        t0: f64,
        t1: f64,
        y: &mut [f64],
    ) -> Result<(), SeirdError> {
        if !(self.rtol > 0.0 && self.atol > 0.0 && self.initial_step > 0.0) {
            return Err(SeirdError::invalid(
                "Dormand-Prince tolerances and initial step must be positive",
            ));
        }
        let n = y.len();
        let mut k = [
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
        ];
        let mut stage = vec![0.0; n];
        let mut y_new = vec![0.0; n];

        let mut t = t0;
        let mut h = self.initial_step.min(t1 - t0);
        let mut attempts = 0usize;
        let mut accepted = 0usize;

        while t < t1 {
            if attempts >= self.max_steps {
                return Err(SeirdError::integration(format!(
                    "exceeded {} steps between t={t0} and t={t1} (reached t={t})",
                    self.max_steps
                )));
            }
            attempts += 1;

            let last = t + h >= t1;
            if last {
                h = t1 - t;
            }
            if h <= f64::EPSILON * t.abs().max(1.0) {
                return Err(SeirdError::integration(format!(
                    "step size underflow at t={t}"
                )));
            }

            rhs(t, y, &mut k[0]);
            combine(&mut stage, y, h, &[(A21, &k[0])]);
            rhs(t + C2 * h, &stage, &mut k[1]);
            combine(&mut stage, y, h, &[(A31, &k[0]), (A32, &k[1])]);
            rhs(t + C3 * h, &stage, &mut k[2]);
            combine(
                &mut stage,
                y,
                h,
                &[(A41, &k[0]), (A42, &k[1]), (A43, &k[2])],
            );
            rhs(t + C4 * h, &stage, &mut k[3]);
            combine(
                &mut stage,
                y,
                h,
                &[(A51, &k[0]), (A52, &k[1]), (A53, &k[2]), (A54, &k[3])],
            );
            rhs(t + C5 * h, &stage, &mut k[4]);
            combine(
                &mut stage,
                y,
                h,
                &[
                    (A61, &k[0]),
                    (A62, &k[1]),
                    (A63, &k[2]),
                    (A64, &k[3]),
                    (A65, &k[4]),
                ],
            );
            let t_next = if last { t1 } else { t + h };
            rhs(t_next, &stage, &mut k[5]);
            combine(
                &mut y_new,
                y,
                h,
                &[
                    (B1, &k[0]),
                    (B3, &k[2]),
                    (B4, &k[3]),
                    (B5, &k[4]),
                    (B6, &k[5]),
                ],
            );
            rhs(t_next, &y_new, &mut k[6]);

            let mut error_sum = 0.0;
            for j in 0..n {
                let local_error = h
                    * (E1 * k[0][j]
                        + E3 * k[2][j]
                        + E4 * k[3][j]
                        + E5 * k[4][j]
                        + E6 * k[5][j]
                        + E7 * k[6][j]);
                let scale = self.atol + self.rtol * y[j].abs().max(y_new[j].abs());
                error_sum += (local_error / scale).powi(2);
            }
            let error = (error_sum / n.max(1) as f64).sqrt();
            if !error.is_finite() {
                return Err(SeirdError::integration(format!(
                    "non-finite error estimate at t={t}"
                )));
            }

            let factor = if error == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * error.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
            };

            if error <= 1.0 {
                y.copy_from_slice(&y_new);
                t = t_next;
                accepted += 1;
                trace!("dopri5 accepted step to t={t} (h={h:e}, err={error:e})");
            } else {
                trace!("dopri5 rejected step at t={t} (h={h:e}, err={error:e})");
            }
            h *= factor;
        }

        debug!(
            "dopri5 integrated [{t0}, {t1}] in {accepted} accepted of {attempts} attempted steps"
        );
        ensure_finite(y, t1)
    }

    fn name(&self) -> &'static str {
        "dopri5"
    }
}

/// `out = y + a * x`
fn axpy(out: &mut [f64], y: &[f64], a: f64, x: &[f64]) {
    for ((o, yi), xi) in out.iter_mut().zip(y).zip(x) {
        *o = yi + a * xi;
    }
}

/// `out = y + h * sum(coefficient * k)`
fn combine(out: &mut [f64], y: &[f64], h: f64, terms: &[(f64, &Vec<f64>)]) {
    for (j, o) in out.iter_mut().enumerate() {
        let increment: f64 = terms.iter().map(|(a, k)| a * k[j]).sum();
        *o = y[j] + h * increment;
    }
}

fn ensure_finite(y: &[f64], t: f64) -> Result<(), SeirdError> {
    if y.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(SeirdError::integration(format!(
            "non-finite state at t={t}: {y:?}"
        )))
    }
}
