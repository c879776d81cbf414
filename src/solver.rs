//! Numerical integration of the SIRD initial value problem.
//!
//! Two methods, both at least 4th-order accurate:
//! - `Rk4`: classical fixed-step Runge-Kutta with sub-steps per grid interval
//! - `DormandPrince` (default): adaptive embedded 5(4) pair with step-size
//!   control
//!
//! Both sample output exactly at the grid points; the adaptive controller
//! never steps past the next output point. After every accepted grid point
//! a guard checks for non-finite values and population conservation drift,
//! stopping the run with a typed error instead of letting NaN or Inf
//! propagate into results.
//!
//! Integration is pure f64 arithmetic with no hidden state, so identical
//! inputs produce bitwise-identical trajectories.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{EpiError, EpiResult};
use crate::grid::TimeGrid;
use crate::model::{SirdModel, State};
use crate::trajectory::Trajectory;

/// Integration method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Classical Runge-Kutta 4th order with fixed sub-steps.
    Rk4,
    /// Dormand-Prince 5(4) adaptive embedded pair.
    #[default]
    DormandPrince,
}

/// Default number of RK4 sub-steps per grid interval.
const DEFAULT_SUBSTEPS: u32 = 10;
/// Default relative tolerance for the adaptive controller.
const DEFAULT_REL_TOL: f64 = 1e-10;
/// Default absolute tolerance floor, in individuals.
const DEFAULT_ABS_TOL: f64 = 1e-10;
/// Relative population drift that aborts the run.
const CONSERVATION_TOL: f64 = 1e-6;
/// Step-size controller safety factor.
const SAFETY: f64 = 0.9;
/// Smallest allowed step shrink factor per rejection.
const MIN_SCALE: f64 = 0.2;
/// Largest allowed step growth factor per acceptance.
const MAX_SCALE: f64 = 5.0;
/// Smallest step before the controller gives up, in days.
const MIN_STEP: f64 = 1e-12;

/// Trajectory integrator.
///
/// Stateless between runs: `integrate` is a pure function of the model and
/// the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    method: Method,
    substeps: u32,
    rel_tol: f64,
    abs_tol: f64,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(Method::default())
    }
}

impl Integrator {
    /// Create an integrator with default tolerances for `method`.
    #[must_use]
    pub const fn new(method: Method) -> Self {
        Self {
            method,
            substeps: DEFAULT_SUBSTEPS,
            rel_tol: DEFAULT_REL_TOL,
            abs_tol: DEFAULT_ABS_TOL,
        }
    }

    /// Override the number of RK4 sub-steps per grid interval.
    #[must_use]
    pub const fn with_substeps(mut self, substeps: u32) -> Self {
        self.substeps = if substeps == 0 { 1 } else { substeps };
        self
    }

    /// Override the adaptive controller tolerances.
    #[must_use]
    pub const fn with_tolerances(mut self, rel_tol: f64, abs_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self.abs_tol = abs_tol;
        self
    }

    /// The selected method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Local error order of the selected method.
    #[must_use]
    pub const fn error_order(&self) -> u32 {
        match self.method {
            Method::Rk4 => 4,
            Method::DormandPrince => 5,
        }
    }

    /// Whether the selected method adapts its internal step size.
    #[must_use]
    pub const fn is_adaptive(&self) -> bool {
        matches!(self.method, Method::DormandPrince)
    }

    /// Integrate the initial value problem over the grid.
    ///
    /// # Errors
    ///
    /// Returns `NonFinite` if a compartment becomes NaN or Inf,
    /// `Conservation` if S+I+R+D drifts from N beyond tolerance, and
    /// `Solver` if the adaptive step size collapses.
    pub fn integrate(&self, model: &SirdModel, grid: &TimeGrid) -> EpiResult<Trajectory> {
        let population = model.population();
        let initial = model.initial_state();
        let mut y = initial.to_array();

        let mut trajectory = Trajectory::with_capacity(grid.len());
        trajectory.push(grid.start(), &initial);

        // Persistent step size estimate for the adaptive controller
        let mut h = grid.step();
        let mut rejected = 0_u32;

        for pair in grid.points().windows(2) {
            let (t0, t1) = (pair[0], pair[1]);

            y = match self.method {
                Method::Rk4 => self.rk4_interval(model, t0, t1, y),
                Method::DormandPrince => {
                    self.adaptive_interval(model, t0, t1, y, &mut h, &mut rejected)?
                }
            };

            let state = State::from_array(y);
            check_guards(&state, population, t1)?;
            trajectory.push(t1, &state);
        }

        if rejected > 0 {
            debug!("adaptive controller rejected {rejected} trial steps");
        }

        Ok(trajectory)
    }

    /// Advance one grid interval with fixed-step RK4.
    fn rk4_interval(&self, model: &SirdModel, t0: f64, t1: f64, mut y: [f64; 4]) -> [f64; 4] {
        let h = (t1 - t0) / f64::from(self.substeps);
        let mut t = t0;

        for _ in 0..self.substeps {
            y = rk4_step(model, t, y, h);
            t += h;
        }

        y
    }

    /// Advance one grid interval with the adaptive 5(4) pair.
    fn adaptive_interval(
        &self,
        model: &SirdModel,
        t0: f64,
        t1: f64,
        mut y: [f64; 4],
        h: &mut f64,
        rejected: &mut u32,
    ) -> EpiResult<[f64; 4]> {
        let mut t = t0;

        while t < t1 - MIN_STEP {
            let clipped = *h > t1 - t;
            let h_try = if clipped { t1 - t } else { *h };

            let (y_next, err) = self.dopri_step(model, t, y, h_try);

            if !err.is_finite() {
                *rejected += 1;
                *h = h_try * MIN_SCALE;
                if *h < MIN_STEP {
                    return Err(EpiError::solver(format!("step size underflow at t={t:.6}")));
                }
                continue;
            }

            if err <= 1.0 {
                t += h_try;
                y = y_next;

                if !clipped {
                    let scale = if err > 0.0 {
                        (SAFETY * err.powf(-0.2)).clamp(MIN_SCALE, MAX_SCALE)
                    } else {
                        MAX_SCALE
                    };
                    *h = h_try * scale;
                }
            } else {
                *rejected += 1;
                let scale = (SAFETY * err.powf(-0.2)).clamp(MIN_SCALE, 1.0);
                *h = h_try * scale;
                trace!("rejected step at t={t:.4} (err={err:.3e}), retrying with h={h:.3e}");

                if *h < MIN_STEP {
                    return Err(EpiError::solver(format!("step size underflow at t={t:.6}")));
                }
            }
        }

        Ok(y)
    }

    /// One Dormand-Prince 5(4) trial step. Returns the 5th-order solution
    /// and the scaled error norm (accept when <= 1).
    fn dopri_step(&self, model: &SirdModel, t: f64, y: [f64; 4], h: f64) -> ([f64; 4], f64) {
        let k1 = model.rhs(t, y);
        let k2 = model.rhs(t + h / 5.0, axpy(&y, h, &[(1.0 / 5.0, &k1)]));
        let k3 = model.rhs(
            t + 3.0 * h / 10.0,
            axpy(&y, h, &[(3.0 / 40.0, &k1), (9.0 / 40.0, &k2)]),
        );
        let k4 = model.rhs(
            t + 4.0 * h / 5.0,
            axpy(
                &y,
                h,
                &[(44.0 / 45.0, &k1), (-56.0 / 15.0, &k2), (32.0 / 9.0, &k3)],
            ),
        );
        let k5 = model.rhs(
            t + 8.0 * h / 9.0,
            axpy(
                &y,
                h,
                &[
                    (19372.0 / 6561.0, &k1),
                    (-25360.0 / 2187.0, &k2),
                    (64448.0 / 6561.0, &k3),
                    (-212.0 / 729.0, &k4),
                ],
            ),
        );
        let k6 = model.rhs(
            t + h,
            axpy(
                &y,
                h,
                &[
                    (9017.0 / 3168.0, &k1),
                    (-355.0 / 33.0, &k2),
                    (46732.0 / 5247.0, &k3),
                    (49.0 / 176.0, &k4),
                    (-5103.0 / 18656.0, &k5),
                ],
            ),
        );

        // 5th-order solution
        let y5 = axpy(
            &y,
            h,
            &[
                (35.0 / 384.0, &k1),
                (500.0 / 1113.0, &k3),
                (125.0 / 192.0, &k4),
                (-2187.0 / 6784.0, &k5),
                (11.0 / 84.0, &k6),
            ],
        );
        let k7 = model.rhs(t + h, y5);

        // Difference between the 5th- and embedded 4th-order solutions
        let e = [
            71.0 / 57600.0,
            0.0,
            -71.0 / 16695.0,
            71.0 / 1920.0,
            -17253.0 / 339_200.0,
            22.0 / 525.0,
            -1.0 / 40.0,
        ];

        let mut err_sq = 0.0;
        for i in 0..4 {
            let err_i = h
                * (e[0] * k1[i]
                    + e[2] * k3[i]
                    + e[3] * k4[i]
                    + e[4] * k5[i]
                    + e[5] * k6[i]
                    + e[6] * k7[i]);
            let scale = self.abs_tol + self.rel_tol * y[i].abs().max(y5[i].abs());
            err_sq += (err_i / scale) * (err_i / scale);
        }

        (y5, (err_sq / 4.0).sqrt())
    }
}

/// One classical RK4 step.
fn rk4_step(model: &SirdModel, t: f64, y: [f64; 4], h: f64) -> [f64; 4] {
    let k1 = model.rhs(t, y);
    let k2 = model.rhs(t + 0.5 * h, axpy(&y, 0.5 * h, &[(1.0, &k1)]));
    let k3 = model.rhs(t + 0.5 * h, axpy(&y, 0.5 * h, &[(1.0, &k2)]));
    let k4 = model.rhs(t + h, axpy(&y, h, &[(1.0, &k3)]));

    let mut out = y;
    for i in 0..4 {
        out[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    out
}

/// y + h * sum(c_j * k_j), componentwise.
fn axpy(y: &[f64; 4], h: f64, terms: &[(f64, &[f64; 4])]) -> [f64; 4] {
    let mut out = *y;
    for (coeff, k) in terms {
        for i in 0..4 {
            out[i] += h * coeff * k[i];
        }
    }
    out
}

/// Stop-on-error checks after each accepted grid point.
fn check_guards(state: &State, population: f64, t: f64) -> EpiResult<()> {
    for (name, value) in [
        ("susceptible", state.susceptible),
        ("infected", state.infected),
        ("recovered", state.recovered),
        ("deceased", state.deceased),
    ] {
        if !value.is_finite() {
            return Err(EpiError::NonFinite {
                location: format!("{name} at t={t:.4}"),
            });
        }
    }

    let drift = (state.total() - population).abs() / population;
    if drift > CONSERVATION_TOL {
        return Err(EpiError::Conservation {
            drift,
            tolerance: CONSERVATION_TOL,
        });
    }

    Ok(())
}
