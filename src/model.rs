//! SIRD compartmental model.
//!
//! Four compartments with flows driven by three per-day rates:
//!
//! ```text
//! dS/dt = -β·S·I/N
//! dI/dt =  β·S·I/N - γ·I - μ·I
//! dR/dt =  γ·I
//! dD/dt =  μ·I
//! ```
//!
//! The system is autonomous (time-invariant) and conserves the total
//! population exactly: the four derivatives sum to zero.

use serde::{Deserialize, Serialize};

use crate::error::{EpiError, EpiResult};
use crate::params::Parameters;

/// Compartment state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Susceptible count S.
    pub susceptible: f64,
    /// Infected count I.
    pub infected: f64,
    /// Recovered count R.
    pub recovered: f64,
    /// Deceased count D.
    pub deceased: f64,
}

impl State {
    /// Total population S + I + R + D.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.recovered + self.deceased
    }

    /// Whether every compartment holds a finite value.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.susceptible.is_finite()
            && self.infected.is_finite()
            && self.recovered.is_finite()
            && self.deceased.is_finite()
    }

    pub(crate) const fn to_array(self) -> [f64; 4] {
        [
            self.susceptible,
            self.infected,
            self.recovered,
            self.deceased,
        ]
    }

    pub(crate) const fn from_array(y: [f64; 4]) -> Self {
        Self {
            susceptible: y[0],
            infected: y[1],
            recovered: y[2],
            deceased: y[3],
        }
    }
}

/// Instantaneous rates of change of the four compartments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivative {
    /// dS/dt.
    pub ds: f64,
    /// dI/dt.
    pub di: f64,
    /// dR/dt.
    pub dr: f64,
    /// dD/dt.
    pub dd: f64,
}

impl Derivative {
    pub(crate) const fn to_array(self) -> [f64; 4] {
        [self.ds, self.di, self.dr, self.dd]
    }
}

/// The SIRD model: derivative evaluator plus closed-form diagnostics.
#[derive(Debug, Clone)]
pub struct SirdModel {
    params: Parameters,
    population: f64,
}

impl SirdModel {
    /// Create a model from parameters.
    ///
    /// # Errors
    ///
    /// Returns `Domain` if the population is zero: every infection term
    /// divides by N.
    pub fn new(params: &Parameters) -> EpiResult<Self> {
        if params.population == 0 {
            return Err(EpiError::domain("population must be positive"));
        }

        Ok(Self {
            params: params.clone(),
            population: params.population as f64,
        })
    }

    /// The parameters this model was built from.
    #[must_use]
    pub const fn params(&self) -> &Parameters {
        &self.params
    }

    /// Total population N as a float.
    #[must_use]
    pub const fn population(&self) -> f64 {
        self.population
    }

    /// Initial state: S0 = N − I0, I = I0, R = D = 0.
    #[must_use]
    pub fn initial_state(&self) -> State {
        let i0 = self.params.initial_infected as f64;

        State {
            susceptible: self.population - i0,
            infected: i0,
            recovered: 0.0,
            deceased: 0.0,
        }
    }

    /// Evaluate the instantaneous derivative at `state`.
    ///
    /// Pure arithmetic, no side effects. The model is autonomous, so the
    /// time argument is unused; it is part of the signature because the
    /// solver evaluates the right-hand side as f(t, y).
    #[must_use]
    pub fn derivatives(&self, _t: f64, state: &State) -> Derivative {
        let infection = self.params.beta * state.susceptible * state.infected / self.population;
        let recovery = self.params.gamma * state.infected;
        let mortality = self.params.mu * state.infected;

        Derivative {
            ds: -infection,
            di: infection - recovery - mortality,
            dr: recovery,
            dd: mortality,
        }
    }

    pub(crate) fn rhs(&self, t: f64, y: [f64; 4]) -> [f64; 4] {
        self.derivatives(t, &State::from_array(y)).to_array()
    }

    /// Analytical peak infected count.
    ///
    /// The peak occurs where dI/dt = 0, i.e. S = N/R0, giving
    /// `I_peak = S0 + I0 − N/R0 + (N/R0)·ln((N/R0)/S0)` with recovered and
    /// deceased lumped as removed. Meaningful when R0 > 1; below threshold
    /// the infected count only declines from I0.
    ///
    /// # Errors
    ///
    /// Returns `Domain` if γ + μ = 0.
    pub fn analytical_peak_infected(&self) -> EpiResult<f64> {
        let r0 = self.params.basic_reproduction_number()?;
        let n = self.population;
        let i0 = self.params.initial_infected as f64;
        let s0 = n - i0;

        let s_peak = n / r0;
        // With S0 at or below N/R0 the infected count only declines from I0
        if r0 <= 1.0 || s0 <= s_peak {
            return Ok(i0);
        }

        Ok(s0 + i0 - s_peak + s_peak * (s_peak / s0).ln())
    }

    /// Final size fraction: the root z of `z = 1 − exp(−R0·z)`.
    ///
    /// This is the fraction of the population ever infected in the limit
    /// t → ∞, i.e. the asymptotic attack rate for small I0. Solved by
    /// Newton iteration. Meaningful when R0 > 1; below threshold the
    /// nontrivial root collapses to zero.
    ///
    /// # Errors
    ///
    /// Returns `Domain` if γ + μ = 0.
    pub fn final_size_fraction(&self) -> EpiResult<f64> {
        let r0 = self.params.basic_reproduction_number()?;

        if r0 <= 1.0 {
            return Ok(0.0);
        }

        let mut z = 0.8;
        for _ in 0..50 {
            let f = z - 1.0 + (-r0 * z).exp();
            let df = 1.0 - r0 * (-r0 * z).exp();
            if df.abs() < f64::EPSILON {
                break;
            }
            z -= f / df;
        }

        Ok(z.clamp(0.0, 1.0))
    }
}
