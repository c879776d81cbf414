//! Integrated trajectory: the compartment series on the output grid.

use serde::{Deserialize, Serialize};

use crate::model::State;

/// The compartment state evaluated at every point of the time grid.
///
/// Four parallel series plus the time axis, all of equal length.
/// Immutable once the integration completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    time: Vec<f64>,
    susceptible: Vec<f64>,
    infected: Vec<f64>,
    recovered: Vec<f64>,
    deceased: Vec<f64>,
}

impl Trajectory {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            susceptible: Vec::with_capacity(capacity),
            infected: Vec::with_capacity(capacity),
            recovered: Vec::with_capacity(capacity),
            deceased: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, t: f64, state: &State) {
        self.time.push(t);
        self.susceptible.push(state.susceptible);
        self.infected.push(state.infected);
        self.recovered.push(state.recovered);
        self.deceased.push(state.deceased);
    }

    /// Time axis in days.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Susceptible series.
    #[must_use]
    pub fn susceptible(&self) -> &[f64] {
        &self.susceptible
    }

    /// Infected series.
    #[must_use]
    pub fn infected(&self) -> &[f64] {
        &self.infected
    }

    /// Recovered series.
    #[must_use]
    pub fn recovered(&self) -> &[f64] {
        &self.recovered
    }

    /// Deceased series.
    #[must_use]
    pub fn deceased(&self) -> &[f64] {
        &self.deceased
    }

    /// Number of sampled points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the trajectory holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Compartment state at a sample index.
    #[must_use]
    pub fn state_at(&self, index: usize) -> Option<State> {
        if index >= self.len() {
            return None;
        }

        Some(State {
            susceptible: self.susceptible[index],
            infected: self.infected[index],
            recovered: self.recovered[index],
            deceased: self.deceased[index],
        })
    }

    /// State at the last grid point.
    #[must_use]
    pub fn final_state(&self) -> Option<State> {
        self.len().checked_sub(1).and_then(|i| self.state_at(i))
    }

    /// Largest relative deviation of S + I + R + D from `population` over
    /// the whole trajectory.
    #[must_use]
    pub fn conservation_drift(&self, population: f64) -> f64 {
        (0..self.len())
            .filter_map(|i| self.state_at(i))
            .map(|s| (s.total() - population).abs() / population)
            .fold(0.0, f64::max)
    }
}
