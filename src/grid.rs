//! Uniform output time grid.

use serde::{Deserialize, Serialize};

/// Uniform sampling grid over the simulation horizon.
///
/// Spans 0 ..= days inclusive with `samples_per_day` points per day, so a
/// run of `d` days has `d * samples_per_day + 1` points. The grid controls
/// output density only; the solver subdivides further internally as its
/// accuracy requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    points: Vec<f64>,
    step: f64,
}

impl TimeGrid {
    /// Create a grid for `days` days at `samples_per_day` resolution.
    #[must_use]
    pub fn new(days: u32, samples_per_day: u32) -> Self {
        let step = 1.0 / f64::from(samples_per_day.max(1));
        let count = days as usize * samples_per_day.max(1) as usize;
        let points = (0..=count).map(|k| k as f64 * step).collect();

        Self { points, step }
    }

    /// The grid points in days, ascending.
    #[must_use]
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Spacing between consecutive points in days.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid is empty. A constructed grid never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First grid point (always 0).
    #[must_use]
    pub fn start(&self) -> f64 {
        self.points.first().copied().unwrap_or(0.0)
    }

    /// Last grid point (the horizon in days).
    #[must_use]
    pub fn end(&self) -> f64 {
        self.points.last().copied().unwrap_or(0.0)
    }
}
