//! Derived epidemiological metrics.
//!
//! Computed from a completed trajectory: peak infection day and magnitude,
//! the effective reproduction number series, and the final attack rate.
//! Stateless; each derivation is independent given its inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EpiError, EpiResult};
use crate::params::Parameters;
use crate::trajectory::Trajectory;

/// Metrics derived from a completed trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpidemicMetrics {
    /// Maximum of the infected series.
    pub peak_infected: f64,
    /// Time-grid value at the argmax index (first occurrence on ties).
    pub peak_day: f64,
    /// Effective reproduction number Rₑ(t) = (β/(γ+μ))·S(t)/N, one value
    /// per grid point.
    pub reproduction: Vec<f64>,
    /// Fraction of the population ever infected: 1 − S(end)/N, in [0, 1].
    pub attack_rate: f64,
}

impl EpidemicMetrics {
    /// Derive all metrics from a trajectory.
    ///
    /// # Errors
    ///
    /// Returns `Domain` if γ + μ = 0 (no removal process means Rₑ is
    /// undefined) and `Validation` if the trajectory is empty.
    pub fn derive(params: &Parameters, trajectory: &Trajectory) -> EpiResult<Self> {
        let removal = params.removal_rate();
        if removal <= 0.0 {
            return Err(EpiError::domain(
                "recovery and mortality rate cannot both be zero",
            ));
        }
        if trajectory.is_empty() {
            return Err(EpiError::validation("trajectory is empty"));
        }

        let population = params.population as f64;

        let mut peak_infected = f64::NEG_INFINITY;
        let mut peak_index = 0;
        for (index, &infected) in trajectory.infected().iter().enumerate() {
            if infected > peak_infected {
                peak_infected = infected;
                peak_index = index;
            }
        }
        let peak_day = trajectory.time()[peak_index];

        let factor = params.beta / removal;
        let reproduction = trajectory
            .susceptible()
            .iter()
            .map(|s| factor * s / population)
            .collect();

        let final_susceptible = trajectory.susceptible()[trajectory.len() - 1];
        let attack_rate = (1.0 - final_susceptible / population).clamp(0.0, 1.0);

        Ok(Self {
            peak_infected,
            peak_day,
            reproduction,
            attack_rate,
        })
    }

    /// Attack rate expressed as a percentage.
    #[must_use]
    pub fn attack_rate_percent(&self) -> f64 {
        self.attack_rate * 100.0
    }

    /// Rₑ at the first grid point.
    #[must_use]
    pub fn initial_reproduction(&self) -> f64 {
        self.reproduction.first().copied().unwrap_or(0.0)
    }
}

/// Final-count summary of a run: the headline numbers a frontend displays
/// under the charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Susceptible count at the end of the horizon.
    pub final_susceptible: f64,
    /// Infected count at the end of the horizon.
    pub final_infected: f64,
    /// Recovered count at the end of the horizon.
    pub final_recovered: f64,
    /// Deceased count at the end of the horizon.
    pub final_deceased: f64,
    /// Maximum of the infected series.
    pub peak_infected: f64,
    /// Day of the infection peak.
    pub peak_day: f64,
    /// Final attack rate in [0, 1].
    pub attack_rate: f64,
}

impl Summary {
    /// Build the summary from a trajectory and its metrics.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the trajectory is empty.
    pub fn derive(trajectory: &Trajectory, metrics: &EpidemicMetrics) -> EpiResult<Self> {
        let last = trajectory
            .final_state()
            .ok_or_else(|| EpiError::validation("trajectory is empty"))?;

        Ok(Self {
            final_susceptible: last.susceptible,
            final_infected: last.infected,
            final_recovered: last.recovered,
            final_deceased: last.deceased,
            peak_infected: metrics.peak_infected,
            peak_day: metrics.peak_day,
            attack_rate: metrics.attack_rate,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "final susceptible: {:.0}", self.final_susceptible)?;
        writeln!(f, "final infected:    {:.0}", self.final_infected)?;
        writeln!(f, "final recovered:   {:.0}", self.final_recovered)?;
        writeln!(f, "final deceased:    {:.0}", self.final_deceased)?;
        writeln!(
            f,
            "peak infection:    {:.0} on day {:.0}",
            self.peak_infected, self.peak_day
        )?;
        write!(f, "attack rate:       {:.2}%", self.attack_rate * 100.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::TimeGrid;
    use crate::model::SirdModel;
    use crate::solver::Integrator;

    fn run(params: &Parameters) -> Trajectory {
        let model = SirdModel::new(params).unwrap();
        let grid = TimeGrid::new(params.days, params.samples_per_day);
        Integrator::default().integrate(&model, &grid).unwrap()
    }

    #[test]
    fn test_peak_matches_argmax() {
        let params = Parameters::default();
        let traj = run(&params);
        let metrics = EpidemicMetrics::derive(&params, &traj).unwrap();

        let (argmax, max) = traj
            .infected()
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });

        assert!((metrics.peak_infected - max).abs() < f64::EPSILON);
        assert!((metrics.peak_day - traj.time()[argmax]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_peak_first_occurrence_on_ties() {
        let params = Parameters {
            days: 2,
            ..Parameters::default()
        };
        let mut traj = Trajectory::with_capacity(3);
        let state = crate::model::State {
            susceptible: 900.0,
            infected: 50.0,
            recovered: 40.0,
            deceased: 10.0,
        };
        traj.push(0.0, &state);
        traj.push(1.0, &state);
        traj.push(2.0, &state);

        let metrics = EpidemicMetrics::derive(&params, &traj).unwrap();
        assert!((metrics.peak_day - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reproduction_series() {
        let params = Parameters::default();
        let traj = run(&params);
        let metrics = EpidemicMetrics::derive(&params, &traj).unwrap();

        assert_eq!(metrics.reproduction.len(), traj.len());

        // Rₑ(0) = (β/(γ+μ)) · S(0)/N
        let expected = (0.3 / 0.07) * 999.0 / 1000.0;
        assert!((metrics.initial_reproduction() - expected).abs() < 1e-12);

        // Rₑ is proportional to S, so it never increases
        for pair in metrics.reproduction.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9);
        }
    }

    #[test]
    fn test_attack_rate_bounds() {
        for params in [
            Parameters::default(),
            Parameters::strict_lockdown(),
            Parameters::no_measures(),
        ] {
            let traj = run(&params);
            let metrics = EpidemicMetrics::derive(&params, &traj).unwrap();
            assert!(
                (0.0..=1.0).contains(&metrics.attack_rate),
                "attack rate = {}",
                metrics.attack_rate
            );
        }
    }

    #[test]
    fn test_attack_rate_percent() {
        let metrics = EpidemicMetrics {
            peak_infected: 100.0,
            peak_day: 10.0,
            reproduction: vec![1.0],
            attack_rate: 0.42,
        };
        assert!((metrics.attack_rate_percent() - 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_removal_rejected() {
        let params = Parameters {
            gamma: 0.0,
            mu: 0.0,
            ..Parameters::default()
        };
        let traj = run(&Parameters::default());

        let err = EpidemicMetrics::derive(&params, &traj).unwrap_err();
        assert!(err.is_domain());
        assert!(err.to_string().contains("cannot both be zero"));
    }

    #[test]
    fn test_empty_trajectory_rejected() {
        let params = Parameters::default();
        let empty = Trajectory::with_capacity(0);

        let err = EpidemicMetrics::derive(&params, &empty).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_summary() {
        let params = Parameters::default();
        let traj = run(&params);
        let metrics = EpidemicMetrics::derive(&params, &traj).unwrap();
        let summary = Summary::derive(&traj, &metrics).unwrap();

        let last = traj.final_state().unwrap();
        assert!((summary.final_recovered - last.recovered).abs() < f64::EPSILON);
        assert!((summary.peak_infected - metrics.peak_infected).abs() < f64::EPSILON);

        let text = summary.to_string();
        assert!(text.contains("peak infection"));
        assert!(text.contains("attack rate"));
    }
}
