//! One-shot simulation façade: validate, integrate, derive.
//!
//! Each run is a pure function of its parameters. There is no shared
//! solver state and no cache, so concurrent sessions are isolated by
//! construction and repeat runs are bitwise identical.

use log::debug;

use crate::error::EpiResult;
use crate::grid::TimeGrid;
use crate::metrics::{EpidemicMetrics, Summary};
use crate::model::SirdModel;
use crate::params::Parameters;
use crate::solver::{Integrator, Method};
use crate::trajectory::Trajectory;

/// A validated, ready-to-run simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: Parameters,
    integrator: Integrator,
}

impl Simulation {
    /// Create a simulation with the default integrator.
    ///
    /// # Errors
    ///
    /// Returns `Domain` or `Validation` if the parameters are rejected.
    pub fn new(params: Parameters) -> EpiResult<Self> {
        Self::with_integrator(params, Integrator::default())
    }

    /// Create a simulation with an explicit integration method.
    ///
    /// # Errors
    ///
    /// Returns `Domain` or `Validation` if the parameters are rejected.
    pub fn with_method(params: Parameters, method: Method) -> EpiResult<Self> {
        Self::with_integrator(params, Integrator::new(method))
    }

    /// Create a simulation with a fully configured integrator.
    ///
    /// # Errors
    ///
    /// Returns `Domain` or `Validation` if the parameters are rejected.
    pub fn with_integrator(params: Parameters, integrator: Integrator) -> EpiResult<Self> {
        params.check()?;

        Ok(Self { params, integrator })
    }

    /// The validated parameters.
    #[must_use]
    pub const fn params(&self) -> &Parameters {
        &self.params
    }

    /// Integrate the trajectory and derive all metrics.
    ///
    /// # Errors
    ///
    /// Returns `Domain` if the model or the reproduction number is
    /// undefined for these parameters, or a guard error if integration
    /// fails numerically. On any error no partial output is returned.
    pub fn run(&self) -> EpiResult<SimulationOutput> {
        let model = SirdModel::new(&self.params)?;
        let grid = TimeGrid::new(self.params.days, self.params.samples_per_day);

        debug!(
            "integrating {} days at {}/day ({} points)",
            self.params.days,
            self.params.samples_per_day,
            grid.len()
        );

        let trajectory = self.integrator.integrate(&model, &grid)?;
        let metrics = EpidemicMetrics::derive(&self.params, &trajectory)?;

        Ok(SimulationOutput {
            trajectory,
            metrics,
        })
    }
}

/// The full result of one run: trajectory plus derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    /// Compartment series on the output grid.
    pub trajectory: Trajectory,
    /// Metrics derived from the trajectory.
    pub metrics: EpidemicMetrics,
}

impl SimulationOutput {
    /// Final-count summary for display.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the trajectory is empty; a completed run
    /// never is.
    pub fn summary(&self) -> EpiResult<Summary> {
        Summary::derive(&self.trajectory, &self.metrics)
    }
}

/// Validate, integrate, and derive in one call.
///
/// # Errors
///
/// Propagates every rejection and guard error from the stages above.
pub fn simulate(params: Parameters) -> EpiResult<SimulationOutput> {
    Simulation::new(params)?.run()
}
