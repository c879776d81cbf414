//! # episim
//!
//! Deterministic SIRD epidemic simulation core.
//!
//! Given a population, per-day transmission/recovery/mortality rates, and
//! initial conditions, episim integrates the SIRD compartmental system over
//! a time horizon and derives the headline epidemiological metrics: peak
//! infection day and magnitude, the effective reproduction number series,
//! and the final attack rate.
//!
//! The crate is the numerical core only. Parameter collection, chart
//! rendering, and page presentation belong to the hosting frontend; the
//! boundary is the in-process API below.
//!
//! ## Example
//!
//! ```rust
//! use episim::prelude::*;
//!
//! let params = Parameters::builder()
//!     .population(10_000)
//!     .beta(0.3)
//!     .gamma(0.1)
//!     .mu(0.01)
//!     .days(120)
//!     .initial_infected(5)
//!     .build();
//!
//! let output = simulate(params).expect("valid parameters");
//! assert!(output.metrics.peak_infected > 0.0);
//! assert!(output.metrics.attack_rate <= 1.0);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names,
    clippy::suboptimal_flops,  // Numerical code choices are intentional
    clippy::missing_const_for_fn,
    clippy::needless_range_loop  // Index loops over fixed-size arrays are clearer
)]

pub mod error;
pub mod grid;
pub mod metrics;
pub mod model;
pub mod params;
pub mod simulation;
pub mod solver;
pub mod trajectory;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{EpiError, EpiResult};
    pub use crate::grid::TimeGrid;
    pub use crate::metrics::{EpidemicMetrics, Summary};
    pub use crate::model::{Derivative, SirdModel, State};
    pub use crate::params::{Parameters, ParametersBuilder};
    pub use crate::simulation::{simulate, Simulation, SimulationOutput};
    pub use crate::solver::{Integrator, Method};
    pub use crate::trajectory::Trajectory;
}

/// Re-export for public API
pub use error::{EpiError, EpiResult};
