//! Simulation parameters: schema validation, semantic validation, scenario
//! presets, and YAML loading.
//!
//! A `Parameters` value is immutable once validated and fully determines a
//! simulation run. Mistake-proofing happens in two layers:
//! - Derive-level range constraints via the validator schema
//! - A semantic pass for cross-field rules the schema cannot express

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{EpiError, EpiResult};

/// Default output resolution in samples per day.
///
/// A sampling choice, not a model constant: it controls output density
/// only, never the solver's internal step size.
pub const DEFAULT_SAMPLES_PER_DAY: u32 = 10;

const fn default_samples_per_day() -> u32 {
    DEFAULT_SAMPLES_PER_DAY
}

/// Immutable parameter set for one simulation run.
///
/// All rates are per-capita, per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    /// Total population N.
    pub population: u64,

    /// Transmission rate β: per-contact probability-rate of transmission.
    #[validate(range(min = 0.0, max = 1.0))]
    pub beta: f64,

    /// Recovery rate γ: per-capita rate of transition to recovered.
    #[validate(range(min = 0.0, max = 1.0))]
    pub gamma: f64,

    /// Mortality rate μ: per-capita rate of transition to deceased.
    #[validate(range(min = 0.0, max = 0.1))]
    pub mu: f64,

    /// Simulation duration in days.
    #[validate(range(min = 1, max = 365))]
    pub days: u32,

    /// Initial infected count I0.
    pub initial_infected: u64,

    /// Output samples per day.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_samples_per_day")]
    pub samples_per_day: u32,
}

impl Default for Parameters {
    /// The custom-scenario defaults of the interactive frontend.
    fn default() -> Self {
        Self {
            population: 1000,
            beta: 0.3,
            gamma: 0.05,
            mu: 0.02,
            days: 160,
            initial_infected: 1,
            samples_per_day: DEFAULT_SAMPLES_PER_DAY,
        }
    }
}

impl Parameters {
    /// Strict lockdown: low transmission, fast removal.
    #[must_use]
    pub fn strict_lockdown() -> Self {
        Self {
            beta: 0.2,
            gamma: 0.2,
            mu: 0.01,
            ..Self::default()
        }
    }

    /// No measures: high transmission, slow removal.
    #[must_use]
    pub fn no_measures() -> Self {
        Self {
            beta: 0.7,
            gamma: 0.1,
            mu: 0.02,
            ..Self::default()
        }
    }

    /// Progressive vaccination: moderate transmission, raised removal.
    #[must_use]
    pub fn progressive_vaccination() -> Self {
        Self {
            beta: 0.5,
            gamma: 0.15,
            mu: 0.015,
            ..Self::default()
        }
    }

    /// Disable mortality (μ = 0), reducing the model to classical SIR.
    #[must_use]
    pub fn without_mortality(mut self) -> Self {
        self.mu = 0.0;
        self
    }

    /// Create a builder for programmatic construction.
    #[must_use]
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::default()
    }

    /// Load parameters from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, YAML parsing fails, or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> EpiResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse parameters from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> EpiResult<Self> {
        let params: Self = serde_yaml::from_str(yaml)?;
        params.check()?;
        Ok(params)
    }

    /// Validate all constraints: schema ranges plus cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns `Domain` if the population is zero, `Schema` for range
    /// violations, and `Validation` for cross-field violations.
    pub fn check(&self) -> EpiResult<()> {
        if self.population == 0 {
            return Err(EpiError::domain("population must be positive"));
        }

        self.validate()?;
        self.validate_semantic()
    }

    /// Cross-field rules beyond the schema.
    fn validate_semantic(&self) -> EpiResult<()> {
        if self.initial_infected < 1 {
            return Err(EpiError::validation(
                "initial infected count must be at least 1",
            ));
        }
        if self.initial_infected > self.population {
            return Err(EpiError::validation(format!(
                "initial infected count {} exceeds population {}",
                self.initial_infected, self.population
            )));
        }

        Ok(())
    }

    /// Combined removal rate γ + μ.
    #[must_use]
    pub fn removal_rate(&self) -> f64 {
        self.gamma + self.mu
    }

    /// Basic reproduction number R0 = β / (γ + μ).
    ///
    /// # Errors
    ///
    /// Returns `Domain` if γ + μ = 0: with no removal process there is no
    /// well-defined reproduction number.
    pub fn basic_reproduction_number(&self) -> EpiResult<f64> {
        let removal = self.removal_rate();
        if removal <= 0.0 {
            return Err(EpiError::domain(
                "recovery and mortality rate cannot both be zero",
            ));
        }

        Ok(self.beta / removal)
    }

    /// Herd immunity threshold 1 − 1/R0.
    ///
    /// # Errors
    ///
    /// Returns `Domain` if γ + μ = 0.
    pub fn herd_immunity_threshold(&self) -> EpiResult<f64> {
        Ok(1.0 - 1.0 / self.basic_reproduction_number()?)
    }
}

/// Parameter builder for programmatic construction.
///
/// Unset fields fall back to the custom-scenario defaults. Validation
/// happens when the parameters are used, not at build time.
#[derive(Debug, Default)]
pub struct ParametersBuilder {
    population: Option<u64>,
    beta: Option<f64>,
    gamma: Option<f64>,
    mu: Option<f64>,
    days: Option<u32>,
    initial_infected: Option<u64>,
    samples_per_day: Option<u32>,
}

impl ParametersBuilder {
    /// Set the total population.
    #[must_use]
    pub const fn population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }

    /// Set the transmission rate β.
    #[must_use]
    pub const fn beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    /// Set the recovery rate γ.
    #[must_use]
    pub const fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Set the mortality rate μ.
    #[must_use]
    pub const fn mu(mut self, mu: f64) -> Self {
        self.mu = Some(mu);
        self
    }

    /// Set the simulation duration in days.
    #[must_use]
    pub const fn days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    /// Set the initial infected count.
    #[must_use]
    pub const fn initial_infected(mut self, initial_infected: u64) -> Self {
        self.initial_infected = Some(initial_infected);
        self
    }

    /// Set the output samples per day.
    #[must_use]
    pub const fn samples_per_day(mut self, samples_per_day: u32) -> Self {
        self.samples_per_day = Some(samples_per_day);
        self
    }

    /// Build the parameter set.
    #[must_use]
    pub fn build(self) -> Parameters {
        let defaults = Parameters::default();

        Parameters {
            population: self.population.unwrap_or(defaults.population),
            beta: self.beta.unwrap_or(defaults.beta),
            gamma: self.gamma.unwrap_or(defaults.gamma),
            mu: self.mu.unwrap_or(defaults.mu),
            days: self.days.unwrap_or(defaults.days),
            initial_infected: self.initial_infected.unwrap_or(defaults.initial_infected),
            samples_per_day: self.samples_per_day.unwrap_or(defaults.samples_per_day),
        }
    }
}
