//! Error types for episim.
//!
//! All fallible operations return `EpiResult<T>` instead of panicking, and
//! numeric degeneracies surface as typed errors rather than NaN or Inf
//! flowing into results.

use thiserror::Error;

/// Result type alias for episim operations.
pub type EpiResult<T> = Result<T, EpiError>;

/// Unified error type for all episim operations.
///
/// # Design
///
/// Two families matter to callers:
/// 1. Domain errors: the parameter combination makes the model
///    mathematically undefined (zero population, no removal process).
/// 2. Validation errors: an input is outside its accepted range and is
///    rejected before any integration starts.
///
/// The remaining variants are integration guards and configuration-layer
/// conversions.
#[derive(Debug, Error)]
pub enum EpiError {
    /// The model is mathematically undefined for these parameters.
    #[error("domain error: {message}")]
    Domain {
        /// What is undefined and why.
        message: String,
    },

    /// An input is outside its accepted range.
    #[error("invalid parameter: {message}")]
    Validation {
        /// Which parameter, its value, and the accepted range.
        message: String,
    },

    /// Numerical instability detected (NaN or Inf) during integration.
    #[error("non-finite value detected at {location}")]
    NonFinite {
        /// Location of the non-finite value (compartment and time).
        location: String,
    },

    /// Population conservation violated beyond tolerance.
    #[error("conservation violated: relative drift {drift:.6e} exceeds tolerance {tolerance:.6e}")]
    Conservation {
        /// Relative deviation of S+I+R+D from the configured population.
        drift: f64,
        /// Allowed relative deviation.
        tolerance: f64,
    },

    /// The adaptive solver could not make progress.
    #[error("solver failure: {message}")]
    Solver {
        /// Description of the failure.
        message: String,
    },

    /// Schema validation failure from the derive-level constraints.
    #[error("validation error: {0}")]
    Schema(#[from] validator::ValidationErrors),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EpiError {
    /// Create a domain error with a message.
    #[must_use]
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
        }
    }

    /// Create a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a solver error with a message.
    #[must_use]
    pub fn solver(message: impl Into<String>) -> Self {
        Self::Solver {
            message: message.into(),
        }
    }

    /// Check if this error means the model is mathematically undefined.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }

    /// Check if this error is an input rejection (range or schema).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Schema(_))
    }

    /// Check if this error was raised by an integration guard.
    #[must_use]
    pub const fn is_guard(&self) -> bool {
        matches!(
            self,
            Self::NonFinite { .. } | Self::Conservation { .. } | Self::Solver { .. }
        )
    }
}
