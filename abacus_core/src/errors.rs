//! # Error Types
//!
//! Structured error types for abacus_core. Every failure the engine can
//! surface is a variant of [`CalcError`], so callers can match on it or ship
//! it across a process boundary as JSON.
//!
//! Validation failures are *not* errors: they come back as data in a
//! [`ValidationResult`](crate::validation::ValidationResult). Only lookup,
//! calculation, report, configuration and boundary problems live here.
//!
//! ## Example
//!
//! ```rust
//! use abacus_core::errors::{CalcError, CalcResult};
//!
//! fn monthly_rate(annual_pct: f64) -> CalcResult<f64> {
//!     if !annual_pct.is_finite() {
//!         return Err(CalcError::calculation_failed(
//!             "mortgage-payment",
//!             "Interest rate is not a finite number",
//!         ));
//!     }
//!     Ok(annual_pct / 100.0 / 12.0)
//! }
//!
//! assert!(monthly_rate(f64::NAN).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for abacus_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for engine operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// No calculator is registered under the requested id
    #[error("Unknown calculator: '{calculator_id}'")]
    UnknownCalculator { calculator_id: String },

    /// A calculator id was registered twice under the reject policy
    #[error("Calculator '{calculator_id}' is already registered")]
    DuplicateCalculator { calculator_id: String },

    /// Raw input could not be turned into an input bag (not an object, bad value)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A typed getter was asked for a field the bag does not hold
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The formula rejected individually valid inputs, or broke an invariant
    #[error("Calculation failed: {calculator_id} - {reason}")]
    CalculationFailed {
        calculator_id: String,
        reason: String,
    },

    /// The report generator failed; never fatal to a run
    #[error("Report generation failed: {calculator_id} - {reason}")]
    ReportFailed {
        calculator_id: String,
        reason: String,
    },

    /// Configuration could not be parsed
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    Io {
        operation: String,
        path: String,
        reason: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an UnknownCalculator error
    pub fn unknown_calculator(calculator_id: impl Into<String>) -> Self {
        CalcError::UnknownCalculator {
            calculator_id: calculator_id.into(),
        }
    }

    /// Create a DuplicateCalculator error
    pub fn duplicate_calculator(calculator_id: impl Into<String>) -> Self {
        CalcError::DuplicateCalculator {
            calculator_id: calculator_id.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField { field: field.into() }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculator_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculator_id: calculator_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a ReportFailed error
    pub fn report_failed(calculator_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ReportFailed {
            calculator_id: calculator_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a Config error
    pub fn config(reason: impl Into<String>) -> Self {
        CalcError::Config { reason: reason.into() }
    }

    /// Create an Io error
    pub fn io(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Io {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller can fix this by changing the input and resubmitting.
    ///
    /// Calculations are deterministic, so a `CalculationFailed` retried with
    /// the same input fails the same way.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::InvalidInput { .. } | CalcError::MissingField { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::UnknownCalculator { .. } => "UNKNOWN_CALCULATOR",
            CalcError::DuplicateCalculator { .. } => "DUPLICATE_CALCULATOR",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::ReportFailed { .. } => "REPORT_FAILED",
            CalcError::Config { .. } => "CONFIG_ERROR",
            CalcError::Serialization { .. } => "SERIALIZATION_ERROR",
            CalcError::Io { .. } => "IO_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::Serialization { reason: err.to_string() }
    }
}
