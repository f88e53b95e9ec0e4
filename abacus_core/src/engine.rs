//! # Calculator Façade
//!
//! [`Engine`] is the single entry point callers use: look a calculator up,
//! validate raw inputs, calculate, and optionally generate a report.
//!
//! ```text
//! run(id, inputs)
//!   lookup ──── not found ──> Err(UnknownCalculator)
//!   validate ── invalid ────> Ok(outcome without result)
//!   calculate ─ fails ──────> Err(CalculationFailed)
//!   report ──── fails ──────> Ok(outcome with result, report_error)
//!   └──────────────────────> Ok(outcome with result [and report])
//! ```
//!
//! Validation failures are data, calculation failures are errors.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use abacus_core::{catalogue, Engine, EngineConfig, InputBag, Registry, RunOptions};
//!
//! let registry = Arc::new(Registry::new());
//! catalogue::register_all(&registry).unwrap();
//! let engine = Engine::new(registry, EngineConfig::default());
//!
//! let inputs = InputBag::new()
//!     .with("propertyValue", 500_000.0)
//!     .with("squareFootage", 2_500.0);
//! let outcome = engine.run("construction-cost", &inputs, RunOptions::default()).unwrap();
//! assert!(outcome.validation.is_valid());
//! let result = outcome.result.unwrap();
//! assert!((result.outputs.number("costPerSquareFoot").unwrap() - 166.0).abs() < 1e-9);
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::calculator::{CalculationResult, CalculatorDefinition};
use crate::config::EngineConfig;
use crate::errors::CalcResult;
use crate::registry::Registry;
use crate::validation::{schema_advisories, ValidationResult};
use crate::values::{InputBag, OutputBag};

/// Per-invocation options for [`Engine::run`].
///
/// `None` falls back to the engine's `[run]` configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_report: Option<bool>,
}

impl RunOptions {
    pub fn with_report() -> Self {
        Self { with_report: Some(true) }
    }

    pub fn without_report() -> Self {
        Self { with_report: Some(false) }
    }
}

/// Everything one `run` produced.
///
/// `result` is present iff validation passed. `report` and `report_error`
/// are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub calculator_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub validation: ValidationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_error: Option<String>,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_some()
    }
}

/// Calculator façade over a shared registry.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(registry: Arc<Registry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate raw inputs against a calculator.
    ///
    /// The only error is an unknown id; an invalid bag is an `Ok` result
    /// with `is_valid == false`.
    pub fn validate(&self, calculator_id: &str, inputs: &InputBag) -> CalcResult<ValidationResult> {
        let definition = self.registry.get(calculator_id)?;
        Ok(self.validate_with(&definition, &definition_inputs(&definition, inputs)))
    }

    /// Run the formula without validating first.
    pub fn calculate(&self, calculator_id: &str, inputs: &InputBag) -> CalcResult<CalculationResult> {
        let definition = self.registry.get(calculator_id)?;
        definition.execute(&definition_inputs(&definition, inputs))
    }

    /// Run the report generator on a finished calculation.
    ///
    /// `Ok(None)` when the calculator has no report generator.
    pub fn report(&self, calculator_id: &str, inputs: &InputBag, outputs: &OutputBag) -> CalcResult<Option<String>> {
        let definition = self.registry.get(calculator_id)?;
        definition
            .generate_report(&definition_inputs(&definition, inputs), outputs)
            .transpose()
    }

    /// Lookup, validate, calculate and optionally report.
    #[instrument(skip(self, inputs, options), fields(run_id = tracing::field::Empty))]
    pub fn run(&self, calculator_id: &str, inputs: &InputBag, options: RunOptions) -> CalcResult<RunOutcome> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let definition = self.registry.get(calculator_id)?;
        let inputs = definition_inputs(&definition, inputs);

        let mut outcome = RunOutcome {
            run_id,
            calculator_id: definition.id.clone(),
            evaluated_at: Utc::now(),
            validation: self.validate_with(&definition, &inputs),
            result: None,
            report: None,
            report_error: None,
        };

        if !outcome.validation.is_valid() {
            debug!(errors = outcome.validation.errors().len(), "validation rejected inputs");
            return Ok(outcome);
        }

        let result = definition.execute(&inputs).inspect_err(|err| {
            warn!(error = %err, "calculation failed");
        })?;

        if options.with_report.unwrap_or(self.config.run.with_report) {
            match definition.generate_report(&inputs, &result.outputs) {
                Some(Ok(report)) => outcome.report = Some(report),
                Some(Err(err)) => {
                    warn!(error = %err, "report generation failed");
                    outcome.report_error = Some(err.to_string());
                }
                None => {}
            }
        }

        outcome.result = Some(result);
        Ok(outcome)
    }

    fn validate_with(&self, definition: &CalculatorDefinition, inputs: &InputBag) -> ValidationResult {
        let mut validation = definition.validate(inputs);
        if self.config.run.schema_warnings {
            validation.extend_warnings(schema_advisories(&definition.inputs, inputs));
        }
        validation
    }
}

/// Inputs with enum fields tagged per the calculator's schema.
fn definition_inputs(definition: &CalculatorDefinition, inputs: &InputBag) -> InputBag {
    inputs.conform(&definition.inputs)
}
