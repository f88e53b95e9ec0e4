//! # Calculator Definitions
//!
//! A [`CalculatorDefinition`] is the unit of registration: metadata, input and
//! output schemas, a validate function, a formula and an optional report
//! generator. Definitions are built once, registered once and only read
//! afterwards.
//!
//! ## Result shapes
//!
//! A formula may return a bare [`OutputBag`] or a full [`CalculationResult`]
//! with an explanation and intermediate steps. Both convert into
//! [`Calculated`], and [`CalculatorDefinition::execute`] always hands back the
//! full envelope.
//!
//! ## Example
//!
//! ```rust
//! use abacus_core::calculator::CalculatorDefinition;
//! use abacus_core::schema::FieldSpec;
//! use abacus_core::validation::{ValidationResult, Validator};
//! use abacus_core::values::{InputBag, OutputBag};
//!
//! let def = CalculatorDefinition::new(
//!     "unit-cost",
//!     "Unit Cost",
//!     "Construction",
//!     |inputs: &InputBag| match Validator::new(inputs)
//!         .require("totalCost", "Total cost is required")
//!         .require("units", "Units are required")
//!         .checks()
//!     {
//!         Ok(mut checks) => {
//!             checks.positive("units", "Units must be positive");
//!             checks.finish()
//!         }
//!         Err(missing) => missing,
//!     },
//!     |inputs: &InputBag| {
//!         let cost = inputs.number("totalCost")?;
//!         let units = inputs.number("units")?;
//!         Ok(OutputBag::new().with("costPerUnit", cost / units).into())
//!     },
//! )
//! .with_inputs(vec![
//!     FieldSpec::number("totalCost", "Total Cost").required(),
//!     FieldSpec::number("units", "Units").required(),
//! ]);
//!
//! let inputs = InputBag::new().with("totalCost", 415_000.0).with("units", 2_500.0);
//! assert!(def.validate(&inputs).is_valid());
//! let result = def.execute(&inputs).unwrap();
//! assert_eq!(result.outputs.number("costPerUnit").unwrap(), 166.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::schema::FieldSpec;
use crate::validation::ValidationResult;
use crate::values::{InputBag, OutputBag, Value};

/// Validation function of a calculator
pub type ValidateFn = Arc<dyn Fn(&InputBag) -> ValidationResult + Send + Sync>;

/// Formula of a calculator
pub type CalculateFn = Arc<dyn Fn(&InputBag) -> CalcResult<Calculated> + Send + Sync>;

/// Report generator of a calculator
pub type ReportFn = Arc<dyn Fn(&InputBag, &OutputBag) -> CalcResult<String> + Send + Sync>;

/// The envelope every successful calculation is normalized into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub outputs: OutputBag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Named intermediate values, in insertion-independent (sorted) order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_steps: Option<BTreeMap<String, String>>,
}

impl CalculationResult {
    pub fn new(outputs: OutputBag) -> Self {
        Self {
            outputs,
            explanation: None,
            intermediate_steps: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Record one intermediate step
    pub fn with_step(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.intermediate_steps
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// What a formula may return: either result shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Calculated {
    Outputs(OutputBag),
    Envelope(CalculationResult),
}

impl Calculated {
    /// Normalize into the envelope; explanation and steps stay absent for bare bags.
    pub fn into_result(self) -> CalculationResult {
        match self {
            Calculated::Outputs(outputs) => CalculationResult::new(outputs),
            Calculated::Envelope(result) => result,
        }
    }
}

impl From<OutputBag> for Calculated {
    fn from(outputs: OutputBag) -> Self {
        Calculated::Outputs(outputs)
    }
}

impl From<CalculationResult> for Calculated {
    fn from(result: CalculationResult) -> Self {
        Calculated::Envelope(result)
    }
}

/// Expected value of one output in a worked example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedOutput {
    pub field: String,
    pub value: f64,
    /// Absolute tolerance
    pub tolerance: f64,
}

/// A named, worked example input set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorExample {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub inputs: InputBag,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected: Vec<ExpectedOutput>,
}

impl CalculatorExample {
    pub fn new(name: impl Into<String>, inputs: InputBag) -> Self {
        Self {
            name: name.into(),
            description: None,
            inputs,
            expected: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Expect `field` to equal `value` within `tolerance`
    pub fn expect(mut self, field: impl Into<String>, value: f64, tolerance: f64) -> Self {
        self.expected.push(ExpectedOutput {
            field: field.into(),
            value,
            tolerance,
        });
        self
    }
}

/// Serializable view of a definition without its functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related: Vec<String>,
    pub inputs: Vec<FieldSpec>,
    pub outputs: Vec<FieldSpec>,
    pub has_report: bool,
    pub stochastic: bool,
    #[serde(default)]
    pub examples: Vec<CalculatorExample>,
}

/// The unit of registration.
#[derive(Clone)]
pub struct CalculatorDefinition {
    /// Globally unique registry key
    pub id: String,
    pub name: String,
    /// Free-form classification
    pub category: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    /// Ids of related calculators
    pub related: Vec<String>,
    pub inputs: Vec<FieldSpec>,
    pub outputs: Vec<FieldSpec>,
    pub examples: Vec<CalculatorExample>,
    /// Outputs come from random sampling and are not bit-reproducible
    pub stochastic: bool,
    validate: ValidateFn,
    calculate: CalculateFn,
    report: Option<ReportFn>,
}

impl CalculatorDefinition {
    pub fn new<V, C>(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        validate: V,
        calculate: C,
    ) -> Self
    where
        V: Fn(&InputBag) -> ValidationResult + Send + Sync + 'static,
        C: Fn(&InputBag) -> CalcResult<Calculated> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            subcategory: None,
            description: String::new(),
            tags: Vec::new(),
            related: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            examples: Vec::new(),
            stochastic: false,
            validate: Arc::new(validate),
            calculate: Arc::new(calculate),
            report: None,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_related(mut self, related: &[&str]) -> Self {
        self.related = related.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<FieldSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<FieldSpec>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_example(mut self, example: CalculatorExample) -> Self {
        self.examples.push(example);
        self
    }

    pub fn with_report<R>(mut self, report: R) -> Self
    where
        R: Fn(&InputBag, &OutputBag) -> CalcResult<String> + Send + Sync + 'static,
    {
        self.report = Some(Arc::new(report));
        self
    }

    pub fn stochastic(mut self) -> Self {
        self.stochastic = true;
        self
    }

    pub fn has_report(&self) -> bool {
        self.report.is_some()
    }

    /// Run this calculator's own validation.
    pub fn validate(&self, inputs: &InputBag) -> ValidationResult {
        (self.validate)(inputs)
    }

    /// Run the formula and normalize its result.
    ///
    /// Does not validate first. Any failure, and any non-finite numeric
    /// output, becomes [`CalcError::CalculationFailed`] for this calculator.
    pub fn execute(&self, inputs: &InputBag) -> CalcResult<CalculationResult> {
        let result = (self.calculate)(inputs)
            .map_err(|err| self.as_calculation_error(err))?
            .into_result();

        if let Some((field, _)) = result
            .outputs
            .iter()
            .find(|(_, v)| matches!(v, Value::Number(n) if !n.is_finite()))
        {
            return Err(CalcError::calculation_failed(
                &self.id,
                format!("Output '{}' is not a finite number", field),
            ));
        }
        Ok(result)
    }

    /// Run the report generator, if any.
    pub fn generate_report(&self, inputs: &InputBag, outputs: &OutputBag) -> Option<CalcResult<String>> {
        self.report.as_ref().map(|report| {
            report(inputs, outputs).map_err(|err| match err {
                CalcError::ReportFailed { .. } => err,
                other => CalcError::report_failed(&self.id, other.to_string()),
            })
        })
    }

    fn as_calculation_error(&self, err: CalcError) -> CalcError {
        match err {
            CalcError::CalculationFailed { .. } => err,
            other => CalcError::calculation_failed(&self.id, other.to_string()),
        }
    }

    /// Metadata without the functions, for listings and JSON output
    pub fn summary(&self) -> CalculatorSummary {
        CalculatorSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            related: self.related.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            has_report: self.has_report(),
            stochastic: self.stochastic,
            examples: self.examples.clone(),
        }
    }
}

impl fmt::Debug for CalculatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("has_report", &self.has_report())
            .field("stochastic", &self.stochastic)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio_calculator() -> CalculatorDefinition {
        CalculatorDefinition::new(
            "ratio",
            "Ratio",
            "Math",
            |_inputs: &InputBag| ValidationResult::valid(),
            |inputs: &InputBag| {
                let a = inputs.number("a")?;
                let b = inputs.number("b")?;
                Ok(OutputBag::new().with("ratio", a / b).into())
            },
        )
    }

    #[test]
    fn test_bare_outputs_normalize_to_envelope() {
        let def = ratio_calculator();
        let inputs = InputBag::new().with("a", 6.0).with("b", 3.0);
        let result = def.execute(&inputs).unwrap();
        assert_eq!(result.outputs.number("ratio").unwrap(), 2.0);
        assert!(result.explanation.is_none());
        assert!(result.intermediate_steps.is_none());
    }

    #[test]
    fn test_envelope_passes_through() {
        let def = CalculatorDefinition::new(
            "explained",
            "Explained",
            "Math",
            |_: &InputBag| ValidationResult::valid(),
            |_: &InputBag| {
                Ok(CalculationResult::new(OutputBag::new().with("x", 1.0))
                    .with_explanation("x is one")
                    .with_step("seed", "1")
                    .into())
            },
        );
        let result = def.execute(&InputBag::new()).unwrap();
        assert_eq!(result.explanation.as_deref(), Some("x is one"));
        assert_eq!(result.intermediate_steps.unwrap().get("seed").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_formula_errors_become_calculation_failures() {
        let def = ratio_calculator();
        // Skipping validation: "b" is missing
        let err = def.execute(&InputBag::new().with("a", 1.0)).unwrap_err();
        match err {
            CalcError::CalculationFailed { calculator_id, reason } => {
                assert_eq!(calculator_id, "ratio");
                assert!(reason.contains("b"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_output_is_a_calculation_failure() {
        let def = ratio_calculator();
        let err = def.execute(&InputBag::new().with("a", 1.0).with("b", 0.0)).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
        assert!(err.to_string().contains("ratio"));
    }

    #[test]
    fn test_report_errors_are_attributed() {
        let def = ratio_calculator().with_report(|_, _| Err(CalcError::missing_field("a")));
        let outcome = def.generate_report(&InputBag::new(), &OutputBag::new()).unwrap();
        assert_eq!(outcome.unwrap_err().error_code(), "REPORT_FAILED");

        assert!(ratio_calculator().generate_report(&InputBag::new(), &OutputBag::new()).is_none());
    }

    #[test]
    fn test_summary_serializes_without_functions() {
        let def = ratio_calculator()
            .with_tags(&["math", "ratio"])
            .with_inputs(vec![FieldSpec::number("a", "A").required()]);
        let json = serde_json::to_string(&def.summary()).unwrap();
        assert!(json.contains("\"id\":\"ratio\""));
        assert!(json.contains("\"has_report\":false"));
        assert!(json.contains("\"tags\":[\"math\",\"ratio\"]"));
    }
}
