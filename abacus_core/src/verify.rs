//! # Catalogue Self-Check
//!
//! Runs every worked example of every registered calculator through the
//! engine, compares the outputs it expects within tolerance, and lints each
//! definition's schema.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use abacus_core::{catalogue, verify, Engine, EngineConfig, Registry};
//!
//! let registry = Arc::new(Registry::new());
//! catalogue::register_all(&registry).unwrap();
//! let report = verify::check_catalogue(&Engine::new(registry, EngineConfig::default()));
//! assert!(report.all_passed(), "{:#?}", report);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculator::{CalculatorDefinition, CalculatorExample};
use crate::engine::{Engine, RunOptions};
use crate::schema::{duplicate_ids, ValueType};

/// Outcome for one calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    /// An example ran but produced unexpected outputs, or the schema has lint
    Fail,
    /// An example could not be run at all
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorCheck {
    pub calculator_id: String,
    pub status: CheckStatus,
    pub examples_run: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// Serializable result of a full catalogue check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueReport {
    pub calculators: Vec<CalculatorCheck>,
}

impl CatalogueReport {
    pub fn all_passed(&self) -> bool {
        self.calculators.iter().all(|c| c.status == CheckStatus::Pass)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.calculators.iter().filter(|c| c.status == status).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CalculatorCheck> {
        self.calculators.iter().filter(|c| c.status != CheckStatus::Pass)
    }
}

/// Check every registered calculator.
pub fn check_catalogue(engine: &Engine) -> CatalogueReport {
    let calculators = engine
        .registry()
        .list()
        .iter()
        .map(|definition| check_calculator(engine, definition))
        .collect();
    CatalogueReport { calculators }
}

fn check_calculator(engine: &Engine, definition: &CalculatorDefinition) -> CalculatorCheck {
    let mut issues = lint_schema(definition);
    let mut status = if issues.is_empty() { CheckStatus::Pass } else { CheckStatus::Fail };

    for example in &definition.examples {
        match run_example(engine, definition, example) {
            Ok(mismatches) if mismatches.is_empty() => {}
            Ok(mismatches) => {
                if status == CheckStatus::Pass {
                    status = CheckStatus::Fail;
                }
                issues.extend(mismatches);
            }
            Err(problem) => {
                status = CheckStatus::Error;
                issues.push(problem);
            }
        }
    }

    if status == CheckStatus::Pass {
        debug!(calculator_id = %definition.id, examples = definition.examples.len(), "calculator passed");
    } else {
        warn!(calculator_id = %definition.id, ?status, issues = issues.len(), "calculator check failed");
    }

    CalculatorCheck {
        calculator_id: definition.id.clone(),
        status,
        examples_run: definition.examples.len(),
        issues,
    }
}

/// Mismatched expectations, or `Err` when the example did not produce a result.
fn run_example(
    engine: &Engine,
    definition: &CalculatorDefinition,
    example: &CalculatorExample,
) -> Result<Vec<String>, String> {
    let outcome = engine
        .run(&definition.id, &example.inputs, RunOptions::with_report())
        .map_err(|err| format!("Example '{}': {}", example.name, err))?;

    let Some(result) = outcome.result else {
        return Err(format!(
            "Example '{}' failed validation: {}",
            example.name,
            outcome.validation.error_messages().join("; ")
        ));
    };

    let mut mismatches = Vec::new();
    if let Some(report_error) = outcome.report_error {
        mismatches.push(format!("Example '{}': {}", example.name, report_error));
    }
    for expected in &example.expected {
        match result.outputs.number(&expected.field) {
            Ok(actual) if (actual - expected.value).abs() <= expected.tolerance => {}
            Ok(actual) => mismatches.push(format!(
                "Example '{}': {} = {} (expected {} ± {})",
                example.name, expected.field, actual, expected.value, expected.tolerance
            )),
            Err(err) => mismatches.push(format!("Example '{}': {}", example.name, err)),
        }
    }
    Ok(mismatches)
}

/// Schema problems in one definition.
pub fn lint_schema(definition: &CalculatorDefinition) -> Vec<String> {
    let mut issues = Vec::new();

    for id in duplicate_ids(&definition.inputs) {
        issues.push(format!("Duplicate input id '{}'", id));
    }
    for id in duplicate_ids(&definition.outputs) {
        issues.push(format!("Duplicate output id '{}'", id));
    }

    for field in definition.inputs.iter().chain(definition.outputs.iter()) {
        let c = &field.constraints;
        if field.value_type == ValueType::Enum && c.options.is_empty() {
            issues.push(format!("Enum field '{}' declares no options", field.id));
        }
        if field.value_type != ValueType::Enum && !c.options.is_empty() {
            issues.push(format!("Field '{}' declares options but is not an enum", field.id));
        }
        if let (Some(min), Some(max)) = (c.min, c.max) {
            if min > max {
                issues.push(format!("Field '{}' has min {} above max {}", field.id, min, max));
            }
        }
    }

    for example in &definition.examples {
        for field in definition.inputs.iter().filter(|f| f.required) {
            if !example.inputs.is_present(&field.id) {
                issues.push(format!(
                    "Example '{}' is missing required input '{}'",
                    example.name, field.id
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalogue;
    use crate::config::EngineConfig;
    use crate::errors::CalcError;
    use crate::registry::{DuplicatePolicy, Registry};
    use crate::schema::FieldSpec;
    use crate::validation::ValidationResult;
    use crate::values::{InputBag, OutputBag};

    fn engine_with(definitions: Vec<CalculatorDefinition>) -> Engine {
        let registry = Arc::new(Registry::with_policy(DuplicatePolicy::Reject));
        for definition in definitions {
            registry.register(definition).unwrap();
        }
        Engine::new(registry, EngineConfig::default())
    }

    fn doubler() -> CalculatorDefinition {
        CalculatorDefinition::new(
            "doubler",
            "Doubler",
            "Math",
            |_: &InputBag| ValidationResult::valid(),
            |inputs: &InputBag| Ok(OutputBag::new().with("y", inputs.number("x")? * 2.0).into()),
        )
        .with_inputs(vec![FieldSpec::number("x", "X").required()])
    }

    #[test]
    fn test_catalogue_passes() {
        let registry = Arc::new(Registry::new());
        catalogue::register_all(&registry).unwrap();
        let report = check_catalogue(&Engine::new(registry, EngineConfig::default()));
        assert!(report.all_passed(), "{:#?}", report);
        assert_eq!(report.count(CheckStatus::Pass), 6);
    }

    #[test]
    fn test_wrong_expectation_fails() {
        let def = doubler().with_example(
            CalculatorExample::new("off by one", InputBag::new().with("x", 2.0)).expect("y", 5.0, 0.1),
        );
        let report = check_catalogue(&engine_with(vec![def]));
        assert_eq!(report.calculators[0].status, CheckStatus::Fail);
        assert!(report.calculators[0].issues[0].contains("y = 4"));
    }

    #[test]
    fn test_failing_calculation_is_error() {
        let def = CalculatorDefinition::new(
            "broken",
            "Broken",
            "Math",
            |_: &InputBag| ValidationResult::valid(),
            |_: &InputBag| Err(CalcError::calculation_failed("broken", "always")),
        )
        .with_example(CalculatorExample::new("any", InputBag::new()));
        let report = check_catalogue(&engine_with(vec![def]));
        assert_eq!(report.calculators[0].status, CheckStatus::Error);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_schema_lint() {
        let def = doubler()
            .with_inputs(vec![
                FieldSpec::number("x", "X").required().range(10.0, 1.0),
                FieldSpec::number("x", "X again"),
                FieldSpec::new("kind", "Kind", ValueType::Enum),
                FieldSpec::choice("size", "Size", &["s", "m"]).required(),
            ])
            .with_example(CalculatorExample::new("partial", InputBag::new().with("x", 1.0)));
        let mut choice_on_number = FieldSpec::number("n", "N");
        choice_on_number.constraints.options = FieldSpec::choice("n", "N", &["a"]).constraints.options;
        let def = def.with_outputs(vec![choice_on_number]);

        let issues = lint_schema(&def);
        assert_eq!(
            issues,
            vec![
                "Duplicate input id 'x'",
                "Field 'x' has min 10 above max 1",
                "Enum field 'kind' declares no options",
                "Field 'n' declares options but is not an enum",
                "Example 'partial' is missing required input 'size'",
            ]
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = check_catalogue(&engine_with(vec![doubler()]));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"pass\""));
    }
}
