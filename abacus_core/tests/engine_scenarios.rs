//! End-to-end runs through the façade with the reference catalogue.

use std::sync::Arc;

use abacus_core::{
    catalogue, CalcError, Calculated, CalculationResult, CalculatorDefinition, Engine, EngineConfig, InputBag,
    OutputBag, Registry, RunOptions, ValidationResult, Validator,
};

fn engine() -> Engine {
    let registry = Arc::new(Registry::new());
    catalogue::register_all(&registry).unwrap();
    Engine::new(registry, EngineConfig::default())
}

#[test]
fn out_of_range_property_value_is_rejected_with_one_message() {
    let engine = engine();
    let inputs = InputBag::new()
        .with("propertyValue", 50_000.0)
        .with("squareFootage", 2_500.0);

    let outcome = engine.run("construction-cost", &inputs, RunOptions::default()).unwrap();

    assert!(!outcome.validation.is_valid());
    assert_eq!(
        outcome.validation.error_messages(),
        vec!["Property value must be between $100,000 and $100,000,000"]
    );
    assert!(outcome.result.is_none());
    assert!(outcome.report.is_none());
}

#[test]
fn construction_cost_per_square_foot() {
    let engine = engine();
    let inputs = InputBag::new()
        .with("propertyValue", 500_000.0)
        .with("squareFootage", 2_500.0);

    let outcome = engine.run("construction-cost", &inputs, RunOptions::default()).unwrap();
    assert!(outcome.succeeded());

    let outputs = outcome.result.unwrap().outputs;
    assert!((outputs.number("totalCost").unwrap() - 415_000.0).abs() < 1e-6);
    assert!((outputs.number("costPerSquareFoot").unwrap() - 166.0).abs() < 1e-9);
}

#[test]
fn unknown_calculator_is_an_error_not_a_panic() {
    let engine = engine();

    let err = engine.registry().get("nonexistent-id").unwrap_err();
    assert_eq!(err, CalcError::unknown_calculator("nonexistent-id"));

    let err = engine
        .run("nonexistent-id", &InputBag::new(), RunOptions::default())
        .unwrap_err();
    assert!(matches!(err, CalcError::UnknownCalculator { .. }));
    assert_eq!(err.error_code(), "UNKNOWN_CALCULATOR");
}

#[test]
fn unmodeled_combination_validates_then_fails_to_calculate() {
    let engine = engine();
    let inputs = InputBag::new()
        .with("propertyValue", 150_000.0)
        .with("propertyType", "mobile_home")
        .with("constructionType", "manufactured")
        .with("floodZone", "very_high_risk");

    let validation = engine.validate("home-insurance", &inputs).unwrap();
    assert!(validation.is_valid());

    let err = engine
        .run("home-insurance", &inputs, RunOptions::default())
        .unwrap_err();
    match err {
        CalcError::CalculationFailed { calculator_id, reason } => {
            assert_eq!(calculator_id, "home-insurance");
            assert!(reason.contains("Mobile homes"));
        }
        other => panic!("expected a calculation failure, got {other:?}"),
    }
}

#[test]
fn json_inputs_with_nested_scores() {
    let engine = engine();
    let inputs = InputBag::from_json_str(
        r#"{
            "scores": {"financial": 80, "customer": 70, "process": 60, "learning": 90},
            "samples": 200,
            "seed": 7
        }"#,
    )
    .unwrap();

    let outcome = engine.run("balanced-scorecard", &inputs, RunOptions::default()).unwrap();
    assert!(outcome.validation.is_valid(), "{:?}", outcome.validation.error_messages());

    let result = outcome.result.unwrap();
    assert!((result.outputs.number("overallScore").unwrap() - 74.0).abs() < 1e-9);
    assert_eq!(result.outputs.text("rating").unwrap(), "good");

    // Same seed, same percentiles
    let again = engine.calculate("balanced-scorecard", &inputs).unwrap();
    assert_eq!(result.outputs, again.outputs);
}

#[test]
fn non_object_json_is_rejected_at_the_boundary() {
    let err = InputBag::from_json_str("[1, 2, 3]").unwrap_err();
    assert!(err.is_recoverable());
    assert!(InputBag::from_json_str("{not json").is_err());
}

#[test]
fn report_is_attached_on_request() {
    let engine = engine();
    let inputs = InputBag::new()
        .with("propertyValue", 375_000.0)
        .with("loanAmount", 300_000.0)
        .with("interestRate", 6.0)
        .with("loanTerm", 30.0);

    let plain = engine.run("mortgage-payment", &inputs, RunOptions::default()).unwrap();
    assert!(plain.report.is_none());

    let outcome = engine.run("mortgage-payment", &inputs, RunOptions::with_report()).unwrap();
    assert!(outcome.succeeded());
    assert!(outcome.report.is_some());
    assert!(outcome.report_error.is_none());

    let result = outcome.result.unwrap();
    assert!((result.outputs.number("monthlyPayment").unwrap() - 1_798.65).abs() < 0.01);
    let steps = result.intermediate_steps.unwrap();
    assert_eq!(steps.get("numberOfPayments").map(String::as_str), Some("360"));
}

fn triple_definition() -> CalculatorDefinition {
    CalculatorDefinition::new(
        "triple",
        "Triple",
        "Test",
        |inputs: &InputBag| -> ValidationResult {
            match Validator::new(inputs).require("x", "X is required").checks() {
                Ok(checks) => checks.finish(),
                Err(missing) => missing,
            }
        },
        |inputs: &InputBag| -> abacus_core::CalcResult<Calculated> {
            let x = inputs.number("x")?;
            Ok(CalculationResult::new(OutputBag::new().with("y", x * 3.0)).into())
        },
    )
    .with_report(|_: &InputBag, _: &OutputBag| -> abacus_core::CalcResult<String> {
        Err(CalcError::Internal {
            message: "template missing".to_string(),
        })
    })
}

#[test]
fn custom_calculator_with_failing_report_still_returns_result() {
    let registry = Arc::new(Registry::new());
    registry.register(triple_definition()).unwrap();
    let engine = Engine::new(registry, EngineConfig::default());

    let outcome = engine
        .run("triple", &InputBag::new().with("x", 2.0), RunOptions::with_report())
        .unwrap();

    assert!((outcome.result.as_ref().unwrap().outputs.number("y").unwrap() - 6.0).abs() < 1e-12);
    assert!(outcome.report.is_none());
    assert!(outcome.report_error.unwrap().contains("template missing"));
}

#[test]
fn outcome_round_trips_through_json() {
    let engine = engine();
    let inputs = InputBag::new()
        .with("initialInvestment", 10_000.0)
        .with("finalValue", 12_500.0);

    let outcome = engine.run("roi", &inputs, RunOptions::default()).unwrap();
    let json = serde_json::to_string(&outcome).unwrap();
    let parsed: abacus_core::RunOutcome = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.run_id, outcome.run_id);
    assert_eq!(parsed.calculator_id, "roi");
    assert!((parsed.result.unwrap().outputs.number("roi").unwrap() - 25.0).abs() < 1e-9);
}
