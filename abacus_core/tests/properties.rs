//! Property tests over the reference catalogue.

use std::sync::Arc;

use proptest::prelude::*;

use abacus_core::catalogue::{home_insurance, mortgage_payment};
use abacus_core::schema::required_ids;
use abacus_core::{
    catalogue, Calculated, CalculationResult, CalculatorDefinition, DuplicatePolicy, Engine, EngineConfig, InputBag,
    OutputBag, Registry, ValidationResult,
};

fn engine() -> Engine {
    let registry = Arc::new(Registry::new());
    catalogue::register_all(&registry).unwrap();
    Engine::new(registry, EngineConfig::default())
}

fn id_string() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9-]{0,23}").unwrap()
}

fn construction_inputs() -> impl Strategy<Value = InputBag> {
    (
        100_000.0..=100_000_000.0f64,
        100.0..=1_000_000.0f64,
        prop::sample::select(vec!["economy", "standard", "premium", "luxury"]),
        prop::sample::select(vec!["national", "northeast", "south", "midwest", "west"]),
        0.0..=50.0f64,
    )
        .prop_map(|(value, sqft, grade, region, contingency)| {
            InputBag::new()
                .with("propertyValue", value)
                .with("squareFootage", sqft)
                .with("qualityGrade", grade)
                .with("region", region)
                .with("contingencyPercent", contingency)
        })
}

fn roi_inputs() -> impl Strategy<Value = InputBag> {
    (1.0..=1_000_000.0f64, 0.0..=2_000_000.0f64, 1u32..=600, 0.0..=10_000.0f64).prop_map(
        |(initial, final_value, months, costs)| {
            InputBag::new()
                .with("initialInvestment", initial)
                .with("finalValue", final_value)
                .with("investmentPeriod", months)
                .with("additionalCosts", costs)
        },
    )
}

fn break_even_inputs() -> impl Strategy<Value = InputBag> {
    (0.0..=1_000_000.0f64, 1.0..=1_000.0f64, 0.0..0.99f64).prop_map(|(fixed, price, share)| {
        InputBag::new()
            .with("fixedCosts", fixed)
            .with("sellingPrice", price)
            .with("variableCostPerUnit", price * share)
    })
}

fn mortgage_inputs() -> impl Strategy<Value = InputBag> {
    (
        1_000.0..=10_000_000.0f64,
        0.0..=1.0f64,
        0.0..=30.0f64,
        1u32..=50,
        prop::option::of(0.0..=50_000.0f64),
        prop::option::of(0.0..=2_000.0f64),
    )
        .prop_map(|(loan, headroom, rate, term, taxes, hoa)| {
            // property value at or above the loan keeps the cross-field rule satisfied
            let mut bag = InputBag::new()
                .with("propertyValue", loan * (1.0 + headroom))
                .with("loanAmount", loan)
                .with("interestRate", rate)
                .with("loanTerm", term);
            if let Some(taxes) = taxes {
                bag.insert("propertyTaxes", taxes);
            }
            if let Some(hoa) = hoa {
                bag.insert("hoaFees", hoa);
            }
            bag
        })
}

fn home_insurance_inputs() -> impl Strategy<Value = InputBag> {
    (
        50_000.0..=10_000_000.0f64,
        prop::sample::select(vec!["single_family", "condo", "townhouse", "mobile_home"]),
        prop::sample::select(vec!["wood_frame", "masonry", "steel_frame", "manufactured"]),
        prop::sample::select(vec!["low_risk", "moderate_risk", "high_risk", "very_high_risk"]),
        prop::sample::select(vec![250.0, 500.0, 1_000.0, 1_500.0, 2_000.0, 2_500.0, 5_000.0, 10_000.0]),
        0u32..=20,
        any::<bool>(),
    )
        .prop_filter("mobile homes in very high risk zones are not rated", |(_, property, _, zone, ..)| {
            !(*property == "mobile_home" && *zone == "very_high_risk")
        })
        .prop_map(|(value, property, construction, zone, deductible, claims, secured)| {
            InputBag::new()
                .with("propertyValue", value)
                .with("propertyType", property)
                .with("constructionType", construction)
                .with("floodZone", zone)
                .with("dwellingDeductible", deductible)
                .with("claimsInLast5Years", claims)
                .with("hasSecuritySystem", secured)
        })
}

fn scorecard_inputs() -> impl Strategy<Value = (InputBag, f64)> {
    (
        prop::array::uniform4(0.0..=100.0f64),
        1u32..=20,
        any::<u32>(),
    )
        .prop_map(|(scores, hundreds, seed)| {
            let overall = scores[0] * 0.35 + scores[1] * 0.25 + scores[2] * 0.25 + scores[3] * 0.15;
            let bag = InputBag::new()
                .with("scores.financial", scores[0])
                .with("scores.customer", scores[1])
                .with("scores.process", scores[2])
                .with("scores.learning", scores[3])
                .with("samples", hundreds * 100)
                .with("seed", seed);
            (bag, overall)
        })
}

fn stub(id: &str) -> CalculatorDefinition {
    CalculatorDefinition::new(
        id,
        "Stub",
        "Test",
        |_: &InputBag| ValidationResult::valid(),
        |_: &InputBag| -> abacus_core::CalcResult<Calculated> { Ok(CalculationResult::new(OutputBag::new()).into()) },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: whatever is registered comes back under the same id.
    #[test]
    fn property_register_then_get_returns_same_id(ids in proptest::collection::vec(id_string(), 1..8)) {
        let registry = Registry::with_policy(DuplicatePolicy::Overwrite);
        for id in &ids {
            prop_assert!(registry.register(stub(id)).is_ok());
        }
        for id in &ids {
            prop_assert_eq!(&registry.get(id).unwrap().id, id);
            prop_assert!(registry.contains(id));
        }
    }

    /// PROPERTY: dropping any one required field reports only missing fields.
    #[test]
    fn property_missing_required_field_short_circuits(
        calculator in 0usize..6,
        pick in any::<prop::sample::Index>(),
    ) {
        let engine = engine();
        let definition = engine.registry().list()[calculator].clone();
        let example = &definition.examples[0];
        let required = required_ids(&definition.inputs);
        let field = required[pick.index(required.len())];

        let validation = engine.validate(&definition.id, &example.inputs.without(field)).unwrap();

        prop_assert!(!validation.is_valid());
        prop_assert!(validation.has_error_for(field), "no error for {}", field);
        for error in validation.errors() {
            prop_assert!(error.message.ends_with("is required"), "unexpected error: {}", error.message);
        }
    }

    /// PROPERTY: in-range construction inputs validate cleanly and calculate the same twice.
    #[test]
    fn property_construction_cost_valid_and_idempotent(inputs in construction_inputs()) {
        let engine = engine();
        let validation = engine.validate("construction-cost", &inputs).unwrap();
        prop_assert!(validation.is_valid(), "{:?}", validation.error_messages());

        let first = engine.calculate("construction-cost", &inputs).unwrap();
        let second = engine.calculate("construction-cost", &inputs).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn property_roi_valid_and_idempotent(inputs in roi_inputs()) {
        let engine = engine();
        let validation = engine.validate("roi", &inputs).unwrap();
        prop_assert!(validation.is_valid(), "{:?}", validation.error_messages());

        let first = engine.calculate("roi", &inputs).unwrap();
        let second = engine.calculate("roi", &inputs).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn property_break_even_valid_and_idempotent(inputs in break_even_inputs()) {
        let engine = engine();
        let validation = engine.validate("break-even", &inputs).unwrap();
        prop_assert!(validation.is_valid(), "{:?}", validation.error_messages());

        let first = engine.calculate("break-even", &inputs).unwrap();
        let second = engine.calculate("break-even", &inputs).unwrap();
        prop_assert_eq!(first, second);
    }

    /// PROPERTY: in-range mortgages validate, and the registered definition
    /// calculates the same as a fresh one, every time.
    #[test]
    fn property_mortgage_valid_and_idempotent(inputs in mortgage_inputs()) {
        let engine = engine();
        let validation = engine.validate(mortgage_payment::ID, &inputs).unwrap();
        prop_assert!(validation.is_valid(), "{:?}", validation.error_messages());

        let first = engine.calculate(mortgage_payment::ID, &inputs).unwrap();
        let second = engine.calculate(mortgage_payment::ID, &inputs).unwrap();
        let fresh = mortgage_payment::definition().execute(&inputs).unwrap();
        prop_assert!(first.outputs.number("monthlyPayment").unwrap().is_finite());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &fresh);
    }

    #[test]
    fn property_home_insurance_valid_and_idempotent(inputs in home_insurance_inputs()) {
        let engine = engine();
        let validation = engine.validate(home_insurance::ID, &inputs).unwrap();
        prop_assert!(validation.is_valid(), "{:?}", validation.error_messages());

        let registered = engine.registry().get(home_insurance::ID).unwrap();
        let conformed = inputs.conform(&registered.inputs);
        let first = engine.calculate(home_insurance::ID, &inputs).unwrap();
        let second = registered.execute(&conformed).unwrap();
        let fresh = home_insurance::definition().execute(&conformed).unwrap();
        prop_assert!(first.outputs.number("effectivePremium").unwrap() > 0.0);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &fresh);
    }

    /// PROPERTY: simulated scorecard figures stay within ±20% of the weighted score.
    #[test]
    fn property_scorecard_within_swing((inputs, overall) in scorecard_inputs()) {
        let engine = engine();
        let validation = engine.validate("balanced-scorecard", &inputs).unwrap();
        prop_assert!(validation.is_valid(), "{:?}", validation.error_messages());

        let outputs = engine.calculate("balanced-scorecard", &inputs).unwrap().outputs;
        let low = overall * 0.8 - 1e-9;
        let high = overall * 1.2 + 1e-9;

        prop_assert!((outputs.number("overallScore").unwrap() - overall).abs() < 1e-9);
        let mut previous = f64::NEG_INFINITY;
        for id in ["percentile10", "percentile25", "percentile50", "percentile75", "percentile90"] {
            let value = outputs.number(id).unwrap();
            prop_assert!(value >= low && value <= high, "{} = {} outside [{}, {}]", id, value, low, high);
            prop_assert!(value >= previous, "{} not monotonic", id);
            previous = value;
        }
        let expected = outputs.number("expectedValue").unwrap();
        prop_assert!(expected >= low && expected <= high);
        prop_assert!(outputs.number("standardDeviation").unwrap() >= 0.0);
    }
}
