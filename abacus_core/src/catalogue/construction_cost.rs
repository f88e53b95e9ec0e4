//! Construction cost estimate from floor area, quality grade and region.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::calculator::{Calculated, CalculatorDefinition, CalculatorExample};
use crate::errors::{CalcError, CalcResult};
use crate::report::{money, percent, ReportBuilder};
use crate::schema::FieldSpec;
use crate::validation::{ValidationResult, Validator};
use crate::values::{InputBag, OutputBag};

pub const ID: &str = "construction-cost";

const GRADES: &[&str] = &["economy", "standard", "premium", "luxury"];
const REGIONS: &[&str] = &["national", "northeast", "south", "midwest", "west"];

/// Base building cost per square foot, USD
static COST_PER_SQFT: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("economy", 125.0),
        ("standard", 166.0),
        ("premium", 245.0),
        ("luxury", 380.0),
    ])
});

static REGION_FACTOR: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("national", 1.0),
        ("northeast", 1.15),
        ("south", 0.9),
        ("midwest", 0.95),
        ("west", 1.2),
    ])
});

pub fn definition() -> CalculatorDefinition {
    CalculatorDefinition::new(ID, "Construction Cost", "Construction", validate, calculate)
        .with_subcategory("Estimating")
        .with_description(
            "Estimates the cost to build a structure from its floor area, quality grade and \
             region, and compares it against the property value.",
        )
        .with_tags(&["construction", "building", "cost", "real estate"])
        .with_related(&["mortgage-payment", "home-insurance"])
        .with_inputs(vec![
            FieldSpec::number("propertyValue", "Property Value")
                .required()
                .range(100_000.0, 100_000_000.0)
                .step(1_000.0)
                .unit("USD"),
            FieldSpec::number("squareFootage", "Square Footage")
                .required()
                .range(100.0, 1_000_000.0)
                .unit("sq ft")
                .placeholder("2500"),
            FieldSpec::choice("qualityGrade", "Quality Grade", GRADES).default_value("standard"),
            FieldSpec::choice("region", "Region", REGIONS).default_value("national"),
            FieldSpec::number("contingencyPercent", "Contingency")
                .range(0.0, 50.0)
                .unit("%")
                .describe("Allowance for overruns, as a percentage of the base cost")
                .default_value(0.0),
        ])
        .with_outputs(vec![
            FieldSpec::number("baseCost", "Base Cost").unit("USD"),
            FieldSpec::number("contingency", "Contingency").unit("USD"),
            FieldSpec::number("totalCost", "Total Cost").unit("USD"),
            FieldSpec::number("costPerSquareFoot", "Cost per Square Foot").unit("USD/sq ft"),
            FieldSpec::number("costToValueRatio", "Cost to Value").unit("%"),
        ])
        .with_example(
            CalculatorExample::new(
                "Standard single-family home",
                InputBag::new()
                    .with("propertyValue", 500_000.0)
                    .with("squareFootage", 2_500.0),
            )
            .expect("totalCost", 415_000.0, 0.01)
            .expect("costPerSquareFoot", 166.0, 1e-6)
            .expect("costToValueRatio", 83.0, 1e-6),
        )
        .with_example(
            CalculatorExample::new(
                "Premium build on the west coast",
                InputBag::new()
                    .with("propertyValue", 2_000_000.0)
                    .with("squareFootage", 3_000.0)
                    .with("qualityGrade", "premium")
                    .with("region", "west")
                    .with("contingencyPercent", 10.0),
            )
            .describe("882,000 base plus a 10% contingency")
            .expect("baseCost", 882_000.0, 0.01)
            .expect("totalCost", 970_200.0, 0.01),
        )
        .with_report(report)
}

fn validate(inputs: &InputBag) -> ValidationResult {
    let mut checks = match Validator::new(inputs)
        .require("propertyValue", "Property value is required")
        .require("squareFootage", "Square footage is required")
        .checks()
    {
        Ok(checks) => checks,
        Err(missing) => return missing,
    };

    checks
        .range(
            "propertyValue",
            100_000.0,
            100_000_000.0,
            "Property value must be between $100,000 and $100,000,000",
        )
        .range(
            "squareFootage",
            100.0,
            1_000_000.0,
            "Square footage must be between 100 and 1,000,000",
        )
        .one_of("qualityGrade", GRADES, "Quality grade must be economy, standard, premium or luxury")
        .one_of("region", REGIONS, "Region must be national, northeast, south, midwest or west")
        .range("contingencyPercent", 0.0, 50.0, "Contingency must be between 0% and 50%");

    checks.warn_if(
        "contingencyPercent",
        |pct| pct < 5.0,
        "Contingency below 5% leaves little room for overruns",
    );
    checks.finish()
}

fn calculate(inputs: &InputBag) -> CalcResult<Calculated> {
    let property_value = inputs.number("propertyValue")?;
    let sqft = inputs.number("squareFootage")?;
    let grade = inputs.text_or("qualityGrade", "standard")?;
    let region = inputs.text_or("region", "national")?;
    let contingency_pct = inputs.number_or("contingencyPercent", 0.0)?;

    let rate = COST_PER_SQFT
        .get(grade)
        .ok_or_else(|| CalcError::calculation_failed(ID, format!("No cost table for grade '{}'", grade)))?;
    let factor = REGION_FACTOR
        .get(region)
        .ok_or_else(|| CalcError::calculation_failed(ID, format!("No cost factor for region '{}'", region)))?;

    let base_cost = sqft * rate * factor;
    let contingency = base_cost * contingency_pct / 100.0;
    let total_cost = base_cost + contingency;

    Ok(OutputBag::new()
        .with("baseCost", base_cost)
        .with("contingency", contingency)
        .with("totalCost", total_cost)
        .with("costPerSquareFoot", total_cost / sqft)
        .with("costToValueRatio", total_cost / property_value * 100.0)
        .into())
}

fn report(inputs: &InputBag, outputs: &OutputBag) -> CalcResult<String> {
    Ok(ReportBuilder::new("Construction Cost Estimate")
        .section("Project")
        .line("Property Value", money(inputs.number("propertyValue")?))
        .line("Square Footage", format!("{:.0} sq ft", inputs.number("squareFootage")?))
        .line("Quality Grade", inputs.text_or("qualityGrade", "standard")?)
        .line("Region", inputs.text_or("region", "national")?)
        .section("Estimate")
        .line("Base Cost", money(outputs.number("baseCost")?))
        .line("Contingency", money(outputs.number("contingency")?))
        .line("Total Cost", money(outputs.number("totalCost")?))
        .line("Cost per Square Foot", money(outputs.number("costPerSquareFoot")?))
        .line("Cost to Value", percent(outputs.number("costToValueRatio")?, 1))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(value: f64, sqft: f64) -> InputBag {
        InputBag::new().with("propertyValue", value).with("squareFootage", sqft)
    }

    #[test]
    fn test_property_value_below_range() {
        let result = validate(&inputs(50_000.0, 2_500.0));
        assert!(!result.is_valid());
        assert_eq!(
            result.error_messages(),
            vec!["Property value must be between $100,000 and $100,000,000"]
        );
    }

    #[test]
    fn test_missing_fields_short_circuit() {
        // An out-of-range value alongside a missing field reports only the missing field
        let result = validate(&InputBag::new().with("propertyValue", 1.0));
        assert_eq!(result.error_messages(), vec!["Square footage is required"]);
    }

    #[test]
    fn test_standard_cost_per_square_foot() {
        let outputs = calculate(&inputs(500_000.0, 2_500.0)).unwrap().into_result().outputs;
        assert_eq!(outputs.number("totalCost").unwrap(), 415_000.0);
        assert!((outputs.number("costPerSquareFoot").unwrap() - 166.0).abs() < 1e-9);
    }

    #[test]
    fn test_grade_region_and_contingency() {
        let bag = inputs(2_000_000.0, 3_000.0)
            .with("qualityGrade", "premium")
            .with("region", "west")
            .with("contingencyPercent", 10.0);
        assert!(validate(&bag).is_valid());
        let outputs = calculate(&bag).unwrap().into_result().outputs;
        assert!((outputs.number("baseCost").unwrap() - 882_000.0).abs() < 1e-6);
        assert!((outputs.number("totalCost").unwrap() - 970_200.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_grade_rejected() {
        let result = validate(&inputs(500_000.0, 2_500.0).with("qualityGrade", "gold"));
        assert!(result.has_error_for("qualityGrade"));
    }

    #[test]
    fn test_report_mentions_totals() {
        let bag = inputs(500_000.0, 2_500.0);
        let outputs = calculate(&bag).unwrap().into_result().outputs;
        let text = report(&bag, &outputs).unwrap();
        assert!(text.contains("$415,000.00"));
        assert!(text.contains("83.0%"));
    }
}
