//! Break-even volume and revenue from a contribution margin.

use crate::calculator::{Calculated, CalculatorDefinition, CalculatorExample};
use crate::errors::CalcResult;
use crate::schema::FieldSpec;
use crate::validation::{ValidationResult, Validator};
use crate::values::{InputBag, OutputBag};

pub const ID: &str = "break-even";

pub fn definition() -> CalculatorDefinition {
    CalculatorDefinition::new(ID, "Break-Even Analysis", "Business", validate, calculate)
        .with_subcategory("Planning")
        .with_description(
            "Units and revenue needed to cover fixed costs, the volume needed to reach a \
             target profit, and the margin of safety at an expected volume.",
        )
        .with_tags(&["break-even", "contribution margin", "pricing"])
        .with_related(&["roi"])
        .with_inputs(vec![
            FieldSpec::number("fixedCosts", "Fixed Costs").required().min(0.0).unit("USD"),
            FieldSpec::number("sellingPrice", "Selling Price per Unit")
                .required()
                .min(0.01)
                .unit("USD"),
            FieldSpec::number("variableCostPerUnit", "Variable Cost per Unit")
                .required()
                .min(0.0)
                .unit("USD"),
            FieldSpec::number("targetProfit", "Target Profit").min(0.0).unit("USD"),
            FieldSpec::number("expectedUnits", "Expected Sales Volume").min(0.0).unit("units"),
        ])
        .with_outputs(vec![
            FieldSpec::number("contributionMargin", "Contribution Margin").unit("USD"),
            FieldSpec::number("contributionMarginRatio", "Contribution Margin Ratio").unit("%"),
            FieldSpec::number("breakEvenUnits", "Break-Even Units").unit("units"),
            FieldSpec::number("breakEvenRevenue", "Break-Even Revenue").unit("USD"),
            FieldSpec::number("targetProfitUnits", "Units for Target Profit").unit("units"),
            FieldSpec::number("marginOfSafety", "Margin of Safety").unit("%"),
        ])
        .with_example(
            CalculatorExample::new(
                "Product launch",
                InputBag::new()
                    .with("fixedCosts", 50_000.0)
                    .with("sellingPrice", 50.0)
                    .with("variableCostPerUnit", 30.0)
                    .with("targetProfit", 20_000.0)
                    .with("expectedUnits", 5_000.0),
            )
            .expect("breakEvenUnits", 2_500.0, 1e-9)
            .expect("breakEvenRevenue", 125_000.0, 1e-6)
            .expect("targetProfitUnits", 3_500.0, 1e-9)
            .expect("marginOfSafety", 50.0, 1e-9),
        )
}

fn validate(inputs: &InputBag) -> ValidationResult {
    let mut checks = match Validator::new(inputs)
        .require_all(&[
            ("fixedCosts", "Fixed costs"),
            ("sellingPrice", "Selling price"),
            ("variableCostPerUnit", "Variable cost per unit"),
        ])
        .checks()
    {
        Ok(checks) => checks,
        Err(missing) => return missing,
    };

    checks
        .non_negative("fixedCosts", "Fixed costs cannot be negative")
        .positive("sellingPrice", "Selling price must be greater than $0")
        .non_negative("variableCostPerUnit", "Variable cost per unit cannot be negative")
        .non_negative("targetProfit", "Target profit cannot be negative")
        .non_negative("expectedUnits", "Expected sales volume cannot be negative")
        .cross(
            "variableCostPerUnit",
            "sellingPrice",
            |variable, price| variable < price,
            "Variable cost per unit must be less than the selling price",
        );
    checks.finish()
}

fn calculate(inputs: &InputBag) -> CalcResult<Calculated> {
    let fixed = inputs.number("fixedCosts")?;
    let price = inputs.number("sellingPrice")?;
    let variable = inputs.number("variableCostPerUnit")?;
    let target = inputs.number_or("targetProfit", 0.0)?;

    let margin = price - variable;
    let units = fixed / margin;

    let mut outputs = OutputBag::new()
        .with("contributionMargin", margin)
        .with("contributionMarginRatio", margin / price * 100.0)
        .with("breakEvenUnits", units)
        .with("breakEvenRevenue", units * price)
        .with("targetProfitUnits", (fixed + target) / margin);

    if inputs.is_present("expectedUnits") {
        let expected = inputs.number("expectedUnits")?;
        if expected > 0.0 {
            outputs.insert("marginOfSafety", (expected - units) / expected * 100.0);
        }
    }

    Ok(outputs.into())
}
