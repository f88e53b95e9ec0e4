//! Return on investment, total and annualized.

use crate::calculator::{Calculated, CalculationResult, CalculatorDefinition, CalculatorExample};
use crate::errors::CalcResult;
use crate::report::{money, percent, ReportBuilder};
use crate::schema::FieldSpec;
use crate::validation::{ValidationResult, Validator};
use crate::values::{InputBag, OutputBag};

pub const ID: &str = "roi";

pub fn definition() -> CalculatorDefinition {
    CalculatorDefinition::new(ID, "Return on Investment", "Business", validate, calculate)
        .with_subcategory("Investment")
        .with_description(
            "Net profit as a percentage of the amount invested. Supplying the holding period \
             also gives the compound annual rate.",
        )
        .with_tags(&["roi", "investment", "return", "profitability"])
        .with_related(&["break-even", "balanced-scorecard"])
        .with_inputs(vec![
            FieldSpec::number("initialInvestment", "Initial Investment")
                .required()
                .min(0.01)
                .unit("USD"),
            FieldSpec::number("finalValue", "Final Value")
                .required()
                .min(0.0)
                .unit("USD")
                .describe("Everything the investment returned, including the sale price"),
            FieldSpec::number("investmentPeriod", "Investment Period")
                .range(1.0, 600.0)
                .unit("months"),
            FieldSpec::number("additionalCosts", "Additional Costs")
                .min(0.0)
                .unit("USD")
                .default_value(0.0),
        ])
        .with_outputs(vec![
            FieldSpec::number("totalInvested", "Total Invested").unit("USD"),
            FieldSpec::number("netProfit", "Net Profit").unit("USD"),
            FieldSpec::number("roi", "ROI").unit("%"),
            FieldSpec::number("annualizedRoi", "Annualized ROI").unit("%"),
        ])
        .with_example(
            CalculatorExample::new(
                "Two-year holding",
                InputBag::new()
                    .with("initialInvestment", 10_000.0)
                    .with("finalValue", 15_000.0)
                    .with("investmentPeriod", 24.0),
            )
            .expect("roi", 50.0, 1e-9)
            .expect("annualizedRoi", 22.474_487_139, 1e-6),
        )
        .with_example(
            CalculatorExample::new(
                "Loss after costs",
                InputBag::new()
                    .with("initialInvestment", 8_000.0)
                    .with("finalValue", 9_000.0)
                    .with("additionalCosts", 2_000.0),
            )
            .expect("netProfit", -1_000.0, 1e-9)
            .expect("roi", -10.0, 1e-9),
        )
        .with_report(report)
}

fn validate(inputs: &InputBag) -> ValidationResult {
    let mut checks = match Validator::new(inputs)
        .require_all(&[
            ("initialInvestment", "Initial investment"),
            ("finalValue", "Final value"),
        ])
        .checks()
    {
        Ok(checks) => checks,
        Err(missing) => return missing,
    };

    checks
        .positive("initialInvestment", "Initial investment must be greater than $0")
        .non_negative("finalValue", "Final value cannot be negative")
        .range("investmentPeriod", 1.0, 600.0, "Investment period must be between 1 and 600 months")
        .non_negative("additionalCosts", "Additional costs cannot be negative")
        .warn_if(
            "investmentPeriod",
            |months| months < 12.0,
            "Annualizing a period under a year exaggerates the rate",
        );
    checks.finish()
}

fn calculate(inputs: &InputBag) -> CalcResult<Calculated> {
    let initial = inputs.number("initialInvestment")?;
    let final_value = inputs.number("finalValue")?;
    let costs = inputs.number_or("additionalCosts", 0.0)?;

    let invested = initial + costs;
    let net_profit = final_value - invested;
    let roi = net_profit / invested * 100.0;

    let mut outputs = OutputBag::new()
        .with("totalInvested", invested)
        .with("netProfit", net_profit)
        .with("roi", roi);

    let mut explanation = format!(
        "Returned {} on {} invested, a {} return",
        money(final_value),
        money(invested),
        percent(roi, 2)
    );

    if inputs.is_present("investmentPeriod") {
        let years = inputs.number("investmentPeriod")? / 12.0;
        let annualized = ((1.0 + roi / 100.0).powf(1.0 / years) - 1.0) * 100.0;
        outputs.insert("annualizedRoi", annualized);
        explanation.push_str(&format!(" ({} a year over {:.1} years)", percent(annualized, 2), years));
    }

    Ok(CalculationResult::new(outputs).with_explanation(explanation).into())
}

fn report(inputs: &InputBag, outputs: &OutputBag) -> CalcResult<String> {
    let roi = outputs.number("roi")?;
    let mut builder = ReportBuilder::new("Return on Investment")
        .section("Investment")
        .line("Initial Investment", money(inputs.number("initialInvestment")?))
        .line("Total Invested", money(outputs.number("totalInvested")?))
        .line("Final Value", money(inputs.number("finalValue")?))
        .section("Returns")
        .line("Net Profit", money(outputs.number("netProfit")?))
        .line("ROI", percent(roi, 2));
    if let Ok(annualized) = outputs.number("annualizedRoi") {
        builder = builder.line("Annualized ROI", percent(annualized, 2));
    }
    let verdict = if roi < 0.0 {
        format!("The investment lost {} of the amount invested.", percent(-roi, 2))
    } else {
        format!("The investment returned {} on the amount invested.", percent(roi, 2))
    };
    Ok(builder.section("Summary").paragraph(&verdict).build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_roi() {
        let bag = InputBag::new().with("initialInvestment", 10_000.0).with("finalValue", 12_500.0);
        let result = calculate(&bag).unwrap().into_result();
        assert_eq!(result.outputs.number("roi").unwrap(), 25.0);
        assert!(!result.outputs.contains("annualizedRoi"));
        assert!(result.explanation.unwrap().contains("25.00%"));
    }

    #[test]
    fn test_report_ends_with_summary() {
        let bag = InputBag::new().with("initialInvestment", 8_000.0).with("finalValue", 7_200.0);
        let outputs = calculate(&bag).unwrap().into_result().outputs;
        let text = report(&bag, &outputs).unwrap();
        assert!(text.contains("Summary\n-------\n"));
        assert_eq!(text.lines().last(), Some("The investment lost 10.00% of the amount invested."));
    }

    #[test]
    fn test_annualized_roi() {
        let bag = InputBag::new()
            .with("initialInvestment", 10_000.0)
            .with("finalValue", 15_000.0)
            .with("investmentPeriod", 24.0);
        let outputs = calculate(&bag).unwrap().into_result().outputs;
        let expected = (1.5_f64.sqrt() - 1.0) * 100.0;
        assert!((outputs.number("annualizedRoi").unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_total_loss_is_finite() {
        let bag = InputBag::new()
            .with("initialInvestment", 10_000.0)
            .with("finalValue", 0.0)
            .with("investmentPeriod", 12.0);
        let outputs = calculate(&bag).unwrap().into_result().outputs;
        assert_eq!(outputs.number("roi").unwrap(), -100.0);
        assert_eq!(outputs.number("annualizedRoi").unwrap(), -100.0);
    }

    #[test]
    fn test_zero_investment_rejected() {
        let bag = InputBag::new().with("initialInvestment", 0.0).with("finalValue", 100.0);
        let result = validate(&bag);
        assert_eq!(result.error_messages(), vec!["Initial investment must be greater than $0"]);
    }

    #[test]
    fn test_short_period_warns() {
        let bag = InputBag::new()
            .with("initialInvestment", 1_000.0)
            .with("finalValue", 1_100.0)
            .with("investmentPeriod", 6.0);
        let result = validate(&bag);
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }
}
