//! Fixed-rate mortgage payment with escrow.
//!
//! Principal and interest use the standard amortization formula
//! `P = L·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate and `n` the
//! number of monthly payments. A zero rate degenerates to `L / n`.

use crate::calculator::{Calculated, CalculationResult, CalculatorDefinition, CalculatorExample};
use crate::errors::CalcResult;
use crate::report::{money, percent, ReportBuilder};
use crate::schema::FieldSpec;
use crate::validation::{ValidationResult, Validator};
use crate::values::{InputBag, OutputBag};

pub const ID: &str = "mortgage-payment";

pub fn definition() -> CalculatorDefinition {
    CalculatorDefinition::new(ID, "Mortgage Payment", "Finance", validate, calculate)
        .with_subcategory("Mortgage")
        .with_description(
            "Monthly principal and interest for a fixed-rate loan, plus taxes, insurance and \
             HOA dues, with lifetime interest and loan-to-value.",
        )
        .with_tags(&["mortgage", "loan", "payment", "amortization"])
        .with_related(&["home-insurance", "construction-cost"])
        .with_inputs(vec![
            FieldSpec::number("propertyValue", "Property Value").required().min(0.0).unit("USD"),
            FieldSpec::number("loanAmount", "Loan Amount")
                .required()
                .range(1_000.0, 10_000_000.0)
                .step(1_000.0)
                .unit("USD"),
            FieldSpec::number("interestRate", "Interest Rate")
                .required()
                .range(0.0, 30.0)
                .step(0.125)
                .unit("%"),
            FieldSpec::number("loanTerm", "Loan Term").required().range(1.0, 50.0).unit("years"),
            FieldSpec::number("propertyTaxes", "Property Taxes")
                .min(0.0)
                .unit("USD/year")
                .describe("Annual property tax"),
            FieldSpec::number("propertyInsurance", "Property Insurance")
                .min(0.0)
                .unit("USD/year"),
            FieldSpec::number("hoaFees", "HOA Fees").min(0.0).unit("USD/month"),
        ])
        .with_outputs(vec![
            FieldSpec::number("monthlyPayment", "Principal & Interest").unit("USD"),
            FieldSpec::number("monthlyEscrow", "Taxes, Insurance & HOA").unit("USD"),
            FieldSpec::number("totalMonthlyPayment", "Total Monthly Payment").unit("USD"),
            FieldSpec::number("totalInterest", "Total Interest").unit("USD"),
            FieldSpec::number("totalPayments", "Total of Payments").unit("USD"),
            FieldSpec::number("loanToValue", "Loan to Value").unit("%"),
        ])
        .with_example(
            CalculatorExample::new(
                "30-year fixed at 6%",
                InputBag::new()
                    .with("propertyValue", 375_000.0)
                    .with("loanAmount", 300_000.0)
                    .with("interestRate", 6.0)
                    .with("loanTerm", 30.0)
                    .with("propertyTaxes", 3_600.0)
                    .with("propertyInsurance", 1_200.0),
            )
            .expect("monthlyPayment", 1_798.65, 0.01)
            .expect("monthlyEscrow", 400.0, 1e-9)
            .expect("loanToValue", 80.0, 1e-9),
        )
        .with_example(
            CalculatorExample::new(
                "Interest-free family loan",
                InputBag::new()
                    .with("propertyValue", 200_000.0)
                    .with("loanAmount", 120_000.0)
                    .with("interestRate", 0.0)
                    .with("loanTerm", 10.0),
            )
            .expect("monthlyPayment", 1_000.0, 1e-9)
            .expect("totalInterest", 0.0, 1e-6),
        )
        .with_report(report)
}

fn validate(inputs: &InputBag) -> ValidationResult {
    let mut checks = match Validator::new(inputs)
        .require_all(&[
            ("propertyValue", "Property value"),
            ("loanAmount", "Loan amount"),
            ("interestRate", "Interest rate"),
            ("loanTerm", "Loan term"),
        ])
        .checks()
    {
        Ok(checks) => checks,
        Err(missing) => return missing,
    };

    checks
        .positive("propertyValue", "Property value must be greater than $0")
        .range(
            "loanAmount",
            1_000.0,
            10_000_000.0,
            "Loan amount must be between $1,000 and $10,000,000",
        )
        .range("interestRate", 0.0, 30.0, "Interest rate must be between 0% and 30%")
        .range("loanTerm", 1.0, 50.0, "Loan term must be between 1 and 50 years")
        .integer("loanTerm", "Loan term must be a whole number of years")
        .non_negative("propertyTaxes", "Property taxes cannot be negative")
        .non_negative("propertyInsurance", "Property insurance cannot be negative")
        .non_negative("hoaFees", "HOA fees cannot be negative")
        .cross(
            "loanAmount",
            "propertyValue",
            |loan, value| loan <= value,
            "Loan amount cannot exceed property value",
        );

    let high_ltv = matches!(
        (checks.value("loanAmount"), checks.value("propertyValue")),
        (Some(loan), Some(value)) if loan / value > 0.8
    );
    checks
        .warn(
            "loanAmount",
            high_ltv,
            "Loan-to-value above 80% usually requires private mortgage insurance",
        )
        .warn_if("interestRate", |rate| rate > 10.0, "Interest rate is unusually high");
    checks.finish()
}

/// Monthly principal and interest
fn monthly_payment(principal: f64, annual_rate_pct: f64, payments: f64) -> f64 {
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return principal / payments;
    }
    // (1 + r)^n - 1 without cancellation; rounds to zero only for vanishing rates
    let growth_less_one = (payments * r.ln_1p()).exp_m1();
    if growth_less_one == 0.0 {
        return principal / payments;
    }
    principal * r * (1.0 + growth_less_one) / growth_less_one
}

fn calculate(inputs: &InputBag) -> CalcResult<Calculated> {
    let property_value = inputs.number("propertyValue")?;
    let loan = inputs.number("loanAmount")?;
    let rate = inputs.number("interestRate")?;
    let term_years = inputs.number("loanTerm")?;
    let taxes = inputs.number_or("propertyTaxes", 0.0)?;
    let insurance = inputs.number_or("propertyInsurance", 0.0)?;
    let hoa = inputs.number_or("hoaFees", 0.0)?;

    let payments = term_years * 12.0;
    let payment = monthly_payment(loan, rate, payments);
    let total_payments = payment * payments;
    let escrow = (taxes + insurance) / 12.0 + hoa;

    let outputs = OutputBag::new()
        .with("monthlyPayment", payment)
        .with("monthlyEscrow", escrow)
        .with("totalMonthlyPayment", payment + escrow)
        .with("totalInterest", total_payments - loan)
        .with("totalPayments", total_payments)
        .with("loanToValue", loan / property_value * 100.0);

    Ok(CalculationResult::new(outputs)
        .with_explanation(format!(
            "{} borrowed over {} monthly payments at {}% a year",
            money(loan),
            payments,
            rate
        ))
        .with_step("monthlyRate", format!("{:.6}", rate / 100.0 / 12.0))
        .with_step("numberOfPayments", format!("{}", payments))
        .into())
}

fn report(inputs: &InputBag, outputs: &OutputBag) -> CalcResult<String> {
    let ltv = outputs.number("loanToValue")?;
    let mut notes = Vec::new();
    if ltv > 80.0 {
        notes.push("Private mortgage insurance is likely until LTV reaches 80%".to_string());
    }
    let interest_share = outputs.number("totalInterest")? / outputs.number("totalPayments")? * 100.0;
    if interest_share.is_finite() {
        notes.push(format!("{} of all payments is interest", percent(interest_share, 1)));
    }

    Ok(ReportBuilder::new("Mortgage Payment Analysis")
        .section("Loan")
        .line("Property Value", money(inputs.number("propertyValue")?))
        .line("Loan Amount", money(inputs.number("loanAmount")?))
        .line("Interest Rate", percent(inputs.number("interestRate")?, 3))
        .line("Term", format!("{} years", inputs.number("loanTerm")?))
        .section("Monthly")
        .line("Principal & Interest", money(outputs.number("monthlyPayment")?))
        .line("Taxes, Insurance & HOA", money(outputs.number("monthlyEscrow")?))
        .line("Total", money(outputs.number("totalMonthlyPayment")?))
        .section("Lifetime")
        .line("Total Interest", money(outputs.number("totalInterest")?))
        .line("Loan to Value", percent(ltv, 1))
        .bullets(&notes)
        .build())
}
