//! Homeowners insurance premium estimate.
//!
//! Premium = value/1000 × base rate(property type) × construction factor ×
//! flood factor × deductible credit × (1 + claims surcharge), less a
//! security-system discount. Mobile homes in very high risk flood zones are
//! not rated and fail the calculation.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::calculator::{Calculated, CalculatorDefinition, CalculatorExample};
use crate::errors::{CalcError, CalcResult};
use crate::report::{money, percent, ReportBuilder};
use crate::schema::{FieldSpec, SelectOption};
use crate::validation::{ValidationResult, Validator};
use crate::values::{InputBag, OutputBag, Value};

pub const ID: &str = "home-insurance";

const PROPERTY_TYPES: &[&str] = &["single_family", "condo", "townhouse", "mobile_home"];
const CONSTRUCTION_TYPES: &[&str] = &["wood_frame", "masonry", "steel_frame", "manufactured"];
const FLOOD_ZONES: &[&str] = &["low_risk", "moderate_risk", "high_risk", "very_high_risk"];
const DEDUCTIBLES: &[f64] = &[250.0, 500.0, 1_000.0, 1_500.0, 2_000.0, 2_500.0, 5_000.0, 10_000.0];

const CLAIM_SURCHARGE: f64 = 0.10;
const MAX_CLAIM_SURCHARGE: f64 = 0.50;
const SECURITY_DISCOUNT: f64 = 0.05;

/// Annual premium per $1,000 of property value
static BASE_RATE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("single_family", 3.5),
        ("condo", 2.0),
        ("townhouse", 2.8),
        ("mobile_home", 6.0),
    ])
});

static CONSTRUCTION_FACTOR: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("wood_frame", 1.1),
        ("masonry", 0.9),
        ("steel_frame", 0.85),
        ("manufactured", 1.3),
    ])
});

static FLOOD_FACTOR: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("low_risk", 1.0),
        ("moderate_risk", 1.15),
        ("high_risk", 1.4),
        ("very_high_risk", 1.9),
    ])
});

/// Multiplier per deductible; higher deductibles earn a credit
fn deductible_factor(deductible: f64) -> Option<f64> {
    let factor = match deductible as u32 {
        250 => 1.10,
        500 => 1.05,
        1_000 => 1.0,
        1_500 => 0.97,
        2_000 => 0.94,
        2_500 => 0.92,
        5_000 => 0.85,
        10_000 => 0.78,
        _ => return None,
    };
    Some(factor)
}

fn labeled(values: &[&str]) -> Vec<SelectOption> {
    values
        .iter()
        .map(|v| {
            let label = v.replace('_', " ");
            let mut chars = label.chars();
            let label: String = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            SelectOption::new(*v, label)
        })
        .collect()
}

pub fn definition() -> CalculatorDefinition {
    CalculatorDefinition::new(ID, "Home Insurance", "Finance", validate, calculate)
        .with_subcategory("Insurance")
        .with_description(
            "Estimates an annual homeowners premium from property value, type, construction, \
             flood exposure, deductible and claims history.",
        )
        .with_tags(&["insurance", "homeowners", "premium", "flood"])
        .with_related(&["mortgage-payment", "construction-cost"])
        .with_inputs(vec![
            FieldSpec::number("propertyValue", "Property Value")
                .required()
                .range(50_000.0, 10_000_000.0)
                .unit("USD"),
            FieldSpec::choice("propertyType", "Property Type", PROPERTY_TYPES)
                .required()
                .options(labeled(PROPERTY_TYPES)),
            FieldSpec::choice("constructionType", "Construction Type", CONSTRUCTION_TYPES)
                .required()
                .options(labeled(CONSTRUCTION_TYPES)),
            FieldSpec::choice("floodZone", "Flood Zone", FLOOD_ZONES)
                .options(labeled(FLOOD_ZONES))
                .default_value("low_risk"),
            FieldSpec::number("dwellingDeductible", "Dwelling Deductible")
                .unit("USD")
                .describe("One of 250, 500, 1000, 1500, 2000, 2500, 5000, 10000")
                .default_value(1_000.0),
            FieldSpec::number("claimsInLast5Years", "Claims in Last 5 Years")
                .range(0.0, 20.0)
                .step(1.0),
            FieldSpec::boolean("hasSecuritySystem", "Monitored Security System"),
        ])
        .with_outputs(vec![
            FieldSpec::number("annualPremium", "Annual Premium").unit("USD"),
            FieldSpec::number("totalDiscounts", "Total Discounts").unit("USD"),
            FieldSpec::number("effectivePremium", "Effective Premium").unit("USD"),
            FieldSpec::number("monthlyPremium", "Monthly Premium").unit("USD"),
            FieldSpec::number("premiumToValueRatio", "Premium to Value").unit("%"),
        ])
        .with_example(
            CalculatorExample::new(
                "Wood-frame house, low flood risk",
                InputBag::new()
                    .with("propertyValue", 400_000.0)
                    .with("propertyType", "single_family")
                    .with("constructionType", "wood_frame")
                    .with("floodZone", "low_risk"),
            )
            .expect("annualPremium", 1_540.0, 0.01)
            .expect("effectivePremium", 1_540.0, 0.01),
        )
        .with_example(
            CalculatorExample::new(
                "Masonry condo with a claim and an alarm",
                InputBag::new()
                    .with("propertyValue", 250_000.0)
                    .with("propertyType", "condo")
                    .with("constructionType", "masonry")
                    .with("floodZone", "moderate_risk")
                    .with("dwellingDeductible", 2_500.0)
                    .with("claimsInLast5Years", 1.0)
                    .with("hasSecuritySystem", true),
            )
            .describe("250 × 2.0 × 0.9 × 1.15 × 0.92 × 1.1, less 5%")
            .expect("annualPremium", 523.71, 0.01)
            .expect("effectivePremium", 497.5245, 0.01),
        )
        .with_report(report)
}

fn validate(inputs: &InputBag) -> ValidationResult {
    let mut checks = match Validator::new(inputs)
        .require_all(&[
            ("propertyValue", "Property value"),
            ("propertyType", "Property type"),
            ("constructionType", "Construction type"),
        ])
        .checks()
    {
        Ok(checks) => checks,
        Err(missing) => return missing,
    };

    checks
        .range(
            "propertyValue",
            50_000.0,
            10_000_000.0,
            "Property value must be between $50,000 and $10,000,000",
        )
        .one_of("propertyType", PROPERTY_TYPES, "Invalid property type")
        .one_of("constructionType", CONSTRUCTION_TYPES, "Invalid construction type")
        .one_of("floodZone", FLOOD_ZONES, "Invalid flood zone")
        .number(
            "dwellingDeductible",
            |d| DEDUCTIBLES.contains(&d),
            "Dwelling deductible must be one of: 250, 500, 1000, 1500, 2000, 2500, 5000, 10000",
        )
        .range("claimsInLast5Years", 0.0, 20.0, "Claims in the last 5 years must be between 0 and 20")
        .integer("claimsInLast5Years", "Claims in the last 5 years must be a whole number")
        .boolean("hasSecuritySystem", "Security system must be true or false")
        .warn_if(
            "claimsInLast5Years",
            |claims| claims >= 3.0,
            "Three or more recent claims may make the property hard to insure",
        );

    let flood_exposed = !checks.has_failed("floodZone")
        && matches!(
            inputs.get("floodZone").and_then(Value::as_str),
            Some("high_risk" | "very_high_risk")
        );
    checks.warn(
        "floodZone",
        flood_exposed,
        "Standard homeowners policies exclude flood damage; price a separate flood policy",
    );
    checks.finish()
}

fn calculate(inputs: &InputBag) -> CalcResult<Calculated> {
    let value = inputs.number("propertyValue")?;
    let property_type = inputs.text("propertyType")?;
    let construction = inputs.text("constructionType")?;
    let flood_zone = inputs.text_or("floodZone", "low_risk")?;
    let deductible = inputs.number_or("dwellingDeductible", 1_000.0)?;
    let claims = inputs.number_or("claimsInLast5Years", 0.0)?;
    let secured = inputs.get("hasSecuritySystem").and_then(Value::as_bool).unwrap_or(false);

    if property_type == "mobile_home" && flood_zone == "very_high_risk" {
        return Err(CalcError::calculation_failed(
            ID,
            "Mobile homes in very high risk flood zones cannot be rated",
        ));
    }

    let lookup = |table: &HashMap<&'static str, f64>, key: &str, what: &str| {
        table
            .get(key)
            .copied()
            .ok_or_else(|| CalcError::calculation_failed(ID, format!("No {} rating for '{}'", what, key)))
    };
    let base = lookup(&BASE_RATE, property_type, "property type")?;
    let construction_factor = lookup(&CONSTRUCTION_FACTOR, construction, "construction")?;
    let flood_factor = lookup(&FLOOD_FACTOR, flood_zone, "flood zone")?;
    let deductible_factor = deductible_factor(deductible).ok_or_else(|| {
        CalcError::calculation_failed(ID, format!("No deductible credit for {}", deductible))
    })?;
    let surcharge = (claims * CLAIM_SURCHARGE).min(MAX_CLAIM_SURCHARGE);

    let annual = value / 1_000.0 * base * construction_factor * flood_factor * deductible_factor * (1.0 + surcharge);
    let discounts = if secured { annual * SECURITY_DISCOUNT } else { 0.0 };
    let effective = annual - discounts;

    Ok(OutputBag::new()
        .with("annualPremium", annual)
        .with("totalDiscounts", discounts)
        .with("effectivePremium", effective)
        .with("monthlyPremium", effective / 12.0)
        .with("premiumToValueRatio", effective / value * 100.0)
        .into())
}

fn report(inputs: &InputBag, outputs: &OutputBag) -> CalcResult<String> {
    let mut notes = Vec::new();
    if outputs.number("totalDiscounts")? > 0.0 {
        notes.push("Security system discount applied".to_string());
    }
    let claims = inputs.number_or("claimsInLast5Years", 0.0)?;
    if claims > 0.0 {
        notes.push(format!("Claims surcharge for {} recent claim(s)", claims));
    }

    Ok(ReportBuilder::new("Home Insurance Estimate")
        .section("Property")
        .line("Property Value", money(inputs.number("propertyValue")?))
        .line("Property Type", inputs.text("propertyType")?)
        .line("Construction", inputs.text("constructionType")?)
        .line("Flood Zone", inputs.text_or("floodZone", "low_risk")?)
        .section("Premium")
        .line("Annual Premium", money(outputs.number("annualPremium")?))
        .line("Discounts", money(outputs.number("totalDiscounts")?))
        .line("Effective Premium", money(outputs.number("effectivePremium")?))
        .line("Monthly", money(outputs.number("monthlyPremium")?))
        .line("Premium to Value", percent(outputs.number("premiumToValueRatio")?, 2))
        .bullets(&notes)
        .build())
}
