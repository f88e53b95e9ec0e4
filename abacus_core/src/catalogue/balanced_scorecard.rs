//! Balanced scorecard with a Monte Carlo spread of the overall score.
//!
//! The overall score weights the four perspectives 35/25/25/15. Each
//! simulation sample scales every perspective score by an independent factor
//! drawn uniformly from `[0.8, 1.2)`, so every sampled overall score lies in
//! `[0.8 × overall, 1.2 × overall)`.
//!
//! Pass `seed` for a reproducible run; without it a seed is drawn at random
//! and reported in the `seed` step so the run can be repeated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::calculator::{Calculated, CalculationResult, CalculatorDefinition, CalculatorExample};
use crate::errors::{CalcError, CalcResult};
use crate::schema::FieldSpec;
use crate::validation::{ValidationResult, Validator};
use crate::values::{InputBag, OutputBag};

pub const ID: &str = "balanced-scorecard";

pub const DEFAULT_SAMPLES: u32 = 1_000;
pub const MAX_SAMPLES: u32 = 100_000;

/// 2^64; seeds at or above it would saturate to the same stream
const MAX_SEED: f64 = 18_446_744_073_709_551_616.0;

/// Drawn seeds stay below 2^53 so they survive a round trip through a JSON number
const MAX_DRAWN_SEED: u64 = 1 << 53;

/// (field, label, weight)
const PERSPECTIVES: [(&str, &str, f64); 4] = [
    ("scores.financial", "Financial score", 0.35),
    ("scores.customer", "Customer score", 0.25),
    ("scores.process", "Internal process score", 0.25),
    ("scores.learning", "Learning and growth score", 0.15),
];

const PERCENTILES: [(&str, f64); 5] = [
    ("percentile10", 0.10),
    ("percentile25", 0.25),
    ("percentile50", 0.50),
    ("percentile75", 0.75),
    ("percentile90", 0.90),
];

pub fn definition() -> CalculatorDefinition {
    let mut inputs: Vec<FieldSpec> = PERSPECTIVES
        .iter()
        .map(|(id, label, _)| FieldSpec::number(*id, *label).required().range(0.0, 100.0))
        .collect();
    inputs.push(
        FieldSpec::number("samples", "Simulation Samples")
            .range(100.0, MAX_SAMPLES as f64)
            .step(100.0)
            .default_value(DEFAULT_SAMPLES),
    );
    inputs.push(
        FieldSpec::number("seed", "Random Seed")
            .min(0.0)
            .describe("Fixes the random sequence so a run can be reproduced"),
    );

    let mut outputs = vec![
        FieldSpec::number("overallScore", "Overall Score"),
        FieldSpec::text("rating", "Rating"),
    ];
    outputs.extend(
        PERCENTILES
            .iter()
            .map(|(id, p)| FieldSpec::number(*id, format!("P{:.0}", p * 100.0))),
    );
    outputs.push(FieldSpec::number("expectedValue", "Expected Value"));
    outputs.push(FieldSpec::number("standardDeviation", "Standard Deviation"));

    CalculatorDefinition::new(ID, "Balanced Scorecard", "Business", validate, calculate)
        .with_subcategory("Performance")
        .with_description(
            "Weighted overall score across the financial, customer, internal process and \
             learning perspectives, with simulated percentiles for a ±20% swing in each.",
        )
        .with_tags(&["scorecard", "kpi", "strategy", "monte carlo"])
        .with_related(&["roi"])
        .with_inputs(inputs)
        .with_outputs(outputs)
        .with_example(
            CalculatorExample::new(
                "Mid-size company",
                InputBag::new()
                    .with("scores.financial", 80.0)
                    .with("scores.customer", 70.0)
                    .with("scores.process", 60.0)
                    .with("scores.learning", 90.0)
                    .with("samples", 500.0)
                    .with("seed", 42.0),
            )
            .expect("overallScore", 74.0, 1e-9),
        )
        .stochastic()
}

fn validate(inputs: &InputBag) -> ValidationResult {
    let required: Vec<(&str, &str)> = PERSPECTIVES.iter().map(|(id, label, _)| (*id, *label)).collect();
    let mut checks = match Validator::new(inputs).require_all(&required).checks() {
        Ok(checks) => checks,
        Err(missing) => return missing,
    };

    for (id, label, _) in PERSPECTIVES {
        checks.range(id, 0.0, 100.0, format!("{} must be between 0 and 100", label));
    }
    checks
        .range(
            "samples",
            100.0,
            MAX_SAMPLES as f64,
            format!("Simulation samples must be between 100 and {}", MAX_SAMPLES),
        )
        .integer("samples", "Simulation samples must be a whole number")
        .number(
            "seed",
            |seed| (0.0..MAX_SEED).contains(&seed),
            "Random seed must be between 0 and 18,446,744,073,709,551,615",
        )
        .integer("seed", "Random seed must be a whole number");

    let weak: Vec<&str> = PERSPECTIVES
        .iter()
        .filter(|(id, _, _)| checks.value(id).is_some_and(|score| score < 40.0))
        .map(|(_, label, _)| *label)
        .collect();
    for label in weak {
        checks.warn("scores", true, format!("{} is below 40 and drags the overall score", label));
    }
    checks.finish()
}

fn weighted(scores: &[f64; 4]) -> f64 {
    scores
        .iter()
        .zip(PERSPECTIVES.iter())
        .map(|(score, (_, _, weight))| score * weight)
        .sum()
}

fn rating(score: f64) -> &'static str {
    match score {
        s if s >= 85.0 => "excellent",
        s if s >= 70.0 => "good",
        s if s >= 50.0 => "fair",
        _ => "poor",
    }
}

/// Sampled overall scores, sorted ascending.
fn simulate(scores: &[f64; 4], samples: usize, rng: &mut impl Rng) -> Vec<f64> {
    let mut results: Vec<f64> = (0..samples)
        .map(|_| {
            let varied = scores.map(|score| score * rng.random_range(0.8..1.2));
            weighted(&varied)
        })
        .collect();
    results.sort_by(f64::total_cmp);
    results
}

fn calculate(inputs: &InputBag) -> CalcResult<Calculated> {
    let mut scores = [0.0; 4];
    for (slot, (id, _, _)) in scores.iter_mut().zip(PERSPECTIVES.iter()) {
        *slot = inputs.number(id)?;
    }
    let samples = inputs.number_or("samples", DEFAULT_SAMPLES as f64)?;
    if !(1.0..=MAX_SAMPLES as f64).contains(&samples) {
        return Err(CalcError::calculation_failed(
            ID,
            format!("Sample count {} is outside 1..={}", samples, MAX_SAMPLES),
        ));
    }
    let samples = samples as usize;

    let seed = match inputs.get("seed").and_then(|v| v.as_f64()) {
        Some(seed) => seed as u64,
        None => rand::random_range(0..MAX_DRAWN_SEED),
    };

    let overall = weighted(&scores);
    let results = simulate(&scores, samples, &mut StdRng::seed_from_u64(seed));

    let mean = results.iter().sum::<f64>() / samples as f64;
    let variance = results.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / samples as f64;

    let mut outputs = OutputBag::new()
        .with("overallScore", overall)
        .with("rating", rating(overall));
    for (id, p) in PERCENTILES {
        let index = ((p * samples as f64).floor() as usize).min(samples - 1);
        outputs.insert(id, results[index]);
    }
    outputs.insert("expectedValue", mean);
    outputs.insert("standardDeviation", variance.sqrt());

    Ok(CalculationResult::new(outputs)
        .with_explanation(format!(
            "Overall {:.1} ({}); {} simulated outcomes with each perspective varied ±20%",
            overall,
            rating(overall),
            samples
        ))
        .with_step("seed", seed.to_string())
        .with_step("samples", samples.to_string())
        .into())
}
