//! Subcommand implementations.
//!
//! Each command prints to stdout and returns the process exit code; errors
//! bubble up to `main`, which maps them with [`exit_code`].

use std::fs;
use std::path::Path;

use abacus_core::verify::{self, CheckStatus};
use abacus_core::{docs, CalcError, CalcResult, Engine, InputBag, RunOptions, Value};

/// Exit code for an error that escaped a command.
///
/// Input the caller can fix exits 1; everything else exits 2.
pub fn exit_code(err: &CalcError) -> u8 {
    if err.is_recoverable() {
        1
    } else {
        2
    }
}

pub fn list(engine: &Engine, category: Option<&str>, search: Option<&str>) -> CalcResult<u8> {
    let registry = engine.registry();
    let mut definitions = match search {
        Some(term) => registry.search(term),
        None => registry.list(),
    };
    if let Some(category) = category {
        definitions.retain(|d| d.category.eq_ignore_ascii_case(category));
    }

    if definitions.is_empty() {
        println!("No calculators found.");
        return Ok(0);
    }
    for definition in definitions {
        let marker = if definition.stochastic { " (stochastic)" } else { "" };
        println!(
            "{:<22} {:<12} {}{}",
            definition.id, definition.category, definition.name, marker
        );
    }
    Ok(0)
}

pub fn describe(engine: &Engine, id: &str, json: bool) -> CalcResult<u8> {
    let definition = engine.registry().get(id)?;
    let summary = definition.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(0);
    }

    println!("{} ({})", summary.name, summary.id);
    match &summary.subcategory {
        Some(sub) => println!("Category: {} / {}", summary.category, sub),
        None => println!("Category: {}", summary.category),
    }
    if !summary.description.is_empty() {
        println!("\n{}", summary.description);
    }

    println!("\nInputs:");
    for field in &summary.inputs {
        let required = if field.required { "*" } else { " " };
        let unit = field.unit.as_deref().map(|u| format!(" [{}]", u)).unwrap_or_default();
        println!(
            "  {} {:<24} {:<8} {}{}",
            required,
            field.id,
            field.value_type.display_name(),
            field.label,
            unit
        );
        if !field.constraints.options.is_empty() {
            let options: Vec<_> = field.constraints.options.iter().map(|o| o.value.as_str()).collect();
            println!("      one of: {}", options.join(", "));
        }
    }

    println!("\nOutputs:");
    for field in &summary.outputs {
        println!("    {:<24} {}", field.id, field.label);
    }

    if !summary.examples.is_empty() {
        println!("\nExamples:");
        for example in &summary.examples {
            println!("  - {}: {}", example.name, serde_json::to_string(&example.inputs)?);
        }
    }
    Ok(0)
}

/// Parse `key=value` pairs; values that parse as JSON keep their type.
pub fn parse_sets(pairs: &[String]) -> CalcResult<InputBag> {
    let mut bag = InputBag::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| CalcError::invalid_input(pair.as_str(), pair.as_str(), "expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CalcError::invalid_input(pair.as_str(), raw, "empty key"));
        }
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .map(Value::from)
            .unwrap_or_else(|_| Value::Text(raw.to_string()));
        bag.insert(key, value);
    }
    Ok(bag)
}

fn read_inputs(path: &Path) -> CalcResult<InputBag> {
    let text = fs::read_to_string(path)
        .map_err(|e| CalcError::io("read", path.display().to_string(), e.to_string()))?;
    InputBag::from_json_str(&text).map_err(|e| match e {
        CalcError::Serialization { reason } => {
            CalcError::invalid_input(path.display().to_string(), "<file>", reason)
        }
        other => other,
    })
}

pub fn run(
    engine: &Engine,
    id: &str,
    input: Option<&Path>,
    sets: &[String],
    with_report: bool,
    json: bool,
) -> CalcResult<u8> {
    let inputs = match input {
        Some(path) => read_inputs(path)?,
        None => parse_sets(sets)?,
    };

    let options = RunOptions {
        with_report: with_report.then_some(true),
    };
    let outcome = engine.run(id, &inputs, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(if outcome.validation.is_valid() { 0 } else { 1 });
    }

    for warning in outcome.validation.warnings() {
        println!("warning: {}", warning.message);
    }
    if !outcome.validation.is_valid() {
        for error in outcome.validation.errors() {
            match &error.field {
                Some(field) => println!("error [{}]: {}", field, error.message),
                None => println!("error: {}", error.message),
            }
        }
        return Ok(1);
    }

    if let Some(result) = &outcome.result {
        for (key, value) in result.outputs.iter() {
            println!("{:<24} {}", key, value);
        }
        if let Some(explanation) = &result.explanation {
            println!("\n{}", explanation);
        }
        if let Some(steps) = &result.intermediate_steps {
            println!("\nSteps:");
            for (name, value) in steps {
                println!("  {:<22} {}", name, value);
            }
        }
    }
    if let Some(report) = &outcome.report {
        println!("\n{}", report);
    }
    if let Some(report_error) = &outcome.report_error {
        eprintln!("warning: report unavailable: {}", report_error);
    }
    Ok(0)
}

pub fn check(engine: &Engine, json: bool) -> CalcResult<u8> {
    let report = verify::check_catalogue(engine);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for calculator in &report.calculators {
            let status = match calculator.status {
                CheckStatus::Pass => "PASS",
                CheckStatus::Fail => "FAIL",
                CheckStatus::Error => "ERROR",
            };
            println!(
                "{:<6} {:<22} {} example(s)",
                status, calculator.calculator_id, calculator.examples_run
            );
            for issue in &calculator.issues {
                println!("         {}", issue);
            }
        }
        println!(
            "\n{} passed, {} failed, {} errored",
            report.count(CheckStatus::Pass),
            report.count(CheckStatus::Fail),
            report.count(CheckStatus::Error)
        );
    }

    Ok(if report.all_passed() { 0 } else { 1 })
}

pub fn catalogue(engine: &Engine) -> CalcResult<u8> {
    print!("{}", docs::catalogue_markdown(engine.registry()));
    Ok(0)
}
