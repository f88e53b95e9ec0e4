//! # Catalogue Documentation
//!
//! Renders a markdown reference of every registered calculator, grouped by
//! category. The `gen-catalogue` binary writes it to `CATALOGUE.md`.

use crate::calculator::CalculatorDefinition;
use crate::registry::Registry;
use crate::schema::FieldSpec;

/// Generate the full CATALOGUE.md content for a registry.
///
/// # Example
///
/// ```rust
/// use abacus_core::{catalogue, docs, Registry};
///
/// let registry = Registry::new();
/// catalogue::register_all(&registry).unwrap();
/// let markdown = docs::catalogue_markdown(&registry);
/// assert!(markdown.contains("# Abacus Calculator Catalogue"));
/// assert!(markdown.contains("### Mortgage Payment"));
/// ```
pub fn catalogue_markdown(registry: &Registry) -> String {
    let mut output = String::with_capacity(16_000);

    output.push_str(
        r#"# Abacus Calculator Catalogue

> **Auto-generated from the calculator registry. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-catalogue`

Each calculator validates its own inputs. The constraints listed in the input
tables are documentation; a run is rejected only by the calculator's rules.

---

"#,
    );

    let categories = registry.categories();
    for category in &categories {
        output.push_str(&format!("## {}\n\n", category));

        for definition in registry.by_category(category) {
            // by_category ignores case; keep exact groups apart
            if &definition.category != category {
                continue;
            }
            write_calculator(&mut output, &definition);
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Calculators:** {}\n- **Categories:** {}\n",
        registry.len(),
        categories.len()
    ));

    output
}

fn write_calculator(output: &mut String, definition: &CalculatorDefinition) {
    output.push_str(&format!("### {}\n\n", definition.name));
    output.push_str(&format!("**Id:** `{}`", definition.id));
    if let Some(sub) = &definition.subcategory {
        output.push_str(&format!(" · **Subcategory:** {}", sub));
    }
    output.push_str("\n\n");

    if !definition.description.is_empty() {
        output.push_str(&format!("{}\n\n", definition.description));
    }

    if definition.stochastic {
        output.push_str("*Stochastic: outputs come from random sampling and vary between runs.*\n\n");
    }

    if !definition.inputs.is_empty() {
        output.push_str("**Inputs:**\n\n");
        write_field_table(output, &definition.inputs);
    }
    if !definition.outputs.is_empty() {
        output.push_str("**Outputs:**\n\n");
        write_field_table(output, &definition.outputs);
    }

    if !definition.tags.is_empty() {
        output.push_str(&format!("**Tags:** {}\n\n", definition.tags.join(", ")));
    }
    if !definition.related.is_empty() {
        let related: Vec<_> = definition.related.iter().map(|r| format!("`{}`", r)).collect();
        output.push_str(&format!("**Related:** {}\n\n", related.join(", ")));
    }
    if !definition.examples.is_empty() {
        output.push_str("**Examples:**\n");
        for example in &definition.examples {
            match &example.description {
                Some(description) => output.push_str(&format!("- {}: {}\n", example.name, description)),
                None => output.push_str(&format!("- {}\n", example.name)),
            }
        }
        output.push('\n');
    }
    if definition.has_report() {
        output.push_str("Generates a text report.\n\n");
    }

    output.push_str("---\n\n");
}

fn write_field_table(output: &mut String, fields: &[FieldSpec]) {
    output.push_str("| Id | Label | Type | Required | Constraints |\n");
    output.push_str("|----|-------|------|----------|-------------|\n");
    for field in fields {
        output.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            field.id,
            field.label,
            field.value_type.display_name(),
            if field.required { "yes" } else { "no" },
            describe_constraints(field)
        ));
    }
    output.push('\n');
}

fn describe_constraints(field: &FieldSpec) -> String {
    let c = &field.constraints;
    let mut parts = Vec::new();
    match (c.min, c.max) {
        (Some(min), Some(max)) => parts.push(format!("{} to {}", min, max)),
        (Some(min), None) => parts.push(format!(">= {}", min)),
        (None, Some(max)) => parts.push(format!("<= {}", max)),
        (None, None) => {}
    }
    if !c.options.is_empty() {
        let options: Vec<_> = c.options.iter().map(|o| o.value.as_str()).collect();
        parts.push(options.join(" / "));
    }
    if let Some(unit) = &field.unit {
        parts.push(unit.clone());
    }
    parts.join(", ")
}
