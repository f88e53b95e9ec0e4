//! # Schema Model
//!
//! [`FieldSpec`] describes one input or output field of a calculator. It is
//! metadata only: the engine reads it for documentation, for tagging enum
//! values at the JSON boundary and for advisory shape warnings, but never
//! derives validation from it. Each calculator's own `validate` function is
//! the single source of truth.
//!
//! ## Example
//!
//! ```rust
//! use abacus_core::schema::FieldSpec;
//!
//! let fields = vec![
//!     FieldSpec::number("propertyValue", "Property Value")
//!         .required()
//!         .range(100_000.0, 100_000_000.0)
//!         .unit("USD"),
//!     FieldSpec::choice("qualityGrade", "Quality Grade", &["economy", "standard", "premium"]),
//! ];
//!
//! let spec = abacus_core::schema::find_field(&fields, "propertyValue").unwrap();
//! assert_eq!(spec.constraints.min, Some(100_000.0));
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::values::Value;

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Number,
    String,
    Boolean,
    /// One of a fixed set of string options
    Enum,
    /// Array of strings
    StringList,
    /// Nested object addressed with dotted field ids
    Object,
}

impl ValueType {
    /// Display name for documentation tables
    pub fn display_name(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Enum => "enum",
            ValueType::StringList => "string[]",
            ValueType::Object => "object",
        }
    }
}

/// One allowed value of an enum field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Advisory constraints on a field's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Allowed values for enum fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

/// Metadata for one input or output field.
///
/// `id` must be unique within a calculator's inputs, and separately within
/// its outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable field id, possibly a dotted path into a nested object
    pub id: String,

    /// Human-readable label
    pub label: String,

    pub value_type: ValueType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub constraints: Constraints,

    /// Unit of measure shown next to the value (e.g., "USD", "%", "sq ft")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Value a form would prefill; not applied by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value_type,
            required: false,
            constraints: Constraints::default(),
            unit: None,
            description: None,
            placeholder: None,
            default: None,
        }
    }

    pub fn number(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ValueType::Number)
    }

    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ValueType::String)
    }

    pub fn boolean(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ValueType::Boolean)
    }

    pub fn string_list(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ValueType::StringList)
    }

    pub fn object(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ValueType::Object)
    }

    /// Enum field whose option labels equal their values
    pub fn choice(id: impl Into<String>, label: impl Into<String>, values: &[&str]) -> Self {
        let mut spec = Self::new(id, label, ValueType::Enum);
        spec.constraints.options = values.iter().map(|v| SelectOption::new(*v, *v)).collect();
        spec
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.constraints.min = Some(min);
        self.constraints.max = Some(max);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.constraints.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.constraints.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.constraints.step = Some(step);
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.constraints.options = options;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Whether `value` is one of the declared enum options.
    ///
    /// Fields without options accept anything.
    pub fn allows_option(&self, value: &str) -> bool {
        self.constraints.options.is_empty() || self.constraints.options.iter().any(|o| o.value == value)
    }
}

/// Find a field by id.
pub fn find_field<'a>(fields: &'a [FieldSpec], id: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.id == id)
}

/// Ids of all required fields, in declaration order.
pub fn required_ids(fields: &[FieldSpec]) -> Vec<&str> {
    fields.iter().filter(|f| f.required).map(|f| f.id.as_str()).collect()
}

/// Ids that appear more than once, each reported once.
pub fn duplicate_ids(fields: &[FieldSpec]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for field in fields {
        if !seen.insert(field.id.as_str()) && reported.insert(field.id.as_str()) {
            duplicates.push(field.id.clone());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_constraints() {
        let spec = FieldSpec::number("loanAmount", "Loan Amount")
            .required()
            .range(1_000.0, 10_000_000.0)
            .step(1_000.0)
            .unit("USD");
        assert!(spec.required);
        assert_eq!(spec.constraints.min, Some(1_000.0));
        assert_eq!(spec.constraints.max, Some(10_000_000.0));
        assert_eq!(spec.constraints.step, Some(1_000.0));
        assert_eq!(spec.unit.as_deref(), Some("USD"));
    }

    #[test]
    fn test_choice_options() {
        let spec = FieldSpec::choice("roofType", "Roof Type", &["metal", "tile"]);
        assert_eq!(spec.value_type, ValueType::Enum);
        assert!(spec.allows_option("metal"));
        assert!(!spec.allows_option("thatch"));
        assert!(FieldSpec::text("city", "City").allows_option("anything"));
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let fields = vec![
            FieldSpec::number("a", "A"),
            FieldSpec::number("b", "B"),
            FieldSpec::number("a", "A again"),
            FieldSpec::number("a", "A thrice"),
        ];
        assert_eq!(duplicate_ids(&fields), vec!["a".to_string()]);
    }

    #[test]
    fn test_required_ids_in_order() {
        let fields = vec![
            FieldSpec::number("x", "X").required(),
            FieldSpec::number("y", "Y"),
            FieldSpec::number("z", "Z").required(),
        ];
        assert_eq!(required_ids(&fields), vec!["x", "z"]);
    }

    #[test]
    fn test_serialization_skips_empty_metadata() {
        let spec = FieldSpec::number("rate", "Rate").required();
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"value_type\":\"number\""));
        assert!(!json.contains("unit"));
        assert!(!json.contains("options"));

        let roundtrip: FieldSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, spec);
    }
}
