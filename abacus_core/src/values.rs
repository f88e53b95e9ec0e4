//! # Runtime Values and Bags
//!
//! Calculators exchange open mappings from field id to [`Value`]. A [`Bag`] is
//! such a mapping; [`InputBag`] and [`OutputBag`] are the same type named for
//! the direction it travels.
//!
//! Bags are plain values: the engine never mutates one it was handed.
//!
//! ## Field paths
//!
//! Field ids may be dotted paths (`budgetInfo.totalBudget`). Lookups first try
//! the literal key, then descend through nested objects one segment at a time.
//!
//! ```rust
//! use abacus_core::values::InputBag;
//!
//! let bag = InputBag::from_json(serde_json::json!({
//!     "budgetInfo": { "totalBudget": 1000000 },
//!     "squareFootage": 2500
//! })).unwrap();
//!
//! assert_eq!(bag.number("budgetInfo.totalBudget").unwrap(), 1_000_000.0);
//! assert_eq!(bag.number("squareFootage").unwrap(), 2500.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::schema::{FieldSpec, ValueType};

/// A single runtime value.
///
/// `Tag` is an enum choice. Raw JSON strings always arrive as `Text`;
/// [`Bag::conform`] re-tags the fields a schema declares as enums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Tag(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Numeric view of this value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String view; both free text and enum tags qualify
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Tag(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in type-mismatch messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Tag(_) => "enum",
            Value::List(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Whether this value matches a declared [`ValueType`].
    ///
    /// Free text is accepted for enum fields, since raw input has not been
    /// conformed yet.
    pub fn matches(&self, value_type: ValueType) -> bool {
        match (value_type, self) {
            (ValueType::Number, Value::Number(_)) => true,
            (ValueType::String, Value::Text(_)) => true,
            (ValueType::Boolean, Value::Bool(_)) => true,
            (ValueType::Enum, Value::Tag(_) | Value::Text(_)) => true,
            (ValueType::StringList, Value::List(items)) => items.iter().all(|v| v.as_str().is_some()),
            (ValueType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) | Value::Tag(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Object(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // Numbers outside f64 range are not produced by serde_json
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Open mapping from field id to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag {
    fields: BTreeMap<String, Value>,
}

/// Raw, unvalidated calculator input
pub type InputBag = Bag;

/// Values produced by a calculator's formula
pub type OutputBag = Bag;

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from a JSON value, which must be an object.
    pub fn from_json(json: serde_json::Value) -> CalcResult<Self> {
        match Value::from(json) {
            Value::Object(fields) => Ok(Bag { fields }),
            other => Err(CalcError::invalid_input(
                "inputs",
                other.to_string(),
                format!("expected a JSON object, found {}", other.type_name()),
            )),
        }
    }

    /// Parse a bag from JSON text.
    pub fn from_json_str(text: &str) -> CalcResult<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(json)
    }

    pub fn to_json(&self) -> CalcResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Copy of this bag without `key`; handy for "omit one field" checks.
    pub fn without(&self, key: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.remove(key);
        Bag { fields }
    }

    /// Look up a field by id or dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Whether the field holds something usable: not absent, not null, not blank text.
    pub fn is_present(&self, path: &str) -> bool {
        match self.get(path) {
            None | Some(Value::Null) => false,
            Some(Value::Text(s)) | Some(Value::Tag(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Gets a numeric field.
    pub fn number(&self, path: &str) -> CalcResult<f64> {
        match self.get(path) {
            Some(Value::Number(n)) => Ok(*n),
            Some(other) => Err(CalcError::invalid_input(path, other.to_string(), "expected a number")),
            None => Err(CalcError::missing_field(path)),
        }
    }

    /// Gets an optional numeric field, falling back to `default` when absent or null.
    pub fn number_or(&self, path: &str, default: f64) -> CalcResult<f64> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(default),
            Some(_) => self.number(path),
        }
    }

    /// Gets a string or enum-tag field.
    pub fn text(&self, path: &str) -> CalcResult<&str> {
        match self.get(path) {
            Some(Value::Text(s)) | Some(Value::Tag(s)) => Ok(s),
            Some(other) => Err(CalcError::invalid_input(path, other.to_string(), "expected a string")),
            None => Err(CalcError::missing_field(path)),
        }
    }

    /// Gets an optional string field, falling back to `default` when absent or null.
    pub fn text_or<'a>(&'a self, path: &str, default: &'a str) -> CalcResult<&'a str> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(default),
            Some(_) => self.text(path),
        }
    }

    /// Gets a boolean field.
    pub fn flag(&self, path: &str) -> CalcResult<bool> {
        match self.get(path) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(CalcError::invalid_input(path, other.to_string(), "expected a boolean")),
            None => Err(CalcError::missing_field(path)),
        }
    }

    /// Gets a list field.
    pub fn list(&self, path: &str) -> CalcResult<&[Value]> {
        match self.get(path) {
            Some(Value::List(items)) => Ok(items),
            Some(other) => Err(CalcError::invalid_input(path, other.to_string(), "expected an array")),
            None => Err(CalcError::missing_field(path)),
        }
    }

    /// Copy of this bag with every top-level field that `fields` declares as
    /// an enum re-tagged from `Text` to `Tag`. Unknown fields pass through.
    pub fn conform(&self, fields: &[FieldSpec]) -> Self {
        let mut conformed = self.clone();
        for spec in fields.iter().filter(|f| f.value_type == ValueType::Enum) {
            if let Some(Value::Text(s)) = conformed.fields.get(&spec.id) {
                let tag = Value::Tag(s.clone());
                conformed.fields.insert(spec.id.clone(), tag);
            }
        }
        conformed
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Bag {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
