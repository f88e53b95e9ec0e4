//! # Validation
//!
//! A calculator's `validate` function turns a raw [`InputBag`] into a
//! [`ValidationResult`]. Validation never fails with an error value: a bad
//! input is an ordinary result the caller can show and fix.
//!
//! ## Two phases
//!
//! [`Validator`] enforces the discipline every calculator follows:
//!
//! 1. **Presence.** Every required field is checked and *all* missing fields
//!    are reported together. If anything is missing, validation stops there,
//!    so no range rule ever runs against an absent value.
//! 2. **Rules.** Type, range, option and business-rule checks run against the
//!    present fields and accumulate every problem. Cross-field rules run only
//!    when both participating fields passed their own checks.
//!
//! Warnings are advisory and never change `is_valid`.
//!
//! ```rust
//! use abacus_core::validation::Validator;
//! use abacus_core::values::InputBag;
//!
//! let inputs = InputBag::new().with("loanAmount", 450_000.0).with("propertyValue", 400_000.0);
//!
//! let result = match Validator::new(&inputs)
//!     .require("loanAmount", "Loan amount is required")
//!     .require("propertyValue", "Property value is required")
//!     .checks()
//! {
//!     Ok(mut checks) => {
//!         checks
//!             .positive("loanAmount", "Loan amount must be positive")
//!             .positive("propertyValue", "Property value must be positive")
//!             .cross("loanAmount", "propertyValue", |loan, value| loan <= value,
//!                 "Loan amount cannot exceed property value");
//!         checks.finish()
//!     }
//!     Err(missing) => missing,
//! };
//!
//! assert!(!result.is_valid());
//! assert_eq!(result.error_messages(), vec!["Loan amount cannot exceed property value"]);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, ValueType};
use crate::values::{InputBag, Value};

/// One user-facing message, tied to a field when possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Outcome of validating one input bag.
///
/// `is_valid` always equals `errors.is_empty()`; the fields are private so
/// that invariant cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ValidationResultRepr")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

#[derive(Deserialize)]
struct ValidationResultRepr {
    #[serde(default)]
    errors: Vec<ValidationIssue>,
    #[serde(default)]
    warnings: Vec<ValidationIssue>,
}

impl From<ValidationResultRepr> for ValidationResult {
    fn from(repr: ValidationResultRepr) -> Self {
        ValidationResult::from_issues(repr.errors, repr.warnings)
    }
}

impl ValidationResult {
    /// A passing result with no warnings
    pub fn valid() -> Self {
        Self::from_issues(Vec::new(), Vec::new())
    }

    pub fn from_issues(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A failing result with a single field error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_issues(vec![ValidationIssue::for_field(field, message)], Vec::new())
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|i| i.message.as_str()).collect()
    }

    pub fn warning_messages(&self) -> Vec<&str> {
        self.warnings.iter().map(|i| i.message.as_str()).collect()
    }

    /// Whether any error is attributed to `field`
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|i| i.field.as_deref() == Some(field))
    }

    /// Append advisories; never affects validity.
    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = ValidationIssue>) {
        self.warnings.extend(warnings);
    }
}

/// Phase 1: presence of required fields.
#[derive(Debug)]
pub struct Validator<'a> {
    inputs: &'a InputBag,
    missing: Vec<ValidationIssue>,
}

impl<'a> Validator<'a> {
    pub fn new(inputs: &'a InputBag) -> Self {
        Self {
            inputs,
            missing: Vec::new(),
        }
    }

    /// Require `field` to be present (not absent, null or blank).
    pub fn require(mut self, field: &str, message: impl Into<String>) -> Self {
        if !self.inputs.is_present(field) {
            self.missing.push(ValidationIssue::for_field(field, message));
        }
        self
    }

    /// Require every field, using "`label` is required" messages.
    pub fn require_all(self, fields: &[(&str, &str)]) -> Self {
        fields
            .iter()
            .fold(self, |v, (field, label)| v.require(field, format!("{} is required", label)))
    }

    /// Finish phase 1.
    ///
    /// Returns the failing result with every missing-field error when
    /// anything is missing, otherwise the phase-2 rule checker.
    pub fn checks(self) -> Result<Checks<'a>, ValidationResult> {
        if self.missing.is_empty() {
            Ok(Checks {
                inputs: self.inputs,
                errors: Vec::new(),
                warnings: Vec::new(),
                failed: HashSet::new(),
            })
        } else {
            Err(ValidationResult::from_issues(self.missing, Vec::new()))
        }
    }
}

/// Phase 2: type, range and business rules, accumulated.
///
/// Rules on optional fields that are absent are skipped. A field that fails
/// any rule is excluded from later cross-field rules.
#[derive(Debug)]
pub struct Checks<'a> {
    inputs: &'a InputBag,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    failed: HashSet<String>,
}

impl<'a> Checks<'a> {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.failed.insert(field.to_string());
        self.errors.push(ValidationIssue::for_field(field, message));
    }

    /// Numeric value of a present field. A value that is not a finite
    /// number fails the field with the rule's own `message`.
    fn numeric(&mut self, field: &str, message: &str) -> Option<f64> {
        if !self.inputs.is_present(field) || self.failed.contains(field) {
            return None;
        }
        match self.inputs.get(field) {
            Some(Value::Number(n)) if n.is_finite() => Some(*n),
            _ => {
                self.fail(field, message);
                None
            }
        }
    }

    /// A number check with a custom predicate.
    ///
    /// Non-numeric values fail with the same message as out-of-rule ones.
    pub fn number(&mut self, field: &str, ok: impl Fn(f64) -> bool, message: impl Into<String>) -> &mut Self {
        let message = message.into();
        if let Some(n) = self.numeric(field, &message) {
            if !ok(n) {
                self.fail(field, message);
            }
        }
        self
    }

    /// `min <= value <= max`
    pub fn range(&mut self, field: &str, min: f64, max: f64, message: impl Into<String>) -> &mut Self {
        self.number(field, |n| (min..=max).contains(&n), message)
    }

    /// `value > 0`
    pub fn positive(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.number(field, |n| n > 0.0, message)
    }

    /// `value >= 0`
    pub fn non_negative(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.number(field, |n| n >= 0.0, message)
    }

    /// `value` is a whole number
    pub fn integer(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.number(field, |n| n.fract() == 0.0, message)
    }

    /// The field is a string equal to one of `allowed`.
    pub fn one_of(&mut self, field: &str, allowed: &[&str], message: impl Into<String>) -> &mut Self {
        if !self.inputs.is_present(field) || self.failed.contains(field) {
            return self;
        }
        let ok = self
            .inputs
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| allowed.contains(&s));
        if !ok {
            self.fail(field, message);
        }
        self
    }

    /// The field is a boolean.
    pub fn boolean(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        if self.inputs.is_present(field) && !self.failed.contains(field) && self.inputs.flag(field).is_err() {
            self.fail(field, message);
        }
        self
    }

    /// A general business rule attributed to `field`.
    pub fn rule(&mut self, field: &str, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.fail(field, message);
        }
        self
    }

    /// A relationship between two numeric fields.
    ///
    /// Runs only when both fields are present, numeric and have not failed
    /// any earlier rule. The error is attributed to `first`.
    pub fn cross(
        &mut self,
        first: &str,
        second: &str,
        ok: impl Fn(f64, f64) -> bool,
        message: impl Into<String>,
    ) -> &mut Self {
        if self.failed.contains(first) || self.failed.contains(second) {
            return self;
        }
        let message = message.into();
        if let (Some(a), Some(b)) = (self.numeric(first, &message), self.numeric(second, &message)) {
            if !ok(a, b) {
                self.fail(first, message);
            }
        }
        self
    }

    /// Add a warning when a numeric field satisfies `flagged`.
    ///
    /// Skipped for fields that already failed.
    pub fn warn_if(&mut self, field: &str, flagged: impl Fn(f64) -> bool, message: impl Into<String>) -> &mut Self {
        if let Some(n) = self.value(field) {
            if flagged(n) {
                self.warnings.push(ValidationIssue::for_field(field, message));
            }
        }
        self
    }

    /// Add a warning unconditionally when `flagged` is true.
    pub fn warn(&mut self, field: &str, flagged: bool, message: impl Into<String>) -> &mut Self {
        if flagged {
            self.warnings.push(ValidationIssue::for_field(field, message));
        }
        self
    }

    /// Numeric value of a field that has passed every rule so far.
    pub fn value(&self, field: &str) -> Option<f64> {
        if self.failed.contains(field) {
            return None;
        }
        self.inputs.get(field).and_then(Value::as_f64).filter(|n| n.is_finite())
    }

    pub fn has_failed(&self, field: &str) -> bool {
        self.failed.contains(field)
    }

    pub fn finish(self) -> ValidationResult {
        ValidationResult::from_issues(self.errors, self.warnings)
    }
}

/// Advisory comparison of a bag against declared field specs.
///
/// These never feed `is_valid`; the engine appends them as warnings when
/// `schema_warnings` is enabled.
pub fn schema_advisories(fields: &[FieldSpec], inputs: &InputBag) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for spec in fields {
        let Some(value) = inputs.get(&spec.id) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if !value.matches(spec.value_type) {
            issues.push(ValidationIssue::for_field(
                &spec.id,
                format!(
                    "{} is declared as {} but received {}",
                    spec.label,
                    spec.value_type.display_name(),
                    value.type_name()
                ),
            ));
            continue;
        }
        match spec.value_type {
            ValueType::Number => {
                if let Some(n) = value.as_f64() {
                    let below = spec.constraints.min.is_some_and(|min| n < min);
                    let above = spec.constraints.max.is_some_and(|max| n > max);
                    if below || above {
                        issues.push(ValidationIssue::for_field(
                            &spec.id,
                            format!("{} is outside its documented range", spec.label),
                        ));
                    }
                }
            }
            ValueType::Enum => {
                if let Some(s) = value.as_str() {
                    if !spec.allows_option(s) {
                        issues.push(ValidationIssue::for_field(
                            &spec.id,
                            format!("{} '{}' is not a documented option", spec.label, s),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    for key in inputs.keys() {
        let prefix = format!("{}.", key);
        let known = fields.iter().any(|f| f.id == key || f.id.starts_with(&prefix));
        if !known {
            issues.push(ValidationIssue::general(format!("Unrecognized input '{}'", key)));
        }
    }

    issues
}
