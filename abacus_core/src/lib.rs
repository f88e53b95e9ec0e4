//! # abacus_core - Calculator Engine
//!
//! `abacus_core` runs a catalogue of independent financial and business
//! calculators through one uniform contract. Each calculator is a data-driven
//! record: an advisory input/output schema, a validate function, a pure
//! formula and an optional report generator. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Validation is data**: an invalid bag comes back as a `ValidationResult`, never an error
//! - **Calculation failures are errors**: a formula that cannot handle valid inputs returns `Err`
//! - **Schemas describe, calculators decide**: `FieldSpec` constraints are documentation and advisories
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use abacus_core::{catalogue, Engine, EngineConfig, InputBag, Registry, RunOptions};
//!
//! let registry = Arc::new(Registry::new());
//! catalogue::register_all(&registry).unwrap();
//! let engine = Engine::new(registry, EngineConfig::default());
//!
//! let inputs = InputBag::from_json(serde_json::json!({
//!     "initialInvestment": 10000,
//!     "finalValue": 12500
//! }))
//! .unwrap();
//! let outcome = engine.run("roi", &inputs, RunOptions::default()).unwrap();
//! assert_eq!(outcome.result.unwrap().outputs.number("roi").unwrap(), 25.0);
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Field metadata (`FieldSpec`)
//! - [`values`] - Runtime values and input/output bags
//! - [`validation`] - Two-phase validation helpers and `ValidationResult`
//! - [`calculator`] - Calculator definitions and the formula executor
//! - [`registry`] - Calculator registry
//! - [`engine`] - The calculator façade
//! - [`config`] - TOML configuration
//! - [`catalogue`] - Reference calculators
//! - [`verify`] - Catalogue self-check
//! - [`docs`] - Markdown catalogue generation
//! - [`report`] - Shared report layout
//! - [`errors`] - Structured error types

pub mod calculator;
pub mod catalogue;
pub mod config;
pub mod docs;
pub mod engine;
pub mod errors;
pub mod registry;
pub mod report;
pub mod schema;
pub mod validation;
pub mod values;
pub mod verify;

// Re-export commonly used types at crate root for convenience
pub use calculator::{Calculated, CalculationResult, CalculatorDefinition, CalculatorExample};
pub use config::EngineConfig;
pub use engine::{Engine, RunOptions, RunOutcome};
pub use errors::{CalcError, CalcResult};
pub use registry::{DuplicatePolicy, Registry};
pub use schema::{FieldSpec, ValueType};
pub use validation::{ValidationResult, Validator};
pub use values::{InputBag, OutputBag, Value};
