//! # Engine Configuration
//!
//! Loaded from TOML. Every key is optional:
//!
//! ```toml
//! log_filter = "abacus_core=debug"
//!
//! [registry]
//! duplicate_policy = "reject"   # or "overwrite"
//!
//! [run]
//! with_report = false
//! schema_warnings = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::registry::DuplicatePolicy;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    pub registry: RegistryConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Generate reports on `run` unless the caller says otherwise
    pub with_report: bool,
    /// Append schema advisories to validation warnings
    pub schema_warnings: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            with_report: false,
            schema_warnings: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        toml::from_str(text).map_err(|e| CalcError::config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CalcError::io("read", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&text)
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.registry.duplicate_policy = policy;
        self
    }

    pub fn with_schema_warnings(mut self, enabled: bool) -> Self {
        self.run.schema_warnings = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.run.schema_warnings);
        assert!(!config.run.with_report);
    }

    #[test]
    fn test_full_config() {
        let config = EngineConfig::from_toml_str(
            r#"
            log_filter = "abacus_core=trace"

            [registry]
            duplicate_policy = "reject"

            [run]
            with_report = true
            schema_warnings = false
            "#,
        )
        .unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("abacus_core=trace"));
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.run.with_report);
        assert!(!config.run.schema_warnings);
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let err = EngineConfig::from_toml_str("[registry]\nduplicate_policy = \"sometimes\"").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        let err = EngineConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here/abacus.toml").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
