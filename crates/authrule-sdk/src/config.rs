//! Configuration types for AuthorizationEngine

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Register the built-in card policy rules at boot
    pub load_builtin_rules: bool,

    /// Rule definition files (YAML or JSON) loaded at boot
    pub rule_files: Vec<PathBuf>,

    /// Where administrative changes are persisted; in memory when absent
    pub state_file: Option<PathBuf>,

    /// Offset east of UTC, in seconds, used by time based templates
    pub reference_utc_offset_seconds: i32,

    /// Country of the issuer, for the international usage rule
    pub issuer_country: String,

    /// Enable metrics collection
    pub enable_metrics: bool,

    /// Attach an evaluation trace to every authorization response
    pub enable_tracing: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            load_builtin_rules: true,
            rule_files: Vec::new(),
            state_file: None,
            reference_utc_offset_seconds: 0,
            issuer_country: "FR".to_string(),
            enable_metrics: true,
            enable_tracing: false,
        }
    }

    /// Load a configuration from a YAML file; missing keys take defaults
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Add a rule file
    pub fn with_rule_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rule_files.push(path.into());
        self
    }

    /// Set the state file
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    pub fn with_reference_offset_seconds(mut self, seconds: i32) -> Self {
        self.reference_utc_offset_seconds = seconds;
        self
    }

    pub fn with_issuer_country(mut self, country: impl Into<String>) -> Self {
        self.issuer_country = country.into();
        self
    }

    /// Register built-in rules
    pub fn load_builtin_rules(mut self, load: bool) -> Self {
        self.load_builtin_rules = load;
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.load_builtin_rules);
        assert!(config.enable_metrics);
        assert!(!config.enable_tracing);
        assert!(config.state_file.is_none());
        assert_eq!(config.reference_utc_offset_seconds, 0);
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::new()
            .with_rule_file("rules/limits.yaml")
            .with_rule_file("rules/fraud.yaml")
            .with_state_file("data/state.json")
            .with_reference_offset_seconds(3600)
            .load_builtin_rules(false)
            .enable_tracing(true);

        assert_eq!(config.rule_files.len(), 2);
        assert_eq!(config.state_file, Some(PathBuf::from("data/state.json")));
        assert_eq!(config.reference_utc_offset_seconds, 3600);
        assert!(!config.load_builtin_rules);
        assert!(config.enable_tracing);
    }

    #[test]
    fn test_from_yaml_with_partial_keys() {
        let config = EngineConfig::from_yaml_str(
            r#"
rule_files:
  - demos/rules/limits.yaml
state_file: /tmp/rule-state.json
enable_tracing: true
"#,
        )
        .unwrap();

        assert!(config.load_builtin_rules);
        assert_eq!(config.rule_files, vec![PathBuf::from("demos/rules/limits.yaml")]);
        assert!(config.enable_tracing);
        assert_eq!(config.issuer_country, "FR");
    }

    #[test]
    fn test_from_yaml_errors() {
        assert!(EngineConfig::from_yaml_str("").is_ok());
        assert!(EngineConfig::from_yaml_str("enable_metrics: [1, 2]").is_err());
        assert!(EngineConfig::from_yaml_file("/nonexistent/authrule.yaml").is_err());
    }
}
