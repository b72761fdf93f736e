//! Validator configuration

use serde::{Deserialize, Serialize};

/// Switches controlling which rule tiers run
///
/// Structural issues (delimiters, brackets, illegal characters, tilde bound)
/// are always reported. Everything that needs the schema runs only with
/// `run_semantic_validation`, and warnings only with `check_for_warnings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Report warning-severity issues
    pub check_for_warnings: bool,
    /// Check tags against the schema
    pub run_semantic_validation: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            check_for_warnings: false,
            run_semantic_validation: true,
        }
    }
}

impl ValidatorConfig {
    /// Create the default configuration (semantics on, warnings off)
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable warnings
    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.check_for_warnings = enabled;
        self
    }

    /// Enable or disable schema checks
    pub fn with_semantic_validation(mut self, enabled: bool) -> Self {
        self.run_semantic_validation = enabled;
        self
    }

    /// Whether schema-dependent warnings are reported
    pub(crate) fn semantic_warnings(&self) -> bool {
        self.check_for_warnings && self.run_semantic_validation
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
