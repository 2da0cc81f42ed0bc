//! Configuration for detection and scaffold generation.
//!
//! Every field has a default matching the fixed identifiers of the
//! converter-test convention, so an empty JSON object is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::syntax::AssertionStyle;

/// Identifier reported with every finding.
pub const DIAGNOSTIC_ID: &str = "ConvertorAnalyzer";

/// Name of the generated test method.
pub const METHOD_NAME: &str = "TestScenario";

/// Parameter holding the source instance.
pub const EXPECTED_PARAMETER: &str = "expected";

/// Parameter holding the destination instance.
pub const TESTED_PARAMETER: &str = "tested";

/// Substring (case-insensitive) that marks a generic type as a converter.
pub const PATTERN_KEYWORD: &str = "converter";

/// Placeholder rendered for a member with no counterpart.
pub const MISMATCH_MARKER: &str = "/*unexpected mismatch*/";

/// Structural and utility members never treated as data on metadata types.
pub const METADATA_DENYLIST: &[&str] = &[".ctor", "ToString", "CompareTo", "GetHashCode", "Equals"];

/// Configuration for the scaffolding pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Diagnostic identifier attached to findings.
    pub diagnostic_id: String,
    /// Case-insensitive substring that marks a converter generic.
    pub pattern_keyword: String,
    /// Name of the generated method; its presence suppresses findings.
    pub method_name: String,
    /// Parameter name for the source instance.
    pub expected_parameter: String,
    /// Parameter name for the destination instance.
    pub tested_parameter: String,
    /// Placeholder rendered in place of a missing member.
    pub mismatch_marker: String,
    /// Member names skipped when reading metadata-only types.
    pub metadata_denylist: Vec<String>,
    /// Test framework dialect for rendered assertions.
    pub assertion_style: AssertionStyle,
    /// Maximum number of ancestors followed when flattening members.
    pub max_base_depth: usize,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            diagnostic_id: DIAGNOSTIC_ID.to_string(),
            pattern_keyword: PATTERN_KEYWORD.to_string(),
            method_name: METHOD_NAME.to_string(),
            expected_parameter: EXPECTED_PARAMETER.to_string(),
            tested_parameter: TESTED_PARAMETER.to_string(),
            mismatch_marker: MISMATCH_MARKER.to_string(),
            metadata_denylist: METADATA_DENYLIST.iter().map(|s| s.to_string()).collect(),
            assertion_style: AssertionStyle::NUnit,
            max_base_depth: 64,
        }
    }
}

impl ScaffoldConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|error| Error::io(path, error))?;
        Self::from_json(&json)
    }

    /// Reject blank identifiers and a zero depth bound.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("diagnostic_id", &self.diagnostic_id),
            ("pattern_keyword", &self.pattern_keyword),
            ("method_name", &self.method_name),
            ("expected_parameter", &self.expected_parameter),
            ("tested_parameter", &self.tested_parameter),
            ("mismatch_marker", &self.mismatch_marker),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("'{}' must not be blank", field)));
            }
        }
        if self.expected_parameter == self.tested_parameter {
            return Err(Error::Config(
                "'expected_parameter' and 'tested_parameter' must differ".to_string(),
            ));
        }
        if self.max_base_depth == 0 {
            return Err(Error::Config("'max_base_depth' must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Set the assertion dialect.
    pub fn with_assertion_style(mut self, style: AssertionStyle) -> Self {
        self.assertion_style = style;
        self
    }

    /// Set the generated method name.
    pub fn with_method_name(mut self, name: impl Into<String>) -> Self {
        self.method_name = name.into();
        self
    }

    /// Set the converter keyword.
    pub fn with_pattern_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.pattern_keyword = keyword.into();
        self
    }

    /// Set the ancestor depth bound.
    pub fn with_max_base_depth(mut self, depth: usize) -> Self {
        self.max_base_depth = depth;
        self
    }

    /// Whether a generic name follows the converter naming convention.
    pub fn is_converter_name(&self, name: &str) -> bool {
        name.to_lowercase()
            .contains(&self.pattern_keyword.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_fixed_identifiers() {
        let config = ScaffoldConfig::default();
        assert_eq!(config.method_name, "TestScenario");
        assert_eq!(config.expected_parameter, "expected");
        assert_eq!(config.tested_parameter, "tested");
        assert_eq!(config.assertion_style, AssertionStyle::NUnit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ScaffoldConfig::from_json(r#"{"assertion_style": "xunit"}"#).unwrap();
        assert_eq!(config.assertion_style, AssertionStyle::XUnit);
        assert_eq!(config.diagnostic_id, DIAGNOSTIC_ID);
    }

    #[test]
    fn test_blank_method_name_rejected() {
        let err = ScaffoldConfig::from_json(r#"{"method_name": "  "}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = ScaffoldConfig::from_json("{").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_converter_name_matching() {
        let config = ScaffoldConfig::default();
        assert!(config.is_converter_name("Converter"));
        assert!(config.is_converter_name("IModelConverterBase"));
        assert!(!config.is_converter_name("Convertor"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convtest.json");
        std::fs::write(&path, r#"{"max_base_depth": 4}"#).unwrap();
        let config = ScaffoldConfig::from_file(&path).unwrap();
        assert_eq!(config.max_base_depth, 4);

        let missing = ScaffoldConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, Error::Io { .. }));
    }
}
