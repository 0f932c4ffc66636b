//! Generator configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! simple_events = ["MouseEvent", "StorageEvent"]
//! special_includes = ["nsContentUtils.h"]
//! exclude_automatic_type_include = ["nsISupports"]
//! xpidl_to_native = [
//!   ["nsIDOMDataTransfer", "mozilla::dom::DataTransfer", "nsIDOMDataTransfer"],
//! ]
//! ```

use crate::error::CodegenError;
use serde::Deserialize;
use std::path::Path;

/// Entry of the type override table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String, String)")]
pub struct TypeOverride {
    /// Type name as declared in XPIDL.
    pub xpidl: String,
    /// Concrete C++ class exposed by getters and native initializers.
    pub native: String,
    /// Interface the stored pointer is queried through.
    pub canonical: String,
}

impl TypeOverride {
    /// Creates an override entry.
    pub fn new(
        xpidl: impl Into<String>,
        native: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Self {
        Self {
            xpidl: xpidl.into(),
            native: native.into(),
            canonical: canonical.into(),
        }
    }
}

impl From<(String, String, String)> for TypeOverride {
    fn from((xpidl, native, canonical): (String, String, String)) -> Self {
        Self {
            xpidl,
            native,
            canonical,
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    /// Event names to generate, in output order.
    pub simple_events: Vec<String>,
    /// Headers included ahead of the collected type headers.
    pub special_includes: Vec<String>,
    /// Collected type headers that must not be included.
    pub exclude_automatic_type_include: Vec<String>,
    /// Type override table; first match wins.
    pub xpidl_to_native: Vec<TypeOverride>,
}

impl Configuration {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    /// Returns `CodegenError::Config` for malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self, CodegenError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if the file cannot be read and
    /// `CodegenError::Config` if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, CodegenError> {
        let text = std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(
            "configuration {}: {} event(s), {} override(s)",
            path.display(),
            config.simple_events.len(),
            config.xpidl_to_native.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Configuration::from_toml(
            r#"
simple_events = ["MouseEvent", "StorageEvent"]
special_includes = ["nsContentUtils.h"]
exclude_automatic_type_include = ["nsISupports"]
xpidl_to_native = [
  ["nsIDOMDataTransfer", "mozilla::dom::DataTransfer", "nsIDOMDataTransfer"],
]
"#,
        )
        .expect("Failed to parse");

        assert_eq!(config.simple_events, vec!["MouseEvent", "StorageEvent"]);
        assert_eq!(config.special_includes, vec!["nsContentUtils.h"]);
        assert_eq!(config.exclude_automatic_type_include, vec!["nsISupports"]);
        assert_eq!(
            config.xpidl_to_native,
            vec![TypeOverride::new(
                "nsIDOMDataTransfer",
                "mozilla::dom::DataTransfer",
                "nsIDOMDataTransfer"
            )]
        );
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = Configuration::from_toml("").expect("Failed to parse");
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Configuration::from_toml("simple_event = [\"Typo\"]").expect_err("should fail");
        assert!(matches!(err, CodegenError::Config(_)));
    }

    #[test]
    fn test_override_needs_three_names() {
        assert!(Configuration::from_toml("xpidl_to_native = [[\"a\", \"b\"]]").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("events.toml");
        std::fs::write(&path, "simple_events = [\"UIEvent\"]").expect("Failed to write");

        let config = Configuration::from_file(&path).expect("Failed to read");
        assert_eq!(config.simple_events, vec!["UIEvent"]);

        let missing = Configuration::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(CodegenError::Io { .. })));
    }
}
