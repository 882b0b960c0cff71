//! Configuration model and loading.
//!
//! ```yaml
//! suites:
//!   cobertura:
//!     report: coverage.xml
//!     constraints:
//!       - type: ignore
//!         paths: ["generated/**"]
//!       - type: line-coverage
//!         pattern: "**"
//!         threshold: 75
//! ```
//!
//! Suites keep the order they are written in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use vigilance_core::{QualityError, Result};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "vigilance.yaml";

/// Which items a scoped constraint looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Files and documentation entries, matched by path
    #[default]
    File,
    /// Packages, matched by name
    Package,
}

/// One constraint declaration inside a suite stanza.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDeclaration {
    /// Registered constraint name
    #[serde(rename = "type")]
    pub name: String,

    /// Scope pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Additional scope patterns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,

    /// Item scope
    #[serde(default)]
    pub scope: Scope,

    /// Constructor parameters
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl ConstraintDeclaration {
    /// Create a declaration for a registered constraint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: None,
            paths: Vec::new(),
            scope: Scope::File,
            params: Map::new(),
        }
    }

    /// Set the scope pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Add a scope pattern.
    pub fn with_path(mut self, pattern: impl Into<String>) -> Self {
        self.paths.push(pattern.into());
        self
    }

    /// Set the item scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set a constructor parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Every declared scope pattern, `pattern` first.
    pub fn patterns(&self) -> Vec<&str> {
        self.pattern
            .iter()
            .map(String::as_str)
            .chain(self.paths.iter().map(String::as_str))
            .collect()
    }

    /// A required numeric parameter.
    pub fn number(&self, key: &str) -> Result<f64> {
        match self.params.get(key) {
            Some(value) => value.as_f64().ok_or_else(|| {
                QualityError::ConfigurationParsing(format!(
                    "constraint \"{}\" expects a number for \"{}\", got {}",
                    self.name, key, value
                ))
            }),
            None => Err(QualityError::ConfigurationParsing(format!(
                "constraint \"{}\" requires a \"{}\" parameter",
                self.name, key
            ))),
        }
    }

    /// Fail when parameters other than `allowed` were declared.
    pub fn expect_only(&self, allowed: &[&str]) -> Result<()> {
        let unexpected: Vec<&str> = self
            .params
            .keys()
            .map(String::as_str)
            .filter(|k| !allowed.contains(k))
            .collect();
        if unexpected.is_empty() {
            Ok(())
        } else {
            Err(QualityError::ConfigurationParsing(format!(
                "constraint \"{}\" does not accept: {}",
                self.name,
                unexpected.join(", ")
            )))
        }
    }
}

/// Configuration of one active suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteStanza {
    /// Suite name, the key of the stanza
    #[serde(skip)]
    pub name: String,

    /// Report file
    pub report: PathBuf,

    /// Declarations in configuration order
    pub constraints: Vec<ConstraintDeclaration>,
}

impl SuiteStanza {
    /// Create a stanza.
    pub fn new(name: impl Into<String>, report: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            report: report.into(),
            constraints: Vec::new(),
        }
    }

    /// Append a declaration.
    pub fn with_constraint(mut self, declaration: ConstraintDeclaration) -> Self {
        self.constraints.push(declaration);
        self
    }
}

/// A materialized configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VigilanceConfig {
    /// Active suites in configuration order
    pub suites: Vec<SuiteStanza>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    suites: serde_yaml::Mapping,
}

impl VigilanceConfig {
    /// Create a configuration from stanzas.
    pub fn new(suites: Vec<SuiteStanza>) -> Self {
        Self { suites }
    }

    /// Parse YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(text).map_err(|e| {
            QualityError::ConfigurationParsing(format!("invalid configuration: {}", e))
        })?;

        let mut suites = Vec::with_capacity(raw.suites.len());
        for (key, value) in raw.suites {
            let name = key.as_str().ok_or_else(|| {
                QualityError::ConfigurationParsing(format!(
                    "suite names must be strings, got {:?}",
                    key
                ))
            })?;
            let mut stanza: SuiteStanza = serde_yaml::from_value(value).map_err(|e| {
                QualityError::ConfigurationParsing(format!(
                    "invalid stanza for suite \"{}\": {}",
                    name, e
                ))
            })?;
            stanza.name = name.to_string();
            suites.push(stanza);
        }

        let config = Self { suites };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            QualityError::ConfigurationParsing(format!(
                "could not read configuration file \"{}\": {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&text)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for suite in &self.suites {
            if suite.name.trim().is_empty() {
                return Err(QualityError::ConfigurationParsing(
                    "suite names cannot be empty".to_string(),
                ));
            }
            if !seen.insert(suite.name.as_str()) {
                return Err(QualityError::ConfigurationParsing(format!(
                    "suite \"{}\" is configured twice",
                    suite.name
                )));
            }
            if suite.report.as_os_str().is_empty() {
                return Err(QualityError::ConfigurationParsing(format!(
                    "suite \"{}\" requires a report path",
                    suite.name
                )));
            }
            let empty = suite.constraints.iter().position(|c| c.name.trim().is_empty());
            if let Some(position) = empty {
                return Err(QualityError::ConfigurationParsing(format!(
                    "constraint #{} of suite \"{}\" has an empty type",
                    position + 1,
                    suite.name
                )));
            }
        }
        Ok(())
    }

    /// Suite names in configuration order.
    pub fn suite_names(&self) -> Vec<&str> {
        self.suites.iter().map(|s| s.name.as_str()).collect()
    }
}
