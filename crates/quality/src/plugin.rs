//! Plugin surface: report parsers and suite registration.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use vigilance_core::{QualityError, QualityReport, ReportParsingError, Result};

use crate::registry::ConstraintRegistry;

/// Turns a raw report into a [`QualityReport`].
pub trait ReportParser: Send + Sync {
    /// Report format handled by the parser.
    fn format(&self) -> &str;

    /// Parse report contents.
    fn parse_str(&self, contents: &str) -> std::result::Result<QualityReport, ReportParsingError>;

    /// Read and parse a report file.
    ///
    /// The file handle is released before parsing starts.
    fn parse(&self, report: &Path) -> std::result::Result<QualityReport, ReportParsingError> {
        let contents = read_report(report)?;
        self.parse_str(&contents).map_err(|e| {
            if e.report.is_none() {
                e.with_report(report)
            } else {
                e
            }
        })
    }
}

fn read_report(report: &Path) -> std::result::Result<String, ReportParsingError> {
    let unreadable = |e: std::io::Error| {
        let message = format!("Could not open report \"{}\" for reading", report.display());
        ReportParsingError::new(message)
            .with_report(report)
            .with_source(e)
    };

    let file = File::open(report).map_err(unreadable)?;
    let mut contents = String::new();
    BufReader::new(file)
        .read_to_string(&mut contents)
        .map_err(unreadable)?;
    Ok(contents)
}

/// Everything needed to run one suite.
#[derive(Clone)]
pub struct SuiteComponents {
    /// Suite name used in configuration
    pub key: String,

    /// Report parser
    pub parser: Arc<dyn ReportParser>,

    /// Constraints available to the suite's stanza
    pub constraints: ConstraintRegistry,
}

impl std::fmt::Debug for SuiteComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteComponents")
            .field("key", &self.key)
            .field("format", &self.parser.format())
            .field("constraints", &self.constraints)
            .finish()
    }
}

/// Entry point of a quality plugin.
pub trait QualityPlugin: Send + Sync {
    /// Components of the suite the plugin provides.
    ///
    /// Fails when the plugin's own constraint registry cannot be built.
    fn suite_components(&self) -> Result<SuiteComponents>;
}

/// Registered suites.
#[derive(Debug, Default)]
pub struct SuiteCatalog {
    suites: HashMap<String, SuiteComponents>,
    order: Vec<String>,
}

impl SuiteCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every plugin, in order.
    pub fn load(plugins: &[Box<dyn QualityPlugin>]) -> Result<Self> {
        let mut catalog = Self::new();
        for plugin in plugins {
            catalog.add_suite(plugin.suite_components()?)?;
        }
        Ok(catalog)
    }

    /// Register a suite. Keys are unique.
    pub fn add_suite(&mut self, components: SuiteComponents) -> Result<()> {
        if self.suites.contains_key(&components.key) {
            return Err(QualityError::DuplicateRegistration(components.key));
        }
        tracing::debug!(
            "Registered suite {} ({} parser, constraints: {})",
            components.key,
            components.parser.format(),
            components.constraints.labels().collect::<Vec<_>>().join(", ")
        );
        self.order.push(components.key.clone());
        self.suites.insert(components.key.clone(), components);
        Ok(())
    }

    /// Suite names in registration order.
    pub fn available_suites(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Components of a suite.
    pub fn get_suite(&self, key: &str) -> Option<&SuiteComponents> {
        self.suites.get(key)
    }

    /// Whether a suite is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.suites.contains_key(key)
    }
}
