//! Error taxonomy.

use std::path::PathBuf;

use crate::id::ItemIdentity;
use crate::report::GateReport;

/// Result type for quality operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Raised by a parser when a report cannot be read or understood.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ReportParsingError {
    /// Report file, when known
    pub report: Option<PathBuf>,

    /// Parser diagnostic
    pub message: String,

    /// Underlying cause
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ReportParsingError {
    /// Create an error from a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            report: None,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach the report path.
    pub fn with_report(mut self, report: impl Into<PathBuf>) -> Self {
        self.report = Some(report.into());
        self
    }
}

/// Errors that abort a quality run.
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    /// Malformed or structurally invalid configuration
    #[error("configuration error: {0}")]
    ConfigurationParsing(String),

    /// Configuration names suites without a registered plugin
    #[error("suites were configured but not available: {}", .0.join(", "))]
    UnknownSuite(Vec<String>),

    /// Configuration names a constraint the suite does not register
    #[error("unknown constraint \"{name}\" for suite \"{suite}\"")]
    UnknownConstraint {
        /// Suite whose stanza declared the constraint
        suite: String,
        /// Declared constraint name
        name: String,
    },

    /// A report could not be parsed
    #[error(transparent)]
    ReportParsing(#[from] ReportParsingError),

    /// A parser produced two items with the same identity
    #[error("duplicate item in {suite} report: {identity}")]
    DuplicateItem {
        /// Suite whose report held the collision
        suite: String,
        /// Colliding identity
        identity: ItemIdentity,
    },

    /// A suite or constraint name was registered twice
    #[error("\"{0}\" is already registered")]
    DuplicateRegistration(String),

    /// A scope pattern could not be compiled
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// Declared pattern
        pattern: String,
        /// Compiler diagnostic
        reason: String,
    },

    /// A suite's evaluation task did not complete
    #[error("evaluation of suite \"{suite}\" was aborted: {reason}")]
    Aborted {
        /// Suite being evaluated
        suite: String,
        /// Runtime diagnostic
        reason: String,
    },

    /// The gate failed; carries the full aggregated report
    #[error("{} quality violation(s) detected", .0.violation_count())]
    QualityViolationsDetected(Box<GateReport>),
}

impl QualityError {
    /// Process exit code for the error.
    ///
    /// Report, configuration and suite errors read as -2, -3 and -4 from a
    /// shell.
    pub fn exit_code(&self) -> u8 {
        match self {
            QualityError::QualityViolationsDetected(_) => 1,
            QualityError::ReportParsing(_) => 254,
            QualityError::ConfigurationParsing(_) | QualityError::InvalidPattern { .. } => 253,
            QualityError::UnknownSuite(_) => 252,
            QualityError::UnknownConstraint { .. } => 251,
            QualityError::DuplicateItem { .. } => 250,
            QualityError::DuplicateRegistration(_) => 249,
            QualityError::Aborted { .. } => 248,
        }
    }

    /// Whether this is the expected "gate failed" signal rather than a fault.
    pub fn is_violation(&self) -> bool {
        matches!(self, QualityError::QualityViolationsDetected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_report_parsing_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: QualityError =
            ReportParsingError::new("Could not open report \"a.xml\" for reading")
                .with_report("a.xml")
                .with_source(io)
                .into();

        assert_eq!(err.to_string(), "Could not open report \"a.xml\" for reading");
        assert_eq!(err.exit_code(), 254);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unknown_suite_lists_names() {
        let err = QualityError::UnknownSuite(vec!["bob".to_string(), "alice".to_string()]);
        assert_eq!(err.to_string(), "suites were configured but not available: bob, alice");
        assert_eq!(err.exit_code(), 252);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(QualityError::ConfigurationParsing("bad".into()).exit_code(), 253);
        assert_eq!(
            QualityError::UnknownConstraint { suite: "s".into(), name: "n".into() }.exit_code(),
            251
        );
        let aborted = QualityError::Aborted { suite: "doxygen".into(), reason: "cancelled".into() };
        assert_eq!(aborted.exit_code(), 248);
        assert_eq!(aborted.to_string(), "evaluation of suite \"doxygen\" was aborted: cancelled");
        let violations = QualityError::QualityViolationsDetected(Box::default());
        assert_eq!(violations.exit_code(), 1);
        assert!(violations.is_violation());
    }
}
