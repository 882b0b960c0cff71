//! Doxygen documentation suite.

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use vigilance_core::{
    DocumentationError, MissingDocKind, QualityItem, QualityReport, ReportParsingError,
    Satisfaction, Severity,
};
use vigilance_quality::{
    Constraint, ConstraintRegistry, QualityPlugin, ReportParser, SuiteComponents,
};

/// Suite key.
pub const SUITE: &str = "doxygen";

/// `path:line: warning: text` or `path:line: error: text`
static WARNING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<path>.+?):(?P<line>\d+):\s*(?P<severity>warning|error):\s*(?P<message>.*)$",
    )
    .unwrap()
});

/// Checked in order; the first match classifies the message.
static KINDS: LazyLock<Vec<(Regex, MissingDocKind)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?i)return (type|value)").unwrap(), MissingDocKind::ReturnValue),
        (
            Regex::new(r"(?i)parameters? .*(not|no) .*documented|argument .* not found").unwrap(),
            MissingDocKind::Parameter,
        ),
        (
            Regex::new(r"(?i)(member|class|file|function|namespace|struct) .* is not documented")
                .unwrap(),
            MissingDocKind::Member,
        ),
    ]
});

/// Classify a warning message.
pub fn classify(message: &str) -> MissingDocKind {
    KINDS
        .iter()
        .find(|(re, _)| re.is_match(message))
        .map(|(_, kind)| *kind)
        .unwrap_or(MissingDocKind::Other)
}

/// Parser for Doxygen warning logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoxygenParser;

impl DoxygenParser {
    fn entry(line: &str) -> DocumentationError {
        match WARNING_LINE.captures(line) {
            Some(caps) => {
                let message = caps["message"].trim();
                let mut entry =
                    DocumentationError::new(&caps["path"], message).with_kind(classify(message));
                if let Some(severity) = Severity::parse(&caps["severity"]) {
                    entry = entry.with_severity(severity);
                }
                match caps["line"].parse::<u32>() {
                    Ok(number) => entry.with_line(number),
                    Err(_) => entry,
                }
            }
            None => DocumentationError::new(line, line).with_kind(classify(line)),
        }
    }
}

impl ReportParser for DoxygenParser {
    fn format(&self) -> &str {
        "doxygen-log"
    }

    /// One item per distinct identity, in order of first appearance.
    fn parse_str(&self, contents: &str) -> Result<QualityReport, ReportParsingError> {
        let mut seen = HashSet::new();
        let report: QualityReport = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| QualityItem::from(Self::entry(line)))
            .filter(|item| seen.insert(item.identity()))
            .collect();
        tracing::debug!("Parsed {} documentation warning(s)", report.len());
        Ok(report)
    }
}

/// Every accepted documentation warning is a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Documentation;

impl Documentation {
    /// Registered name.
    pub const NAME: &'static str = "documentation";
}

impl Constraint for Documentation {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self, item: &QualityItem) -> bool {
        matches!(item, QualityItem::Documentation(_))
    }

    fn check(&self, item: &QualityItem) -> Satisfaction {
        Satisfaction::fail(
            item.identity(),
            Self::NAME,
            format!("documentation failure: {}", item.describe()),
        )
    }
}

/// The default documentation suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoxygenPlugin;

impl DoxygenPlugin {
    /// Constraints of the suite.
    pub fn registry() -> vigilance_core::Result<ConstraintRegistry> {
        let mut registry = ConstraintRegistry::with_defaults();
        registry.register_scoped(Documentation::NAME, |d| {
            d.expect_only(&[])?;
            Ok(Box::new(Documentation))
        })?;
        Ok(registry)
    }
}

impl QualityPlugin for DoxygenPlugin {
    fn suite_components(&self) -> vigilance_core::Result<SuiteComponents> {
        Ok(SuiteComponents {
            key: SUITE.to_string(),
            parser: Arc::new(DoxygenParser),
            constraints: Self::registry()?,
        })
    }
}
