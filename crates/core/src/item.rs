//! Item model - the things a constraint can judge.

use serde::{Deserialize, Serialize};

use crate::id::{ItemIdentity, ItemKind, ItemPath};

/// A source file from a coverage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUnderTest {
    /// File path
    pub path: ItemPath,

    /// Line coverage, in percent
    pub line_coverage: f64,

    /// Branch coverage, in percent
    pub branch_coverage: f64,

    /// Complexity score
    pub complexity: f64,
}

impl FileUnderTest {
    /// Create a file with zeroed metrics.
    pub fn new(path: impl Into<ItemPath>) -> Self {
        Self {
            path: path.into(),
            line_coverage: 0.0,
            branch_coverage: 0.0,
            complexity: 0.0,
        }
    }

    /// Set line coverage.
    pub fn with_line_coverage(mut self, percent: f64) -> Self {
        self.line_coverage = percent;
        self
    }

    /// Set branch coverage.
    pub fn with_branch_coverage(mut self, percent: f64) -> Self {
        self.branch_coverage = percent;
        self
    }

    /// Set complexity.
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }
}

/// A package from a coverage report, aggregated over its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageUnderTest {
    /// Package name, matched like a path
    pub name: ItemPath,

    /// Line coverage, in percent
    pub line_coverage: f64,

    /// Branch coverage, in percent
    pub branch_coverage: f64,

    /// Complexity score
    pub complexity: f64,
}

impl PackageUnderTest {
    /// Create a package with zeroed metrics.
    pub fn new(name: impl Into<ItemPath>) -> Self {
        Self {
            name: name.into(),
            line_coverage: 0.0,
            branch_coverage: 0.0,
            complexity: 0.0,
        }
    }

    /// Set line coverage.
    pub fn with_line_coverage(mut self, percent: f64) -> Self {
        self.line_coverage = percent;
        self
    }

    /// Set branch coverage.
    pub fn with_branch_coverage(mut self, percent: f64) -> Self {
        self.branch_coverage = percent;
        self
    }

    /// Set complexity.
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }
}

/// What documentation is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingDocKind {
    /// A member, class or file has no documentation
    Member,
    /// A parameter is undocumented
    Parameter,
    /// The return value is undocumented
    ReturnValue,
    /// Anything else the tool complained about
    Other,
}

/// Severity a documentation tool gave a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// `warning:`
    Warning,
    /// `error:`
    Error,
}

impl Severity {
    /// Parse the tool's severity word.
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }

    /// The severity word.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A documentation warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationError {
    /// File the warning points at
    pub location: ItemPath,

    /// Line within the file, when reported
    pub line: Option<u32>,

    /// Classified kind
    pub kind: MissingDocKind,

    /// Reported severity, when the line carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Warning text
    pub message: String,
}

impl DocumentationError {
    /// Create a documentation error.
    pub fn new(location: impl Into<ItemPath>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            line: None,
            kind: MissingDocKind::Other,
            severity: None,
            message: message.into(),
        }
    }

    /// Set line.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Set kind.
    pub fn with_kind(mut self, kind: MissingDocKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Coverage figures shared by files and packages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageMetrics {
    /// Line coverage, in percent
    pub line_coverage: f64,
    /// Branch coverage, in percent
    pub branch_coverage: f64,
    /// Complexity score
    pub complexity: f64,
}

/// A unit of judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QualityItem {
    /// A file under test
    File(FileUnderTest),
    /// A package under test
    Package(PackageUnderTest),
    /// A documentation entry
    Documentation(DocumentationError),
}

impl QualityItem {
    /// Item kind.
    pub fn kind(&self) -> ItemKind {
        match self {
            QualityItem::File(_) => ItemKind::File,
            QualityItem::Package(_) => ItemKind::Package,
            QualityItem::Documentation(_) => ItemKind::Documentation,
        }
    }

    /// Path used for pattern matching.
    pub fn path(&self) -> &ItemPath {
        match self {
            QualityItem::File(file) => &file.path,
            QualityItem::Package(package) => &package.name,
            QualityItem::Documentation(doc) => &doc.location,
        }
    }

    /// Stable identity of the item.
    ///
    /// Documentation entries are told apart by line, severity and message.
    pub fn identity(&self) -> ItemIdentity {
        match self {
            QualityItem::Documentation(doc) => {
                let line = doc.line.map(|l| l.to_string()).unwrap_or_default();
                let qualifier = match doc.severity {
                    Some(severity) => format!("{}:{}:{}", line, severity.as_str(), doc.message),
                    None => format!("{}:{}", line, doc.message),
                };
                ItemIdentity::qualified(ItemKind::Documentation, doc.location.clone(), qualifier)
            }
            other => ItemIdentity::new(other.kind(), other.path().clone()),
        }
    }

    /// Human readable description used in messages.
    pub fn describe(&self) -> String {
        match self {
            QualityItem::File(file) => format!("file {}", file.path),
            QualityItem::Package(package) => format!("package {}", package.name),
            QualityItem::Documentation(doc) => match doc.line {
                Some(line) => format!("{}:{}: {}", doc.location, line, doc.message),
                None => doc.message.clone(),
            },
        }
    }

    /// Coverage metrics, for files and packages.
    pub fn coverage(&self) -> Option<CoverageMetrics> {
        match self {
            QualityItem::File(f) => Some(CoverageMetrics {
                line_coverage: f.line_coverage,
                branch_coverage: f.branch_coverage,
                complexity: f.complexity,
            }),
            QualityItem::Package(p) => Some(CoverageMetrics {
                line_coverage: p.line_coverage,
                branch_coverage: p.branch_coverage,
                complexity: p.complexity,
            }),
            QualityItem::Documentation(_) => None,
        }
    }
}

impl From<FileUnderTest> for QualityItem {
    fn from(file: FileUnderTest) -> Self {
        QualityItem::File(file)
    }
}

impl From<PackageUnderTest> for QualityItem {
    fn from(package: PackageUnderTest) -> Self {
        QualityItem::Package(package)
    }
}

impl From<DocumentationError> for QualityItem {
    fn from(doc: DocumentationError) -> Self {
        QualityItem::Documentation(doc)
    }
}
