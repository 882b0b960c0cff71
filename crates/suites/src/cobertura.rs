//! Cobertura coverage suite.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::sync::Arc;
use vigilance_core::{
    FileUnderTest, ItemPath, PackageUnderTest, QualityItem, QualityReport, ReportParsingError,
    Satisfaction,
};
use vigilance_quality::{
    Constraint, ConstraintDeclaration, ConstraintRegistry, QualityPlugin, ReportParser,
    SuiteComponents,
};

/// Suite key.
pub const SUITE: &str = "cobertura";

const MALFORMED: &str = "Unable to parse Cobertura report as XML";

/// Parser for Cobertura XML reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoberturaParser;

impl ReportParser for CoberturaParser {
    fn format(&self) -> &str {
        "cobertura-xml"
    }

    fn parse_str(&self, contents: &str) -> Result<QualityReport, ReportParsingError> {
        let mut reader = Reader::from_str(contents);
        let mut buf = Vec::new();

        let mut collected = Collected::default();
        let mut depth = 0usize;
        let mut seen_element = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    seen_element = true;
                    collected.element(e)?;
                }
                Ok(Event::Empty(ref e)) => {
                    seen_element = true;
                    collected.element(e)?;
                }
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => break,
                Err(e) => {
                    tracing::debug!("Cobertura parsing failed: {}", e);
                    return Err(ReportParsingError::new(MALFORMED).with_source(e));
                }
                _ => {}
            }
            buf.clear();
        }

        if !seen_element || depth != 0 {
            return Err(ReportParsingError::new(MALFORMED));
        }

        Ok(collected.into_report())
    }
}

/// Coverage figures of one element.
#[derive(Debug, Clone, Copy)]
struct Figures {
    line: f64,
    branch: f64,
    complexity: f64,
}

impl Figures {
    fn read(attrs: &HashMap<String, String>) -> Self {
        Self {
            line: percent(attrs, "line-rate"),
            branch: percent(attrs, "branch-rate"),
            complexity: number(attrs, "complexity"),
        }
    }

    /// Lowest coverage and highest complexity of both.
    fn fold(self, other: Figures) -> Self {
        Self {
            line: self.line.min(other.line),
            branch: self.branch.min(other.branch),
            complexity: self.complexity.max(other.complexity),
        }
    }
}

/// Files and packages in document order, one entry per path.
///
/// Classes sharing a filename (inner and anonymous classes) fold into the
/// first file with that path. Packages sharing a name fold the same way.
#[derive(Debug, Default)]
struct Collected {
    files: Vec<(ItemPath, Figures)>,
    packages: Vec<(ItemPath, Figures)>,
    file_index: HashMap<ItemPath, usize>,
    package_index: HashMap<ItemPath, usize>,
}

impl Collected {
    fn element(&mut self, element: &BytesStart<'_>) -> Result<(), ReportParsingError> {
        match element.local_name().as_ref() {
            b"class" => {
                let attrs = attributes(element)?;
                let path = attrs.get("filename").ok_or_else(|| {
                    ReportParsingError::new("Cobertura class element has no filename attribute")
                })?;
                let figures = Figures::read(&attrs);
                Self::add(
                    &mut self.files,
                    &mut self.file_index,
                    ItemPath::new(path.as_str()),
                    figures,
                );
            }
            b"package" => {
                let attrs = attributes(element)?;
                let name = attrs.get("name").ok_or_else(|| {
                    ReportParsingError::new("Cobertura package element has no name attribute")
                })?;
                let figures = Figures::read(&attrs);
                Self::add(
                    &mut self.packages,
                    &mut self.package_index,
                    ItemPath::new(name.as_str()),
                    figures,
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn add(
        entries: &mut Vec<(ItemPath, Figures)>,
        index: &mut HashMap<ItemPath, usize>,
        path: ItemPath,
        figures: Figures,
    ) {
        match index.get(&path) {
            Some(&position) => {
                tracing::debug!("Merging repeated Cobertura entry {}", path);
                let entry = &mut entries[position];
                entry.1 = entry.1.fold(figures);
            }
            None => {
                index.insert(path.clone(), entries.len());
                entries.push((path, figures));
            }
        }
    }

    fn into_report(self) -> QualityReport {
        tracing::debug!(
            "Parsed {} file(s) and {} package(s)",
            self.files.len(),
            self.packages.len()
        );
        let files = self.files.into_iter().map(|(path, f)| {
            QualityItem::from(
                FileUnderTest::new(path)
                    .with_line_coverage(f.line)
                    .with_branch_coverage(f.branch)
                    .with_complexity(f.complexity),
            )
        });
        let packages = self.packages.into_iter().map(|(name, f)| {
            QualityItem::from(
                PackageUnderTest::new(name)
                    .with_line_coverage(f.line)
                    .with_branch_coverage(f.branch)
                    .with_complexity(f.complexity),
            )
        });
        files.chain(packages).collect()
    }
}

fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, ReportParsingError> {
    let mut attrs = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ReportParsingError::new(MALFORMED).with_source(e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ReportParsingError::new(MALFORMED).with_source(e))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(attrs)
}

fn number(attrs: &HashMap<String, String>, key: &str) -> f64 {
    match attrs.get(key).and_then(|v| v.trim().parse::<f64>().ok()) {
        Some(value) => value,
        None => {
            tracing::warn!("Failed to find attribute in XML element: {}", key);
            0.0
        }
    }
}

/// A rate in `0..=1` as a percentage, without float noise past six decimals.
fn percent(attrs: &HashMap<String, String>, key: &str) -> f64 {
    (number(attrs, key) * 1e8).round() / 1e6
}

/// Minimum line coverage, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCoverage {
    minimum: f64,
}

impl LineCoverage {
    /// Registered name.
    pub const NAME: &'static str = "line-coverage";

    /// Require at least `minimum` percent.
    pub fn new(minimum: f64) -> Self {
        Self { minimum }
    }
}

impl Constraint for LineCoverage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self, item: &QualityItem) -> bool {
        item.coverage().is_some()
    }

    fn check(&self, item: &QualityItem) -> Satisfaction {
        let actual = item.coverage().map(|m| m.line_coverage).unwrap_or_default();
        if actual < self.minimum {
            Satisfaction::fail(
                item.identity(),
                Self::NAME,
                format!(
                    "Line coverage too low for {} ({}/{})",
                    item.describe(),
                    actual,
                    self.minimum
                ),
            )
        } else {
            Satisfaction::pass(item.identity(), Self::NAME)
        }
    }
}

/// Minimum branch coverage, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchCoverage {
    minimum: f64,
}

impl BranchCoverage {
    /// Registered name.
    pub const NAME: &'static str = "branch-coverage";

    /// Require at least `minimum` percent.
    pub fn new(minimum: f64) -> Self {
        Self { minimum }
    }
}

impl Constraint for BranchCoverage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self, item: &QualityItem) -> bool {
        item.coverage().is_some()
    }

    fn check(&self, item: &QualityItem) -> Satisfaction {
        let actual = item.coverage().map(|m| m.branch_coverage).unwrap_or_default();
        if actual < self.minimum {
            Satisfaction::fail(
                item.identity(),
                Self::NAME,
                format!(
                    "Branch coverage too low for {} ({}/{})",
                    item.describe(),
                    actual,
                    self.minimum
                ),
            )
        } else {
            Satisfaction::pass(item.identity(), Self::NAME)
        }
    }
}

/// Maximum complexity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complexity {
    maximum: f64,
}

impl Complexity {
    /// Registered name.
    pub const NAME: &'static str = "complexity";

    /// Allow at most `maximum`.
    pub fn new(maximum: f64) -> Self {
        Self { maximum }
    }
}

impl Constraint for Complexity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn accepts(&self, item: &QualityItem) -> bool {
        item.coverage().is_some()
    }

    fn check(&self, item: &QualityItem) -> Satisfaction {
        let actual = item.coverage().map(|m| m.complexity).unwrap_or_default();
        if actual > self.maximum {
            Satisfaction::fail(
                item.identity(),
                Self::NAME,
                format!(
                    "Complexity too high for {} ({}/{})",
                    item.describe(),
                    actual,
                    self.maximum
                ),
            )
        } else {
            Satisfaction::pass(item.identity(), Self::NAME)
        }
    }
}

fn threshold(declaration: &ConstraintDeclaration) -> vigilance_core::Result<f64> {
    declaration.expect_only(&["threshold"])?;
    declaration.number("threshold")
}

/// The default coverage suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoberturaPlugin;

impl CoberturaPlugin {
    /// Constraints of the suite.
    pub fn registry() -> vigilance_core::Result<ConstraintRegistry> {
        let mut registry = ConstraintRegistry::with_defaults();
        registry.register_scoped(LineCoverage::NAME, |d| {
            Ok(Box::new(LineCoverage::new(threshold(d)?)))
        })?;
        registry.register_scoped(BranchCoverage::NAME, |d| {
            Ok(Box::new(BranchCoverage::new(threshold(d)?)))
        })?;
        registry.register_scoped(Complexity::NAME, |d| {
            Ok(Box::new(Complexity::new(threshold(d)?)))
        })?;
        Ok(registry)
    }
}

impl QualityPlugin for CoberturaPlugin {
    fn suite_components(&self) -> vigilance_core::Result<SuiteComponents> {
        Ok(SuiteComponents {
            key: SUITE.to_string(),
            parser: Arc::new(CoberturaParser),
            constraints: Self::registry()?,
        })
    }
}
