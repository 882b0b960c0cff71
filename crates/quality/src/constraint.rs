//! Constraints and the constraint set.

use std::fmt;
use vigilance_core::{
    ItemKind, QualityItem, QualityReport, Satisfaction, ScopeNote, SuiteOutcome,
};

use crate::config::Scope;
use crate::pattern::PathPattern;

/// The property a constraint judges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension<'a> {
    /// Exemptions compete in every dimension
    Every,
    /// A single named property
    Only(&'a str),
}

impl Dimension<'_> {
    /// Whether a constraint of this dimension competes for `name`.
    pub fn covers(&self, name: &str) -> bool {
        match self {
            Dimension::Every => true,
            Dimension::Only(own) => *own == name,
        }
    }
}

/// A bound, executable rule.
///
/// Constraints are immutable once built and can be evaluated any number of
/// times.
pub trait Constraint: Send + Sync + fmt::Debug {
    /// Registered name.
    fn name(&self) -> &str;

    /// Judged property; defaults to the name.
    fn dimension(&self) -> Dimension<'_> {
        Dimension::Only(self.name())
    }

    /// Declared scope, for notes and labels.
    fn scope(&self) -> String {
        "**".to_string()
    }

    /// Whether the constraint applies to an item.
    fn accepts(&self, _item: &QualityItem) -> bool {
        true
    }

    /// Judge an item.
    fn check(&self, item: &QualityItem) -> Satisfaction;
}

fn label(name: &str, scope: &str) -> String {
    format!("{}({})", name, scope)
}

fn in_scope(scope: Scope, item: &QualityItem) -> bool {
    match scope {
        Scope::File => matches!(item.kind(), ItemKind::File | ItemKind::Documentation),
        Scope::Package => item.kind() == ItemKind::Package,
    }
}

/// Applies a constraint to files (and documentation entries) whose path matches.
#[derive(Debug)]
pub struct FileConstraint {
    inner: Box<dyn Constraint>,
    pattern: PathPattern,
}

impl FileConstraint {
    /// Scope `inner` to matching file paths.
    pub fn new(inner: Box<dyn Constraint>, pattern: PathPattern) -> Self {
        Self { inner, pattern }
    }
}

impl Constraint for FileConstraint {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn dimension(&self) -> Dimension<'_> {
        self.inner.dimension()
    }

    fn scope(&self) -> String {
        self.pattern.to_string()
    }

    fn accepts(&self, item: &QualityItem) -> bool {
        in_scope(Scope::File, item) && self.pattern.matches(item.path()) && self.inner.accepts(item)
    }

    fn check(&self, item: &QualityItem) -> Satisfaction {
        Satisfaction {
            constraint: label(self.name(), self.pattern.as_str()),
            ..self.inner.check(item)
        }
    }
}

/// Applies a constraint to packages whose name matches.
#[derive(Debug)]
pub struct PackageConstraint {
    inner: Box<dyn Constraint>,
    pattern: PathPattern,
}

impl PackageConstraint {
    /// Scope `inner` to matching package names.
    pub fn new(inner: Box<dyn Constraint>, pattern: PathPattern) -> Self {
        Self { inner, pattern }
    }
}

impl Constraint for PackageConstraint {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn dimension(&self) -> Dimension<'_> {
        self.inner.dimension()
    }

    fn scope(&self) -> String {
        format!("package {}", self.pattern)
    }

    fn accepts(&self, item: &QualityItem) -> bool {
        in_scope(Scope::Package, item)
            && self.pattern.matches(item.path())
            && self.inner.accepts(item)
    }

    fn check(&self, item: &QualityItem) -> Satisfaction {
        Satisfaction {
            constraint: label(self.name(), &self.scope()),
            ..self.inner.check(item)
        }
    }
}

/// Exempts matching items from every other constraint placed after it.
#[derive(Debug)]
pub struct IgnoreFiles {
    patterns: Vec<PathPattern>,
    scope: Scope,
}

impl IgnoreFiles {
    /// Name under which the exemption is registered.
    pub const NAME: &'static str = "ignore";

    /// Ignore files matching any of `patterns`.
    pub fn new(patterns: Vec<PathPattern>) -> Self {
        Self {
            patterns,
            scope: Scope::File,
        }
    }

    /// Set the item scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

impl Constraint for IgnoreFiles {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn dimension(&self) -> Dimension<'_> {
        Dimension::Every
    }

    fn scope(&self) -> String {
        let patterns: Vec<&str> = self.patterns.iter().map(PathPattern::as_str).collect();
        match self.scope {
            Scope::File => patterns.join(", "),
            Scope::Package => format!("package {}", patterns.join(", ")),
        }
    }

    fn accepts(&self, item: &QualityItem) -> bool {
        in_scope(self.scope, item) && self.patterns.iter().any(|p| p.matches(item.path()))
    }

    fn check(&self, item: &QualityItem) -> Satisfaction {
        Satisfaction::pass(item.identity(), label(Self::NAME, &self.scope()))
    }
}

/// Ordered constraints of one suite.
#[derive(Debug, Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint.
    pub fn push(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constraints in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Constraint> {
        self.constraints.iter().map(|c| c.as_ref())
    }

    /// Named dimensions in order of first appearance.
    fn dimensions(&self) -> Vec<&str> {
        let mut dimensions = Vec::new();
        for constraint in &self.constraints {
            if let Dimension::Only(name) = constraint.dimension() {
                if !dimensions.contains(&name) {
                    dimensions.push(name);
                }
            }
        }
        dimensions
    }

    /// Indices of the constraints that judge `item`, in configuration order.
    ///
    /// Per dimension the first accepting constraint wins; exemptions compete
    /// in every dimension.
    fn select(&self, item: &QualityItem, dimensions: &[&str]) -> Vec<usize> {
        let mut chosen = Vec::new();

        if dimensions.is_empty() {
            if let Some(index) = self.constraints.iter().position(|c| c.accepts(item)) {
                chosen.push(index);
            }
        }

        for dimension in dimensions {
            let winner = self
                .constraints
                .iter()
                .position(|c| c.dimension().covers(dimension) && c.accepts(item));
            if let Some(index) = winner {
                if !chosen.contains(&index) {
                    chosen.push(index);
                }
            }
        }

        chosen.sort_unstable();
        chosen
    }

    /// Evaluate every item of `report` in report order.
    ///
    /// Items no constraint accepts are implicitly satisfied and produce no
    /// satisfaction.
    pub fn evaluate(&self, suite: &str, report: &QualityReport) -> SuiteOutcome {
        let dimensions = self.dimensions();
        let mut satisfactions = Vec::new();

        for item in report.items() {
            let chosen = self.select(item, &dimensions);
            if chosen.is_empty() {
                tracing::debug!("{}: {} is unconstrained", suite, item.describe());
                continue;
            }
            for index in chosen {
                let satisfaction = self.constraints[index].check(item);
                tracing::debug!(
                    "{}: {} -> {} ({})",
                    suite,
                    item.describe(),
                    satisfaction.constraint,
                    if satisfaction.passed { "pass" } else { "fail" }
                );
                satisfactions.push(satisfaction);
            }
        }

        let notes = self
            .constraints
            .iter()
            .filter(|c| !report.items().iter().any(|item| c.accepts(item)))
            .map(|c| {
                let note = ScopeNote {
                    constraint: c.name().to_string(),
                    scope: c.scope(),
                };
                tracing::warn!(
                    "{}: constraint \"{}\" with scope \"{}\" matched no items",
                    suite,
                    note.constraint,
                    note.scope
                );
                note
            })
            .collect();

        SuiteOutcome {
            suite: suite.to_string(),
            satisfactions,
            notes,
            items_evaluated: report.len(),
        }
    }
}

impl FromIterator<Box<dyn Constraint>> for ConstraintSet {
    fn from_iter<T: IntoIterator<Item = Box<dyn Constraint>>>(iter: T) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use vigilance_core::{FileUnderTest, ItemIdentity, ItemPath, PackageUnderTest};

    /// Minimum line coverage, enough to exercise the set.
    #[derive(Debug)]
    pub(crate) struct MinLine(pub f64);

    impl Constraint for MinLine {
        fn name(&self) -> &str {
            "line-coverage"
        }

        fn accepts(&self, item: &QualityItem) -> bool {
            item.coverage().is_some()
        }

        fn check(&self, item: &QualityItem) -> Satisfaction {
            let actual = item.coverage().map(|m| m.line_coverage).unwrap_or_default();
            if actual < self.0 {
                Satisfaction::fail(
                    item.identity(),
                    self.name(),
                    format!(
                        "Line coverage too low for {} ({}/{})",
                        item.describe(),
                        actual,
                        self.0
                    ),
                )
            } else {
                Satisfaction::pass(item.identity(), self.name())
            }
        }
    }

    /// Minimum branch coverage.
    #[derive(Debug)]
    pub(crate) struct MinBranch(pub f64);

    impl Constraint for MinBranch {
        fn name(&self) -> &str {
            "branch-coverage"
        }

        fn check(&self, item: &QualityItem) -> Satisfaction {
            let actual = item.coverage().map(|m| m.branch_coverage).unwrap_or_default();
            if actual < self.0 {
                Satisfaction::fail(item.identity(), self.name(), format!("{}", actual))
            } else {
                Satisfaction::pass(item.identity(), self.name())
            }
        }
    }

    pub(crate) fn files(pattern: &str, inner: impl Constraint + 'static) -> Box<dyn Constraint> {
        Box::new(FileConstraint::new(Box::new(inner), PathPattern::new(pattern).unwrap()))
    }

    pub(crate) fn ignore(pattern: &str) -> Box<dyn Constraint> {
        Box::new(IgnoreFiles::new(vec![PathPattern::new(pattern).unwrap()]))
    }

    fn file(path: &str, line: f64) -> QualityItem {
        FileUnderTest::new(path).with_line_coverage(line).into()
    }

    fn id(path: &str) -> ItemIdentity {
        ItemIdentity::new(ItemKind::File, ItemPath::new(path))
    }

    #[test]
    fn test_ignore_first_wins_over_broader_constraint() {
        let set: ConstraintSet =
            vec![ignore("a/*"), files("**", MinLine(80.0))].into_iter().collect();
        let report = QualityReport::new(vec![file("a/x.ext", 10.0)]);

        let outcome = set.evaluate("cobertura", &report);
        assert_eq!(outcome.satisfactions.len(), 1);
        assert!(outcome.satisfactions[0].passed);
        assert_eq!(outcome.satisfactions[0].constraint, "ignore(a/*)");
        assert!(outcome.passed());
    }

    #[test]
    fn test_ignore_after_constraint_does_not_exempt() {
        let set: ConstraintSet =
            vec![files("**", MinLine(80.0)), ignore("a/*")].into_iter().collect();
        let report = QualityReport::new(vec![file("a/x.ext", 10.0)]);

        let outcome = set.evaluate("cobertura", &report);
        assert_eq!(outcome.satisfactions.len(), 1);
        assert!(!outcome.satisfactions[0].passed);
    }

    #[test]
    fn test_unconstrained_items_pass_silently() {
        let set: ConstraintSet = vec![files("src/**", MinLine(80.0))].into_iter().collect();
        let report = QualityReport::new(vec![file("tests/t.rs", 0.0), file("src/a.rs", 90.0)]);

        let outcome = set.evaluate("cobertura", &report);
        assert_eq!(outcome.satisfactions.len(), 1);
        assert_eq!(outcome.satisfactions[0].item, id("src/a.rs"));
        assert!(outcome.passed());
        assert_eq!(outcome.items_evaluated, 2);
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let set: ConstraintSet = vec![files("", MinLine(100.0))].into_iter().collect();
        let report = QualityReport::new(vec![file("a", 0.0), file("b/c", 0.0)]);

        let outcome = set.evaluate("cobertura", &report);
        assert!(outcome.satisfactions.is_empty());
        assert_eq!(outcome.notes.len(), 1);
        assert_eq!(outcome.notes[0].constraint, "line-coverage");
    }

    #[test]
    fn test_first_match_per_dimension() {
        let set: ConstraintSet = vec![
            files("src/**", MinLine(90.0)),
            files("**", MinLine(50.0)),
            files("**", MinBranch(40.0)),
        ]
        .into_iter()
        .collect();
        let item: QualityItem = FileUnderTest::new("src/a.rs")
            .with_line_coverage(60.0)
            .with_branch_coverage(30.0)
            .into();
        let report = QualityReport::new(vec![item]);

        let outcome = set.evaluate("cobertura", &report);
        let labels: Vec<&str> = outcome
            .satisfactions
            .iter()
            .map(|s| s.constraint.as_str())
            .collect();
        assert_eq!(labels, vec!["line-coverage(src/**)", "branch-coverage(**)"]);
        assert!(outcome.satisfactions.iter().all(|s| !s.passed));
    }

    #[test]
    fn test_exemption_is_checked_once_across_dimensions() {
        let set: ConstraintSet = vec![
            ignore("gen/**"),
            files("**", MinLine(90.0)),
            files("**", MinBranch(90.0)),
        ]
        .into_iter()
        .collect();
        let report = QualityReport::new(vec![file("gen/a.rs", 0.0)]);

        let outcome = set.evaluate("cobertura", &report);
        assert_eq!(outcome.satisfactions.len(), 1);
        assert!(outcome.passed());
    }

    #[test]
    fn test_file_scope_skips_packages() {
        let set: ConstraintSet = vec![files("**", MinLine(90.0))].into_iter().collect();
        let report = QualityReport::new(vec![PackageUnderTest::new("core").into()]);

        let outcome = set.evaluate("cobertura", &report);
        assert!(outcome.satisfactions.is_empty());
    }

    #[test]
    fn test_package_constraint() {
        let package =
            PackageConstraint::new(Box::new(MinLine(75.0)), PathPattern::new("core*").unwrap());
        let set: ConstraintSet =
            vec![Box::new(package) as Box<dyn Constraint>].into_iter().collect();
        let report = QualityReport::new(vec![
            file("core/a.rs", 0.0),
            PackageUnderTest::new("core").with_line_coverage(70.0).into(),
            PackageUnderTest::new("cli").into(),
        ]);

        let outcome = set.evaluate("cobertura", &report);
        assert_eq!(outcome.satisfactions.len(), 1);
        assert_eq!(outcome.satisfactions[0].constraint, "line-coverage(package core*)");
        assert!(!outcome.satisfactions[0].passed);
    }

    #[test]
    fn test_end_to_end_line_coverage() {
        let set: ConstraintSet = vec![files("**", MinLine(75.0))].into_iter().collect();
        let report = QualityReport::new(vec![file("pkg/A.ext", 90.0), file("pkg/B.ext", 60.0)]);

        let outcome = set.evaluate("cobertura", &report);
        assert_eq!(outcome.satisfactions.len(), 2);
        assert_eq!(outcome.satisfactions[0].item, id("pkg/A.ext"));
        assert!(outcome.satisfactions[0].passed);
        assert_eq!(outcome.satisfactions[1].item, id("pkg/B.ext"));
        assert!(!outcome.satisfactions[1].passed);
        assert!(outcome.satisfactions[1].message.as_deref().unwrap().contains("60"));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let set: ConstraintSet = vec![
            ignore("a/*"),
            files("**", MinLine(50.0)),
            files("**", MinBranch(50.0)),
        ]
        .into_iter()
        .collect();
        let report = QualityReport::new(
            (0..20).map(|i| file(&format!("d{}/f{}.rs", i % 3, i), (i * 5) as f64)).collect(),
        );

        let first = set.evaluate("cobertura", &report);
        let second = set.evaluate("cobertura", &report);
        assert_eq!(first, second);
    }
}
