//! Turns configured stanzas into runnable suites.

use std::path::PathBuf;
use vigilance_core::{QualityError, QualityReport, Result, SuiteOutcome};

use crate::config::SuiteStanza;
use crate::constraint::ConstraintSet;
use crate::plugin::SuiteCatalog;

/// A suite ready to evaluate.
#[derive(Debug)]
pub struct ConstraintSuite {
    /// Suite name
    pub name: String,

    /// Report the items came from
    pub source: PathBuf,

    /// Bound constraints in configuration order
    pub constraints: ConstraintSet,

    /// Parsed report
    pub report: QualityReport,
}

impl ConstraintSuite {
    /// Evaluate the suite.
    pub fn run(&self) -> SuiteOutcome {
        tracing::info!(
            "Evaluating suite {} ({} constraints, {} items)",
            self.name,
            self.constraints.len(),
            self.report.len()
        );
        self.constraints.evaluate(&self.name, &self.report)
    }
}

/// Resolves stanzas against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct SuiteResolver<'a> {
    catalog: &'a SuiteCatalog,
}

impl<'a> SuiteResolver<'a> {
    /// Create a resolver.
    pub fn new(catalog: &'a SuiteCatalog) -> Self {
        Self { catalog }
    }

    /// Configured suites the catalog does not know, in configuration order.
    pub fn unknown_suites<'s>(&self, stanzas: &'s [SuiteStanza]) -> Vec<&'s str> {
        stanzas
            .iter()
            .map(|s| s.name.as_str())
            .filter(|name| !self.catalog.contains(name))
            .collect()
    }

    /// Resolve one stanza.
    ///
    /// Constraints are built before the report is read. Parser errors are
    /// returned as they are.
    pub fn resolve(&self, stanza: &SuiteStanza) -> Result<ConstraintSuite> {
        let components = self
            .catalog
            .get_suite(&stanza.name)
            .ok_or_else(|| QualityError::UnknownSuite(vec![stanza.name.clone()]))?;

        let constraints = components.constraints.build_all(&stanza.name, &stanza.constraints)?;

        tracing::debug!(
            "Parsing {} report {}",
            components.parser.format(),
            stanza.report.display()
        );
        let report = components.parser.parse(&stanza.report)?;
        report.ensure_unique(&stanza.name)?;

        Ok(ConstraintSuite {
            name: stanza.name.clone(),
            source: stanza.report.clone(),
            constraints,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintDeclaration;
    use crate::plugin::tests::LineListPlugin;
    use crate::plugin::QualityPlugin;

    fn catalog() -> SuiteCatalog {
        let plugins: Vec<Box<dyn QualityPlugin>> = vec![Box::new(LineListPlugin)];
        SuiteCatalog::load(&plugins).unwrap()
    }

    fn line_rule(threshold: i64) -> ConstraintDeclaration {
        ConstraintDeclaration::new("line-coverage")
            .with_pattern("**")
            .with_param("threshold", threshold)
    }

    #[test]
    fn test_resolve_and_run() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("lines.txt");
        std::fs::write(&report, "pkg/A.ext 90\npkg/B.ext 60\n").unwrap();

        let catalog = catalog();
        let stanza = SuiteStanza::new("lines", &report).with_constraint(line_rule(75));
        let suite = SuiteResolver::new(&catalog).resolve(&stanza).unwrap();
        assert_eq!(suite.report.len(), 2);

        let outcome = suite.run();
        assert!(!outcome.passed());
        assert_eq!(outcome.violations().count(), 1);
    }

    #[test]
    fn test_unknown_constraint_skips_report() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog();
        let stanza = SuiteStanza::new("lines", dir.path().join("never-written.txt"))
            .with_constraint(ConstraintDeclaration::new("complexity").with_pattern("**"));

        let err = SuiteResolver::new(&catalog).resolve(&stanza).unwrap_err();
        assert!(matches!(err, QualityError::UnknownConstraint { .. }));
    }

    #[test]
    fn test_parser_error_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("lines.txt");
        std::fs::write(&report, "garbage\n").unwrap();

        let catalog = catalog();
        let stanza = SuiteStanza::new("lines", &report).with_constraint(line_rule(75));
        match SuiteResolver::new(&catalog).resolve(&stanza).unwrap_err() {
            QualityError::ReportParsing(e) => assert_eq!(e.message, "malformed line: garbage"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_items_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("lines.txt");
        std::fs::write(&report, "pkg/A.ext 90\npkg/A.ext 10\n").unwrap();

        let catalog = catalog();
        let stanza = SuiteStanza::new("lines", &report).with_constraint(line_rule(75));
        assert!(matches!(
            SuiteResolver::new(&catalog).resolve(&stanza),
            Err(QualityError::DuplicateItem { .. })
        ));
    }

    #[test]
    fn test_unknown_suites_in_order() {
        let catalog = catalog();
        let stanzas = vec![
            SuiteStanza::new("zeta", "z"),
            SuiteStanza::new("lines", "l"),
            SuiteStanza::new("alpha", "a"),
        ];
        assert_eq!(SuiteResolver::new(&catalog).unknown_suites(&stanzas), vec!["zeta", "alpha"]);
    }
}
