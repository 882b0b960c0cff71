//! Console rendering of gate results.

use serde::Serialize;
use std::fmt::Write;
use vigilance_core::{GateReport, Verdict};
use vigilance_quality::SuiteCatalog;

#[derive(Serialize)]
struct JsonVerdict<'a> {
    passed: bool,
    violations: usize,
    #[serde(flatten)]
    report: &'a GateReport,
}

/// Render a verdict as pretty JSON.
pub fn json(verdict: &Verdict) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonVerdict {
        passed: verdict.passed(),
        violations: verdict.report().violation_count(),
        report: verdict.report(),
    })
}

/// Render a verdict as text.
pub fn text(verdict: &Verdict) -> String {
    let report = verdict.report();
    let mut out = String::new();

    for suite in &report.suites {
        let failed = suite.violations().count();
        let _ = writeln!(
            out,
            "{}: {} {} item(s), {} check(s), {} violation(s)",
            suite.suite,
            if suite.passed() { "PASS" } else { "FAIL" },
            suite.items_evaluated,
            suite.satisfactions.len(),
            failed
        );
        for violation in suite.violations() {
            let _ = writeln!(
                out,
                "  - {} [{}]",
                violation.message.as_deref().unwrap_or("constraint not satisfied"),
                violation.constraint
            );
        }
        for note in &suite.notes {
            let _ = writeln!(out, "  note: {} ({}) matched no items", note.constraint, note.scope);
        }
    }

    if verdict.passed() {
        out.push_str("Quality gate passed\n");
    } else {
        let _ = writeln!(out, "Quality gate failed: {} violation(s)", report.violation_count());
    }
    out
}

/// Render the available suites.
pub fn suites(catalog: &SuiteCatalog) -> String {
    let mut out = String::new();
    let names = catalog.available_suites();
    let _ = writeln!(out, "Suites ({})", names.len());
    for name in names {
        if let Some(suite) = catalog.get_suite(name) {
            let constraints: Vec<&str> = suite.constraints.labels().collect();
            let _ = writeln!(
                out,
                "  {} | {} | {}",
                name,
                suite.parser.format(),
                constraints.join(", ")
            );
        }
    }
    out
}
