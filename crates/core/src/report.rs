//! Reports, satisfactions and the aggregated gate outcome.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{QualityError, Result};
use crate::id::ItemIdentity;
use crate::item::QualityItem;

/// Ordered items produced by one parser run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    items: Vec<QualityItem>,
}

impl QualityReport {
    /// Create a report from parsed items, keeping their order.
    pub fn new(items: Vec<QualityItem>) -> Self {
        Self { items }
    }

    /// Items in report order.
    pub fn items(&self) -> &[QualityItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the report holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fail on the first pair of items sharing an identity.
    pub fn ensure_unique(&self, suite: &str) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            let identity = item.identity();
            if !seen.insert(identity.clone()) {
                return Err(QualityError::DuplicateItem {
                    suite: suite.to_string(),
                    identity,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<QualityItem> for QualityReport {
    fn from_iter<T: IntoIterator<Item = QualityItem>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Result of checking one item against one constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Satisfaction {
    /// Judged item
    pub item: ItemIdentity,

    /// Constraint that judged it
    pub constraint: String,

    /// Whether the item satisfied the constraint
    pub passed: bool,

    /// Detail when the item failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Satisfaction {
    /// A passing result.
    pub fn pass(item: ItemIdentity, constraint: impl Into<String>) -> Self {
        Self {
            item,
            constraint: constraint.into(),
            passed: true,
            message: None,
        }
    }

    /// A failing result.
    pub fn fail(
        item: ItemIdentity,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            item,
            constraint: constraint.into(),
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// A declared constraint whose scope matched no item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeNote {
    /// Constraint name
    pub constraint: String,

    /// Declared scope
    pub scope: String,
}

/// Evaluation of one suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteOutcome {
    /// Suite name
    pub suite: String,

    /// Satisfactions in evaluation order
    pub satisfactions: Vec<Satisfaction>,

    /// Zero-match scopes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ScopeNote>,

    /// Number of report items looked at
    pub items_evaluated: usize,
}

impl SuiteOutcome {
    /// Whether every satisfaction passed.
    pub fn passed(&self) -> bool {
        self.satisfactions.iter().all(|s| s.passed)
    }

    /// Failing satisfactions.
    pub fn violations(&self) -> impl Iterator<Item = &Satisfaction> {
        self.satisfactions.iter().filter(|s| !s.passed)
    }
}

/// Aggregated outcome of a run, suites in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateReport {
    /// Outcomes per suite
    pub suites: Vec<SuiteOutcome>,
}

impl GateReport {
    /// Create a report.
    pub fn new(suites: Vec<SuiteOutcome>) -> Self {
        Self { suites }
    }

    /// AND over every satisfaction in every suite.
    pub fn passed(&self) -> bool {
        self.suites.iter().all(SuiteOutcome::passed)
    }

    /// Outcome of a suite by name.
    pub fn suite(&self, name: &str) -> Option<&SuiteOutcome> {
        self.suites.iter().find(|s| s.suite == name)
    }

    /// Failing satisfactions paired with their suite name.
    pub fn violations(&self) -> impl Iterator<Item = (&str, &Satisfaction)> {
        self.suites
            .iter()
            .flat_map(|s| s.violations().map(move |v| (s.suite.as_str(), v)))
    }

    /// Total number of failures.
    pub fn violation_count(&self) -> usize {
        self.violations().count()
    }
}

/// Final decision of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Every satisfaction passed
    Passed(GateReport),
    /// At least one satisfaction failed
    Violations(GateReport),
}

impl Verdict {
    /// Decide from an aggregated report.
    pub fn from_report(report: GateReport) -> Self {
        if report.passed() {
            Verdict::Passed(report)
        } else {
            Verdict::Violations(report)
        }
    }

    /// Whether the gate passed.
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Passed(_))
    }

    /// The aggregated report.
    pub fn report(&self) -> &GateReport {
        match self {
            Verdict::Passed(report) | Verdict::Violations(report) => report,
        }
    }

    /// Turn violations into [`QualityError::QualityViolationsDetected`].
    pub fn into_result(self) -> Result<GateReport> {
        match self {
            Verdict::Passed(report) => Ok(report),
            Verdict::Violations(report) => {
                Err(QualityError::QualityViolationsDetected(Box::new(report)))
            }
        }
    }
}
