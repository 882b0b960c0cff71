//! Vigilance core data models.
//!
//! This crate defines the items a quality report describes, the result of
//! judging them, and the errors that abort a quality run.

#![warn(missing_docs)]

// Identities
mod id;

// Items and reports
mod item;
mod report;

// Errors
mod error;

pub use error::{QualityError, ReportParsingError, Result};
pub use id::{normalize, ItemIdentity, ItemKind, ItemPath};
pub use item::{
    CoverageMetrics, DocumentationError, FileUnderTest, MissingDocKind, PackageUnderTest,
    QualityItem, Severity,
};
pub use report::{GateReport, QualityReport, Satisfaction, ScopeNote, SuiteOutcome, Verdict};
