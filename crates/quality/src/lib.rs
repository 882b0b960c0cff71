//! Quality gate
//!
//! Configuration, constraints, suites, and the gate engine.

#![warn(missing_docs)]

pub mod config;
pub mod constraint;
pub mod engine;
pub mod pattern;
pub mod plugin;
pub mod registry;
pub mod resolver;

pub use config::{
    ConstraintDeclaration, Scope, SuiteStanza, VigilanceConfig, DEFAULT_CONFIG_FILE,
};
pub use constraint::{
    Constraint, ConstraintSet, Dimension, FileConstraint, IgnoreFiles, PackageConstraint,
};
pub use engine::{BasicQualityEngine, EngineConfig, QualityEngine};
pub use pattern::PathPattern;
pub use plugin::{QualityPlugin, ReportParser, SuiteCatalog, SuiteComponents};
pub use registry::{scoped, ConstraintConstructor, ConstraintRegistry};
pub use resolver::{ConstraintSuite, SuiteResolver};
