//! Default quality suites.
//!
//! - `cobertura`: line coverage, branch coverage and complexity from
//!   Cobertura XML reports
//! - `doxygen`: documentation warnings from Doxygen logs

#![warn(missing_docs)]

pub mod cobertura;
pub mod doxygen;

pub use cobertura::{BranchCoverage, CoberturaParser, CoberturaPlugin, Complexity, LineCoverage};
pub use doxygen::{Documentation, DoxygenParser, DoxygenPlugin};

use vigilance_core::Result;
use vigilance_quality::{QualityPlugin, SuiteCatalog};

/// The plugins shipped with vigilance, in registration order.
pub fn default_plugins() -> Vec<Box<dyn QualityPlugin>> {
    vec![Box::new(CoberturaPlugin), Box::new(DoxygenPlugin)]
}

/// A catalog holding the default suites.
pub fn default_catalog() -> Result<SuiteCatalog> {
    SuiteCatalog::load(&default_plugins())
}
