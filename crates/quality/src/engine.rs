//! Quality gate engine.

use async_trait::async_trait;
use std::sync::Arc;
use vigilance_core::{GateReport, QualityError, Result, SuiteOutcome, Verdict};

use crate::config::VigilanceConfig;
use crate::plugin::SuiteCatalog;
use crate::resolver::{ConstraintSuite, SuiteResolver};

/// Engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Evaluate suites on blocking worker threads
    pub parallel: bool,
}

/// Quality gate engine.
#[async_trait]
pub trait QualityEngine: Send + Sync {
    /// Run every configured suite and aggregate the outcome.
    ///
    /// Fatal errors abort the run; violations are reported through the
    /// returned [`Verdict`].
    async fn run(&self, config: &VigilanceConfig) -> Result<Verdict>;
}

/// Basic quality engine implementation.
#[derive(Debug, Clone)]
pub struct BasicQualityEngine {
    catalog: Arc<SuiteCatalog>,
    config: EngineConfig,
}

impl BasicQualityEngine {
    /// Create a new quality engine.
    pub fn new(catalog: SuiteCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: EngineConfig::default(),
        }
    }

    /// Set engine settings.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The registered suites.
    pub fn catalog(&self) -> &SuiteCatalog {
        &self.catalog
    }

    fn resolve_all(&self, config: &VigilanceConfig) -> Result<Vec<ConstraintSuite>> {
        let resolver = SuiteResolver::new(&self.catalog);

        let unknown = resolver.unknown_suites(&config.suites);
        if !unknown.is_empty() {
            return Err(QualityError::UnknownSuite(
                unknown.into_iter().map(str::to_string).collect(),
            ));
        }

        config.suites.iter().map(|stanza| resolver.resolve(stanza)).collect()
    }

    async fn evaluate_parallel(&self, suites: Vec<ConstraintSuite>) -> Result<Vec<SuiteOutcome>> {
        let handles: Vec<_> = suites
            .into_iter()
            .map(|suite| {
                let name = suite.name.clone();
                (name, tokio::task::spawn_blocking(move || suite.run()))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (suite, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    return Err(QualityError::Aborted {
                        suite,
                        reason: e.to_string(),
                    })
                }
            }
        }
        Ok(outcomes)
    }
}

#[async_trait]
impl QualityEngine for BasicQualityEngine {
    async fn run(&self, config: &VigilanceConfig) -> Result<Verdict> {
        config.validate()?;
        tracing::info!(
            "Running {} suite(s): {}",
            config.suites.len(),
            config.suite_names().join(", ")
        );

        let suites = self.resolve_all(config)?;

        let outcomes = if self.config.parallel {
            self.evaluate_parallel(suites).await?
        } else {
            suites.iter().map(ConstraintSuite::run).collect()
        };

        let report = GateReport::new(outcomes);
        tracing::info!(
            "Quality gate {} with {} violation(s)",
            if report.passed() { "passed" } else { "failed" },
            report.violation_count()
        );
        Ok(Verdict::from_report(report))
    }
}
