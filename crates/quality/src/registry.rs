//! Constraint registry.

use std::collections::HashMap;
use std::sync::Arc;
use vigilance_core::{QualityError, Result};

use crate::config::{ConstraintDeclaration, Scope};
use crate::constraint::{
    Constraint, ConstraintSet, FileConstraint, IgnoreFiles, PackageConstraint,
};
use crate::pattern::PathPattern;

/// Builds a bound constraint from its declaration.
pub type ConstraintConstructor =
    Arc<dyn Fn(&ConstraintDeclaration) -> Result<Box<dyn Constraint>> + Send + Sync>;

/// Maps declared constraint names to constructors.
///
/// Append-only: a name can be registered once.
#[derive(Clone, Default)]
pub struct ConstraintRegistry {
    constructors: HashMap<String, ConstraintConstructor>,
    labels: Vec<String>,
}

impl ConstraintRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the constraints every suite shares.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .constructors
            .insert(IgnoreFiles::NAME.to_string(), Arc::new(build_ignore));
        registry.labels.push(IgnoreFiles::NAME.to_string());
        registry
    }

    /// Register a constructor.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn(&ConstraintDeclaration) -> Result<Box<dyn Constraint>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return Err(QualityError::DuplicateRegistration(name));
        }
        self.constructors.insert(name.clone(), Arc::new(constructor));
        self.labels.push(name);
        Ok(())
    }

    /// Register a constructor whose result is scoped by the declaration's
    /// `pattern` and `scope`.
    pub fn register_scoped<F>(&mut self, name: impl Into<String>, measure: F) -> Result<()>
    where
        F: Fn(&ConstraintDeclaration) -> Result<Box<dyn Constraint>> + Send + Sync + 'static,
    {
        self.register(name, move |declaration| {
            let inner = measure(declaration)?;
            scoped(declaration, inner)
        })
    }

    /// Whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Build one declaration.
    pub fn build(
        &self,
        suite: &str,
        declaration: &ConstraintDeclaration,
    ) -> Result<Box<dyn Constraint>> {
        let constructor = self
            .constructors
            .get(&declaration.name)
            .ok_or_else(|| QualityError::UnknownConstraint {
                suite: suite.to_string(),
                name: declaration.name.clone(),
            })?;
        constructor(declaration)
    }

    /// Build every declaration, in order.
    pub fn build_all(
        &self,
        suite: &str,
        declarations: &[ConstraintDeclaration],
    ) -> Result<ConstraintSet> {
        declarations
            .iter()
            .map(|declaration| self.build(suite, declaration))
            .collect::<Result<Vec<_>>>()
            .map(|constraints| constraints.into_iter().collect())
    }
}

impl std::fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintRegistry")
            .field("labels", &self.labels)
            .finish()
    }
}

/// Wrap `inner` into a file or package constraint.
pub fn scoped(
    declaration: &ConstraintDeclaration,
    inner: Box<dyn Constraint>,
) -> Result<Box<dyn Constraint>> {
    if !declaration.paths.is_empty() {
        return Err(QualityError::ConfigurationParsing(format!(
            "constraint \"{}\" takes a single \"pattern\", not \"paths\"",
            declaration.name
        )));
    }
    let pattern = declaration.pattern.as_deref().ok_or_else(|| {
        QualityError::ConfigurationParsing(format!(
            "constraint \"{}\" requires a \"pattern\"",
            declaration.name
        ))
    })?;
    let pattern = PathPattern::new(pattern)?;

    Ok(match declaration.scope {
        Scope::File => Box::new(FileConstraint::new(inner, pattern)),
        Scope::Package => Box::new(PackageConstraint::new(inner, pattern)),
    })
}

fn build_ignore(declaration: &ConstraintDeclaration) -> Result<Box<dyn Constraint>> {
    declaration.expect_only(&[])?;
    let patterns = declaration.patterns();
    if patterns.is_empty() {
        return Err(QualityError::ConfigurationParsing(
            "constraint \"ignore\" requires \"paths\" or \"pattern\"".to_string(),
        ));
    }
    let patterns = patterns
        .into_iter()
        .map(PathPattern::new)
        .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(IgnoreFiles::new(patterns).with_scope(declaration.scope)))
}
