//! Directive resolution strategies.
//!
//! The scanner hands every start marker line to a [`DirectiveResolver`].
//! [`GenerateStrategy`] parses and resolves it for real; [`CleanStrategy`]
//! ignores it and always yields an empty directive, which strips regions
//! back to bare markers.

use crate::{
    Catalog, Directive, DirectiveSpec, GeneratorRegistry, Result, UnknownGeneratorPolicy,
    WeaveError,
};
use tracing::{debug, warn};

/// Turns a start marker line into a [`Directive`].
pub trait DirectiveResolver {
    /// Resolve the marker on 1-based line `line_no`.
    fn resolve(&self, line: &str, line_no: usize) -> Result<Directive<'_>>;
}

/// Which strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Expand every region with generated blocks.
    Generate,
    /// Strip every region back to bare markers.
    Clean,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Generate => f.write_str("generate"),
            RunMode::Clean => f.write_str("clean"),
        }
    }
}

/// Real parsing against the catalog and generator registry.
pub struct GenerateStrategy<'a> {
    separator: char,
    catalog: &'a Catalog,
    registry: &'a GeneratorRegistry,
    policy: UnknownGeneratorPolicy,
}

impl<'a> GenerateStrategy<'a> {
    pub fn new(separator: char, catalog: &'a Catalog, registry: &'a GeneratorRegistry) -> Self {
        Self {
            separator,
            catalog,
            registry,
            policy: UnknownGeneratorPolicy::default(),
        }
    }

    /// Set the unknown generator policy.
    pub fn with_policy(mut self, policy: UnknownGeneratorPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl DirectiveResolver for GenerateStrategy<'_> {
    fn resolve(&self, line: &str, line_no: usize) -> Result<Directive<'_>> {
        let spec = DirectiveSpec::from_marker_line(line, self.separator, line_no)?;
        debug!(line = line_no, generator = %spec.generator, categories = ?spec.categories, "Resolved directive");

        let categories = spec
            .categories
            .iter()
            .map(|name| {
                self.catalog
                    .category(name)
                    .ok_or_else(|| WeaveError::UnknownCategory {
                        name: name.clone(),
                        line: line_no,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let generator = match self.registry.lookup(&spec.generator) {
            Ok(generator) => Some(generator),
            Err(e) => match self.policy {
                UnknownGeneratorPolicy::Error => return Err(e),
                UnknownGeneratorPolicy::Warn => {
                    warn!(line = line_no, generator = %spec.generator, "Generator not registered, region will be emptied");
                    None
                }
            },
        };

        Ok(Directive::new(spec.generator, generator, categories))
    }
}

/// Ignores the annotation entirely and produces no blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanStrategy;

impl DirectiveResolver for CleanStrategy {
    fn resolve(&self, _line: &str, _line_no: usize) -> Result<Directive<'_>> {
        Ok(Directive::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaxonomyCategory, TypeDescriptor};

    fn fixtures() -> (Catalog, GeneratorRegistry) {
        let catalog = Catalog::new()
            .with_category(
                TaxonomyCategory::new("CategoryOne")
                    .with_entry("alpha", TypeDescriptor::new().with("name", "alpha"))
                    .unwrap(),
            )
            .unwrap();

        let mut builder = GeneratorRegistry::builder();
        builder.register_handlebars("tmpl_x", "GEN({{name}})").unwrap();
        (catalog, builder.build())
    }

    #[test]
    fn test_generate_resolves() {
        let (catalog, registry) = fixtures();
        let strategy = GenerateStrategy::new('|', &catalog, &registry);

        let directive = strategy
            .resolve("# START INJECTION | tmpl_x(CategoryOne)", 1)
            .unwrap();
        assert_eq!(directive.generator_name(), "tmpl_x");
        assert!(directive.generator().is_some());
        assert_eq!(directive.targets().count(), 1);
    }

    #[test]
    fn test_unknown_category_is_fatal() {
        let (catalog, registry) = fixtures();
        let strategy = GenerateStrategy::new('|', &catalog, &registry);

        let err = strategy
            .resolve("# START INJECTION | tmpl_x(CategoryTwo)", 9)
            .unwrap_err();
        assert!(matches!(err, WeaveError::UnknownCategory { ref name, line: 9 } if name == "CategoryTwo"));
        assert!(err.is_run_fatal());
    }

    #[test]
    fn test_unknown_generator_warn_policy() {
        let (catalog, registry) = fixtures();
        let strategy = GenerateStrategy::new('|', &catalog, &registry);

        let directive = strategy
            .resolve("# START INJECTION | tmpl_missing(CategoryOne)", 1)
            .unwrap();
        assert!(directive.generator().is_none());
        assert!(directive.is_empty());
    }

    #[test]
    fn test_unknown_generator_error_policy() {
        let (catalog, registry) = fixtures();
        let strategy = GenerateStrategy::new('|', &catalog, &registry)
            .with_policy(UnknownGeneratorPolicy::Error);

        let err = strategy
            .resolve("# START INJECTION | tmpl_missing(CategoryOne)", 1)
            .unwrap_err();
        assert!(matches!(err, WeaveError::GeneratorNotFound(_)));
        assert!(!err.is_run_fatal());
    }

    #[test]
    fn test_clean_ignores_syntax() {
        let directive = CleanStrategy.resolve("# START INJECTION | ((garbage", 1).unwrap();
        assert!(directive.is_empty());
        assert_eq!(directive.targets().count(), 0);

        let directive = CleanStrategy.resolve("# START INJECTION", 2).unwrap();
        assert!(directive.generator().is_none());
    }
}
