//! # Weave Core
//!
//! Core library for marker-driven source injection.
//!
//! Source files carry pairs of marker comments. The start marker holds a
//! directive naming a generator and one or more type categories; everything
//! between the markers is regenerated by calling the generator once per type
//! in those categories.
//!
//! ## Features
//!
//! - Marker scanning with precise directive errors
//! - Closed type catalog loaded from YAML or JSON
//! - Named generators, including Handlebars templates
//! - Generate and clean modes, dry-run previews and atomic writes
//!
//! ## Example
//!
//! ```rust,ignore
//! use weave_core::{Catalog, GeneratorRegistry, InjectionEngine, RunMode, WeaveConfig};
//!
//! let catalog = Catalog::load("types.yaml")?;
//! let mut builder = GeneratorRegistry::builder();
//! builder.register_handlebars("tmpl_primitives", "cdef {{c_type}} {{title}}")?;
//!
//! let engine = InjectionEngine::new(WeaveConfig::from_env()?, catalog, builder.build())?;
//! let files = weave_core::discover("src", &engine.config().extensions)?;
//! engine.apply_all(&files, false, RunMode::Generate, &mut std::io::stdout())?;
//! ```

pub mod config;
pub mod directive;
pub mod discover;
pub mod engine;
pub mod error;
pub mod generator;
pub mod registry;
pub mod scanner;
pub mod splice;
pub mod strategy;
pub mod taxonomy;

pub use config::{MarkerSyntax, UnknownGeneratorPolicy, WeaveConfig};
pub use directive::{annotation, Directive, DirectiveSpec};
pub use discover::discover;
pub use engine::{ApplyReport, CheckReport, FileOutcome, FilePlan, InjectionEngine};
pub use error::{Result, WeaveError};
pub use generator::{Generator, HandlebarsGenerator};
pub use registry::{GeneratorRegistry, RegistryBuilder};
pub use scanner::{scan, Region, Scan};
pub use splice::{splice, FileRewritePlan};
pub use strategy::{CleanStrategy, DirectiveResolver, GenerateStrategy, RunMode};
pub use taxonomy::{Catalog, TaxonomyCategory, TypeDescriptor};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        Catalog, Generator, GeneratorRegistry, InjectionEngine, Result, RunMode, TaxonomyCategory,
        TypeDescriptor, WeaveConfig, WeaveError,
    };
}
