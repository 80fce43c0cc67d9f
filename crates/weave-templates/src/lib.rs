//! # Weave Templates
//!
//! The generator library and type catalog for MDS Cython bindings.
//!
//! - **Catalog**: the `Primitives`, `Composites` and `Arrays` categories
//! - **Templates**: Handlebars generators for the Cython declarations and
//!   wrapper classes of each type
//! - **Loader**: extra `*.hbs` templates from a directory
//!
//! ## Example
//!
//! ```rust,ignore
//! use weave_core::{GeneratorRegistry, InjectionEngine, WeaveConfig};
//!
//! let mut builder = GeneratorRegistry::builder();
//! weave_templates::register_template_dir(&mut builder, "templates")?;
//! weave_templates::register_builtins(&mut builder)?;
//!
//! let engine = InjectionEngine::new(
//!     WeaveConfig::default(),
//!     weave_templates::builtin_catalog()?,
//!     builder.build(),
//! )?;
//! ```

pub mod loader;
pub mod naming;

pub use loader::register_template_dir;

use tracing::debug;
use weave_core::{Catalog, GeneratorRegistry, HandlebarsGenerator, RegistryBuilder, Result};

const BUILTIN_CATALOG: &str = include_str!("../catalog/mds.yaml");

struct Builtin {
    name: &'static str,
    source: &'static str,
    only_when: Option<&'static str>,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "tmpl_api_primitives",
        source: include_str!("../templates/api_primitives.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_primitives",
        source: include_str!("../templates/primitives.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_api_namespaces",
        source: include_str!("../templates/api_namespaces.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_namespace_mapping",
        source: include_str!("../templates/namespace_mapping.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_namespace_typed_primitive_bindings",
        source: include_str!("../templates/namespace_typed_primitive_bindings.hbs"),
        only_when: Some("is_primitive"),
    },
    Builtin {
        name: "tmpl_namespace_typed_array_bindings",
        source: include_str!("../templates/namespace_typed_array_bindings.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_api_records",
        source: include_str!("../templates/api_records.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_record_field",
        source: include_str!("../templates/record_field.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_record_field_reference",
        source: include_str!("../templates/record_field_reference.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_record_member",
        source: include_str!("../templates/record_member.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_array",
        source: include_str!("../templates/array.hbs"),
        only_when: None,
    },
    Builtin {
        name: "tmpl_api_arrays",
        source: include_str!("../templates/api_arrays.hbs"),
        only_when: None,
    },
];

/// Names of the built-in generators.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}

/// The MDS type catalog with all derived names filled in.
pub fn builtin_catalog() -> Result<Catalog> {
    let raw = Catalog::from_yaml_str(BUILTIN_CATALOG)?;
    naming::complete_catalog(&raw)
}

/// Register the built-in generators.
///
/// Names already present in `builder` are left alone, so templates loaded
/// from a directory first take precedence over the built-ins.
pub fn register_builtins(builder: &mut RegistryBuilder) -> Result<()> {
    for builtin in BUILTINS {
        if builder.contains(builtin.name) {
            debug!(generator = builtin.name, "Built-in generator overridden");
            continue;
        }

        let mut generator = HandlebarsGenerator::new(builtin.source)?;
        if let Some(flag) = builtin.only_when {
            generator = generator.only_when(flag);
        }
        builder.register(builtin.name, generator)?;
    }
    Ok(())
}

/// A registry holding only the built-in generators.
pub fn builtin_registry() -> Result<GeneratorRegistry> {
    let mut builder = GeneratorRegistry::builder();
    register_builtins(&mut builder)?;
    Ok(builder.build())
}
