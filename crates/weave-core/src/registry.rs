//! Generator registry: the name → generator table directives are resolved against.
//!
//! Populated once through [`RegistryBuilder`] before any file is processed,
//! then frozen.

use crate::{Generator, HandlebarsGenerator, Result, WeaveError};
use std::collections::HashMap;

/// Immutable table of named generators.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Box<dyn Generator>>,
}

/// Collects generators before freezing them into a [`GeneratorRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    generators: HashMap<String, Box<dyn Generator>>,
}

impl RegistryBuilder {
    /// Register a generator under `name`. Names are unique.
    pub fn register(&mut self, name: impl Into<String>, generator: impl Generator + 'static) -> Result<&mut Self> {
        let name = name.into();
        if self.generators.contains_key(&name) {
            return Err(WeaveError::DuplicateGenerator(name));
        }
        self.generators.insert(name, Box::new(generator));
        Ok(self)
    }

    /// Compile and register a Handlebars template.
    pub fn register_handlebars(&mut self, name: impl Into<String>, source: &str) -> Result<&mut Self> {
        let generator = HandlebarsGenerator::new(source)?;
        self.register(name, generator)
    }

    /// Whether a name is already taken.
    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Freeze the registry.
    pub fn build(self) -> GeneratorRegistry {
        GeneratorRegistry {
            generators: self.generators,
        }
    }
}

impl GeneratorRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Find a generator by name.
    pub fn lookup(&self, name: &str) -> Result<&dyn Generator> {
        self.generators
            .get(name)
            .map(|g| g.as_ref())
            .ok_or_else(|| WeaveError::GeneratorNotFound(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.names())
            .finish()
    }
}
