//! Generator trait and the Handlebars-backed implementation.
//!
//! Defines the interface that code generators must implement.

use crate::{Result, TypeDescriptor, WeaveError};
use handlebars::Handlebars;

/// Trait that code generators must implement.
///
/// A generator turns one type descriptor into one text block.
pub trait Generator: Send + Sync {
    /// Generate a block for a descriptor.
    ///
    /// # Returns
    ///
    /// `Ok(None)` means "emit nothing for this descriptor", which is
    /// different from `Ok(Some(String::new()))`.
    fn generate(&self, descriptor: &TypeDescriptor) -> Result<Option<String>>;
}

impl<F> Generator for F
where
    F: Fn(&TypeDescriptor) -> Option<String> + Send + Sync,
{
    fn generate(&self, descriptor: &TypeDescriptor) -> Result<Option<String>> {
        Ok(self(descriptor))
    }
}

const TEMPLATE_KEY: &str = "block";

/// A generator rendering a single Handlebars template against the
/// descriptor's attributes.
///
/// # Example
///
/// ```
/// use weave_core::{Generator, HandlebarsGenerator, TypeDescriptor};
///
/// let generator = HandlebarsGenerator::new("cdef {{c_type}} value\n").unwrap();
/// let block = generator
///     .generate(&TypeDescriptor::new().with("c_type", "int32_t"))
///     .unwrap();
/// assert_eq!(block.as_deref(), Some("cdef int32_t value\n"));
/// ```
pub struct HandlebarsGenerator {
    handlebars: Handlebars<'static>,
    only_when: Option<String>,
}

impl HandlebarsGenerator {
    /// Compile a template.
    pub fn new(source: &str) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(TEMPLATE_KEY, source)
            .map_err(|e| WeaveError::Template(e.to_string()))?;

        Ok(Self {
            handlebars,
            only_when: None,
        })
    }

    /// Only produce a block when the descriptor's `flag` attribute is truthy.
    pub fn only_when(mut self, flag: impl Into<String>) -> Self {
        self.only_when = Some(flag.into());
        self
    }
}

impl Generator for HandlebarsGenerator {
    fn generate(&self, descriptor: &TypeDescriptor) -> Result<Option<String>> {
        if let Some(ref flag) = self.only_when {
            if !descriptor.flag(flag) {
                return Ok(None);
            }
        }

        self.handlebars
            .render(TEMPLATE_KEY, descriptor)
            .map(Some)
            .map_err(|e| WeaveError::Template(e.to_string()))
    }
}

impl std::fmt::Debug for HandlebarsGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsGenerator")
            .field("only_when", &self.only_when)
            .finish_non_exhaustive()
    }
}
