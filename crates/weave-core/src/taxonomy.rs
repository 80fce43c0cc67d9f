//! Type taxonomy: descriptors grouped into named, ordered categories.
//!
//! The catalog is read-only once built. Directives name categories; the
//! engine hands each descriptor of those categories to a generator.

use crate::{Result, WeaveError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// An attribute bag describing one concrete type variant.
///
/// The engine never interprets attributes; generators read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor {
    attributes: Map<String, Value>,
}

impl TypeDescriptor {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Raw attribute access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String attribute, if present and a string.
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Truthiness of an attribute. Missing, `null`, `false`, `0`, `""` and
    /// empty collections are falsy.
    pub fn flag(&self, key: &str) -> bool {
        match self.attributes.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }

    /// All attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl From<Map<String, Value>> for TypeDescriptor {
    fn from(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }
}

/// A named, ordered mapping from label to descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyCategory {
    name: String,
    entries: Vec<(String, TypeDescriptor)>,
}

impl TaxonomyCategory {
    /// Create an empty category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry. Labels are unique within a category.
    pub fn insert(&mut self, label: impl Into<String>, descriptor: TypeDescriptor) -> Result<()> {
        let label = label.into();
        if self.entries.iter().any(|(l, _)| *l == label) {
            return Err(WeaveError::DuplicateLabel {
                category: self.name.clone(),
                label,
            });
        }
        self.entries.push((label, descriptor));
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_entry(mut self, label: impl Into<String>, descriptor: TypeDescriptor) -> Result<Self> {
        self.insert(label, descriptor)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.entries.iter().map(|(l, d)| (l.as_str(), d))
    }

    pub fn get(&self, label: &str) -> Option<&TypeDescriptor> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The closed table of categories a directive may name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: HashMap<String, TaxonomyCategory>,
    order: Vec<String>,
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    categories: Vec<CategoryFile>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    name: String,
    #[serde(default)]
    types: Vec<EntryFile>,
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    label: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category. Category names are unique.
    pub fn insert(&mut self, category: TaxonomyCategory) -> Result<()> {
        if self.categories.contains_key(category.name()) {
            return Err(WeaveError::DuplicateCategory(category.name().to_string()));
        }
        self.order.push(category.name().to_string());
        self.categories.insert(category.name().to_string(), category);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_category(mut self, category: TaxonomyCategory) -> Result<Self> {
        self.insert(category)?;
        Ok(self)
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&TaxonomyCategory> {
        self.categories.get(name)
    }

    /// Categories in the order they were added.
    pub fn categories(&self) -> impl Iterator<Item = &TaxonomyCategory> {
        self.order.iter().filter_map(|n| self.categories.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Parse a YAML catalog.
    ///
    /// ```yaml
    /// categories:
    ///   - name: Primitives
    ///     types:
    ///       - label: bool
    ///         attributes: { kind: BOOL, c_type: bool }
    /// ```
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml_ng::from_str(source)?;
        Self::from_file_layout(file)
    }

    /// Parse a JSON catalog with the same layout as the YAML form.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(source)?;
        Self::from_file_layout(file)
    }

    /// Load a catalog file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&source),
            "json" => Self::from_json_str(&source),
            other => Err(WeaveError::Catalog(format!(
                "unsupported catalog format '{}' for {}",
                other,
                path.display()
            ))),
        }
    }

    fn from_file_layout(file: CatalogFile) -> Result<Self> {
        let mut catalog = Self::new();
        for category_file in file.categories {
            let mut category = TaxonomyCategory::new(category_file.name);
            for entry in category_file.types {
                category.insert(entry.label, TypeDescriptor::from(entry.attributes))?;
            }
            catalog.insert(category)?;
        }
        Ok(catalog)
    }
}
