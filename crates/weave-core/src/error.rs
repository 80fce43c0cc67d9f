//! Error types for Weave Core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Weave operations.
pub type Result<T> = std::result::Result<T, WeaveError>;

/// Main error type for the injection engine.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// A directive named a category that is not in the catalog.
    #[error("Unknown category '{name}' on line {line}")]
    UnknownCategory { name: String, line: usize },

    /// No generator is registered under this name.
    #[error("Generator '{0}' not found")]
    GeneratorNotFound(String),

    /// A generator name was registered twice.
    #[error("Generator '{0}' is already registered")]
    DuplicateGenerator(String),

    /// A label appears twice in the same category.
    #[error("Duplicate label '{label}' in category '{category}'")]
    DuplicateLabel { category: String, label: String },

    /// Two categories share a name.
    #[error("Duplicate category '{0}'")]
    DuplicateCategory(String),

    /// The annotation on a start marker could not be parsed.
    #[error("Malformed directive on line {line}: {reason}")]
    MalformedDirective { line: usize, reason: String },

    /// A start marker was found inside an open region.
    #[error("Start marker on line {line} is nested inside an open region")]
    NestedMarker { line: usize },

    /// A generator failed while producing a block.
    #[error("Generator '{name}' failed for '{label}': {message}")]
    Generator {
        name: String,
        label: String,
        message: String,
    },

    /// A template could not be compiled.
    #[error("Template error: {0}")]
    Template(String),

    /// The type catalog is invalid.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Directory traversal failed.
    #[error("Walk error: {0}")]
    Walk(String),

    /// Any of the above, attributed to a file.
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<WeaveError>,
    },

    /// IO operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML deserialization failed.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),
}

impl WeaveError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        WeaveError::MalformedDirective {
            line,
            reason: reason.into(),
        }
    }

    /// Attach a file path to this error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ WeaveError::InFile { .. } => already,
            other => WeaveError::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// Whether this error must abort the whole run rather than just the file.
    ///
    /// The category table is closed and fixed at startup, so a directive
    /// naming an unknown category is a template bug that stops everything.
    pub fn is_run_fatal(&self) -> bool {
        match self {
            WeaveError::UnknownCategory { .. } => true,
            WeaveError::InFile { source, .. } => source.is_run_fatal(),
            _ => false,
        }
    }
}
