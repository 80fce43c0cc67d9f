//! # Weave Configuration
//!
//! Central configuration for the injection engine.
//! Supports loading from environment variables and programmatic defaults.

use crate::{Result, WeaveError};
use std::env;

/// What to do when a directive names a generator that is not registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownGeneratorPolicy {
    /// Log a warning and emit nothing for the region.
    #[default]
    Warn,
    /// Fail the file.
    Error,
}

impl std::str::FromStr for UnknownGeneratorPolicy {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "strict" => Ok(Self::Error),
            other => Err(WeaveError::Config(format!(
                "unknown generator policy '{}' (expected 'warn' or 'error')",
                other
            ))),
        }
    }
}

/// The delimiters that mark injection regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSyntax {
    /// Token that opens a region.
    pub start: String,
    /// Token that closes a region.
    pub end: String,
    /// The annotation is everything after the last occurrence of this character.
    pub separator: char,
}

impl Default for MarkerSyntax {
    fn default() -> Self {
        Self {
            start: "START INJECTION".to_string(),
            end: "END INJECTION".to_string(),
            separator: '|',
        }
    }
}

/// Global configuration for the Weave engine.
///
/// # Example
/// ```rust
/// use weave_core::WeaveConfig;
///
/// // Load from environment
/// let config = WeaveConfig::from_env().unwrap();
///
/// // Or customize
/// let config = WeaveConfig::default()
///     .with_separator('#')
///     .with_extensions(["rs"]);
/// assert_eq!(config.markers().separator, '#');
/// ```
#[derive(Debug, Clone)]
pub struct WeaveConfig {
    /// Token that opens a region.
    /// Default: "START INJECTION", Env: WEAVE_START_MARKER
    pub start_marker: String,

    /// Token that closes a region.
    /// Default: "END INJECTION", Env: WEAVE_END_MARKER
    pub end_marker: String,

    /// Character preceding the directive annotation.
    /// Default: '|', Env: WEAVE_SEPARATOR
    pub separator: char,

    /// File extensions (without the dot) considered during discovery.
    /// Default: ["pyx", "pxd"], Env: WEAVE_EXTENSIONS=pyx,pxd
    pub extensions: Vec<String>,

    /// Handling of directives naming unregistered generators.
    /// Default: Warn, Env: WEAVE_UNKNOWN_GENERATOR=error
    pub unknown_generator: UnknownGeneratorPolicy,

    /// Leave files alone when the rewrite would not change them.
    /// Default: true, Env: WEAVE_SKIP_UNCHANGED=false
    pub skip_unchanged: bool,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        let markers = MarkerSyntax::default();
        Self {
            start_marker: markers.start,
            end_marker: markers.end,
            separator: markers.separator,
            extensions: vec!["pyx".to_string(), "pxd".to_string()],
            unknown_generator: UnknownGeneratorPolicy::default(),
            skip_unchanged: true,
        }
    }
}

impl WeaveConfig {
    /// Create a new config from environment variables.
    /// Falls back to defaults for missing variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(v) = env::var("WEAVE_START_MARKER") {
            config.start_marker = v;
        }
        if let Ok(v) = env::var("WEAVE_END_MARKER") {
            config.end_marker = v;
        }
        if let Ok(v) = env::var("WEAVE_SEPARATOR") {
            config.separator = v
                .chars()
                .next()
                .ok_or_else(|| WeaveError::Config("WEAVE_SEPARATOR is empty".to_string()))?;
        }
        if let Ok(v) = env::var("WEAVE_EXTENSIONS") {
            config.extensions = split_extensions(&v);
        }
        if let Ok(v) = env::var("WEAVE_UNKNOWN_GENERATOR") {
            config.unknown_generator = v.parse()?;
        }
        if let Ok(v) = env::var("WEAVE_SKIP_UNCHANGED") {
            config.skip_unchanged = v.to_lowercase() != "false" && v != "0";
        }

        config.validate()?;
        Ok(config)
    }

    /// Builder: Set the start and end marker tokens.
    pub fn with_markers(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_marker = start.into();
        self.end_marker = end.into();
        self
    }

    /// Builder: Set the annotation separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Builder: Set the discovered file extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Builder: Set the unknown generator policy.
    pub fn with_unknown_generator(mut self, policy: UnknownGeneratorPolicy) -> Self {
        self.unknown_generator = policy;
        self
    }

    /// Builder: Enable or disable skipping of unchanged writes.
    pub fn with_skip_unchanged(mut self, enabled: bool) -> Self {
        self.skip_unchanged = enabled;
        self
    }

    /// Check that the markers can actually delimit regions.
    pub fn validate(&self) -> Result<()> {
        if self.start_marker.is_empty() || self.end_marker.is_empty() {
            return Err(WeaveError::Config("markers must not be empty".to_string()));
        }
        if self.start_marker == self.end_marker {
            return Err(WeaveError::Config(
                "start and end markers must differ".to_string(),
            ));
        }
        if self.start_marker.contains(&self.end_marker) || self.end_marker.contains(&self.start_marker) {
            return Err(WeaveError::Config(format!(
                "markers '{}' and '{}' overlap, one contains the other",
                self.start_marker, self.end_marker
            )));
        }
        Ok(())
    }

    /// The marker syntax consumed by the scanner and the directive parser.
    pub fn markers(&self) -> MarkerSyntax {
        MarkerSyntax {
            start: self.start_marker.clone(),
            end: self.end_marker.clone(),
            separator: self.separator,
        }
    }
}

fn split_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect()
}
