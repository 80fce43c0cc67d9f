//! Loading user templates from a directory.

use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;
use weave_core::{RegistryBuilder, Result, WeaveError};

/// File extension of template files.
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Register every `*.hbs` file under `dir` as a Handlebars generator named
/// after its file stem. Returns the number of templates registered.
pub fn register_template_dir(builder: &mut RegistryBuilder, dir: impl AsRef<Path>) -> Result<usize> {
    let mut count = 0;

    for entry in WalkDir::new(dir.as_ref()).sort_by_file_name() {
        let entry = entry.map_err(|e| WeaveError::Walk(e.to_string()))?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION)
        {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let source = fs::read_to_string(path)?;
        builder
            .register_handlebars(name, &source)
            .map_err(|e| e.in_file(path))?;

        debug!(template = name, path = %path.display(), "Registered template");
        count += 1;
    }

    Ok(count)
}
