//! Source file discovery.

use crate::{Result, WeaveError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find every regular file under `root` whose extension is one of
/// `extensions`, sorted by path so runs are deterministic.
pub fn discover<S: AsRef<str>>(root: impl AsRef<Path>, extensions: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root.as_ref()).follow_links(false) {
        let entry = entry.map_err(|e| WeaveError::Walk(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.as_ref() == ext));

        if matches {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
