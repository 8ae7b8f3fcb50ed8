//! Removal of image and text outputs from a working directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Extensions removed by default: NIfTI, Analyze, text, MATLAB and JSON outputs.
pub const DEFAULT_CLEAN_EXTENSIONS: &[&str] =
    &[".nii", ".nii.gz", ".txt", ".img", ".hdr", ".mat", ".json"];

/// Removes the files directly inside `dir` whose names end with one of `extensions`.
///
/// Symlinks left by materialization are removed too (the link, not its
/// target). Subdirectories and hidden files are left alone. Returns the
/// removed paths, sorted.
pub fn clean_dir<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<Vec<PathBuf>, CacheError> {
    let entries = fs::read_dir(dir).map_err(CacheError::io_at(dir))?;

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(CacheError::io_at(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(CacheError::io_at(&path))?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if extensions.iter().any(|ext| name.ends_with(ext.as_ref())) {
            fs::remove_file(&path).map_err(CacheError::io_at(&path))?;
            removed.push(path);
        }
    }

    removed.sort();
    tracing::debug!(dir = %dir.display(), count = removed.len(), "cleaned working directory");
    Ok(removed)
}
