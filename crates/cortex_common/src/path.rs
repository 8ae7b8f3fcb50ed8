//! Path decomposition with multi-part extensions.
//!
//! Neuroimaging files routinely carry compound extensions (`.nii.gz`,
//! `.img.gz`), so a plain "last dot" split is not enough to rename outputs
//! while keeping their format. [`PathParts`] strips suffixes repeatedly and
//! keeps them in their original order.

use std::path::{Path, PathBuf};

/// A path split into directory, stem, and (possibly multi-part) extension.
///
/// `directory / (stem + extension)` reproduces the original path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathParts {
    /// The parent directory; empty for a bare file name.
    pub directory: PathBuf,
    /// The file name with every extension removed.
    pub stem: String,
    /// All extensions in original order, e.g. `.nii.gz`; empty if none.
    pub extension: String,
}

/// Options controlling how [`PathParts::join`] rebuilds a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinOptions {
    /// Text prepended to the stem.
    pub prefix: String,
    /// Text appended to the stem, before the extension.
    pub suffix: String,
    /// Replacement directory, resolved to an absolute path before joining.
    /// `None` or an empty path keeps the original directory.
    pub new_directory: Option<PathBuf>,
    /// Whether the original extension is re-attached.
    pub keep_extension: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            new_directory: None,
            keep_extension: true,
        }
    }
}

impl JoinOptions {
    /// Options that rebuild the path unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the suffix.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Relocates the rebuilt path into `dir`.
    pub fn into_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.new_directory = Some(dir.into());
        self
    }

    /// Drops the extension from the rebuilt path.
    pub fn without_extension(mut self) -> Self {
        self.keep_extension = false;
        self
    }
}

impl PathParts {
    /// Splits `path` into directory, stem, and full extension.
    ///
    /// Suffixes are stripped one at a time until none remain. Leading dots
    /// never start an extension, so `.bashrc` has an empty extension.
    pub fn split(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let (directory, name) = match path.file_name() {
            Some(name) => (
                path.parent().map(Path::to_path_buf).unwrap_or_default(),
                name.to_string_lossy().into_owned(),
            ),
            None => (path.to_path_buf(), String::new()),
        };

        let mut stem = name.as_str();
        let mut suffixes = Vec::new();
        loop {
            let (rest, ext) = split_ext(stem);
            if ext.is_empty() {
                break;
            }
            suffixes.push(ext);
            stem = rest;
        }
        suffixes.reverse();

        Self {
            directory,
            stem: stem.to_string(),
            extension: suffixes.concat(),
        }
    }

    /// Returns the file name (`stem + extension`).
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.extension)
    }

    /// Reassembles the original path.
    pub fn to_path(&self) -> PathBuf {
        let name = self.file_name();
        if name.is_empty() {
            return self.directory.clone();
        }
        self.directory.join(name)
    }

    /// Rebuilds the path as `dir / (prefix + stem + suffix + extension)`.
    pub fn join(&self, options: &JoinOptions) -> PathBuf {
        let directory = match options.new_directory.as_deref() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
            }
            _ => self.directory.clone(),
        };
        let extension = if options.keep_extension {
            self.extension.as_str()
        } else {
            ""
        };
        directory.join(format!(
            "{}{}{}{}",
            options.prefix, self.stem, options.suffix, extension
        ))
    }
}

/// Splits `path` into `(directory, stem, extension)`.
pub fn split_path(path: impl AsRef<Path>) -> (PathBuf, String, String) {
    let parts = PathParts::split(path);
    (parts.directory, parts.stem, parts.extension)
}

/// Applies [`PathParts::join`] to every path, preserving order.
pub fn join_many<P: AsRef<Path>>(paths: &[P], options: &JoinOptions) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|p| PathParts::split(p).join(options))
        .collect()
}

/// Splits off the last extension of a file name.
///
/// Leading dots are skipped when looking for the separator, so hidden files
/// keep their whole name as the stem.
fn split_ext(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}
