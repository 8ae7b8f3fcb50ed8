//! Placing files into working directories by symlink or copy.
//!
//! Reusing a cached output means making it visible at a new path. Symlinks
//! are preferred since they cost nothing for large volumes; copies are used
//! when asked for, or when the destination filesystem refuses symlinks.
//!
//! Split formats store one image as several files that differ only by
//! extension (Analyze 7.5: `.img` data, `.hdr` header, optional `.mat`
//! orientation). Placing the primary file places its companions too.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cortex_common::{join_many, JoinOptions, PathParts};
use cortex_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// An existing destination was removed before placing the source.
pub const OVERWRITE: DiagnosticCode = DiagnosticCode::new(Category::Materialize, 101);

/// A symlink could not be created and the file was copied instead.
pub const LINK_FALLBACK: DiagnosticCode = DiagnosticCode::new(Category::Materialize, 102);

/// Source and destination are the same file; nothing was done.
pub const SAME_FILE: DiagnosticCode = DiagnosticCode::new(Category::Materialize, 103);

/// How a file is made available at its destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceMode {
    /// Symbolic link to the source, falling back to a copy.
    #[default]
    Link,
    /// Independent byte-for-byte copy.
    Copy,
}

/// A storage format whose image data is spread over same-stem files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitFormat {
    /// Extension of the primary data file, e.g. `.img`.
    pub primary: String,
    /// Extension of the mandatory header file, e.g. `.hdr`.
    pub header: String,
    /// Extension of the optional side-metadata file, e.g. `.mat`.
    #[serde(default)]
    pub sidecar: Option<String>,
}

impl SplitFormat {
    /// The Analyze 7.5 layout: `.img` + `.hdr` + optional `.mat`.
    pub fn analyze() -> Self {
        Self {
            primary: ".img".to_string(),
            header: ".hdr".to_string(),
            sidecar: Some(".mat".to_string()),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(&self.primary))
    }
}

/// Where [`Materializer::place_many`] puts its files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Keep each source's file name, inside this directory.
    Directory(PathBuf),
    /// Explicit destination paths, one per source, in order.
    Paths(Vec<PathBuf>),
}

impl Destination {
    /// Interprets a destination sequence: a single element names a
    /// directory, several elements are explicit destination paths.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_sequence(mut paths: Vec<PathBuf>) -> Option<Self> {
        match paths.len() {
            0 => None,
            1 => paths.pop().map(Destination::Directory),
            _ => Some(Destination::Paths(paths)),
        }
    }
}

/// What [`Materializer::place_one`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Where the primary file now lives.
    pub destination: PathBuf,
    /// How it got there; `Copy` when a requested link fell back.
    pub method: PlaceMode,
    /// Destinations of the companion files placed alongside it.
    pub companions: Vec<PathBuf>,
}

/// Places files by symlink or copy, propagating split-format companions.
///
/// Existing destinations are replaced without asking; each replacement is
/// reported as an [`OVERWRITE`] warning. Two concurrent calls targeting the
/// same destination are not serialized here: the last one wins.
#[derive(Clone, Debug)]
pub struct Materializer {
    split_formats: Vec<SplitFormat>,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Materializer {
    /// Creates a materializer that knows the Analyze 7.5 split format.
    pub fn new() -> Self {
        Self::with_split_formats(vec![SplitFormat::analyze()])
    }

    /// Creates a materializer with an explicit split-format table.
    pub fn with_split_formats(split_formats: Vec<SplitFormat>) -> Self {
        Self { split_formats }
    }

    /// The split formats this materializer recognizes.
    pub fn split_formats(&self) -> &[SplitFormat] {
        &self.split_formats
    }

    /// Places `source` at `destination`.
    ///
    /// If `source` is the primary file of a split format, its header (which
    /// must exist) and side-metadata file (if present) are placed next to
    /// `destination` using the same mode. The header is checked before
    /// anything is written.
    pub fn place_one(
        &self,
        source: &Path,
        destination: &Path,
        mode: PlaceMode,
        sink: &DiagnosticSink,
    ) -> Result<Placement, CacheError> {
        require_exists(source)?;
        let companions = self.companions(source, destination)?;

        let method = place_file(source, destination, mode, sink)?;
        let mut placed = Vec::with_capacity(companions.len());
        for (companion_source, companion_destination) in companions {
            place_file(&companion_source, &companion_destination, mode, sink)?;
            placed.push(companion_destination);
        }

        Ok(Placement {
            destination: destination.to_path_buf(),
            method,
            companions: placed,
        })
    }

    /// Places every source, returning the destination paths in source order.
    ///
    /// Stops at the first failure; files placed before it stay in place.
    pub fn place_many<P: AsRef<Path>>(
        &self,
        sources: &[P],
        destination: &Destination,
        mode: PlaceMode,
        sink: &DiagnosticSink,
    ) -> Result<Vec<PathBuf>, CacheError> {
        let targets = match destination {
            Destination::Directory(dir) => join_many(sources, &JoinOptions::new().into_dir(dir)),
            Destination::Paths(paths) => {
                if paths.len() != sources.len() {
                    return Err(CacheError::DestinationMismatch {
                        sources: sources.len(),
                        destinations: paths.len(),
                    });
                }
                paths.clone()
            }
        };

        for (source, target) in sources.iter().zip(&targets) {
            self.place_one(source.as_ref(), target, mode, sink)?;
        }
        Ok(targets)
    }

    /// Resolves the `(source, destination)` companion pairs for a split-format file.
    fn companions(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<Vec<(PathBuf, PathBuf)>, CacheError> {
        let Some(format) = self.split_formats.iter().find(|f| f.matches(source)) else {
            return Ok(Vec::new());
        };

        let mut pairs = Vec::new();
        if let Some(sidecar) = &format.sidecar {
            let sidecar_source = swap_extension(source, &format.primary, sidecar);
            if sidecar_source.exists() {
                let sidecar_destination = swap_extension(destination, &format.primary, sidecar);
                pairs.push((sidecar_source, sidecar_destination));
            } else {
                tracing::debug!(
                    path = %sidecar_source.display(),
                    "optional side-metadata file absent"
                );
            }
        }

        let header_source = swap_extension(source, &format.primary, &format.header);
        if !header_source.exists() {
            return Err(CacheError::NotFound {
                path: header_source,
            });
        }
        let header_destination = swap_extension(destination, &format.primary, &format.header);
        pairs.push((header_source, header_destination));

        Ok(pairs)
    }
}

fn require_exists(path: &Path) -> Result<(), CacheError> {
    match fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CacheError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(CacheError::io_at(path)(e)),
    }
}

/// Places one file, returning the method actually used.
fn place_file(
    source: &Path,
    destination: &Path,
    mode: PlaceMode,
    sink: &DiagnosticSink,
) -> Result<PlaceMode, CacheError> {
    if let Ok(existing) = fs::symlink_metadata(destination) {
        if !existing.file_type().is_symlink() && same_file(source, destination) {
            sink.emit(
                Diagnostic::note(SAME_FILE, "source and destination are the same file")
                    .with_path(destination),
            );
            return Ok(mode);
        }
        sink.emit(
            Diagnostic::warning(OVERWRITE, "destination already exists; overwriting")
                .with_path(destination)
                .with_note(format!("replaced by {} ({mode:?})", source.display())),
        );
        fs::remove_file(destination).map_err(CacheError::io_at(destination))?;
    }

    if mode == PlaceMode::Link {
        match symlink(source, destination) {
            Ok(()) => {
                tracing::debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "linked"
                );
                return Ok(PlaceMode::Link);
            }
            Err(err) => {
                tracing::debug!(
                    destination = %destination.display(),
                    error = %err,
                    "symlink failed; copying"
                );
                sink.emit(
                    Diagnostic::note(LINK_FALLBACK, "symlink not possible; copied instead")
                        .with_path(destination)
                        .with_note(err.to_string()),
                );
            }
        }
    }

    fs::copy(source, destination).map_err(CacheError::io_at(destination))?;
    tracing::debug!(source = %source.display(), destination = %destination.display(), "copied");
    Ok(PlaceMode::Copy)
}

#[cfg(unix)]
fn symlink(source: &Path, destination: &Path) -> io::Result<()> {
    // Relative targets would resolve against the link's directory.
    let target = std::path::absolute(source)?;
    std::os::unix::fs::symlink(target, destination)
}

#[cfg(not(unix))]
fn symlink(_source: &Path, _destination: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not used on this platform",
    ))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replaces the `from` extension of `path`'s file name with `to`.
///
/// Names that do not end with `from` have their full extension replaced.
fn swap_extension(path: &Path, from: &str, to: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let new_name = match name.strip_suffix(from) {
        Some(stem) => format!("{stem}{to}"),
        None => format!("{}{to}", PathParts::split(path).stem),
    };
    path.with_file_name(new_name)
}
