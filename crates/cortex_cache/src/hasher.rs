//! File fingerprinting for cache reuse decisions.
//!
//! Two fingerprints are available. A content digest streams every byte of the
//! file and changes exactly when the bytes change. A timestamp digest only
//! looks at size, change time, and modification time: it is effectively free
//! for multi-gigabyte volumes, at the price of trusting that untouched
//! metadata means untouched content.

use std::fmt;
use std::fs::{self, File, Metadata};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use cortex_common::ContentHash;
use cortex_diagnostics::{Category, DiagnosticCode};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Default read size for content hashing.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// A path asked to be fingerprinted does not name a regular file.
pub const NOT_A_FILE: DiagnosticCode = DiagnosticCode::new(Category::Hash, 101);

/// Which fingerprint a [`FileDigest`] was computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    /// Digest of the full byte stream.
    Content,
    /// Digest of size, change time, and modification time.
    Timestamp,
}

/// How a caller wants files fingerprinted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMethod {
    /// Hash file contents.
    #[default]
    Content,
    /// Hash file size and timestamps.
    Timestamp,
}

/// A freshly computed fingerprint of one file.
///
/// `value` is 32 lowercase hex characters, suitable for embedding into a
/// filename as a cache token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDigest {
    /// Hex rendering of the 128-bit hash.
    pub value: String,
    /// What the hash was computed over.
    pub kind: DigestKind,
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Computes file fingerprints.
pub struct FileHasher;

impl FileHasher {
    /// Hashes the contents of `path`, reading `chunk_size` bytes at a time.
    ///
    /// Returns `Ok(None)` if `path` does not name a regular file (symlinks are
    /// followed). Read failures on an existing file are surfaced.
    pub fn content_digest(
        path: &Path,
        chunk_size: usize,
    ) -> Result<Option<FileDigest>, CacheError> {
        if chunk_size == 0 {
            return Err(CacheError::InvalidChunkSize);
        }
        if regular_file_metadata(path).is_none() {
            return Ok(None);
        }
        let file = File::open(path).map_err(CacheError::io_at(path))?;
        let hash = ContentHash::from_reader(file, chunk_size).map_err(CacheError::io_at(path))?;
        Ok(Some(FileDigest {
            value: hash.to_hex(),
            kind: DigestKind::Content,
        }))
    }

    /// Hashes the size, change time, and modification time of `path`.
    ///
    /// Returns `Ok(None)` if `path` does not name a regular file.
    pub fn timestamp_digest(path: &Path) -> Result<Option<FileDigest>, CacheError> {
        let Some(meta) = regular_file_metadata(path) else {
            return Ok(None);
        };
        let fingerprint = format!(
            "{}:{}:{}",
            meta.len(),
            change_time(&meta, path),
            system_time_text(meta.modified(), path, "mtime"),
        );
        Ok(Some(FileDigest {
            value: ContentHash::from_bytes(fingerprint.as_bytes()).to_hex(),
            kind: DigestKind::Timestamp,
        }))
    }

    /// Computes the fingerprint selected by `method`.
    pub fn digest(
        path: &Path,
        method: HashMethod,
        chunk_size: usize,
    ) -> Result<Option<FileDigest>, CacheError> {
        match method {
            HashMethod::Content => Self::content_digest(path, chunk_size),
            HashMethod::Timestamp => Self::timestamp_digest(path),
        }
    }
}

fn regular_file_metadata(path: &Path) -> Option<Metadata> {
    fs::metadata(path).ok().filter(Metadata::is_file)
}

#[cfg(unix)]
fn change_time(meta: &Metadata, _path: &Path) -> String {
    use std::os::unix::fs::MetadataExt;
    format!("{}.{:09}", meta.ctime(), meta.ctime_nsec())
}

#[cfg(not(unix))]
fn change_time(meta: &Metadata, path: &Path) -> String {
    system_time_text(meta.created(), path, "ctime")
}

/// Renders a timestamp as `seconds.nanoseconds` since the Unix epoch.
///
/// Unavailable or pre-epoch times render as `0`; the digest stays stable
/// for as long as the platform keeps reporting the same thing.
fn system_time_text(time: std::io::Result<SystemTime>, path: &Path, field: &str) -> String {
    match time.map(|t| t.duration_since(UNIX_EPOCH)) {
        Ok(Ok(dur)) => format!("{}.{:09}", dur.as_secs(), dur.subsec_nanos()),
        Ok(Err(err)) => {
            tracing::debug!(
                path = %path.display(),
                field,
                error = %err,
                "timestamp before unix epoch; using 0"
            );
            "0".to_string()
        }
        Err(err) => {
            tracing::debug!(
                path = %path.display(),
                field,
                error = %err,
                "timestamp unavailable; using 0"
            );
            "0".to_string()
        }
    }
}
