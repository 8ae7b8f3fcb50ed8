//! Error types for hashing and materialization.

use std::path::{Path, PathBuf};

/// Errors surfaced by cache operations.
///
/// Conditions that do not stop an operation (an overwritten destination, a
/// symlink that fell back to a copy) are reported as diagnostics instead.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A file that must exist does not: a materialization source or the
    /// mandatory header of a split-format file.
    #[error("required file not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// An underlying filesystem call failed.
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An explicit destination list does not match the number of sources.
    #[error("{sources} source files but {destinations} destination paths")]
    DestinationMismatch {
        /// Number of source files.
        sources: usize,
        /// Number of destination paths.
        destinations: usize,
    },

    /// Content hashing was asked to read zero-byte chunks.
    #[error("hash chunk size must be greater than zero")]
    InvalidChunkSize,
}

impl CacheError {
    /// Returns a closure wrapping an I/O error with `path`, for use with `map_err`.
    pub(crate) fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError {
        let path = path.to_path_buf();
        move |source| CacheError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = CacheError::NotFound {
            path: PathBuf::from("/data/T1.hdr"),
        };
        assert_eq!(err.to_string(), "required file not found: /data/T1.hdr");
    }

    #[test]
    fn io_error_display() {
        let err = CacheError::io_at(Path::new("/work/T1.img"))(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("/work/T1.img"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn mismatch_display() {
        let err = CacheError::DestinationMismatch {
            sources: 3,
            destinations: 2,
        };
        assert_eq!(err.to_string(), "3 source files but 2 destination paths");
    }
}
