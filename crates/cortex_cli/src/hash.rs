//! `cortex hash`: fingerprint files the way the cache does.

use std::path::PathBuf;

use cortex_cache::{CacheError, FileDigest, FileHasher, HashMethod, NOT_A_FILE};
use cortex_diagnostics::{Diagnostic, DiagnosticSink};

use crate::report::render_and_report;
use crate::{GlobalArgs, HashArgs, ReportFormat};

/// Runs the `cortex hash` command.
///
/// Prints `<digest>  <path>` per file; paths that are not regular files are
/// reported and make the command exit with 1.
pub fn run(args: &HashArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = crate::config::load(global)?;
    let method = if args.timestamp {
        HashMethod::Timestamp
    } else {
        config.hash.method
    };
    let chunk_size = args.chunk_size.unwrap_or(config.hash.chunk_size);

    let sink = DiagnosticSink::new();
    let digests = digest_all(&args.files, method, chunk_size, &sink)?;
    for (path, digest) in &digests {
        println!("{digest}  {}", path.display());
    }
    render_and_report(&sink, ReportFormat::Text, global);

    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Fingerprints each file in order. Paths that are not regular files are
/// left out and reported as errors in `sink`.
fn digest_all(
    files: &[PathBuf],
    method: HashMethod,
    chunk_size: usize,
    sink: &DiagnosticSink,
) -> Result<Vec<(PathBuf, FileDigest)>, CacheError> {
    let mut digests = Vec::with_capacity(files.len());
    for path in files {
        match FileHasher::digest(path, method, chunk_size)? {
            Some(digest) => digests.push((path.clone(), digest)),
            None => sink.emit(Diagnostic::error(NOT_A_FILE, "not a regular file").with_path(path)),
        }
    }
    Ok(digests)
}
