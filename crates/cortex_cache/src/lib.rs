//! Content-addressed cache keys and file materialization.
//!
//! This crate decides whether a previously produced output can be reused and
//! places reusable files into a node's working directory:
//!
//! - [`FileHasher`] fingerprints files by content (streamed XXH3-128) or by
//!   size and timestamps.
//! - [`embedded_token`] and [`embed_token`] detect and build the `_0x<hash>`
//!   tokens carried by cached filenames.
//! - [`Materializer`] symlinks or copies files, dragging along the companion
//!   header and side-metadata files of split formats such as Analyze
//!   `.img`/`.hdr`/`.mat`.
//! - [`to_sequence`] and [`collapse`] normalize "one path or many" arguments.

#![warn(missing_docs)]

pub mod clean;
pub mod error;
pub mod hasher;
pub mod materialize;
pub mod shape;
pub mod token;

pub use clean::{clean_dir, DEFAULT_CLEAN_EXTENSIONS};
pub use error::CacheError;
pub use hasher::{
    DigestKind, FileDigest, FileHasher, HashMethod, DEFAULT_CHUNK_SIZE, NOT_A_FILE,
};
pub use materialize::{Destination, Materializer, PlaceMode, Placement, SplitFormat};
pub use shape::{collapse, to_sequence, IntoPathList, OneOrMany};
pub use token::{embed_token, embedded_token, has_embedded_token, CacheToken, TOKEN_LEN};
