//! Shared foundational types used across the Cortex pipeline core.
//!
//! This crate provides the streaming content hash used for cache keys and the
//! path splitter that both the cache and the resource estimator rely on to
//! reason about multi-part file extensions such as `.nii.gz`.

#![warn(missing_docs)]

pub mod hash;
pub mod path;

pub use hash::ContentHash;
pub use path::{join_many, split_path, JoinOptions, PathParts};
