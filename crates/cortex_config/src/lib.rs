//! Parsing and validation of `cortex.toml` configuration files.
//!
//! This crate reads the pipeline configuration file and produces a
//! strongly-typed [`CortexConfig`]: hashing and materialization settings plus
//! one memory estimator policy per tool.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
