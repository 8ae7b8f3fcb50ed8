//! Configuration types deserialized from `cortex.toml`.

use std::collections::BTreeMap;

use cortex_cache::{
    HashMethod, Materializer, PlaceMode, SplitFormat, DEFAULT_CHUNK_SIZE, DEFAULT_CLEAN_EXTENSIONS,
};
use cortex_estimate::{EstimatorPolicy, ResourceEstimator};
use serde::Deserialize;

use crate::error::ConfigError;

/// The top-level configuration parsed from `cortex.toml`.
///
/// Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CortexConfig {
    /// File fingerprinting settings.
    #[serde(default)]
    pub hash: HashConfig,
    /// File placement settings.
    #[serde(default)]
    pub materialize: MaterializeConfig,
    /// Memory estimator policies keyed by tool name.
    #[serde(default)]
    pub estimators: BTreeMap<String, EstimatorPolicy>,
}

impl CortexConfig {
    /// Builds the estimator declared for `tool`.
    pub fn estimator(&self, tool: &str) -> Result<ResourceEstimator, ConfigError> {
        let policy = self
            .estimators
            .get(tool)
            .ok_or_else(|| ConfigError::UnknownEstimator(tool.to_string()))?;
        policy
            .clone()
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("estimators.{tool}: {e}")))
    }

    /// The declared estimator names, sorted.
    pub fn estimator_names(&self) -> impl Iterator<Item = &str> {
        self.estimators.keys().map(String::as_str)
    }

    /// A materializer recognizing the configured split formats.
    pub fn materializer(&self) -> Materializer {
        Materializer::with_split_formats(self.materialize.split_formats.clone())
    }
}

/// `[hash]`: how files are fingerprinted.
#[derive(Debug, Deserialize)]
pub struct HashConfig {
    /// Content or timestamp fingerprints.
    #[serde(default)]
    pub method: HashMethod,
    /// Read buffer size for content hashing, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            method: HashMethod::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// `[materialize]`: how inputs are placed into working directories.
#[derive(Debug, Deserialize)]
pub struct MaterializeConfig {
    /// Link (with copy fallback) or copy.
    #[serde(default)]
    pub mode: PlaceMode,
    /// Extensions removed by `cortex clean`.
    #[serde(default = "default_clean_extensions")]
    pub clean_extensions: Vec<String>,
    /// Formats whose companion files travel with the primary file.
    #[serde(default = "default_split_formats")]
    pub split_formats: Vec<SplitFormat>,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            mode: PlaceMode::default(),
            clean_extensions: default_clean_extensions(),
            split_formats: default_split_formats(),
        }
    }
}

fn default_clean_extensions() -> Vec<String> {
    DEFAULT_CLEAN_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_split_formats() -> Vec<SplitFormat> {
    vec![SplitFormat::analyze()]
}
