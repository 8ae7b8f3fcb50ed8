//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::CortexConfig;
use std::path::Path;

/// File name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "cortex.toml";

/// Loads and validates a `cortex.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<CortexConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `cortex.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<CortexConfig, ConfigError> {
    let config: CortexConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &CortexConfig) -> Result<(), ConfigError> {
    if config.hash.chunk_size == 0 {
        return Err(ConfigError::ValidationError(
            "hash.chunk_size must be at least 1".to_string(),
        ));
    }

    for ext in &config.materialize.clean_extensions {
        check_extension("materialize.clean_extensions", ext)?;
    }

    for (i, format) in config.materialize.split_formats.iter().enumerate() {
        let field = format!("materialize.split_formats[{i}]");
        if format.primary.is_empty() {
            return Err(ConfigError::MissingField(format!("{field}.primary")));
        }
        if format.header.is_empty() {
            return Err(ConfigError::MissingField(format!("{field}.header")));
        }
        check_extension(&field, &format.primary)?;
        check_extension(&field, &format.header)?;
        if let Some(sidecar) = &format.sidecar {
            check_extension(&field, sidecar)?;
        }
        if format.primary == format.header {
            return Err(ConfigError::ValidationError(format!(
                "{field}: header extension must differ from primary '{}'",
                format.primary
            )));
        }
    }

    for (name, policy) in &config.estimators {
        policy
            .clone()
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("estimators.{name}: {e}")))?;
    }
    Ok(())
}

fn check_extension(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.len() < 2 || !ext.starts_with('.') {
        return Err(ConfigError::ValidationError(format!(
            "{field}: extension '{ext}' must start with '.'"
        )));
    }
    Ok(())
}
