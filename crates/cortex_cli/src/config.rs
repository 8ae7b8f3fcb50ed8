//! Configuration lookup shared by the subcommands.

use std::path::{Path, PathBuf};

use cortex_config::{load_config, load_config_from_str, ConfigError, CortexConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// Loads the configuration selected by the global flags.
///
/// `--config` may name the file itself or its directory. Without it,
/// `cortex.toml` in the current directory is used when present and the
/// built-in defaults otherwise.
pub fn load(global: &GlobalArgs) -> Result<CortexConfig, ConfigError> {
    match &global.config {
        Some(path) if path.is_dir() => load_config(path),
        Some(path) => load_file(path),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.is_file() {
                load_file(&local)
            } else {
                tracing::debug!("no {CONFIG_FILE_NAME} found; using defaults");
                Ok(CortexConfig::default())
            }
        }
    }
}

fn load_file(path: &Path) -> Result<CortexConfig, ConfigError> {
    tracing::debug!(path = %path.display(), "loading configuration");
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}
