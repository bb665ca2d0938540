//! Configuration file discovery and loading.
//!
//! A configuration file is optional. Lookup order:
//! 1. The path given with `--config` (must exist)
//! 2. `config.yml` inside the `--state-dir` directory
//! 3. `~/.upkeep/config.yml`
//!
//! Command-line overrides are applied after the file is parsed, then the
//! result is validated.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{default_state_dir, UpkeepConfig};
use crate::config::validator::validate;
use crate::error::{Result, UpkeepError};

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.yml";

/// Values supplied on the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub install_root: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut UpkeepConfig) {
        if let Some(install_root) = &self.install_root {
            config.install_root = install_root.clone();
        }
        if let Some(state_dir) = &self.state_dir {
            config.state_dir = Some(state_dir.clone());
        }
    }
}

/// Find a configuration file when none was given explicitly.
pub fn discover_config(state_dir_override: Option<&Path>) -> Option<PathBuf> {
    let candidates = [
        state_dir_override.map(|dir| dir.join(CONFIG_FILE)),
        Some(default_state_dir().join(CONFIG_FILE)),
    ];
    candidates.into_iter().flatten().find(|path| path.exists())
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<UpkeepConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            UpkeepError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            UpkeepError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into UpkeepConfig.
pub fn parse_config(content: &str, source_path: &Path) -> Result<UpkeepConfig> {
    if content.trim().is_empty() {
        return Ok(UpkeepConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| UpkeepError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load, override and validate the effective configuration.
pub fn load_config(
    config_override: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<UpkeepConfig> {
    let mut config = match config_override {
        Some(path) => load_config_file(path)?,
        None => match discover_config(overrides.state_dir.as_deref()) {
            Some(path) => {
                tracing::debug!("Using configuration at {}", path.display());
                load_config_file(&path)?
            }
            None => UpkeepConfig::default(),
        },
    };

    overrides.apply(&mut config);
    validate(&config)?;
    Ok(config)
}
