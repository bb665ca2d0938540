//! Persistent state storage.
//!
//! All durable state lives in one YAML file under the state directory:
//! the component registry (`repos`), the activity log (`debug_log`) and the
//! access token (`token`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::log::ActivityLog;
use crate::error::{Result, UpkeepError};
use crate::registry::ComponentRegistry;
use crate::remote::Credential;

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "UPKEEP_TOKEN";

/// Durable agent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStore {
    /// Tracked components.
    #[serde(default)]
    pub repos: ComponentRegistry,

    /// Activity log, newest first.
    #[serde(default)]
    pub debug_log: ActivityLog,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl StateStore {
    /// Name of the state file inside the state directory.
    pub const FILE_NAME: &'static str = "state.yml";

    /// Get the state file path.
    pub fn state_file(state_dir: &Path) -> PathBuf {
        state_dir.join(Self::FILE_NAME)
    }

    /// Load state from disk; a missing file yields empty state.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = Self::state_file(state_dir);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut state: Self =
            serde_yaml::from_str(&content).map_err(|e| UpkeepError::ConfigParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;

        // Hand-edited files may carry duplicates or an oversized log.
        state.repos = ComponentRegistry::from_entries(state.repos.list().to_vec());
        state.debug_log.normalize();

        Ok(state)
    }

    /// Save state to disk using atomic write.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;

        let path = Self::state_file(state_dir);
        let content =
            serde_yaml::to_string(self).map_err(|e| UpkeepError::ConfigValidationError {
                message: format!("Failed to serialize state: {}", e),
            })?;

        let temp_path = path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Stored token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Store a token; blank values clear it.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into().trim().to_string();
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Credential to use, preferring the environment override.
    pub fn credential(&self) -> Option<Credential> {
        self.credential_with_override(std::env::var(TOKEN_ENV).ok())
    }

    /// Credential to use given an explicit override value.
    pub fn credential_with_override(&self, override_token: Option<String>) -> Option<Credential> {
        override_token
            .and_then(Credential::new)
            .or_else(|| self.token.clone().and_then(Credential::new))
    }
}
