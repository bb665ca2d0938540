//! Configuration schema definitions for Upkeep.
//!
//! This module contains the struct that maps to the YAML configuration
//! file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::orchestrator::OrchestratorOptions;
use crate::remote::{ClientOptions, DEFAULT_TRUSTED_HOSTS};
use crate::resolver::StrategyKind;

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpkeepConfig {
    /// Base URL of the hosting API.
    pub api_url: String,

    /// Base URL of repository web pages.
    pub web_url: String,

    /// Hosts that may receive the access token.
    pub trusted_hosts: Vec<String>,

    /// Branch tracked when a component does not name one.
    pub default_branch: String,

    /// Resolution strategy for components that do not set their own.
    pub strategy: StrategyKind,

    /// Directory holding installed components.
    pub install_root: PathBuf,

    /// Directory holding state files (`~/.upkeep` when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// API request timeout in seconds.
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for UpkeepConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            web_url: "https://github.com".to_string(),
            trusted_hosts: DEFAULT_TRUSTED_HOSTS.iter().map(|h| h.to_string()).collect(),
            default_branch: crate::registry::DEFAULT_BRANCH.to_string(),
            strategy: StrategyKind::default(),
            install_root: PathBuf::from("components"),
            state_dir: None,
            timeout_secs: 30,
            user_agent: "upkeep".to_string(),
        }
    }
}

impl UpkeepConfig {
    /// State directory, defaulting to `~/.upkeep`.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    /// Options for the hosting API client.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            trusted_hosts: self.trusted_hosts.clone(),
            ..ClientOptions::default()
        }
    }

    /// Policy defaults for the orchestrator.
    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            web_url: self.web_url.clone(),
            default_branch: self.default_branch.clone(),
            default_strategy: self.strategy,
        }
    }
}

/// `~/.upkeep`
pub fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".upkeep")
}
