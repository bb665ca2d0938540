//! Shared setup for commands that touch state or the network.

use std::path::{Path, PathBuf};

use crate::config::{load_config, ConfigOverrides, UpkeepConfig};
use crate::error::Result;
use crate::host::{DirectoryUnits, UpdateTransient};
use crate::remote::RemoteClient;
use crate::state::StateStore;

/// Global flags that affect where configuration and state are read from.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub config: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub install_root: Option<PathBuf>,
}

/// Loaded configuration plus durable state.
#[derive(Debug)]
pub struct AgentContext {
    pub config: UpkeepConfig,
    pub state: StateStore,
    state_dir: PathBuf,
}

impl AgentContext {
    /// Load configuration and state.
    pub fn load(options: &ContextOptions) -> Result<Self> {
        let overrides = ConfigOverrides {
            install_root: options.install_root.clone(),
            state_dir: options.state_dir.clone(),
        };
        let config = load_config(options.config.as_deref(), &overrides)?;
        let state_dir = config.state_dir();
        let state = StateStore::load(&state_dir)?;

        tracing::debug!(
            "State dir {}, install root {}",
            state_dir.display(),
            config.install_root.display()
        );

        Ok(Self {
            config,
            state,
            state_dir,
        })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn install_root(&self) -> &Path {
        &self.config.install_root
    }

    /// API client using the configured endpoints and credential.
    pub fn client(&self) -> Result<RemoteClient> {
        RemoteClient::with_options(
            &self.config.api_url,
            self.state.credential(),
            self.config.client_options(),
        )
    }

    /// Installed units found under the install root.
    pub fn units(&self) -> DirectoryUnits {
        DirectoryUnits::new(self.install_root())
    }

    pub fn load_transient(&self) -> Result<UpdateTransient> {
        UpdateTransient::load(&self.state_dir)
    }

    pub fn save_transient(&self, transient: &UpdateTransient) -> Result<()> {
        transient.save(&self.state_dir)
    }

    /// Persist the state file.
    pub fn save(&self) -> Result<()> {
        self.state.save(&self.state_dir)
    }
}
