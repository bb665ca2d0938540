//! Published update candidates.
//!
//! The transient maps an installed unit identifier to the descriptor an
//! installer needs to upgrade it. It is rewritten on every check and read
//! back by `apply`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpkeepError};
use crate::remote::RemoteSource;

/// Everything needed to upgrade one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDescriptor {
    /// Unit directory name.
    pub slug: String,
    /// Unit identifier (`dir` or `dir/entry`).
    pub plugin: String,
    /// Version shown to users (short SHA for commits).
    pub new_version: String,
    /// Repository web page.
    pub url: String,
    /// Archive download URL.
    pub package: String,
    /// Identifier to record once installed.
    pub new_identifier: String,
    /// Registry entry this descriptor was produced for.
    pub component: String,
    /// Repository of that entry; names alone are not unique.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<RemoteSource>,
    /// Ref of the archive in `package`.
    pub archive_ref: String,
}

/// Unit id to descriptor map, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTransient {
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response: BTreeMap<String, UpdateDescriptor>,
}

impl UpdateTransient {
    pub const FILE_NAME: &'static str = "updates.json";

    pub fn file_path(state_dir: &Path) -> PathBuf {
        state_dir.join(Self::FILE_NAME)
    }

    /// Publish (or replace) the descriptor for a unit.
    pub fn publish(&mut self, descriptor: UpdateDescriptor) {
        self.response.insert(descriptor.plugin.clone(), descriptor);
    }

    pub fn get(&self, unit_id: &str) -> Option<&UpdateDescriptor> {
        self.response.get(unit_id)
    }

    pub fn remove(&mut self, unit_id: &str) -> Option<UpdateDescriptor> {
        self.response.remove(unit_id)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &UpdateDescriptor> {
        self.response.values()
    }

    pub fn len(&self) -> usize {
        self.response.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }

    /// Load from the state directory; a missing file is empty.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = Self::file_path(state_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| UpkeepError::ConfigParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Write atomically to the state directory.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let path = Self::file_path(state_dir);
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize updates: {}", e))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }
}
