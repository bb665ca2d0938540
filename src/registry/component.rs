//! Registry entries.

use serde::{Deserialize, Serialize};

use crate::remote::RemoteSource;
use crate::resolver::StrategyKind;

/// Branch used when an entry does not name one.
pub const DEFAULT_BRANCH: &str = "main";

/// One tracked component: a local unit mapped to a remote repository.
///
/// Field names on disk follow the persisted layout
/// (`plugin`, `repo`, `branch`, `commit_sha`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedComponent {
    /// Logical name; matches an installed unit directory or unit identifier.
    #[serde(rename = "plugin")]
    pub name: String,

    #[serde(rename = "repo")]
    pub remote_source: RemoteSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Last version string or commit observed as installed.
    #[serde(
        rename = "commit_sha",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub last_known_version: String,

    /// Resolution strategy; falls back to the configured policy when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,

    /// Remote path of the file carrying the `Version:` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_file: Option<String>,
}

impl TrackedComponent {
    /// Create an entry with no recorded version.
    pub fn new(name: impl Into<String>, remote_source: RemoteSource) -> Self {
        Self {
            name: name.into(),
            remote_source,
            branch: None,
            last_known_version: String::new(),
            strategy: None,
            entry_file: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = normalize_branch(Some(branch.into()));
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.last_known_version = version.into();
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_entry_file(mut self, entry_file: impl Into<String>) -> Self {
        self.entry_file = Some(entry_file.into());
        self
    }

    /// Branch to track, falling back to `default`.
    pub fn branch_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.branch.as_deref().unwrap_or(default)
    }

    /// Whether two entries share the registry's uniqueness key.
    pub fn same_key(&self, other: &TrackedComponent) -> bool {
        self.name == other.name && self.remote_source == other.remote_source
    }
}

/// A loosely-typed registry row, as submitted by a bulk edit.
///
/// Rows without a name or a parseable repository are discarded when
/// converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDraft {
    #[serde(default)]
    pub plugin: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commit_sha: Option<String>,
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
    #[serde(default)]
    pub entry_file: Option<String>,
}

impl ComponentDraft {
    /// Validate the row into a registry entry.
    pub fn into_component(self) -> Option<TrackedComponent> {
        let name = self.plugin.map(|p| p.trim().to_string()).filter(|p| !p.is_empty())?;
        let repo = self.repo.filter(|r| !r.trim().is_empty())?;
        let remote_source = RemoteSource::parse(&repo).ok()?;

        Some(TrackedComponent {
            name,
            remote_source,
            branch: normalize_branch(self.branch),
            last_known_version: self.commit_sha.unwrap_or_default().trim().to_string(),
            strategy: self.strategy,
            entry_file: self.entry_file.filter(|e| !e.trim().is_empty()),
        })
    }
}

fn normalize_branch(branch: Option<String>) -> Option<String> {
    branch
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
}
