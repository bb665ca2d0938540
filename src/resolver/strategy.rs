//! Version resolution strategies.
//!
//! Each strategy knows how to read a remote identifier and how to compare
//! it against the stored one. Header and release identifiers are ordered
//! with semver; commit identifiers are compared for exact equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::version::{extract_header_version, is_newer_version, parse_version};
use crate::error::{Result, UpkeepError};
use crate::remote::{short_sha, RemoteClient, RemoteSource};

/// Strategy selector as written in configuration and registry records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// `Version:` header in an entry-point file.
    Header,
    /// Latest tagged release.
    Release,
    /// Head commit of the tracked branch.
    #[default]
    Commit,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Header => "header",
            StrategyKind::Release => "release",
            StrategyKind::Commit => "commit",
        }
    }

    /// Whether identifiers are ordered (semver) rather than compared exactly.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, StrategyKind::Commit)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "header" => Ok(Self::Header),
            "release" | "tag" => Ok(Self::Release),
            "commit" | "sha" => Ok(Self::Commit),
            _ => Err(format!("unknown strategy: {}", s)),
        }
    }
}

/// A resolved remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteVersion {
    /// Value stored in the registry after an install (version or full SHA).
    pub identifier: String,
    /// Ref whose archive holds this state.
    pub archive_ref: String,
}

impl RemoteVersion {
    /// Human-facing form (short SHA for commits).
    pub fn display(&self, kind: StrategyKind) -> String {
        match kind {
            StrategyKind::Commit => short_sha(&self.identifier).to_string(),
            _ => self.identifier.clone(),
        }
    }
}

/// A configured strategy for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStrategy {
    Header { entry_file: String },
    Release,
    Commit,
}

impl VersionStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            VersionStrategy::Header { .. } => StrategyKind::Header,
            VersionStrategy::Release => StrategyKind::Release,
            VersionStrategy::Commit => StrategyKind::Commit,
        }
    }

    /// Read the remote identifier for a source.
    pub fn fetch_remote(
        &self,
        client: &RemoteClient,
        source: &RemoteSource,
        branch: &str,
    ) -> Result<RemoteVersion> {
        match self {
            VersionStrategy::Header { entry_file } => {
                let content = client.fetch_file_content(source, entry_file, branch)?;
                let text = content.text();
                let token = extract_header_version(&text).ok_or_else(|| {
                    let head: String = text.chars().take(100).collect();
                    UpkeepError::unavailable(format!(
                        "no Version header in {}/{} (content start: {:?})",
                        source, entry_file, head
                    ))
                })?;
                if parse_version(&token).is_none() {
                    return Err(UpkeepError::unavailable(format!(
                        "malformed version '{}' in {}/{}",
                        token, source, entry_file
                    )));
                }
                tracing::debug!("Found version '{}' in {}/{}", token, source, entry_file);
                Ok(RemoteVersion {
                    identifier: token,
                    archive_ref: branch.to_string(),
                })
            }
            VersionStrategy::Release => {
                let release = client.fetch_latest_release(source)?;
                let version = release.version().to_string();
                if parse_version(&version).is_none() {
                    return Err(UpkeepError::unavailable(format!(
                        "malformed release tag '{}' for {}",
                        release.tag, source
                    )));
                }
                Ok(RemoteVersion {
                    identifier: version,
                    archive_ref: release.tag,
                })
            }
            VersionStrategy::Commit => {
                let commit = client.fetch_latest_commit(source, branch)?;
                Ok(RemoteVersion {
                    identifier: commit.0.clone(),
                    archive_ref: commit.0,
                })
            }
        }
    }

    /// Decide whether `remote` supersedes `stored`.
    ///
    /// Returns the malformed token as the error when an ordered comparison
    /// cannot be made.
    pub fn is_update(&self, stored: &str, remote: &RemoteVersion) -> std::result::Result<bool, String> {
        match self {
            VersionStrategy::Commit => Ok(stored != remote.identifier),
            VersionStrategy::Header { .. } | VersionStrategy::Release => {
                is_newer_version(stored, &remote.identifier)
            }
        }
    }
}
