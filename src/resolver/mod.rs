//! Version resolution.
//!
//! [`VersionResolver`] turns a [`TrackedComponent`] into a [`Resolution`]:
//! the remote identifier under the component's strategy, and whether it
//! supersedes the stored one. A remote that cannot be read, or that reports
//! a malformed version, resolves to [`Resolution::Unresolvable`] and never
//! to an update.

pub mod strategy;
pub mod version;

pub use strategy::{RemoteVersion, StrategyKind, VersionStrategy};
pub use version::{extract_header_version, is_newer_version, parse_version};

use crate::error::{ErrorKind, Result, UpkeepError};
use crate::registry::TrackedComponent;
use crate::remote::RemoteClient;

/// Outcome of resolving one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Remote matches (or is older than) the stored identifier.
    UpToDate {
        strategy: StrategyKind,
        remote: RemoteVersion,
    },
    /// Remote supersedes the stored identifier.
    UpdateAvailable {
        strategy: StrategyKind,
        remote: RemoteVersion,
    },
    /// Remote state could not be determined this cycle.
    Unresolvable { kind: ErrorKind, reason: String },
}

impl Resolution {
    pub fn is_update_available(&self) -> bool {
        matches!(self, Resolution::UpdateAvailable { .. })
    }

    /// The remote version, when one was resolved.
    pub fn remote(&self) -> Option<&RemoteVersion> {
        match self {
            Resolution::UpToDate { remote, .. } | Resolution::UpdateAvailable { remote, .. } => {
                Some(remote)
            }
            Resolution::Unresolvable { .. } => None,
        }
    }
}

/// Resolves remote versions through a [`RemoteClient`].
pub struct VersionResolver<'a> {
    client: &'a RemoteClient,
    default_branch: String,
    default_strategy: StrategyKind,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        client: &'a RemoteClient,
        default_branch: impl Into<String>,
        default_strategy: StrategyKind,
    ) -> Self {
        Self {
            client,
            default_branch: default_branch.into(),
            default_strategy,
        }
    }

    /// Branch tracked by a component.
    pub fn branch_for<'c>(&'c self, component: &'c TrackedComponent) -> &'c str {
        component.branch_or(&self.default_branch)
    }

    /// Build the strategy for a component.
    ///
    /// The header strategy reads the component's `entry_file`, or the entry
    /// part of the installed unit identifier (`dir/entry`).
    pub fn strategy_for(
        &self,
        component: &TrackedComponent,
        unit_id: Option<&str>,
    ) -> Result<VersionStrategy> {
        match component.strategy.unwrap_or(self.default_strategy) {
            StrategyKind::Commit => Ok(VersionStrategy::Commit),
            StrategyKind::Release => Ok(VersionStrategy::Release),
            StrategyKind::Header => {
                let entry_file = component
                    .entry_file
                    .clone()
                    .or_else(|| {
                        unit_id
                            .and_then(|id| id.split_once('/'))
                            .map(|(_, entry)| entry.to_string())
                    })
                    .ok_or_else(|| UpkeepError::ConfigValidationError {
                        message: format!(
                            "component '{}' uses the header strategy but has no entry file",
                            component.name
                        ),
                    })?;
                Ok(VersionStrategy::Header { entry_file })
            }
        }
    }

    /// Fetch the current remote version without comparing it.
    pub fn fetch_remote(
        &self,
        component: &TrackedComponent,
        unit_id: Option<&str>,
    ) -> Result<(VersionStrategy, RemoteVersion)> {
        let strategy = self.strategy_for(component, unit_id)?;
        let remote = strategy.fetch_remote(
            self.client,
            &component.remote_source,
            self.branch_for(component),
        )?;
        Ok((strategy, remote))
    }

    /// Resolve a component against its stored identifier.
    pub fn resolve(&self, component: &TrackedComponent, unit_id: Option<&str>) -> Resolution {
        let (strategy, remote) = match self.fetch_remote(component, unit_id) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Could not resolve {}: {}", component.name, e);
                return Resolution::Unresolvable {
                    kind: e.kind(),
                    reason: e.to_string(),
                };
            }
        };

        let kind = strategy.kind();
        match strategy.is_update(&component.last_known_version, &remote) {
            Ok(true) => {
                tracing::info!(
                    "{}: update available ({} -> {})",
                    component.name,
                    display_stored(&component.last_known_version),
                    remote.display(kind)
                );
                Resolution::UpdateAvailable {
                    strategy: kind,
                    remote,
                }
            }
            Ok(false) => {
                tracing::debug!("{}: up to date at {}", component.name, remote.display(kind));
                Resolution::UpToDate {
                    strategy: kind,
                    remote,
                }
            }
            Err(token) => Resolution::Unresolvable {
                kind: ErrorKind::Unavailable,
                reason: format!(
                    "cannot compare versions for {}: malformed version '{}'",
                    component.name, token
                ),
            },
        }
    }
}

fn display_stored(stored: &str) -> &str {
    if stored.is_empty() {
        "none"
    } else {
        stored
    }
}
