//! Per-cycle results.

use serde::Serialize;

use crate::error::ErrorKind;
use crate::host::{UpdateDescriptor, UpdateTransient};
use crate::installer::InstallResult;
use crate::resolver::StrategyKind;

/// Result of resolving one component during a cycle. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCandidate {
    pub component_name: String,
    pub unit_id: String,
    pub strategy: StrategyKind,
    pub current_identifier: String,
    pub remote_identifier: String,
    /// Display form of the remote identifier.
    pub new_version: String,
    pub archive_ref: String,
    pub archive_location: String,
    pub available: bool,
}

/// How one component fared in a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    UpToDate { version: String },
    UpdateAvailable { version: String },
    NotInstalled,
    Unresolvable { kind: ErrorKind, reason: String },
    /// Another entry already published an update for the same unit.
    Conflict { published_by: String },
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::UpToDate { .. } => "up to date",
            CheckStatus::UpdateAvailable { .. } => "update available",
            CheckStatus::NotInstalled => "not installed",
            CheckStatus::Unresolvable { .. } => "unresolvable",
            CheckStatus::Conflict { .. } => "conflict",
        }
    }
}

/// One component's line in a [`CycleReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentCheck {
    pub name: String,
    pub unit_id: Option<String>,
    #[serde(flatten)]
    pub status: CheckStatus,
}

/// Everything a check cycle produced.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub checks: Vec<ComponentCheck>,
    pub candidates: Vec<UpdateCandidate>,
    /// Descriptors published for the host installer.
    pub transient: UpdateTransient,
}

impl CycleReport {
    pub fn available(&self) -> impl Iterator<Item = &UpdateCandidate> {
        self.candidates.iter().filter(|c| c.available)
    }

    pub fn skipped(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| {
                matches!(
                    c.status,
                    CheckStatus::NotInstalled
                        | CheckStatus::Unresolvable { .. }
                        | CheckStatus::Conflict { .. }
                )
            })
            .count()
    }
}

/// Identifier persisted after a host install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedInstall {
    pub component: String,
    pub unit_id: String,
    /// New identifier, or the reason it could not be resolved.
    pub outcome: Result<String, String>,
}

/// Result of installing one published descriptor.
#[derive(Debug, Clone)]
pub struct AppliedUpdate {
    pub descriptor: UpdateDescriptor,
    pub result: InstallResult,
    /// Set when the install succeeded.
    pub completion: Option<CompletedInstall>,
}
