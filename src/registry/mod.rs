//! Component registry.
//!
//! The registry is the durable list of tracked components. It is an
//! ordered sequence; no two entries share the same `(name, remote_source)`
//! pair. Removing an entry never touches the installed files.
//!
//! # Example
//!
//! ```
//! use upkeep::registry::{ComponentRegistry, TrackedComponent};
//! use upkeep::remote::RemoteSource;
//!
//! let mut registry = ComponentRegistry::default();
//! let source = RemoteSource::parse("acme/widget").unwrap();
//! registry.upsert(TrackedComponent::new("widget", source.clone()));
//! registry.upsert(TrackedComponent::new("widget", source).with_version("abc1234"));
//!
//! assert_eq!(registry.list().len(), 1);
//! assert_eq!(registry.list()[0].last_known_version, "abc1234");
//! ```

pub mod component;

pub use component::{ComponentDraft, TrackedComponent, DEFAULT_BRANCH};

use serde::{Deserialize, Serialize};

use crate::remote::RemoteSource;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The entry had no name and was not stored.
    Rejected,
}

/// Counts from a bulk replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Entries stored.
    pub kept: usize,
    /// Rows dropped for a missing name or repository.
    pub discarded: usize,
    /// Rows dropped as duplicates of an earlier row.
    pub duplicates: usize,
}

/// Ordered list of tracked components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRegistry {
    entries: Vec<TrackedComponent>,
}

impl ComponentRegistry {
    /// Build a registry, dropping nameless entries and later duplicates.
    pub fn from_entries(entries: Vec<TrackedComponent>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            if entry.name.trim().is_empty() {
                tracing::warn!("Dropping registry entry for {} with no name", entry.remote_source);
                continue;
            }
            if !registry.entries.iter().any(|e| e.same_key(&entry)) {
                registry.entries.push(entry);
            }
        }
        registry
    }

    /// All entries in registry order.
    pub fn list(&self) -> &[TrackedComponent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with this name.
    pub fn get(&self, name: &str) -> Option<&TrackedComponent> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// The entry for exactly this `(name, remote_source)` pair.
    pub fn find(&self, name: &str, source: &RemoteSource) -> Option<&TrackedComponent> {
        self.entries
            .iter()
            .find(|e| e.name == name && e.remote_source == *source)
    }

    /// Insert or merge an entry.
    ///
    /// An entry with the same name and repository is updated in place; failing
    /// that, the first entry with the same name is retargeted. Retargeting only
    /// happens when the incoming pair is absent, so no duplicate can arise. The stored
    /// version is only replaced when the incoming one is non-empty. An entry
    /// without a name is rejected.
    pub fn upsert(&mut self, entry: TrackedComponent) -> UpsertOutcome {
        if entry.name.trim().is_empty() {
            return UpsertOutcome::Rejected;
        }
        let position = self
            .entries
            .iter()
            .position(|e| e.same_key(&entry))
            .or_else(|| self.entries.iter().position(|e| e.name == entry.name));

        match position {
            Some(index) => {
                let existing = &mut self.entries[index];
                existing.remote_source = entry.remote_source;
                existing.branch = entry.branch;
                if !entry.last_known_version.is_empty() {
                    existing.last_known_version = entry.last_known_version;
                }
                if entry.strategy.is_some() {
                    existing.strategy = entry.strategy;
                }
                if entry.entry_file.is_some() {
                    existing.entry_file = entry.entry_file;
                }
                UpsertOutcome::Updated
            }
            None => {
                self.entries.push(entry);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Record a newly observed version for the `(name, source)` entry.
    ///
    /// Returns true if the entry changed.
    pub fn set_version(&mut self, name: &str, source: &RemoteSource, version: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.name == name && e.remote_source == *source)
        {
            Some(entry) if entry.last_known_version != version => {
                entry.last_known_version = version.to_string();
                true
            }
            _ => false,
        }
    }

    /// Remove all entries with this name; returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        before - self.entries.len()
    }

    /// Replace the whole registry from loosely-typed rows.
    ///
    /// Invalid rows are discarded; for duplicate `(name, repo)` pairs the
    /// first row wins.
    pub fn replace_all(&mut self, rows: Vec<ComponentDraft>) -> ReplaceSummary {
        let mut summary = ReplaceSummary::default();
        let mut entries: Vec<TrackedComponent> = Vec::with_capacity(rows.len());

        for row in rows {
            match row.into_component() {
                None => summary.discarded += 1,
                Some(entry) if entries.iter().any(|e| e.same_key(&entry)) => {
                    summary.duplicates += 1
                }
                Some(entry) => entries.push(entry),
            }
        }

        summary.kept = entries.len();
        tracing::debug!(
            "Registry replaced: {} kept, {} discarded, {} duplicates",
            summary.kept,
            summary.discarded,
            summary.duplicates
        );
        self.entries = entries;
        summary
    }
}
