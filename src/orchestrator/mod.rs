//! The update control loop.
//!
//! A cycle walks the registry in order. For every component it locates the
//! installed unit, resolves the remote version and, when an update is due,
//! publishes an [`UpdateDescriptor`] rather than installing. Installing is
//! left to the host (or to [`UpdateOrchestrator::apply`]); forced reinstall
//! is the one path that installs directly.
//!
//! One component's failure never stops the cycle. Every decision is
//! written to `tracing` and to the persisted activity log.
//!
//! Registry writes go through `&mut StateStore`, so callers serialize them
//! by construction.

pub mod candidate;

pub use candidate::{
    AppliedUpdate, CheckStatus, ComponentCheck, CompletedInstall, CycleReport, UpdateCandidate,
};

use chrono::Utc;

use crate::error::{Result, UpkeepError};
use crate::host::{InstalledUnits, UpdateDescriptor, UpdateTransient};
use crate::installer::{ArchiveInstaller, InstallRequest, InstallResult};
use crate::registry::{TrackedComponent, DEFAULT_BRANCH};
use crate::remote::{RemoteClient, RemoteSource};
use crate::resolver::{Resolution, StrategyKind, VersionResolver};
use crate::state::StateStore;

/// Policy defaults applied to components that do not set their own.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Base of human-facing repository URLs.
    pub web_url: String,
    pub default_branch: String,
    pub default_strategy: StrategyKind,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            web_url: "https://github.com".to_string(),
            default_branch: DEFAULT_BRANCH.to_string(),
            default_strategy: StrategyKind::default(),
        }
    }
}

/// Drives check, reinstall and post-install bookkeeping.
pub struct UpdateOrchestrator<'a, U: InstalledUnits> {
    client: &'a RemoteClient,
    units: &'a U,
    installer: ArchiveInstaller<'a>,
    options: OrchestratorOptions,
}

impl<'a, U: InstalledUnits> UpdateOrchestrator<'a, U> {
    pub fn new(
        client: &'a RemoteClient,
        units: &'a U,
        installer: ArchiveInstaller<'a>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            client,
            units,
            installer,
            options,
        }
    }

    fn resolver(&self) -> VersionResolver<'a> {
        VersionResolver::new(
            self.client,
            self.options.default_branch.clone(),
            self.options.default_strategy,
        )
    }

    /// Run one check cycle over the whole registry.
    pub fn run_cycle(&self, state: &mut StateStore) -> CycleReport {
        let resolver = self.resolver();
        let mut report = CycleReport {
            transient: UpdateTransient {
                last_checked: Some(Utc::now()),
                ..Default::default()
            },
            ..Default::default()
        };

        let components: Vec<TrackedComponent> = state.repos.list().to_vec();
        tracing::info!("Checking {} component(s)", components.len());

        for component in &components {
            let unit_id = match self.units.locate(&component.name) {
                Some(unit_id) => unit_id,
                None => {
                    let msg = format!("{}: not installed, skipping", component.name);
                    tracing::warn!("{}", msg);
                    state.debug_log.record(msg);
                    report.checks.push(ComponentCheck {
                        name: component.name.clone(),
                        unit_id: None,
                        status: CheckStatus::NotInstalled,
                    });
                    continue;
                }
            };

            let status = match resolver.resolve(component, Some(&unit_id)) {
                Resolution::UpdateAvailable { .. } if report.transient.get(&unit_id).is_some() => {
                    let published_by = report
                        .transient
                        .get(&unit_id)
                        .and_then(|d| d.repo.as_ref())
                        .map(|r| r.to_string())
                        .unwrap_or_default();
                    let msg = format!(
                        "{} ({}): update for {} already published from {}, skipping",
                        component.name, component.remote_source, unit_id, published_by
                    );
                    tracing::warn!("{}", msg);
                    state.debug_log.record(msg);
                    CheckStatus::Conflict { published_by }
                }
                Resolution::UpdateAvailable { strategy, remote } => {
                    match self.candidate(component, &unit_id, strategy, &remote) {
                        Ok((candidate, descriptor)) => {
                            state.debug_log.record(format!(
                                "{}: update available {} -> {}",
                                component.name,
                                display_or_none(&component.last_known_version),
                                candidate.new_version
                            ));
                            let version = candidate.new_version.clone();
                            report.transient.publish(descriptor);
                            report.candidates.push(candidate);
                            CheckStatus::UpdateAvailable { version }
                        }
                        Err(e) => {
                            state
                                .debug_log
                                .record(format!("{}: {}", component.name, e));
                            CheckStatus::Unresolvable {
                                kind: e.kind(),
                                reason: e.to_string(),
                            }
                        }
                    }
                }
                Resolution::UpToDate { strategy, remote } => {
                    state.debug_log.record(format!(
                        "{}: up to date ({})",
                        component.name,
                        remote.display(strategy)
                    ));
                    CheckStatus::UpToDate {
                        version: remote.display(strategy),
                    }
                }
                Resolution::Unresolvable { kind, reason } => {
                    state
                        .debug_log
                        .record(format!("{}: skipped, {}", component.name, reason));
                    CheckStatus::Unresolvable { kind, reason }
                }
            };

            report.checks.push(ComponentCheck {
                name: component.name.clone(),
                unit_id: Some(unit_id),
                status,
            });
        }

        tracing::info!(
            "Cycle complete: {} update(s) available, {} skipped",
            report.candidates.len(),
            report.skipped()
        );
        report
    }

    fn candidate(
        &self,
        component: &TrackedComponent,
        unit_id: &str,
        strategy: StrategyKind,
        remote: &crate::resolver::RemoteVersion,
    ) -> Result<(UpdateCandidate, UpdateDescriptor)> {
        let source = &component.remote_source;
        let package = self
            .client
            .resolve_archive_url(source, &remote.archive_ref)?
            .to_string();
        let new_version = remote.display(strategy);

        let candidate = UpdateCandidate {
            component_name: component.name.clone(),
            unit_id: unit_id.to_string(),
            strategy,
            current_identifier: component.last_known_version.clone(),
            remote_identifier: remote.identifier.clone(),
            new_version: new_version.clone(),
            archive_ref: remote.archive_ref.clone(),
            archive_location: package.clone(),
            available: true,
        };
        let descriptor = UpdateDescriptor {
            slug: unit_slug(unit_id).to_string(),
            plugin: unit_id.to_string(),
            new_version,
            url: format!("{}/{}", self.options.web_url.trim_end_matches('/'), source),
            package,
            new_identifier: remote.identifier.clone(),
            component: component.name.clone(),
            repo: Some(source.clone()),
            archive_ref: remote.archive_ref.clone(),
        };
        Ok((candidate, descriptor))
    }

    /// Resolve and reinstall one component over its current install.
    ///
    /// `source` picks between entries sharing `name`; without it the first
    /// entry in registry order is used. Errors only when the component is
    /// unknown or its remote version cannot be resolved; install failures
    /// come back in the result.
    pub fn force_reinstall(
        &self,
        state: &mut StateStore,
        name: &str,
        source: Option<&RemoteSource>,
    ) -> Result<InstallResult> {
        let found = match source {
            Some(source) => state.repos.find(name, source),
            None => state.repos.get(name),
        };
        let component = found
            .cloned()
            .ok_or_else(|| UpkeepError::UnknownComponent {
                name: match source {
                    Some(source) => format!("{} ({})", name, source),
                    None => name.to_string(),
                },
            })?;
        if source.is_none() && state.repos.list().iter().filter(|e| e.name == name).count() > 1 {
            tracing::warn!(
                "{} is tracked from several repositories; reinstalling from {}",
                name,
                component.remote_source
            );
        }

        let unit_id = self.units.locate(name);
        let resolver = self.resolver();
        let (strategy, remote) = match resolver.fetch_remote(&component, unit_id.as_deref()) {
            Ok(pair) => pair,
            Err(e) => {
                state
                    .debug_log
                    .record(format!("{}: reinstall aborted, {}", name, e));
                return Err(e);
            }
        };

        let target = unit_id
            .as_deref()
            .map(unit_slug)
            .unwrap_or(name)
            .to_string();
        let request = InstallRequest::new(component.remote_source.clone(), &remote.archive_ref, target)
            .with_name(name)
            .with_branch(resolver.branch_for(&component))
            .with_overwrite(true)
            .with_identifier(&remote.identifier)
            .with_strategy(component.strategy)
            .with_entry_file(component.entry_file.clone());

        let result = self.installer.install(&request, &mut state.repos);
        if result.success {
            state.debug_log.record(format!(
                "{}: reinstalled from {} at {}",
                name,
                component.remote_source,
                remote.display(strategy.kind())
            ));
        } else {
            state
                .debug_log
                .record(format!("{}: reinstall failed, {}", name, result.message));
        }
        Ok(result)
    }

    /// Persist fresh identifiers after the host installed these units.
    ///
    /// Every entry matching a unit records the head of its own repository.
    pub fn complete_host_install(
        &self,
        state: &mut StateStore,
        unit_ids: &[String],
    ) -> Vec<CompletedInstall> {
        let resolver = self.resolver();
        let components: Vec<TrackedComponent> = state.repos.list().to_vec();
        let mut completed = Vec::new();

        for unit_id in unit_ids {
            let matching = components.iter().filter(|c| {
                c.name == *unit_id || self.units.locate(&c.name).as_deref() == Some(unit_id)
            });
            for component in matching {
                completed.push(self.record_installed(&resolver, state, component, unit_id));
            }
        }

        completed
    }

    fn record_installed(
        &self,
        resolver: &VersionResolver<'_>,
        state: &mut StateStore,
        component: &TrackedComponent,
        unit_id: &str,
    ) -> CompletedInstall {
        let outcome = match resolver.fetch_remote(component, Some(unit_id)) {
            Ok((_, remote)) => {
                state.repos.set_version(
                    &component.name,
                    &component.remote_source,
                    &remote.identifier,
                );
                state.debug_log.record(format!(
                    "{}: recorded installed version {} from {}",
                    component.name, remote.identifier, component.remote_source
                ));
                Ok(remote.identifier)
            }
            Err(e) => {
                tracing::warn!(
                    "Could not record installed version of {}: {}",
                    component.name,
                    e
                );
                state.debug_log.record(format!(
                    "{}: installed version not recorded, {}",
                    component.name, e
                ));
                Err(e.to_string())
            }
        };
        CompletedInstall {
            component: component.name.clone(),
            unit_id: unit_id.to_string(),
            outcome,
        }
    }

    /// Install every published descriptor, then record what was installed.
    ///
    /// Each descriptor is matched back to its registry entry by name and
    /// repository. Successfully applied descriptors are removed from
    /// `transient`.
    pub fn apply(
        &self,
        state: &mut StateStore,
        transient: &mut UpdateTransient,
    ) -> Vec<AppliedUpdate> {
        let resolver = self.resolver();
        let descriptors: Vec<UpdateDescriptor> = transient.descriptors().cloned().collect();
        let mut applied = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let target = self.installer.install_root().join(&descriptor.slug);
            let entry = match &descriptor.repo {
                Some(repo) => state.repos.find(&descriptor.component, repo),
                None => state.repos.get(&descriptor.component),
            }
            .cloned();

            let (result, completion) = match entry {
                Some(component) => {
                    let request = InstallRequest::new(
                        component.remote_source.clone(),
                        &descriptor.archive_ref,
                        &descriptor.slug,
                    )
                    .with_name(&component.name)
                    .with_branch(component.branch_or(&self.options.default_branch))
                    .with_overwrite(true);
                    let result = self.installer.install(&request, &mut state.repos);
                    let completion = result.success.then(|| {
                        self.record_installed(&resolver, state, &component, &descriptor.plugin)
                    });
                    (result, completion)
                }
                None => {
                    let name = match &descriptor.repo {
                        Some(repo) => format!("{} ({})", descriptor.component, repo),
                        None => descriptor.component.clone(),
                    };
                    let result =
                        InstallResult::failed(&UpkeepError::UnknownComponent { name }, target);
                    (result, None)
                }
            };

            if result.success {
                transient.remove(&descriptor.plugin);
            } else {
                state.debug_log.record(format!(
                    "{}: update to {} failed, {}",
                    descriptor.component, descriptor.new_version, result.message
                ));
            }

            applied.push(AppliedUpdate {
                descriptor,
                result,
                completion,
            });
        }

        applied
    }
}

/// Directory part of a unit identifier.
pub fn unit_slug(unit_id: &str) -> &str {
    unit_id.split('/').next().unwrap_or(unit_id)
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() {
        "none"
    } else {
        value
    }
}
