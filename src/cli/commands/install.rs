//! Install command implementation.
//!
//! The `upkeep install` command downloads a repository archive into the
//! install root and starts tracking it.

use crate::cli::args::InstallArgs;
use crate::cli::context::{AgentContext, ContextOptions};
use crate::error::{ErrorKind, Result};
use crate::installer::{ArchiveInstaller, InstallRequest};
use crate::registry::TrackedComponent;
use crate::remote::RemoteSource;
use crate::resolver::VersionResolver;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    options: ContextOptions,
    args: InstallArgs,
}

impl InstallCommand {
    pub fn new(options: ContextOptions, args: InstallArgs) -> Self {
        Self { options, args }
    }

    fn registry_name(&self) -> &str {
        self.args.name.as_deref().unwrap_or(&self.args.slug)
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = AgentContext::load(&self.options)?;
        let source = RemoteSource::parse(&self.args.repo)?;
        let client = ctx.client()?;
        let resolver = VersionResolver::new(
            &client,
            ctx.config.default_branch.clone(),
            ctx.config.strategy,
        );

        let mut draft = TrackedComponent::new(self.registry_name(), source.clone());
        if let Some(branch) = &self.args.branch {
            draft = draft.with_branch(branch);
        }
        draft.strategy = self.args.strategy;
        draft.entry_file = self.args.entry_file.clone();
        let branch = resolver.branch_for(&draft).to_string();

        let mut spinner = ui.start_spinner(&format!("Installing {}", source));

        // Without a resolved version the branch head is installed and the
        // identifier is recorded on the next check.
        let mut request = match resolver.fetch_remote(&draft, None) {
            Ok((strategy, remote)) => {
                spinner.set_message(&format!(
                    "Installing {} at {}",
                    source,
                    remote.display(strategy.kind())
                ));
                InstallRequest::new(source.clone(), &remote.archive_ref, &self.args.slug)
                    .with_identifier(&remote.identifier)
            }
            Err(e) => {
                tracing::warn!("Could not resolve {}: {}; installing {}", source, e, branch);
                InstallRequest::new(source.clone(), &branch, &self.args.slug)
            }
        };
        request = request
            .with_name(self.registry_name())
            .with_overwrite(self.args.force)
            .with_strategy(self.args.strategy)
            .with_entry_file(self.args.entry_file.clone());
        if let Some(branch) = &self.args.branch {
            request = request.with_branch(branch);
        }

        let installer = ArchiveInstaller::new(&client, ctx.install_root());
        let result = installer.install(&request, &mut ctx.state.repos);

        if result.success {
            spinner.finish_success(&format!(
                "Installed {} to {}",
                source,
                result.installed_path.display()
            ));
            ctx.state.debug_log.record(format!(
                "{}: installed from {}@{}",
                request.registry_name(),
                source,
                request.git_ref
            ));
        } else {
            spinner.finish_error(&format!("Install of {} failed", source));
            ctx.state.debug_log.record(format!(
                "{}: install failed, {}",
                request.registry_name(),
                result.message
            ));
        }
        ctx.save()?;

        if result.success {
            return Ok(CommandResult::success());
        }

        ui.error(&result.message);
        if result.error_kind == Some(ErrorKind::AlreadyExists) {
            ui.message("Use --force to replace it.");
        }
        Ok(CommandResult::failure(1))
    }
}
