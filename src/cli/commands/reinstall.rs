//! Reinstall command implementation.
//!
//! The `upkeep reinstall` command replaces a tracked component with its
//! latest remote version, whether or not an update is due.

use crate::cli::args::ReinstallArgs;
use crate::cli::context::{AgentContext, ContextOptions};
use crate::error::{Result, UpkeepError};
use crate::installer::ArchiveInstaller;
use crate::orchestrator::UpdateOrchestrator;
use crate::remote::RemoteSource;
use crate::ui::{Prompt, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The reinstall command implementation.
pub struct ReinstallCommand {
    options: ContextOptions,
    args: ReinstallArgs,
}

impl ReinstallCommand {
    pub fn new(options: ContextOptions, args: ReinstallArgs) -> Self {
        Self { options, args }
    }

    fn confirmed(&self, ui: &mut dyn UserInterface) -> Result<bool> {
        if self.args.yes {
            return Ok(true);
        }
        if !ui.is_interactive() {
            ui.error("Refusing to reinstall without confirmation; pass --yes");
            return Ok(false);
        }
        let prompt = Prompt::confirm(
            "reinstall",
            format!("Replace the installed copy of {}?", self.args.name),
        );
        Ok(ui.prompt(&prompt)?.as_bool().unwrap_or(false))
    }
}

impl Command for ReinstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = AgentContext::load(&self.options)?;
        let name = self.args.name.as_str();
        let source = self
            .args
            .repo
            .as_deref()
            .map(RemoteSource::parse)
            .transpose()?;

        let tracked = match &source {
            Some(source) => ctx.state.repos.find(name, source).is_some(),
            None => ctx.state.repos.get(name).is_some(),
        };
        if !tracked {
            match &source {
                Some(source) => ui.error(&format!("'{}' is not tracked from {}", name, source)),
                None => ui.error(&format!("'{}' is not tracked", name)),
            }
            return Ok(CommandResult::failure(1));
        }
        if !self.confirmed(ui)? {
            ui.message("Reinstall cancelled");
            return Ok(CommandResult::failure(1));
        }

        let client = ctx.client()?;
        let units = ctx.units();
        let installer = ArchiveInstaller::new(&client, ctx.install_root());
        let orchestrator =
            UpdateOrchestrator::new(&client, &units, installer, ctx.config.orchestrator_options());

        let mut spinner = ui.start_spinner(&format!("Reinstalling {}", name));
        let outcome = orchestrator.force_reinstall(&mut ctx.state, name, source.as_ref());
        ctx.save()?;

        match outcome {
            Ok(result) if result.success => {
                spinner.finish_success(&format!(
                    "Reinstalled {} at {}",
                    name,
                    result.installed_path.display()
                ));
                Ok(CommandResult::success())
            }
            Ok(result) => {
                spinner.finish_error(&format!("Reinstall of {} failed", name));
                ui.error(&result.message);
                Ok(CommandResult::failure(1))
            }
            Err(e @ UpkeepError::UnknownComponent { .. }) => Err(e),
            Err(e) => {
                spinner.finish_error(&format!("Could not resolve {}", name));
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
        }
    }
}
