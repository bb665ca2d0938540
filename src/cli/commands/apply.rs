//! Apply command implementation.
//!
//! The `upkeep apply` command installs every update published by the last
//! check and records the installed identifiers.

use crate::cli::args::ApplyArgs;
use crate::cli::context::{AgentContext, ContextOptions};
use crate::error::Result;
use crate::installer::ArchiveInstaller;
use crate::orchestrator::UpdateOrchestrator;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The apply command implementation.
pub struct ApplyCommand {
    options: ContextOptions,
    args: ApplyArgs,
}

impl ApplyCommand {
    pub fn new(options: ContextOptions, args: ApplyArgs) -> Self {
        Self { options, args }
    }
}

impl Command for ApplyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = AgentContext::load(&self.options)?;
        let client = ctx.client()?;
        let units = ctx.units();
        let installer = ArchiveInstaller::new(&client, ctx.install_root());
        let orchestrator =
            UpdateOrchestrator::new(&client, &units, installer, ctx.config.orchestrator_options());

        let mut transient = if self.args.check {
            orchestrator.run_cycle(&mut ctx.state).transient
        } else {
            ctx.load_transient()?
        };

        if transient.is_empty() {
            ctx.save()?;
            ui.message("No updates published. Run 'upkeep check' first.");
            return Ok(CommandResult::success());
        }

        let mut spinner = ui.start_spinner(&format!("Installing {} update(s)", transient.len()));
        let applied = orchestrator.apply(&mut ctx.state, &mut transient);
        let failed = applied.iter().filter(|a| !a.result.success).count();
        if failed == 0 {
            spinner.finish_success(&format!("Installed {} update(s)", applied.len()));
        } else {
            spinner.finish_error(&format!("{} of {} update(s) failed", failed, applied.len()));
        }

        ctx.save_transient(&transient)?;
        ctx.save()?;

        for update in &applied {
            let label = format!(
                "{} {}",
                update.descriptor.component, update.descriptor.new_version
            );
            if !update.result.success {
                ui.error(&format!("{}: {}", label, update.result.message));
                continue;
            }
            match update.completion.as_ref().map(|c| &c.outcome) {
                Some(Err(reason)) => ui.warning(&format!(
                    "{} installed, but its version was not recorded: {}",
                    label, reason
                )),
                _ => ui.success(&format!("{} installed", label)),
            }
        }

        if failed > 0 {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}
