//! Check command implementation.
//!
//! The `upkeep check` command runs one update cycle and publishes the
//! available updates to `updates.json` for `apply` or an external
//! installer.

use crate::cli::args::CheckArgs;
use crate::cli::context::{AgentContext, ContextOptions};
use crate::error::Result;
use crate::installer::ArchiveInstaller;
use crate::orchestrator::{CheckStatus, CycleReport, UpdateOrchestrator};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    options: ContextOptions,
    args: CheckArgs,
}

impl CheckCommand {
    pub fn new(options: ContextOptions, args: CheckArgs) -> Self {
        Self { options, args }
    }

    fn show_report(&self, report: &CycleReport, ui: &mut dyn UserInterface) -> Result<()> {
        if self.args.json {
            let json = serde_json::json!({
                "checks": report.checks,
                "candidates": report.candidates,
            });
            let rendered = serde_json::to_string_pretty(&json)
                .map_err(|e| anyhow::anyhow!("Failed to serialize report: {}", e))?;
            ui.message(&rendered);
            return Ok(());
        }

        let mut table = Table::new(&["Component", "Unit", "Status", "Version"]);
        for check in &report.checks {
            let version = match &check.status {
                CheckStatus::UpToDate { version } | CheckStatus::UpdateAvailable { version } => {
                    version.clone()
                }
                CheckStatus::NotInstalled => "-".to_string(),
                CheckStatus::Unresolvable { kind, .. } => kind.to_string(),
                CheckStatus::Conflict { published_by } => format!("see {}", published_by),
            };
            table.add_row([
                check.name.clone(),
                check.unit_id.clone().unwrap_or_else(|| "-".to_string()),
                check.status.label().to_string(),
                version,
            ]);
        }
        ui.message(&table.render());

        if ui.output_mode().shows_detail() {
            for check in &report.checks {
                if let CheckStatus::Unresolvable { reason, .. } = &check.status {
                    ui.message(&format!("  {}: {}", check.name, reason));
                }
            }
        }

        let available = report.available().count();
        if available > 0 {
            ui.success(&format!(
                "{} update(s) available. Run 'upkeep apply' to install.",
                available
            ));
        } else {
            ui.success("Everything is up to date");
        }
        if report.skipped() > 0 {
            ui.warning(&format!(
                "{} component(s) skipped; see 'upkeep log'",
                report.skipped()
            ));
        }
        Ok(())
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = AgentContext::load(&self.options)?;

        if ctx.state.repos.is_empty() {
            ui.message("No components tracked. Add one with 'upkeep registry add'.");
            return Ok(CommandResult::success());
        }

        let client = ctx.client()?;
        let units = ctx.units();
        let installer = ArchiveInstaller::new(&client, ctx.install_root());
        let orchestrator =
            UpdateOrchestrator::new(&client, &units, installer, ctx.config.orchestrator_options());

        let mut spinner = ui.start_spinner(&format!(
            "Checking {} component(s)",
            ctx.state.repos.len()
        ));
        let report = orchestrator.run_cycle(&mut ctx.state);
        spinner.finish_success(&format!("Checked {} component(s)", report.checks.len()));

        ctx.save_transient(&report.transient)?;
        ctx.save()?;

        self.show_report(&report, ui)?;
        Ok(CommandResult::success())
    }
}
