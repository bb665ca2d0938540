//! Registry command implementation.
//!
//! `upkeep registry list|add|remove|import` edits the tracked component
//! list stored in the state file.

use std::fs;

use crate::cli::args::{
    RegistryAddArgs, RegistryCommand, RegistryImportArgs, RegistryListArgs, RegistryRemoveArgs,
};
use crate::cli::context::{AgentContext, ContextOptions};
use crate::error::{Result, UpkeepError};
use crate::registry::{ComponentDraft, TrackedComponent, UpsertOutcome};
use crate::remote::RemoteSource;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Runs the registry subcommands.
pub struct RegistryCommandRunner {
    options: ContextOptions,
    command: RegistryCommand,
}

impl RegistryCommandRunner {
    pub fn new(options: ContextOptions, command: RegistryCommand) -> Self {
        Self { options, command }
    }

    fn list(
        &self,
        ctx: &AgentContext,
        args: &RegistryListArgs,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let entries = ctx.state.repos.list();

        if args.json {
            let json = serde_json::to_string_pretty(entries)
                .map_err(|e| anyhow::anyhow!("Failed to serialize registry: {}", e))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if entries.is_empty() {
            ui.message("No components tracked. Add one with 'upkeep registry add'.");
            return Ok(CommandResult::success());
        }

        let default_branch = ctx.config.default_branch.as_str();
        let mut table = Table::new(&["Component", "Repository", "Branch", "Strategy", "Version"]);
        for entry in entries {
            let strategy = entry.strategy.unwrap_or(ctx.config.strategy);
            let version = if entry.last_known_version.is_empty() {
                "-".to_string()
            } else {
                entry.last_known_version.clone()
            };
            table.add_row([
                entry.name.clone(),
                entry.remote_source.to_string(),
                entry.branch_or(default_branch).to_string(),
                strategy.to_string(),
                version,
            ]);
        }
        ui.message(&table.render());
        Ok(CommandResult::success())
    }

    fn add(
        &self,
        ctx: &mut AgentContext,
        args: &RegistryAddArgs,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let source = RemoteSource::parse(&args.repo)?;
        let mut entry = TrackedComponent::new(args.name.trim(), source);
        if entry.name.is_empty() {
            return Err(UpkeepError::ConfigValidationError {
                message: "component name must not be empty".to_string(),
            });
        }
        if let Some(branch) = &args.branch {
            entry = entry.with_branch(branch);
        }
        if let Some(version) = &args.version {
            entry = entry.with_version(version.trim());
        }
        if let Some(strategy) = args.strategy {
            entry = entry.with_strategy(strategy);
        }
        if let Some(entry_file) = &args.entry_file {
            entry = entry.with_entry_file(entry_file);
        }

        let summary = format!("{} -> {}", entry.name, entry.remote_source);
        let outcome = ctx.state.repos.upsert(entry);
        let verb = match outcome {
            UpsertOutcome::Inserted => "Tracking",
            UpsertOutcome::Updated => "Updated",
            UpsertOutcome::Rejected => {
                return Err(UpkeepError::ConfigValidationError {
                    message: "component name must not be empty".to_string(),
                })
            }
        };
        ctx.state.debug_log.record(format!("Registry: {} {}", verb.to_lowercase(), summary));
        ctx.save()?;

        ui.success(&format!("{} {}", verb, summary));
        Ok(CommandResult::success())
    }

    fn remove(
        &self,
        ctx: &mut AgentContext,
        args: &RegistryRemoveArgs,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let removed = ctx.state.repos.remove(&args.name);
        if removed == 0 {
            ui.error(&format!("'{}' is not tracked", args.name));
            return Ok(CommandResult::failure(1));
        }

        ctx.state
            .debug_log
            .record(format!("Registry: removed {}", args.name));
        ctx.save()?;
        ui.success(&format!("Stopped tracking {}", args.name));
        Ok(CommandResult::success())
    }

    fn import(
        &self,
        ctx: &mut AgentContext,
        args: &RegistryImportArgs,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let content = fs::read_to_string(&args.file).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UpkeepError::ConfigNotFound {
                    path: args.file.clone(),
                }
            } else {
                UpkeepError::Io(e)
            }
        })?;
        let rows: Vec<ComponentDraft> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml::from_str(&content).map_err(|e| UpkeepError::ConfigParseError {
                path: args.file.clone(),
                message: e.to_string(),
            })?
        };

        let summary = ctx.state.repos.replace_all(rows);
        ctx.state.debug_log.record(format!(
            "Registry: imported {} entries ({} invalid, {} duplicate)",
            summary.kept, summary.discarded, summary.duplicates
        ));
        ctx.save()?;

        ui.success(&format!("Registry now tracks {} component(s)", summary.kept));
        if summary.discarded > 0 {
            ui.warning(&format!(
                "Discarded {} row(s) without a name or valid repository",
                summary.discarded
            ));
        }
        if summary.duplicates > 0 {
            ui.warning(&format!("Dropped {} duplicate row(s)", summary.duplicates));
        }
        Ok(CommandResult::success())
    }
}

impl Command for RegistryCommandRunner {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = AgentContext::load(&self.options)?;

        match &self.command {
            RegistryCommand::List(args) => self.list(&ctx, args, ui),
            RegistryCommand::Add(args) => self.add(&mut ctx, args, ui),
            RegistryCommand::Remove(args) => self.remove(&mut ctx, args, ui),
            RegistryCommand::Import(args) => self.import(&mut ctx, args, ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateStore;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn options(temp: &TempDir) -> ContextOptions {
        ContextOptions {
            state_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        }
    }

    fn add_args(name: &str, repo: &str) -> RegistryAddArgs {
        RegistryAddArgs {
            name: name.to_string(),
            repo: repo.to_string(),
            branch: None,
            version: None,
            strategy: None,
            entry_file: None,
        }
    }

    fn run(temp: &TempDir, command: RegistryCommand, ui: &mut MockUI) -> CommandResult {
        RegistryCommandRunner::new(options(temp), command)
            .execute(ui)
            .unwrap()
    }

    #[test]
    fn add_then_update() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        run(&temp, RegistryCommand::Add(add_args("widget", "acme/widget")), &mut ui);
        let mut args = add_args("widget", "https://github.com/acme/widget.git");
        args.branch = Some("develop".to_string());
        run(&temp, RegistryCommand::Add(args), &mut ui);

        let state = StateStore::load(temp.path()).unwrap();
        assert_eq!(state.repos.len(), 1);
        assert_eq!(state.repos.list()[0].branch.as_deref(), Some("develop"));
        assert_eq!(
            ui.successes(),
            ["Tracking widget -> acme/widget", "Updated widget -> acme/widget"]
        );
    }

    #[test]
    fn add_rejects_bad_repository() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = RegistryCommandRunner::new(
            options(&temp),
            RegistryCommand::Add(add_args("widget", "not-a-repo")),
        )
        .execute(&mut ui);
        assert!(matches!(result, Err(UpkeepError::InvalidRemoteSource { .. })));
    }

    #[test]
    fn remove_unknown_fails() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = run(
            &temp,
            RegistryCommand::Remove(RegistryRemoveArgs {
                name: "ghost".to_string(),
            }),
            &mut ui,
        );
        assert_eq!(result.exit_code, 1);
        assert_eq!(ui.errors(), ["'ghost' is not tracked"]);
    }

    #[test]
    fn import_replaces_registry() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        run(&temp, RegistryCommand::Add(add_args("old", "acme/old")), &mut ui);

        let file = temp.path().join("import.yml");
        fs::write(
            &file,
            "- plugin: widget\n  repo: acme/widget\n  branch: main\n\
             - plugin: widget\n  repo: acme/widget\n\
             - plugin: ''\n  repo: acme/nameless\n",
        )
        .unwrap();
        run(
            &temp,
            RegistryCommand::Import(RegistryImportArgs { file }),
            &mut ui,
        );

        let state = StateStore::load(temp.path()).unwrap();
        let names: Vec<&str> = state.repos.list().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["widget"]);
        assert_eq!(ui.warnings().len(), 2);
    }

    #[test]
    fn list_renders_table() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        run(&temp, RegistryCommand::Add(add_args("widget", "acme/widget")), &mut ui);

        run(
            &temp,
            RegistryCommand::List(RegistryListArgs::default()),
            &mut ui,
        );
        let table = ui.messages().last().unwrap();
        assert!(table.contains("acme/widget"));
        assert!(table.contains("commit"));
        assert!(table.contains("main"));
    }
}
