//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::cli::context::ContextOptions;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    options: ContextOptions,
}

impl CommandDispatcher {
    pub fn new(options: ContextOptions) -> Self {
        Self { options }
    }

    /// Build a dispatcher from the parsed global flags.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(ContextOptions {
            config: cli.config.clone(),
            state_dir: cli.state_dir.clone(),
            install_root: cli.install_root.clone(),
        })
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let options = self.options.clone();
        match &cli.command {
            Commands::Check(args) => super::check::CheckCommand::new(options, args.clone()).execute(ui),
            Commands::Apply(args) => super::apply::ApplyCommand::new(options, args.clone()).execute(ui),
            Commands::Install(args) => {
                super::install::InstallCommand::new(options, args.clone()).execute(ui)
            }
            Commands::Reinstall(args) => {
                super::reinstall::ReinstallCommand::new(options, args.clone()).execute(ui)
            }
            Commands::Registry(cmd) => {
                super::registry::RegistryCommandRunner::new(options, cmd.clone()).execute(ui)
            }
            Commands::Log(args) => super::log::LogCommand::new(options, args.clone()).execute(ui),
            Commands::Token(cmd) => super::token::TokenCommandRunner::new(options, cmd.clone()).execute(ui),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn from_cli_copies_global_paths() {
        let cli = Cli::parse_from([
            "upkeep",
            "--state-dir",
            "/tmp/state",
            "--install-root",
            "/tmp/root",
            "log",
        ]);
        let dispatcher = CommandDispatcher::from_cli(&cli);
        assert_eq!(
            dispatcher.options().state_dir.as_deref(),
            Some(std::path::Path::new("/tmp/state"))
        );
        assert_eq!(
            dispatcher.options().install_root.as_deref(),
            Some(std::path::Path::new("/tmp/root"))
        );
    }

    #[test]
    fn dispatches_to_log_command() {
        let temp = TempDir::new().unwrap();
        let state_dir = temp.path().to_str().unwrap();
        let cli = Cli::parse_from(["upkeep", "--state-dir", state_dir, "log"]);
        let mut ui = MockUI::new();

        let result = CommandDispatcher::from_cli(&cli)
            .dispatch(&cli, &mut ui)
            .unwrap();
        assert!(result.success);
        assert!(ui.has_output("empty"));
    }
}
