//! Token command implementation.
//!
//! The stored token is only sent to trusted hosts. `UPKEEP_TOKEN` in the
//! environment takes precedence over it.

use crate::cli::args::TokenCommand;
use crate::cli::context::{AgentContext, ContextOptions};
use crate::error::Result;
use crate::state::TOKEN_ENV;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Runs `upkeep token set|clear|status`.
pub struct TokenCommandRunner {
    options: ContextOptions,
    command: TokenCommand,
}

impl TokenCommandRunner {
    pub fn new(options: ContextOptions, command: TokenCommand) -> Self {
        Self { options, command }
    }
}

impl Command for TokenCommandRunner {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = AgentContext::load(&self.options)?;

        match &self.command {
            TokenCommand::Set(args) => {
                ctx.state.set_token(args.value.as_str());
                let stored = ctx.state.token().is_some();
                ctx.state.debug_log.record(if stored {
                    "Access token updated"
                } else {
                    "Access token removed"
                });
                ctx.save()?;
                if stored {
                    ui.success("Token stored");
                } else {
                    ui.warning("Empty token given; stored token removed");
                }
            }
            TokenCommand::Clear => {
                ctx.state.clear_token();
                ctx.state.debug_log.record("Access token removed");
                ctx.save()?;
                ui.success("Token removed");
            }
            TokenCommand::Status => {
                let from_env = std::env::var(TOKEN_ENV)
                    .map(|v| !v.trim().is_empty())
                    .unwrap_or(false);
                if from_env {
                    ui.message(&format!("Using token from {}", TOKEN_ENV));
                } else if ctx.state.token().is_some() {
                    ui.message("Using stored token");
                } else {
                    ui.message("No token configured; requests are anonymous");
                }
            }
        }

        Ok(CommandResult::success())
    }
}
