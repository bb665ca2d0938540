//! Log command implementation.
//!
//! The `upkeep log` command prints the activity log, newest first.

use crate::cli::args::LogArgs;
use crate::cli::context::{AgentContext, ContextOptions};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The log command implementation.
pub struct LogCommand {
    options: ContextOptions,
    args: LogArgs,
}

impl LogCommand {
    pub fn new(options: ContextOptions, args: LogArgs) -> Self {
        Self { options, args }
    }
}

impl Command for LogCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut ctx = AgentContext::load(&self.options)?;

        if self.args.clear {
            let removed = ctx.state.debug_log.len();
            ctx.state.debug_log.clear();
            ctx.save()?;
            ui.success(&format!("Cleared {} log entries", removed));
            return Ok(CommandResult::success());
        }

        let entries = ctx.state.debug_log.entries();
        if entries.is_empty() {
            ui.message("Activity log is empty");
            return Ok(CommandResult::success());
        }

        let limit = self.args.limit.unwrap_or(entries.len());
        for entry in entries.iter().take(limit) {
            ui.message(entry);
        }
        if limit < entries.len() {
            ui.message(&format!("... {} older entries", entries.len() - limit));
        }

        Ok(CommandResult::success())
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

    fn seed(temp: &TempDir, messages: &[&str]) {
        let mut state = StateStore::default();
        for message in messages {
            state.debug_log.record(message);
        }
        state.save(temp.path()).unwrap();
    }

    #[test]
    fn prints_newest_first() {
        let temp = TempDir::new().unwrap();
        seed(&temp, &["first", "second"]);
        let mut ui = MockUI::new();

        LogCommand::new(options(&temp), LogArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert_eq!(ui.messages().len(), 2);
        assert!(ui.messages()[0].ends_with("second"));
        assert!(ui.messages()[1].ends_with("first"));
    }

    #[test]
    fn limit_truncates_output() {
        let temp = TempDir::new().unwrap();
        seed(&temp, &["a", "b", "c"]);
        let mut ui = MockUI::new();
        let args = LogArgs {
            limit: Some(1),
            ..Default::default()
        };

        LogCommand::new(options(&temp), args).execute(&mut ui).unwrap();

        assert!(ui.messages()[0].ends_with("c"));
        assert!(ui.has_output("2 older entries"));
    }

    #[test]
    fn clear_empties_the_log() {
        let temp = TempDir::new().unwrap();
        seed(&temp, &["a"]);
        let mut ui = MockUI::new();
        let args = LogArgs {
            clear: true,
            ..Default::default()
        };

        LogCommand::new(options(&temp), args).execute(&mut ui).unwrap();

        assert!(StateStore::load(temp.path()).unwrap().debug_log.is_empty());
        assert_eq!(ui.successes(), ["Cleared 1 log entries"]);
    }
}
